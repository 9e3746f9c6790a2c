//! Shared utilities for stock-advisor
//!
//! This crate provides common functionality used across the stock-advisor
//! workspace: logging setup and runtime settings read from the environment.

pub mod config;
pub mod logging;

pub use config::{LogFormat, Settings};
pub use logging::{init_tracing, init_tracing_json, init_tracing_with};
