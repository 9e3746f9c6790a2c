//! Core abstractions for stock-advisor
//!
//! This crate defines the data handed to analyzers ([`StockSnapshot`]), the
//! [`Analyzer`] trait every scoring heuristic implements, the per-analyzer
//! and composite result types, the five-band [`Classifier`], the
//! confidence-weighted [`Aggregator`] and the configuration surface.
//!
//! Nothing in here performs I/O except [`AdvisorConfig::from_file`] and the
//! merged config loaders, which are only called by binaries.

pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod recommendation;
pub mod result;
pub mod snapshot;

pub use aggregator::{AggregationSettings, Aggregator, WeightedResult};
pub use analyzer::{Analyzer, Scorecard};
pub use config::{AdvisorConfig, AdvisorConfigBuilder, AnalyzerConfig, AnalyzerOverride};
pub use error::{AdvisorError, Result};
pub use recommendation::{Classifier, ClassifierThresholds, RecommendationType};
pub use result::{AnalysisResult, AnalyzerFailure, CompositeResult, Coverage, ReasoningEntry};
pub use snapshot::{
    Fundamentals, NewsItem, PricePoint, SentimentAssessment, SentimentMethod, StockSnapshot,
    VolumeMetrics,
};
