//! Stock analyzers and the engine that runs them
//!
//! The nine built-in analyzers live in [`analyzers`]; [`AnalyzerRegistry`]
//! holds them in configured order and [`AnalysisEngine`] runs the enabled
//! ones over a [`StockSnapshot`](advisor_core::StockSnapshot), sequentially
//! or on the blocking pool, before aggregating.

pub mod analyzers;
pub mod engine;
pub mod indicators;
pub mod registry;
pub mod sentiment;
pub mod source;

#[cfg(test)]
mod testing;

pub use analyzers::{
    FundamentalAnalyzer, MomentumAnalyzer, NewsAnalyzer, PeriodAnalyzer, PriceAnalyzer,
    STANDARD_ORDER, SupportResistanceAnalyzer, TechnicalAnalyzer, VolatilityAnalyzer,
    VolumeAnalyzer,
};
pub use engine::{AnalysisEngine, BatchOutcome};
pub use registry::{AnalyzerRegistry, ResolvedAnalyzer};
pub use sentiment::KeywordSentiment;
pub use source::{JsonDirectorySource, SnapshotSource, read_snapshot};
