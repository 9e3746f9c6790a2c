//! The built-in analyzers
//!
//! Each analyzer scores one dimension of a [`StockSnapshot`](advisor_core::StockSnapshot)
//! with additive threshold rules. Thresholds are module constants so they
//! can be read next to the rules that use them.

pub mod fundamental;
pub mod momentum;
pub mod news;
pub mod period;
pub mod price;
pub mod support_resistance;
pub mod technical;
pub mod volatility;
pub mod volume;

pub use fundamental::FundamentalAnalyzer;
pub use momentum::MomentumAnalyzer;
pub use news::NewsAnalyzer;
pub use period::PeriodAnalyzer;
pub use price::PriceAnalyzer;
pub use support_resistance::SupportResistanceAnalyzer;
pub use technical::TechnicalAnalyzer;
pub use volatility::VolatilityAnalyzer;
pub use volume::VolumeAnalyzer;

pub const PRICE: &str = "price";
pub const VOLUME: &str = "volume";
pub const NEWS: &str = "news";
pub const TECHNICAL: &str = "technical";
pub const PERIOD: &str = "period";
pub const SUPPORT_RESISTANCE: &str = "support_resistance";
pub const FUNDAMENTAL: &str = "fundamental";
pub const MOMENTUM: &str = "momentum";
pub const VOLATILITY: &str = "volatility";

/// Built-in analyzer names in their default order
pub const STANDARD_ORDER: [&str; 9] = [
    PRICE,
    VOLUME,
    NEWS,
    TECHNICAL,
    PERIOD,
    SUPPORT_RESISTANCE,
    FUNDAMENTAL,
    MOMENTUM,
    VOLATILITY,
];
