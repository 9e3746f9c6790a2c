//! Stock snapshot handed to every analyzer
//!
//! A snapshot is assembled once per request by a data-fetching collaborator
//! and stays immutable while analyzers read it.

use crate::error::{AdvisorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bar of the historical price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Volume figures for the current session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetrics {
    /// Volume traded in the current session
    pub current: u64,
    /// Trailing average volume, when the provider supplies one
    #[serde(default)]
    pub average: Option<f64>,
}

/// Fundamental metrics, each optional
///
/// Ratios are plain fractions: a 25% profit margin is `0.25`, a
/// debt/equity of 150% is `1.5`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub profit_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub market_cap: Option<f64>,
}

impl Fundamentals {
    /// Number of metrics that carry a finite value
    pub fn available_count(&self) -> usize {
        [
            self.pe_ratio,
            self.pb_ratio,
            self.debt_to_equity,
            self.profit_margin,
            self.revenue_growth,
            self.earnings_growth,
            self.dividend_yield,
            self.market_cap,
        ]
        .iter()
        .filter(|v| v.is_some_and(f64::is_finite))
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.available_count() == 0
    }
}

/// A recent news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    pub published_at: DateTime<Utc>,
    /// Provider-supplied polarity in [-1, 1]
    #[serde(default)]
    pub sentiment: Option<f64>,
}

/// How a sentiment assessment was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SentimentMethod {
    /// One or more language-model providers classified the articles
    Llm { providers: Vec<String> },
    /// Keyword counting
    Keyword,
}

/// Output of the optional sentiment-classification capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAssessment {
    /// Polarity in [-1, 1]
    pub score: f64,
    /// Provider confidence in [0, 1]
    pub confidence: f64,
    pub method: SentimentMethod,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl SentimentAssessment {
    /// Number of language-model providers behind this assessment
    pub fn provider_count(&self) -> usize {
        match &self.method {
            SentimentMethod::Llm { providers } => providers.len().max(1),
            SentimentMethod::Keyword => 0,
        }
    }
}

/// Everything the analyzers know about one stock for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub current_price: f64,
    pub previous_close: f64,
    #[serde(default)]
    pub volume: VolumeMetrics,
    /// Ascending by timestamp
    #[serde(default)]
    pub history: Vec<PricePoint>,
    #[serde(default)]
    pub fundamentals: Option<Fundamentals>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    /// Present only when the sentiment capability succeeded
    #[serde(default)]
    pub news_sentiment: Option<SentimentAssessment>,
    pub as_of: DateTime<Utc>,
}

impl StockSnapshot {
    /// Create a snapshot with only the price fields filled in
    pub fn new(symbol: impl Into<String>, current_price: f64, previous_close: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            current_price,
            previous_close,
            volume: VolumeMetrics::default(),
            history: Vec::new(),
            fundamentals: None,
            news: Vec::new(),
            news_sentiment: None,
            as_of: Utc::now(),
        }
    }

    pub fn with_history(mut self, history: Vec<PricePoint>) -> Self {
        self.history = history;
        self
    }

    pub fn with_volume(mut self, volume: VolumeMetrics) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_fundamentals(mut self, fundamentals: Fundamentals) -> Self {
        self.fundamentals = Some(fundamentals);
        self
    }

    pub fn with_news(mut self, news: Vec<NewsItem>) -> Self {
        self.news = news;
        self
    }

    pub fn with_news_sentiment(mut self, sentiment: SentimentAssessment) -> Self {
        self.news_sentiment = Some(sentiment);
        self
    }

    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    /// Percent change from the previous close, 0 when there is no usable close
    pub fn price_change_percent(&self) -> f64 {
        if self.previous_close > 0.0 && self.previous_close.is_finite() {
            (self.current_price - self.previous_close) / self.previous_close * 100.0
        } else {
            0.0
        }
    }

    /// Closing prices in chronological order
    pub fn closes(&self) -> Vec<f64> {
        self.history.iter().map(|p| p.close).collect()
    }

    /// Fail with `MalformedInput` unless the current price is a positive number
    pub fn require_price(&self, analyzer: &str) -> Result<()> {
        if !self.current_price.is_finite() || self.current_price <= 0.0 {
            return Err(AdvisorError::malformed(
                analyzer,
                format!("current price {} is not a positive number", self.current_price),
            ));
        }
        Ok(())
    }

    /// Fail with `MalformedInput` if history is out of order or has non-finite closes
    pub fn require_ordered_history(&self, analyzer: &str) -> Result<()> {
        if let Some(pair) = self
            .history
            .windows(2)
            .find(|w| w[1].timestamp < w[0].timestamp)
        {
            return Err(AdvisorError::malformed(
                analyzer,
                format!(
                    "history is not ascending at {}",
                    pair[1].timestamp.format("%Y-%m-%d")
                ),
            ));
        }
        if self.history.iter().any(|p| !p.close.is_finite()) {
            return Err(AdvisorError::malformed(analyzer, "history contains a non-finite close"));
        }
        Ok(())
    }

    /// Check the request-level invariants
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(AdvisorError::malformed("snapshot", "symbol is empty"));
        }
        self.require_ordered_history("snapshot")
    }
}
