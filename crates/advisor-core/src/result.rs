//! Analysis result types

use crate::recommendation::{Classifier, RecommendationType};
use crate::snapshot::NewsItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reasoning attached to the neutral fallback composite
pub const INSUFFICIENT_DATA: &str = "insufficient data";

/// Output of a single analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analyzer_name: String,
    /// Bearish -1.0 to bullish 1.0
    pub score: f64,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub recommendation_type: RecommendationType,
    /// False when the analyzer had no basis for a judgment
    pub applicable: bool,
    /// Key figures behind the judgment, for drill-down display
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
    /// Articles the judgment was based on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub articles: Vec<NewsItem>,
}

impl AnalysisResult {
    /// Create an applicable result; score and confidence are clamped into range
    pub fn new(
        analyzer_name: impl Into<String>,
        score: f64,
        confidence: f64,
        classifier: &Classifier,
    ) -> Self {
        let score = if score.is_finite() { score.clamp(-1.0, 1.0) } else { 0.0 };
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            analyzer_name: analyzer_name.into(),
            score,
            confidence,
            reasoning: Vec::new(),
            recommendation_type: classifier.classify(score),
            applicable: true,
            metrics: BTreeMap::new(),
            articles: Vec::new(),
        }
    }

    /// A "no opinion" result, excluded from aggregation
    pub fn inapplicable(analyzer_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            analyzer_name: analyzer_name.into(),
            score: 0.0,
            confidence: 0.0,
            reasoning: vec![reason.into()],
            recommendation_type: RecommendationType::Hold,
            applicable: false,
            metrics: BTreeMap::new(),
            articles: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasoning.push(reason.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl IntoIterator<Item = String>) -> Self {
        self.reasoning.extend(reasoning);
        self
    }

    /// Record a metric; non-finite values are dropped so the result stays serializable
    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        if value.is_finite() {
            self.metrics.insert(key.into(), value);
        }
        self
    }

    pub fn with_articles(mut self, articles: Vec<NewsItem>) -> Self {
        self.articles = articles;
        self
    }

    pub fn add_reason(&mut self, reason: impl Into<String>) {
        self.reasoning.push(reason.into());
    }

    pub fn summary(&self) -> String {
        if self.applicable {
            format!(
                "{}: {} (score {:+.2}, confidence {:.0}%)",
                self.analyzer_name,
                self.recommendation_type,
                self.score,
                self.confidence * 100.0
            )
        } else {
            format!("{}: not applicable", self.analyzer_name)
        }
    }
}

/// One line of merged reasoning, tagged with its analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningEntry {
    pub analyzer: String,
    pub text: String,
}

impl ReasoningEntry {
    pub fn new(analyzer: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            analyzer: analyzer.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for ReasoningEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.analyzer, self.text)
    }
}

/// An analyzer that errored on malformed input and was left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerFailure {
    pub analyzer: String,
    pub error: String,
}

/// How many enabled analyzers actually contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub contributing: usize,
    pub enabled: usize,
}

impl Coverage {
    pub fn fraction(&self) -> f64 {
        if self.enabled == 0 {
            return 0.0;
        }
        self.contributing as f64 / self.enabled as f64
    }
}

/// Aggregated recommendation for one stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub symbol: String,
    pub score: f64,
    pub confidence: f64,
    pub recommendation_type: RecommendationType,
    /// Contributors' reasoning in configured analyzer order
    pub reasoning: Vec<ReasoningEntry>,
    /// Contributing analyzer results by name
    pub analyzers: BTreeMap<String, AnalysisResult>,
    #[serde(default)]
    pub inapplicable: Vec<String>,
    #[serde(default)]
    pub failures: Vec<AnalyzerFailure>,
    pub coverage: Coverage,
    /// De-duplicated articles behind the news judgment, newest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub articles: Vec<NewsItem>,
    /// Price objective, set only for bullish recommendations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
}

impl CompositeResult {
    /// Neutral result used when nothing could be aggregated
    pub fn neutral(coverage: Coverage) -> Self {
        Self {
            symbol: String::new(),
            score: 0.0,
            confidence: 0.0,
            recommendation_type: RecommendationType::Hold,
            reasoning: vec![ReasoningEntry::new("composite", INSUFFICIENT_DATA)],
            analyzers: BTreeMap::new(),
            inapplicable: Vec::new(),
            failures: Vec::new(),
            coverage,
            articles: Vec::new(),
            target_price: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// True when no analyzer contributed
    pub fn is_neutral_fallback(&self) -> bool {
        self.analyzers.is_empty()
    }

    pub fn reasoning_lines(&self) -> Vec<String> {
        self.reasoning.iter().map(ToString::to_string).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} (score {:+.2}, confidence {:.0}%, {}/{} analyzers)",
            self.symbol,
            self.recommendation_type,
            self.score,
            self.confidence * 100.0,
            self.coverage.contributing,
            self.coverage.enabled
        )
    }
}
