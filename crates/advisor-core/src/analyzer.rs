//! The Analyzer trait and a helper for accumulating additive signals

use crate::error::Result;
use crate::recommendation::Classifier;
use crate::result::AnalysisResult;
use crate::snapshot::StockSnapshot;
use std::collections::BTreeMap;

/// A scoring heuristic over one dimension of a stock snapshot
///
/// Implementations must be pure: the same snapshot always yields the same
/// result, and nothing is shared between calls. Missing data is reported
/// with [`AnalysisResult::inapplicable`]; only a structurally unusable
/// snapshot returns an error.
pub trait Analyzer: Send + Sync {
    /// Stable key used in configuration and reasoning tags
    fn name(&self) -> &str;

    /// Human readable label
    fn description(&self) -> &str {
        self.name()
    }

    /// Weight used when the configuration has no entry for this analyzer
    fn default_weight(&self) -> f64 {
        1.0
    }

    /// Score the snapshot
    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult>;
}

/// Accumulates signed score terms and their explanations
#[derive(Debug, Clone)]
pub struct Scorecard {
    analyzer: String,
    score: f64,
    reasoning: Vec<String>,
    metrics: BTreeMap<String, f64>,
}

impl Scorecard {
    pub fn new(analyzer: impl Into<String>) -> Self {
        Self {
            analyzer: analyzer.into(),
            score: 0.0,
            reasoning: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Add a score term with its justification
    pub fn add(&mut self, delta: f64, reason: impl Into<String>) {
        self.score += delta;
        self.reasoning.push(reason.into());
    }

    /// Add a justification that does not move the score
    pub fn note(&mut self, reason: impl Into<String>) {
        self.reasoning.push(reason.into());
    }

    pub fn metric(&mut self, key: impl Into<String>, value: f64) {
        if value.is_finite() {
            self.metrics.insert(key.into(), value);
        }
    }

    /// Raise the running score to at least `floor`
    pub fn raise_to(&mut self, floor: f64) {
        self.score = self.score.max(floor);
    }

    /// Lower the running score to at most `ceiling`
    pub fn lower_to(&mut self, ceiling: f64) {
        self.score = self.score.min(ceiling);
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// True until a term or note has been recorded
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_empty()
    }

    /// Clamp, classify and produce the final result
    pub fn finish(self, confidence: f64, classifier: &Classifier) -> AnalysisResult {
        let mut result = AnalysisResult::new(self.analyzer, self.score, confidence, classifier)
            .with_reasoning(self.reasoning);
        result.metrics = self.metrics;
        result
    }
}
