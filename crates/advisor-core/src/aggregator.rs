//! Composite aggregation of analyzer results
//!
//! The composite score is a confidence-weighted average of the applicable
//! analyzers' scores:
//!
//! ```text
//! score      = Σ(sᵢ·wᵢ·cᵢ) / Σ(wᵢ·cᵢ)
//! confidence = Σ(cᵢ·wᵢ) / Σwᵢ  +  bonus · (k − 1) / (N − 1)
//! ```
//!
//! where `k` analyzers contributed out of `N` enabled. A lone contributor
//! gets no coverage bonus, so its confidence passes through unchanged.

use crate::recommendation::Classifier;
use crate::result::{AnalysisResult, CompositeResult, Coverage, ReasoningEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// An analyzer result paired with its configured weight
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedResult {
    pub result: AnalysisResult,
    pub weight: f64,
}

impl WeightedResult {
    pub fn new(result: AnalysisResult, weight: f64) -> Self {
        Self { result, weight }
    }
}

/// Tunables for the aggregation step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Confidence added when every enabled analyzer contributes
    pub coverage_bonus: f64,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            coverage_bonus: 0.10,
        }
    }
}

/// Combines analyzer results into one recommendation
#[derive(Debug, Clone)]
pub struct Aggregator {
    order: Vec<String>,
    classifier: Classifier,
    settings: AggregationSettings,
}

impl Aggregator {
    /// `order` lists the enabled analyzers in configured order
    pub fn new(order: Vec<String>, classifier: Classifier, settings: AggregationSettings) -> Self {
        Self {
            order,
            classifier,
            settings,
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn settings(&self) -> &AggregationSettings {
        &self.settings
    }

    fn rank(&self, name: &str) -> usize {
        self.order
            .iter()
            .position(|n| n == name)
            .unwrap_or(self.order.len())
    }

    /// Aggregate results supplied in any order
    pub fn aggregate(&self, mut results: Vec<WeightedResult>) -> CompositeResult {
        // Sorting first keeps both the reasoning order and the floating point
        // summation order independent of the input order.
        results.sort_by(|a, b| {
            self.rank(&a.result.analyzer_name)
                .cmp(&self.rank(&b.result.analyzer_name))
                .then_with(|| a.result.analyzer_name.cmp(&b.result.analyzer_name))
        });

        let unlisted = results
            .iter()
            .filter(|r| self.rank(&r.result.analyzer_name) == self.order.len())
            .map(|r| r.result.analyzer_name.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        let enabled = self.order.len() + unlisted;

        let mut inapplicable = Vec::new();
        let mut contributors = Vec::new();
        for weighted in results {
            if !weighted.result.applicable {
                inapplicable.push(weighted.result.analyzer_name);
            } else if weighted.weight.is_finite() && weighted.weight > 0.0 {
                contributors.push(weighted);
            } else {
                debug!(
                    analyzer = %weighted.result.analyzer_name,
                    weight = weighted.weight,
                    "Skipping analyzer without a positive weight"
                );
            }
        }

        let coverage = Coverage {
            contributing: contributors.len(),
            enabled,
        };

        let evidence: f64 = contributors
            .iter()
            .map(|r| r.weight * r.result.confidence)
            .sum();
        if contributors.is_empty() || evidence <= 0.0 || !evidence.is_finite() {
            debug!(
                contributing = contributors.len(),
                enabled, "No usable analyzer output, returning neutral composite"
            );
            let mut neutral = CompositeResult::neutral(Coverage {
                contributing: 0,
                enabled,
            });
            neutral.inapplicable = inapplicable;
            return neutral;
        }

        let score = contributors
            .iter()
            .map(|r| r.result.score * (r.weight * r.result.confidence / evidence))
            .sum::<f64>()
            .clamp(-1.0, 1.0);

        let total_weight: f64 = contributors.iter().map(|r| r.weight).sum();
        let base_confidence: f64 = contributors
            .iter()
            .map(|r| r.result.confidence * (r.weight / total_weight))
            .sum();
        let confidence = (base_confidence + self.coverage_bonus(coverage)).clamp(0.0, 1.0);

        let mut reasoning = Vec::new();
        let mut analyzers = BTreeMap::new();
        let mut articles = Vec::new();
        for mut weighted in contributors {
            articles.append(&mut weighted.result.articles);
            let name = weighted.result.analyzer_name.clone();
            reasoning.extend(
                weighted
                    .result
                    .reasoning
                    .iter()
                    .map(|text| ReasoningEntry::new(name.clone(), text.clone())),
            );
            analyzers.insert(name, weighted.result);
        }

        debug!(score, confidence, contributing = coverage.contributing, enabled, "Aggregated");

        CompositeResult {
            symbol: String::new(),
            score,
            confidence,
            recommendation_type: self.classifier.classify(score),
            reasoning,
            analyzers,
            inapplicable,
            failures: Vec::new(),
            coverage,
            articles,
            target_price: None,
        }
    }

    /// Bounded bonus growing linearly from 0 (one contributor) to the
    /// configured maximum (every enabled analyzer contributed)
    pub fn coverage_bonus(&self, coverage: Coverage) -> f64 {
        if coverage.enabled <= 1 || coverage.contributing <= 1 {
            return 0.0;
        }
        let extra = (coverage.contributing - 1).min(coverage.enabled - 1);
        self.settings.coverage_bonus * extra as f64 / (coverage.enabled - 1) as f64
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Vec::new(), Classifier::default(), AggregationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::RecommendationType;
    use crate::snapshot::NewsItem;

    fn result(name: &str, score: f64, confidence: f64) -> AnalysisResult {
        AnalysisResult::new(name, score, confidence, &Classifier::default())
            .with_reason(format!("{name} reason 1"))
            .with_reason(format!("{name} reason 2"))
    }

    fn weighted(name: &str, score: f64, confidence: f64, weight: f64) -> WeightedResult {
        WeightedResult::new(result(name, score, confidence), weight)
    }

    fn aggregator(names: &[&str]) -> Aggregator {
        Aggregator::new(
            names.iter().map(ToString::to_string).collect(),
            Classifier::default(),
            AggregationSettings::default(),
        )
    }

    #[test]
    fn test_price_volume_scenario() {
        let composite = aggregator(&["price", "volume"]).aggregate(vec![
            weighted("price", 0.5, 0.7, 1.0),
            weighted("volume", 0.2, 0.6, 1.0),
        ]);

        assert!((composite.score - 0.47 / 1.3).abs() < 1e-9);
        assert!((composite.score - 0.3615).abs() < 1e-4);
        assert_eq!(composite.recommendation_type, RecommendationType::Buy);
        // (0.7 + 0.6) / 2 plus the full bonus, both analyzers contributed
        assert!((composite.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_score_stays_in_convex_hull() {
        let cases = [
            vec![(0.9, 0.8, 1.0), (-0.4, 0.3, 0.8), (0.1, 0.6, 1.2)],
            vec![(-1.0, 1.0, 1.1), (1.0, 0.01, 0.8)],
            vec![(0.2, 0.5, 1.0), (0.2, 0.9, 2.0), (0.3, 0.1, 0.5)],
        ];
        let names = ["a", "b", "c"];
        for case in cases {
            let inputs: Vec<_> = case
                .iter()
                .zip(names)
                .map(|(&(s, c, w), n)| weighted(n, s, c, w))
                .collect();
            let min = case.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
            let max = case.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);

            let composite = aggregator(&names).aggregate(inputs);
            assert!(composite.score >= min - 1e-12 && composite.score <= max + 1e-12);
        }
    }

    #[test]
    fn test_order_invariant_score_configured_reasoning_order() {
        let agg = aggregator(&["price", "volume", "news"]);
        let forward = agg.aggregate(vec![
            weighted("price", 0.5, 0.7, 1.0),
            weighted("volume", -0.2, 0.4, 1.0),
            weighted("news", 0.3, 0.8, 1.0),
        ]);
        let reversed = agg.aggregate(vec![
            weighted("news", 0.3, 0.8, 1.0),
            weighted("volume", -0.2, 0.4, 1.0),
            weighted("price", 0.5, 0.7, 1.0),
        ]);

        assert_eq!(forward.score, reversed.score);
        assert_eq!(forward.confidence, reversed.confidence);
        assert_eq!(forward.reasoning, reversed.reasoning);

        let tags: Vec<_> = forward.reasoning.iter().map(|e| e.analyzer.as_str()).collect();
        assert_eq!(tags, vec!["price", "price", "volume", "volume", "news", "news"]);
        assert_eq!(forward.reasoning[0].text, "price reason 1");
        assert_eq!(forward.reasoning[1].text, "price reason 2");
    }

    #[test]
    fn test_single_applicable_analyzer_passes_through() {
        let agg = aggregator(&["price", "volume", "news", "technical"]);
        let composite = agg.aggregate(vec![
            weighted("price", 0.37, 0.7, 1.3),
            WeightedResult::new(AnalysisResult::inapplicable("news", "No news"), 1.0),
        ]);

        assert_eq!(composite.score, 0.37);
        assert_eq!(composite.confidence, 0.7);
        assert_eq!(composite.coverage.contributing, 1);
        assert_eq!(composite.coverage.enabled, 4);
        assert_eq!(composite.inapplicable, vec!["news".to_string()]);
    }

    #[test]
    fn test_zero_applicable_is_neutral() {
        let composite = aggregator(&["news", "fundamental"]).aggregate(vec![
            WeightedResult::new(AnalysisResult::inapplicable("news", "No news"), 1.0),
            WeightedResult::new(AnalysisResult::inapplicable("fundamental", "No data"), 1.0),
        ]);

        assert!(composite.is_neutral_fallback());
        assert_eq!(composite.score, 0.0);
        assert_eq!(composite.confidence, 0.0);
        assert_eq!(composite.recommendation_type, RecommendationType::Hold);
        assert_eq!(composite.reasoning[0].text, "insufficient data");
        assert_eq!(composite.inapplicable.len(), 2);
    }

    #[test]
    fn test_no_analyzers_enabled_is_neutral() {
        let composite = aggregator(&[]).aggregate(Vec::new());
        assert!(composite.is_neutral_fallback());
        assert_eq!(composite.coverage, Coverage::default());
    }

    #[test]
    fn test_inapplicable_news_excluded_from_both_sums() {
        let agg = aggregator(&["price", "volume", "news"]);
        let with_news = agg.aggregate(vec![
            weighted("price", 0.5, 0.7, 1.0),
            weighted("volume", 0.2, 0.6, 1.0),
            WeightedResult::new(AnalysisResult::inapplicable("news", "No news"), 5.0),
        ]);
        let without_news = agg.aggregate(vec![
            weighted("price", 0.5, 0.7, 1.0),
            weighted("volume", 0.2, 0.6, 1.0),
        ]);

        assert_eq!(with_news.score, without_news.score);
        assert_eq!(with_news.confidence, without_news.confidence);
        assert!(!with_news.analyzers.contains_key("news"));
    }

    #[test]
    fn test_news_articles_move_to_composite() {
        let item = NewsItem {
            headline: "Profit jumps".to_string(),
            summary: None,
            source: "wire".to_string(),
            url: None,
            published_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            sentiment: None,
        };
        let news = result("news", 0.3, 0.6).with_articles(vec![item.clone()]);
        let composite = aggregator(&["price", "news"]).aggregate(vec![
            weighted("price", 0.5, 0.7, 1.0),
            WeightedResult::new(news, 1.0),
        ]);

        assert_eq!(composite.articles, vec![item.clone()]);
        assert!(composite.analyzers["news"].articles.is_empty());

        let skipped = AnalysisResult::inapplicable("news", "stale").with_articles(vec![item]);
        let composite = aggregator(&["price", "news"]).aggregate(vec![
            weighted("price", 0.5, 0.7, 1.0),
            WeightedResult::new(skipped, 1.0),
        ]);
        assert!(composite.articles.is_empty());
    }

    #[test]
    fn test_zero_confidence_everywhere_is_neutral() {
        let composite = aggregator(&["price", "volume"]).aggregate(vec![
            weighted("price", 0.5, 0.0, 1.0),
            weighted("volume", 0.2, 0.0, 1.0),
        ]);
        assert!(composite.is_neutral_fallback());
        assert_eq!(composite.score, 0.0);
    }

    #[test]
    fn test_non_positive_weight_is_skipped() {
        let composite = aggregator(&["price", "volume"]).aggregate(vec![
            weighted("price", 0.5, 0.7, 1.0),
            weighted("volume", -0.9, 0.6, 0.0),
        ]);
        assert_eq!(composite.score, 0.5);
        assert!(!composite.analyzers.contains_key("volume"));
    }

    #[test]
    fn test_confidence_acts_as_second_weight() {
        let composite = aggregator(&["a", "b"]).aggregate(vec![
            weighted("a", 1.0, 0.9, 1.0),
            weighted("b", -1.0, 0.1, 1.0),
        ]);
        assert!((composite.score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_bonus_curve() {
        let agg = aggregator(&["a", "b", "c", "d", "e"]);
        let bonus = |k| {
            agg.coverage_bonus(Coverage {
                contributing: k,
                enabled: 5,
            })
        };
        assert_eq!(bonus(0), 0.0);
        assert_eq!(bonus(1), 0.0);
        assert!((bonus(3) - 0.05).abs() < 1e-12);
        assert!((bonus(5) - 0.10).abs() < 1e-12);
        assert!(bonus(2) < bonus(3) && bonus(3) < bonus(4));
    }

    #[test]
    fn test_confidence_never_exceeds_one() {
        let composite = aggregator(&["a", "b"]).aggregate(vec![
            weighted("a", 0.5, 1.0, 1.0),
            weighted("b", 0.5, 0.98, 1.0),
        ]);
        assert!(composite.confidence <= 1.0);
        assert_eq!(composite.confidence, 1.0);
    }

    #[test]
    fn test_unlisted_analyzer_sorted_after_configured() {
        let composite = aggregator(&["price"]).aggregate(vec![
            weighted("custom", 0.1, 0.5, 1.0),
            weighted("price", 0.1, 0.5, 1.0),
        ]);
        assert_eq!(composite.reasoning[0].analyzer, "price");
        assert_eq!(composite.reasoning[2].analyzer, "custom");
        assert_eq!(composite.coverage.enabled, 2);
    }
}
