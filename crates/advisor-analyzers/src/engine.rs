//! Analysis engine: runs the enabled analyzers and aggregates their output

use crate::registry::{AnalyzerRegistry, ResolvedAnalyzer};
use crate::source::SnapshotSource;
use advisor_core::{
    AdvisorConfig, AdvisorError, AnalysisResult, Aggregator, AnalyzerFailure, CompositeResult,
    Result, StockSnapshot, WeightedResult,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one symbol in a batch run
#[derive(Debug)]
pub struct BatchOutcome {
    pub symbol: String,
    pub result: Result<CompositeResult>,
}

struct EngineInner {
    analyzers: Vec<ResolvedAnalyzer>,
    aggregator: Aggregator,
    target_price_multiplier: f64,
}

/// Stock analysis engine
///
/// Cheap to clone; clones share the same analyzers.
#[derive(Clone)]
pub struct AnalysisEngine {
    inner: Arc<EngineInner>,
}

impl AnalysisEngine {
    /// Engine over the built-in analyzers
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let registry = AnalyzerRegistry::standard(config.classifier()?)?;
        Self::with_registry(&registry, config)
    }

    /// Engine over the analyzers of `registry` that `config` enables
    pub fn with_registry(registry: &AnalyzerRegistry, config: &AdvisorConfig) -> Result<Self> {
        config.validate()?;

        let analyzers = registry.enabled(config);
        let order = analyzers.iter().map(|r| r.name().to_string()).collect();
        let aggregator = Aggregator::new(
            order,
            config.classifier()?,
            config.aggregation_settings(),
        );
        debug!(
            analyzers = ?analyzers.iter().map(ResolvedAnalyzer::name).collect::<Vec<_>>(),
            "Analysis engine ready"
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                analyzers,
                aggregator,
                target_price_multiplier: config.target_price_multiplier(),
            }),
        })
    }

    /// Enabled analyzers in configured order
    pub fn analyzers(&self) -> &[ResolvedAnalyzer] {
        &self.inner.analyzers
    }

    fn check_symbol(snapshot: &StockSnapshot) -> Result<()> {
        if snapshot.symbol.trim().is_empty() {
            return Err(AdvisorError::malformed("snapshot", "symbol is empty"));
        }
        Ok(())
    }

    /// Run every enabled analyzer on the calling thread
    pub fn analyze(&self, snapshot: &StockSnapshot) -> Result<CompositeResult> {
        Self::check_symbol(snapshot)?;
        info!(symbol = %snapshot.symbol, "Analyzing");

        let outcomes = self
            .inner
            .analyzers
            .iter()
            .map(|resolved| resolved.analyzer.analyze(snapshot))
            .collect();
        Ok(self.compose(snapshot, outcomes))
    }

    /// Run every enabled analyzer on the blocking pool
    ///
    /// Produces the same result as [`analyze`](Self::analyze).
    pub async fn analyze_concurrent(&self, snapshot: Arc<StockSnapshot>) -> Result<CompositeResult> {
        Self::check_symbol(&snapshot)?;
        info!(symbol = %snapshot.symbol, "Analyzing concurrently");

        let tasks = self.inner.analyzers.iter().map(|resolved| {
            let analyzer = Arc::clone(&resolved.analyzer);
            let snapshot = Arc::clone(&snapshot);
            tokio::task::spawn_blocking(move || analyzer.analyze(&snapshot))
        });

        // join_all keeps task order, so outcomes line up with the analyzers
        let outcomes = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    Err(AdvisorError::Other(format!("Analyzer task failed: {e}")))
                })
            })
            .collect();
        Ok(self.compose(&snapshot, outcomes))
    }

    /// Fetch and analyze several symbols, most confident first
    ///
    /// A symbol that cannot be fetched or analyzed is reported in its
    /// outcome and sorted after the successful ones.
    pub async fn analyze_batch(
        &self,
        source: &dyn SnapshotSource,
        symbols: &[String],
    ) -> Vec<BatchOutcome> {
        info!(count = symbols.len(), "Starting batch analysis");

        let runs = symbols.iter().map(|symbol| async move {
            let result = match source.fetch(symbol).await {
                Ok(snapshot) => self.analyze_concurrent(Arc::new(snapshot)).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!(symbol = %symbol, error = %e, "Batch entry failed");
            }
            BatchOutcome {
                symbol: symbol.clone(),
                result,
            }
        });
        let mut outcomes = futures::future::join_all(runs).await;

        outcomes.sort_by(|a, b| match (&a.result, &b.result) {
            (Ok(x), Ok(y)) => y.confidence.total_cmp(&x.confidence),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(count = outcomes.len(), failed, "Batch analysis complete");
        outcomes
    }

    /// `outcomes` must be in the same order as the enabled analyzers
    fn compose(
        &self,
        snapshot: &StockSnapshot,
        outcomes: Vec<Result<AnalysisResult>>,
    ) -> CompositeResult {
        let mut weighted = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for (resolved, outcome) in self.inner.analyzers.iter().zip(outcomes) {
            match outcome {
                Ok(result) => {
                    debug!(
                        symbol = %snapshot.symbol,
                        analyzer = resolved.name(),
                        applicable = result.applicable,
                        score = result.score,
                        confidence = result.confidence,
                        "Analyzer finished"
                    );
                    weighted.push(WeightedResult::new(result, resolved.config.weight));
                }
                Err(e) => {
                    warn!(
                        symbol = %snapshot.symbol,
                        analyzer = resolved.name(),
                        error = %e,
                        "Analyzer failed, leaving it out of the composite"
                    );
                    failures.push(AnalyzerFailure {
                        analyzer: resolved.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut composite = self
            .inner
            .aggregator
            .aggregate(weighted)
            .with_symbol(snapshot.symbol.clone());
        composite.failures = failures;

        let price = snapshot.current_price;
        if composite.recommendation_type.is_bullish() && price.is_finite() && price > 0.0 {
            composite.target_price = Some(price * self.inner.target_price_multiplier);
        }

        info!(summary = %composite.summary(), "Analysis complete");
        composite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{NEWS, PRICE, STANDARD_ORDER};
    use crate::source::MockSnapshotSource;
    use crate::testing::{linear, news, snapshot_with_closes};
    use advisor_core::{Analyzer, Classifier, RecommendationType};

    struct Fixed {
        name: &'static str,
        score: f64,
        confidence: f64,
    }

    impl Analyzer for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn analyze(&self, _snapshot: &StockSnapshot) -> Result<AnalysisResult> {
            Ok(AnalysisResult::new(
                self.name,
                self.score,
                self.confidence,
                &Classifier::default(),
            )
            .with_reason(format!("{} says {:+.1}", self.name, self.score)))
        }
    }

    fn fixed_engine(analyzers: &[(&'static str, f64, f64)]) -> AnalysisEngine {
        let mut registry = AnalyzerRegistry::new();
        for &(name, score, confidence) in analyzers {
            registry.register(Arc::new(Fixed {
                name,
                score,
                confidence,
            }));
        }
        AnalysisEngine::with_registry(&registry, &AdvisorConfig::default()).unwrap()
    }

    fn rally() -> StockSnapshot {
        snapshot_with_closes(&linear(100.0, 150.0, 200))
    }

    #[test]
    fn test_two_analyzer_scenario() {
        let engine = fixed_engine(&[("a", 0.5, 0.7), ("b", 0.2, 0.6)]);
        let result = engine.analyze(&StockSnapshot::new("ACME", 50.0, 49.0)).unwrap();

        assert!((result.score - 0.47 / 1.3).abs() < 1e-12);
        assert_eq!(result.recommendation_type, RecommendationType::Buy);
        assert!((result.confidence - 0.75).abs() < 1e-12);
        assert_eq!(result.reasoning_lines(), vec!["[a] a says +0.5", "[b] b says +0.2"]);
        assert!((result.target_price.unwrap() - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearish_result_has_no_target() {
        let engine = fixed_engine(&[("a", -0.7, 0.8)]);
        let result = engine.analyze(&StockSnapshot::new("ACME", 50.0, 49.0)).unwrap();
        assert_eq!(result.recommendation_type, RecommendationType::StrongSell);
        assert!(result.target_price.is_none());
    }

    #[test]
    fn test_all_disabled_is_neutral() {
        let config = STANDARD_ORDER
            .iter()
            .fold(AdvisorConfig::builder(), |builder, name| builder.disable(*name))
            .build()
            .unwrap();
        let engine = AnalysisEngine::from_config(&config).unwrap();
        assert!(engine.analyzers().is_empty());

        let result = engine.analyze(&rally()).unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.recommendation_type, RecommendationType::Hold);
        assert!(result.is_neutral_fallback());
        assert_eq!(result.symbol, "TEST");
    }

    #[test]
    fn test_news_without_articles_is_excluded() {
        let engine = AnalysisEngine::from_config(&AdvisorConfig::default()).unwrap();
        let result = engine.analyze(&rally()).unwrap();

        assert!(result.inapplicable.contains(&NEWS.to_string()));
        assert!(!result.analyzers.contains_key(NEWS));
        assert!(result.reasoning.iter().all(|r| r.analyzer != NEWS));
        assert_eq!(result.coverage.enabled, 9);
        assert!(result.coverage.contributing < 9);
    }

    #[test]
    fn test_composite_carries_news_articles() {
        let snapshot = rally();
        let as_of = snapshot.as_of;
        let snapshot = snapshot.with_news(vec![
            news("Analysts upgrade shares", "wire", as_of - chrono::Duration::days(3)),
            news("Record quarterly revenue", "desk", as_of - chrono::Duration::days(1)),
        ]);
        let engine = AnalysisEngine::from_config(&AdvisorConfig::default()).unwrap();
        let result = engine.analyze(&snapshot).unwrap();

        let headlines: Vec<&str> = result.articles.iter().map(|a| a.headline.as_str()).collect();
        assert_eq!(headlines, vec!["Record quarterly revenue", "Analysts upgrade shares"]);
        assert!(result.analyzers[NEWS].articles.is_empty());
    }

    #[test]
    fn test_malformed_price_is_recorded() {
        let engine = AnalysisEngine::from_config(&AdvisorConfig::default()).unwrap();
        let mut snapshot = rally();
        snapshot.current_price = f64::NAN;

        let result = engine.analyze(&snapshot).unwrap();
        assert!(result.failures.iter().any(|f| f.analyzer == PRICE));
        assert!(!result.analyzers.contains_key(PRICE));
        assert!(result.score.is_finite());
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let engine = AnalysisEngine::from_config(&AdvisorConfig::default()).unwrap();
        let mut snapshot = rally();
        snapshot.symbol = "  ".to_string();
        assert!(matches!(
            engine.analyze(&snapshot),
            Err(AdvisorError::MalformedInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let engine = AnalysisEngine::from_config(&AdvisorConfig::default()).unwrap();
        let snapshot = rally();

        let sequential = engine.analyze(&snapshot).unwrap();
        let concurrent = engine.analyze_concurrent(Arc::new(snapshot)).await.unwrap();
        assert_eq!(sequential, concurrent);
    }

    #[tokio::test]
    async fn test_batch_sorted_by_confidence() {
        let mut source = MockSnapshotSource::new();
        source.expect_fetch().returning(|symbol| match symbol {
            // unusable price: every analyzer drops out, neutral confidence 0
            "LOW" => Ok(StockSnapshot::new("LOW", f64::NAN, 10.0)),
            "HIGH" => {
                let mut snapshot = snapshot_with_closes(&linear(100.0, 150.0, 200));
                snapshot.symbol = "HIGH".to_string();
                Ok(snapshot)
            }
            other => Err(AdvisorError::Source {
                symbol: other.to_string(),
                reason: "not found".to_string(),
            }),
        });

        let engine = AnalysisEngine::from_config(&AdvisorConfig::default()).unwrap();
        let symbols = vec!["MISSING".to_string(), "LOW".to_string(), "HIGH".to_string()];
        let outcomes = engine.analyze_batch(&source, &symbols).await;

        let order: Vec<&str> = outcomes.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(order, vec!["HIGH", "LOW", "MISSING"]);
        assert!(outcomes[1].result.as_ref().unwrap().is_neutral_fallback());
        assert!(outcomes[2].result.is_err());
    }
}
