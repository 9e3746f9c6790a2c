//! Ordered registry of analyzers

use crate::analyzers::{
    FundamentalAnalyzer, MomentumAnalyzer, NewsAnalyzer, PeriodAnalyzer, PriceAnalyzer,
    SupportResistanceAnalyzer, TechnicalAnalyzer, VolatilityAnalyzer, VolumeAnalyzer,
};
use advisor_core::{AdvisorConfig, Analyzer, AnalyzerConfig, Classifier, Result};
use std::sync::Arc;
use tracing::warn;

/// An analyzer together with its effective configuration
#[derive(Clone)]
pub struct ResolvedAnalyzer {
    pub analyzer: Arc<dyn Analyzer>,
    pub config: AnalyzerConfig,
}

impl ResolvedAnalyzer {
    pub fn name(&self) -> &str {
        self.analyzer.name()
    }
}

/// Analyzers keyed by name, kept in registration order
///
/// Registration order is the configured analyzer order: it decides how the
/// composite reasoning is laid out.
#[derive(Default, Clone)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The nine built-in analyzers in their standard order
    pub fn standard(classifier: Classifier) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(PriceAnalyzer::new(classifier)));
        registry.register(Arc::new(VolumeAnalyzer::new(classifier)));
        registry.register(Arc::new(NewsAnalyzer::new(classifier)?));
        registry.register(Arc::new(TechnicalAnalyzer::new(classifier)));
        registry.register(Arc::new(PeriodAnalyzer::new(classifier)));
        registry.register(Arc::new(SupportResistanceAnalyzer::new(classifier)));
        registry.register(Arc::new(FundamentalAnalyzer::new(classifier)));
        registry.register(Arc::new(MomentumAnalyzer::new(classifier)));
        registry.register(Arc::new(VolatilityAnalyzer::new(classifier)));
        Ok(registry)
    }

    /// Register an analyzer
    ///
    /// An analyzer with the same name is replaced in place, keeping its position.
    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        match self
            .analyzers
            .iter_mut()
            .find(|existing| existing.name() == analyzer.name())
        {
            Some(slot) => *slot = analyzer,
            None => self.analyzers.push(analyzer),
        }
    }

    /// Get an analyzer by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Analyzer>> {
        self.analyzers.iter().find(|a| a.name() == name).cloned()
    }

    /// Registered names in order
    pub fn names(&self) -> Vec<&str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Every registered analyzer with its settings from `config`
    ///
    /// Configuration entries naming no registered analyzer are ignored
    /// with a warning.
    pub fn resolve(&self, config: &AdvisorConfig) -> Vec<ResolvedAnalyzer> {
        for unknown in config.unknown_analyzers(&self.names()) {
            warn!(analyzer = unknown, "Ignoring configuration for unknown analyzer");
        }

        self.analyzers
            .iter()
            .map(|analyzer| ResolvedAnalyzer {
                config: config.resolve(analyzer.name(), analyzer.default_weight()),
                analyzer: Arc::clone(analyzer),
            })
            .collect()
    }

    /// Only the analyzers `config` leaves enabled
    pub fn enabled(&self, config: &AdvisorConfig) -> Vec<ResolvedAnalyzer> {
        self.resolve(config)
            .into_iter()
            .filter(|r| r.config.enabled)
            .collect()
    }
}
