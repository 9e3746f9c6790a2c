//! Configuration for analyzers, classification and aggregation

use crate::aggregator::AggregationSettings;
use crate::error::{AdvisorError, Result};
use crate::recommendation::{Classifier, ClassifierThresholds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default multiplier applied to the current price for bullish targets
pub const DEFAULT_TARGET_PRICE_MULTIPLIER: f64 = 1.10;

/// Resolved settings for one analyzer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub enabled: bool,
    pub weight: f64,
}

impl AnalyzerConfig {
    pub fn new(enabled: bool, weight: f64) -> Self {
        Self { enabled, weight }
    }
}

/// Per-analyzer entry as written in a config file; missing fields use defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl AnalyzerOverride {
    /// Fields set in `other` win
    fn merge(&mut self, other: Self) {
        self.enabled = other.enabled.or(self.enabled);
        self.weight = other.weight.or(self.weight);
    }
}

/// Top-level advisor configuration
///
/// ```json
/// {
///   "analyzers": { "news": { "enabled": false }, "period": { "weight": 1.5 } },
///   "classifier": { "strong_sell": -0.6, "sell": -0.2, "buy": 0.2, "strong_buy": 0.6 },
///   "coverage_bonus": 0.1,
///   "target_price_multiplier": 1.1
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Overrides keyed by analyzer name
    pub analyzers: BTreeMap<String, AnalyzerOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierThresholds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_bonus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price_multiplier: Option<f64>,
}

impl AdvisorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// Validate weights, thresholds and scalar settings
    pub fn validate(&self) -> Result<()> {
        for (name, entry) in &self.analyzers {
            match entry.weight {
                Some(weight) if !weight.is_finite() || weight <= 0.0 => {
                    return Err(AdvisorError::config(format!(
                        "weight for analyzer '{name}' must be a positive number, got {weight}"
                    )));
                }
                _ => {}
            }
        }

        if let Some(thresholds) = &self.classifier {
            thresholds.validate()?;
        }

        let bonus = self.coverage_bonus();
        if !(0.0..=1.0).contains(&bonus) {
            return Err(AdvisorError::config(format!(
                "coverage_bonus must be between 0 and 1, got {bonus}"
            )));
        }

        let multiplier = self.target_price_multiplier();
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(AdvisorError::config(format!(
                "target_price_multiplier must be positive, got {multiplier}"
            )));
        }

        Ok(())
    }

    /// Settings for `name`, falling back to enabled with `default_weight`
    pub fn resolve(&self, name: &str, default_weight: f64) -> AnalyzerConfig {
        let entry = self.analyzers.get(name).copied().unwrap_or_default();
        AnalyzerConfig {
            enabled: entry.enabled.unwrap_or(true),
            weight: entry.weight.unwrap_or(default_weight),
        }
    }

    /// Configured names that are not in `known`
    pub fn unknown_analyzers<'a>(&'a self, known: &[&str]) -> Vec<&'a str> {
        self.analyzers
            .keys()
            .map(String::as_str)
            .filter(|name| !known.contains(name))
            .collect()
    }

    pub fn thresholds(&self) -> ClassifierThresholds {
        self.classifier.unwrap_or_default()
    }

    pub fn classifier(&self) -> Result<Classifier> {
        Classifier::new(self.thresholds())
    }

    pub fn coverage_bonus(&self) -> f64 {
        self.coverage_bonus
            .unwrap_or_else(|| AggregationSettings::default().coverage_bonus)
    }

    pub fn aggregation_settings(&self) -> AggregationSettings {
        AggregationSettings {
            coverage_bonus: self.coverage_bonus(),
        }
    }

    pub fn target_price_multiplier(&self) -> f64 {
        self.target_price_multiplier
            .unwrap_or(DEFAULT_TARGET_PRICE_MULTIPLIER)
    }

    /// Load configuration from a JSON file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AdvisorError::config(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;

        let config: AdvisorConfig = serde_json::from_str(&content).map_err(|e| {
            AdvisorError::config(format!(
                "Failed to parse config file {}: {e}",
                path.as_ref().display()
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load and merge user-level and project-level configuration
    ///
    /// Missing files are skipped; project settings override user settings.
    pub fn load_merged() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            config.merge(Self::from_file(path)?);
        }

        let project = Path::new(PROJECT_CONFIG_FILE);
        if project.exists() {
            config.merge(Self::from_file(project)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// `~/.config/stock-advisor/advisor.json`
    pub fn user_config_path() -> Option<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()?;

        Some(
            PathBuf::from(home)
                .join(".config")
                .join("stock-advisor")
                .join("advisor.json"),
        )
    }

    /// Merge another configuration into this one; values set in `other` win
    pub fn merge(&mut self, other: AdvisorConfig) {
        for (name, entry) in other.analyzers {
            self.analyzers.entry(name).or_default().merge(entry);
        }
        self.classifier = other.classifier.or(self.classifier);
        self.coverage_bonus = other.coverage_bonus.or(self.coverage_bonus);
        self.target_price_multiplier = other
            .target_price_multiplier
            .or(self.target_price_multiplier);
    }
}

/// Project-level config file name, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".advisor.json";

/// Builder for AdvisorConfig
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    analyzers: BTreeMap<String, AnalyzerOverride>,
    classifier: Option<ClassifierThresholds>,
    coverage_bonus: Option<f64>,
    target_price_multiplier: Option<f64>,
}

impl AdvisorConfigBuilder {
    /// Set the weight of an analyzer
    pub fn weight(mut self, analyzer: impl Into<String>, weight: f64) -> Self {
        self.analyzers.entry(analyzer.into()).or_default().weight = Some(weight);
        self
    }

    /// Enable an analyzer
    pub fn enable(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzers.entry(analyzer.into()).or_default().enabled = Some(true);
        self
    }

    /// Disable an analyzer
    pub fn disable(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzers.entry(analyzer.into()).or_default().enabled = Some(false);
        self
    }

    /// Set classifier thresholds
    pub fn classifier(mut self, thresholds: ClassifierThresholds) -> Self {
        self.classifier = Some(thresholds);
        self
    }

    /// Set the maximum coverage bonus
    pub fn coverage_bonus(mut self, bonus: f64) -> Self {
        self.coverage_bonus = Some(bonus);
        self
    }

    /// Set the target price multiplier
    pub fn target_price_multiplier(mut self, multiplier: f64) -> Self {
        self.target_price_multiplier = Some(multiplier);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AdvisorConfig> {
        let config = AdvisorConfig {
            analyzers: self.analyzers,
            classifier: self.classifier,
            coverage_bonus: self.coverage_bonus,
            target_price_multiplier: self.target_price_multiplier,
        };

        config.validate()?;
        Ok(config)
    }
}
