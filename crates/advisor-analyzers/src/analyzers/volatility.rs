//! Realized volatility level, its trend, and the recent trading range

use super::VOLATILITY;
use crate::indicators::annualized_volatility;
use advisor_core::{AnalysisResult, Analyzer, Classifier, Result, Scorecard, StockSnapshot};

pub const CONFIDENCE: f64 = 0.50;

pub const MIN_HISTORY: usize = 21;
/// Closes used for the headline volatility figure
const LEVEL_CLOSES: usize = 61;
/// Closes in the recent window when comparing volatility regimes
const RECENT_CLOSES: usize = 21;
const RANGE_BARS: usize = 20;

const LOW_VOL: f64 = 0.20;
const MODERATE_VOL: f64 = 0.35;
const HIGH_VOL: f64 = 0.50;

const CONTRACTING_RATIO: f64 = 0.7;
const EXPANDING_RATIO: f64 = 1.3;

const TIGHT_RANGE: f64 = 0.05;
const WIDE_RANGE: f64 = 0.30;

/// Favors calm, contracting volatility and penalizes turbulent regimes
#[derive(Debug, Clone, Default)]
pub struct VolatilityAnalyzer {
    classifier: Classifier,
}

impl VolatilityAnalyzer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    fn score_level(card: &mut Scorecard, vol: f64) {
        card.metric("annualized_volatility", vol);
        let pct = vol * 100.0;
        if vol < LOW_VOL {
            card.add(0.1, format!("Low volatility ({pct:.1}% annualized)"));
        } else if vol <= MODERATE_VOL {
            card.add(0.05, format!("Moderate volatility ({pct:.1}% annualized)"));
        } else if vol <= HIGH_VOL {
            card.add(-0.15, format!("Elevated volatility ({pct:.1}% annualized)"));
        } else {
            card.add(-0.3, format!("Extreme volatility ({pct:.1}% annualized)"));
        }
    }

    /// Compares the last 20 returns with the 40 before them
    fn score_trend(card: &mut Scorecard, closes: &[f64]) -> Result<()> {
        if closes.len() < LEVEL_CLOSES {
            return Ok(());
        }
        let len = closes.len();
        let recent = annualized_volatility(&closes[len - RECENT_CLOSES..])?;
        let earlier = annualized_volatility(&closes[len - LEVEL_CLOSES..=len - RECENT_CLOSES])?;
        let (Some(recent), Some(earlier)) = (recent, earlier) else {
            return Ok(());
        };
        if earlier <= 0.0 {
            return Ok(());
        }

        let ratio = recent / earlier;
        card.metric("volatility_ratio", ratio);
        if ratio < CONTRACTING_RATIO {
            card.metric("volatility_trend", -1.0);
            card.add(0.05, format!("Volatility contracting ({ratio:.2}x prior level)"));
        } else if ratio > EXPANDING_RATIO {
            card.metric("volatility_trend", 1.0);
            card.add(-0.1, format!("Volatility expanding ({ratio:.2}x prior level)"));
        } else {
            card.metric("volatility_trend", 0.0);
        }
        Ok(())
    }

    fn score_range(card: &mut Scorecard, closes: &[f64]) {
        let recent = &closes[closes.len().saturating_sub(RANGE_BARS)..];
        let high = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let low = recent.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = recent.iter().sum::<f64>() / recent.len() as f64;
        if mean <= 0.0 {
            return;
        }
        let width = (high - low) / mean;
        card.metric("range_percent", width * 100.0);
        if width < TIGHT_RANGE {
            card.add(0.05, format!("Tight {RANGE_BARS}-day trading range"));
        } else if width > WIDE_RANGE {
            card.add(-0.05, format!("Wide {RANGE_BARS}-day trading range"));
        }
    }
}

impl Analyzer for VolatilityAnalyzer {
    fn name(&self) -> &str {
        VOLATILITY
    }

    fn description(&self) -> &str {
        "Volatility Analysis"
    }

    fn default_weight(&self) -> f64 {
        0.8
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        snapshot.require_ordered_history(VOLATILITY)?;

        let closes = snapshot.closes();
        if closes.len() < MIN_HISTORY {
            return Ok(AnalysisResult::inapplicable(
                VOLATILITY,
                format!(
                    "Insufficient price history for volatility ({} bars, need {MIN_HISTORY})",
                    closes.len()
                ),
            ));
        }

        let window = &closes[closes.len().saturating_sub(LEVEL_CLOSES)..];
        let Some(vol) = annualized_volatility(window)? else {
            return Ok(AnalysisResult::inapplicable(
                VOLATILITY,
                "Not enough valid returns to measure volatility",
            ));
        };

        let mut card = Scorecard::new(VOLATILITY);
        Self::score_level(&mut card, vol);
        Self::score_trend(&mut card, &closes)?;
        Self::score_range(&mut card, &closes);

        Ok(card.finish(CONFIDENCE, &self.classifier))
    }
}
