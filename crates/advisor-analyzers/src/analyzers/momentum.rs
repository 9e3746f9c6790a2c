//! Rate of change over short, medium and long lookbacks

use super::MOMENTUM;
use crate::indicators::trailing_return;
use advisor_core::{AnalysisResult, Analyzer, Classifier, Result, Scorecard, StockSnapshot};

pub const CONFIDENCE: f64 = 0.60;

/// Return lookback in bars, and the strong/moderate percent thresholds with their scores
struct Horizon {
    bars: usize,
    label: &'static str,
    strong: (f64, f64),
    moderate: (f64, f64),
}

const HORIZONS: [Horizon; 3] = [
    Horizon {
        bars: 5,
        label: "5-day",
        strong: (5.0, 0.15),
        moderate: (2.0, 0.08),
    },
    Horizon {
        bars: 20,
        label: "20-day",
        strong: (10.0, 0.2),
        moderate: (4.0, 0.1),
    },
    Horizon {
        bars: 60,
        label: "60-day",
        strong: (20.0, 0.25),
        moderate: (8.0, 0.12),
    },
];

pub const MIN_HISTORY: usize = 61;

/// Scores trailing returns, their agreement, and whether the pace is picking up
#[derive(Debug, Clone, Default)]
pub struct MomentumAnalyzer {
    classifier: Classifier,
}

impl MomentumAnalyzer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    fn score_horizon(card: &mut Scorecard, horizon: &Horizon, change: f64) {
        let (strong, strong_score) = horizon.strong;
        let (moderate, moderate_score) = horizon.moderate;
        let label = horizon.label;
        if change > strong {
            card.add(strong_score, format!("Strong {label} momentum ({change:+.1}%)"));
        } else if change > moderate {
            card.add(moderate_score, format!("Positive {label} momentum ({change:+.1}%)"));
        } else if change < -strong {
            card.add(-strong_score, format!("Sharp {label} decline ({change:+.1}%)"));
        } else if change < -moderate {
            card.add(-moderate_score, format!("Negative {label} momentum ({change:+.1}%)"));
        }
    }
}

impl Analyzer for MomentumAnalyzer {
    fn name(&self) -> &str {
        MOMENTUM
    }

    fn description(&self) -> &str {
        "Momentum Analysis"
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        snapshot.require_ordered_history(MOMENTUM)?;

        let closes = snapshot.closes();
        if closes.len() < MIN_HISTORY {
            return Ok(AnalysisResult::inapplicable(
                MOMENTUM,
                format!(
                    "Insufficient price history for momentum ({} bars, need {MIN_HISTORY})",
                    closes.len()
                ),
            ));
        }

        let mut changes = Vec::with_capacity(HORIZONS.len());
        for horizon in &HORIZONS {
            if let Some(change) = trailing_return(&closes, horizon.bars) {
                changes.push((horizon, change));
            }
        }
        if changes.len() < HORIZONS.len() {
            return Ok(AnalysisResult::inapplicable(
                MOMENTUM,
                "Price history contains non-positive closes",
            ));
        }

        let mut card = Scorecard::new(MOMENTUM);
        for &(horizon, change) in &changes {
            card.metric(format!("return_{}d", horizon.bars), change);
            Self::score_horizon(&mut card, horizon, change);
        }

        if changes.iter().all(|&(_, c)| c > 0.0) {
            card.add(0.15, "Momentum positive across all lookbacks");
        } else if changes.iter().all(|&(_, c)| c < 0.0) {
            card.add(-0.15, "Momentum negative across all lookbacks");
        }

        // per-bar pace, shortest lookback first
        let pace: Vec<f64> = changes
            .iter()
            .map(|&(h, c)| c / h.bars as f64)
            .collect();
        if pace.windows(2).all(|w| w[0] > w[1]) {
            card.add(0.1, "Momentum strengthening: recent pace above longer-term pace");
        } else if pace.windows(2).all(|w| w[0] < w[1]) {
            card.add(-0.1, "Momentum deteriorating: recent pace below longer-term pace");
        }

        if card.is_empty() {
            card.note("No clear momentum");
        }

        Ok(card.finish(CONFIDENCE, &self.classifier))
    }
}
