//! Performance over fixed lookback windows with a consensus vote

use super::PERIOD;
use crate::indicators::percent_change;
use advisor_core::{
    AnalysisResult, Analyzer, Classifier, PricePoint, RecommendationType, Result, Scorecard,
    StockSnapshot,
};
use chrono::Duration;

/// A lookback window and its weight in the combined score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub label: &'static str,
    pub days: i64,
    pub weight: f64,
}

/// Near-term windows weigh less than the three-month window
pub const WINDOWS: [Window; 4] = [
    Window { label: "1 week", days: 7, weight: 0.6 },
    Window { label: "1 month", days: 30, weight: 0.8 },
    Window { label: "3 months", days: 90, weight: 1.0 },
    Window { label: "6 months", days: 180, weight: 0.9 },
];

const STRONG_GAIN_PERCENT: f64 = 10.0;
const GAIN_PERCENT: f64 = 3.0;

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_WINDOW: f64 = 0.05;

/// Score and category for one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowOutcome {
    pub window: Window,
    pub change_percent: f64,
    pub score: f64,
    pub recommendation: RecommendationType,
}

impl WindowOutcome {
    fn from_change(window: Window, change_percent: f64) -> Self {
        let (score, recommendation) = if change_percent > STRONG_GAIN_PERCENT {
            (0.6, RecommendationType::Buy)
        } else if change_percent > GAIN_PERCENT {
            (0.3, RecommendationType::Buy)
        } else if change_percent > 0.0 {
            (0.1, RecommendationType::Hold)
        } else if change_percent > -GAIN_PERCENT {
            (-0.1, RecommendationType::Hold)
        } else if change_percent > -STRONG_GAIN_PERCENT {
            (-0.3, RecommendationType::Sell)
        } else {
            (-0.6, RecommendationType::Sell)
        };
        Self {
            window,
            change_percent,
            score,
            recommendation,
        }
    }
}

/// Change over `window`, measured from the last close at or before its start
fn window_change(history: &[PricePoint], window: Window) -> Option<f64> {
    let last = history.last()?;
    let start = last.timestamp - Duration::days(window.days);
    let base = history.iter().rev().find(|p| p.timestamp <= start)?;
    percent_change(base.close, last.close)
}

/// Scores 1W/1M/3M/6M performance and folds in the majority vote
#[derive(Debug, Clone, Default)]
pub struct PeriodAnalyzer {
    classifier: Classifier,
}

impl PeriodAnalyzer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Evaluate every window the history covers
    pub fn outcomes(history: &[PricePoint]) -> Vec<WindowOutcome> {
        WINDOWS
            .iter()
            .filter_map(|&w| window_change(history, w).map(|c| WindowOutcome::from_change(w, c)))
            .collect()
    }
}

impl Analyzer for PeriodAnalyzer {
    fn name(&self) -> &str {
        PERIOD
    }

    fn description(&self) -> &str {
        "Period-based Analysis"
    }

    fn default_weight(&self) -> f64 {
        1.2
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        snapshot.require_ordered_history(PERIOD)?;

        let outcomes = Self::outcomes(&snapshot.history);
        if outcomes.is_empty() {
            return Ok(AnalysisResult::inapplicable(
                PERIOD,
                "Price history does not cover any lookback window",
            ));
        }

        let mut card = Scorecard::new(PERIOD);
        let breakdown: Vec<String> = outcomes
            .iter()
            .map(|o| {
                format!(
                    "{} {} ({:+.1}%)",
                    o.window.label, o.recommendation, o.change_percent
                )
            })
            .collect();
        card.note(format!("Period recommendations: {}", breakdown.join(", ")));

        let buys = outcomes.iter().filter(|o| o.recommendation.is_bullish()).count();
        let sells = outcomes.iter().filter(|o| o.recommendation.is_bearish()).count();
        let holds = outcomes.len() - buys - sells;
        card.note(format!("Consensus: {buys} buy, {holds} hold, {sells} sell"));

        let total_weight: f64 = outcomes.iter().map(|o| o.window.weight).sum();
        let weighted = outcomes
            .iter()
            .map(|o| o.score * o.window.weight)
            .sum::<f64>()
            / total_weight;
        card.add(weighted, format!("Weighted period score {weighted:+.2}"));

        if buys >= 3 {
            card.raise_to(0.5);
            card.note("Strong buy consensus across periods");
        } else if buys >= 2 && sells == 0 {
            card.raise_to(0.3);
            card.note("Buy consensus across periods");
        } else if sells >= 3 {
            card.lower_to(-0.5);
            card.note("Strong sell consensus across periods");
        } else if sells >= 2 && buys == 0 {
            card.lower_to(-0.3);
            card.note("Sell consensus across periods");
        }

        for outcome in &outcomes {
            card.metric(
                format!("change_{}d", outcome.window.days),
                outcome.change_percent,
            );
        }

        let confidence = BASE_CONFIDENCE + CONFIDENCE_PER_WINDOW * outcomes.len() as f64;
        Ok(card.finish(confidence, &self.classifier))
    }
}
