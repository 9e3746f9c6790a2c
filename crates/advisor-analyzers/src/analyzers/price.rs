//! Daily price change and P/E valuation

use super::PRICE;
use advisor_core::{AnalysisResult, Analyzer, Classifier, Result, Scorecard, StockSnapshot};

/// Price is observed directly, so confidence does not vary with input
pub const CONFIDENCE: f64 = 0.70;

const STRONG_MOVE_PERCENT: f64 = 3.0;
const MOVE_PERCENT: f64 = 1.0;
const SIGNIFICANT_MOVE_PERCENT: f64 = 5.0;

const PE_UNDERVALUED: f64 = 10.0;
const PE_FAIR_MAX: f64 = 25.0;
const PE_OVERVALUED: f64 = 35.0;

/// Scores the move from the previous close and the P/E band
#[derive(Debug, Clone, Default)]
pub struct PriceAnalyzer {
    classifier: Classifier,
}

impl PriceAnalyzer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }
}

impl Analyzer for PriceAnalyzer {
    fn name(&self) -> &str {
        PRICE
    }

    fn description(&self) -> &str {
        "Price Analysis"
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        snapshot.require_price(PRICE)?;

        let mut card = Scorecard::new(PRICE);
        let change = snapshot.price_change_percent();
        card.metric("change_percent", change);

        if change > STRONG_MOVE_PERCENT {
            card.add(0.4, format!("Strong positive momentum ({change:+.2}%)"));
        } else if change > MOVE_PERCENT {
            card.add(0.2, format!("Positive momentum ({change:+.2}%)"));
        } else if change < -STRONG_MOVE_PERCENT {
            card.add(-0.4, format!("Strong negative momentum ({change:+.2}%)"));
        } else if change < -MOVE_PERCENT {
            card.add(-0.2, format!("Negative momentum ({change:+.2}%)"));
        } else {
            card.note(format!("Price stable ({change:+.2}%)"));
        }

        if change.abs() >= SIGNIFICANT_MOVE_PERCENT {
            let direction = change.signum();
            card.add(
                0.1 * direction,
                format!("Significant single-session move of {:.1}%", change.abs()),
            );
        }

        let pe = snapshot
            .fundamentals
            .as_ref()
            .and_then(|f| f.pe_ratio)
            .filter(|pe| pe.is_finite());
        if let Some(pe) = pe {
            card.metric("pe_ratio", pe);
            if pe <= 0.0 {
                card.add(-0.2, format!("Negative earnings (P/E {pe:.1})"));
            } else if pe < PE_UNDERVALUED {
                card.add(0.3, format!("Low P/E of {pe:.1} suggests undervaluation"));
            } else if pe <= PE_FAIR_MAX {
                card.add(0.2, format!("Reasonable P/E of {pe:.1}"));
            } else if pe > PE_OVERVALUED {
                card.add(-0.3, format!("High P/E of {pe:.1} suggests overvaluation"));
            } else {
                card.note(format!("Elevated P/E of {pe:.1}"));
            }
        }

        Ok(card.finish(CONFIDENCE, &self.classifier))
    }
}
