//! Valuation, balance sheet, profitability and growth against healthy bands

use super::FUNDAMENTAL;
use advisor_core::{
    AnalysisResult, Analyzer, Classifier, Fundamentals, Result, Scorecard, StockSnapshot,
};

const BASE_CONFIDENCE: f64 = 0.40;
const CONFIDENCE_PER_METRIC: f64 = 0.05;

const LARGE_CAP: f64 = 10e9;

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Scores each available fundamental metric
#[derive(Debug, Clone, Default)]
pub struct FundamentalAnalyzer {
    classifier: Classifier,
}

impl FundamentalAnalyzer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    fn score(card: &mut Scorecard, f: &Fundamentals) {
        if let Some(pe) = finite(f.pe_ratio) {
            card.metric("pe_ratio", pe);
            if pe <= 0.0 {
                card.add(-0.1, format!("Negative earnings (P/E {pe:.1})"));
            } else if pe < 10.0 {
                card.add(0.1, format!("Low P/E of {pe:.1}"));
            } else if pe <= 25.0 {
                card.add(0.15, format!("Healthy P/E of {pe:.1}"));
            } else if pe > 35.0 {
                card.add(-0.15, format!("Rich P/E of {pe:.1}"));
            }
        }

        if let Some(pb) = finite(f.pb_ratio) {
            card.metric("pb_ratio", pb);
            if pb > 0.0 && pb < 1.0 {
                card.add(0.1, format!("Trading below book value (P/B {pb:.2})"));
            } else if pb > 0.0 && pb < 3.0 {
                card.add(0.05, format!("Reasonable P/B of {pb:.2}"));
            } else if pb > 5.0 {
                card.add(-0.1, format!("High P/B of {pb:.2}"));
            }
        }

        if let Some(de) = finite(f.debt_to_equity) {
            card.metric("debt_to_equity", de);
            if de < 0.5 {
                card.add(0.1, format!("Low leverage (D/E {de:.2})"));
            } else if de > 2.0 {
                card.add(-0.15, format!("High leverage (D/E {de:.2})"));
            }
        }

        if let Some(margin) = finite(f.profit_margin) {
            card.metric("profit_margin", margin);
            let pct = margin * 100.0;
            if margin > 0.20 {
                card.add(0.15, format!("Excellent profit margin of {pct:.1}%"));
            } else if margin > 0.10 {
                card.add(0.1, format!("Solid profit margin of {pct:.1}%"));
            } else if margin < 0.0 {
                card.add(-0.15, format!("Unprofitable (margin {pct:.1}%)"));
            }
        }

        if let Some(growth) = finite(f.revenue_growth) {
            card.metric("revenue_growth", growth);
            let pct = growth * 100.0;
            if growth > 0.15 {
                card.add(0.15, format!("Strong revenue growth of {pct:.1}%"));
            } else if growth > 0.05 {
                card.add(0.1, format!("Revenue growing {pct:.1}%"));
            } else if growth < 0.0 {
                card.add(-0.1, format!("Revenue shrinking {pct:.1}%"));
            }
        }

        if let Some(growth) = finite(f.earnings_growth) {
            card.metric("earnings_growth", growth);
            let pct = growth * 100.0;
            if growth > 0.20 {
                card.add(0.15, format!("Strong earnings growth of {pct:.1}%"));
            } else if growth > 0.05 {
                card.add(0.1, format!("Earnings growing {pct:.1}%"));
            } else if growth < 0.0 {
                card.add(-0.15, format!("Earnings declining {pct:.1}%"));
            }
        }

        if let Some(dividend) = finite(f.dividend_yield) {
            card.metric("dividend_yield", dividend);
            let pct = dividend * 100.0;
            if dividend > 0.04 {
                card.add(0.1, format!("High dividend yield of {pct:.2}%"));
            } else if dividend > 0.02 {
                card.add(0.05, format!("Dividend yield of {pct:.2}%"));
            }
        }

        if let Some(cap) = finite(f.market_cap) {
            card.metric("market_cap", cap);
            if cap >= LARGE_CAP {
                card.add(0.05, format!("Large-cap stability (${:.1}B)", cap / 1e9));
            }
        }
    }
}

impl Analyzer for FundamentalAnalyzer {
    fn name(&self) -> &str {
        FUNDAMENTAL
    }

    fn description(&self) -> &str {
        "Fundamental Analysis"
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        let Some(fundamentals) = snapshot.fundamentals.as_ref().filter(|f| !f.is_empty()) else {
            return Ok(AnalysisResult::inapplicable(
                FUNDAMENTAL,
                "No fundamental data available",
            ));
        };

        let mut card = Scorecard::new(FUNDAMENTAL);
        Self::score(&mut card, fundamentals);
        if card.is_empty() {
            card.note("Fundamentals within neutral ranges");
        }

        let available = fundamentals.available_count();
        let confidence = BASE_CONFIDENCE + CONFIDENCE_PER_METRIC * available as f64;
        Ok(card.finish(confidence, &self.classifier))
    }
}
