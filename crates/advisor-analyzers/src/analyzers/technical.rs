//! RSI bands and moving-average crossovers

use super::TECHNICAL;
use crate::indicators::{rsi, sma_series};
use advisor_core::{AnalysisResult, Analyzer, Classifier, Result, Scorecard, StockSnapshot};

pub const CONFIDENCE: f64 = 0.60;

/// Bars required before any technical signal is computed
pub const MIN_HISTORY: usize = 30;

pub const RSI_PERIOD: usize = 14;
const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_NEUTRAL_LOW: f64 = 40.0;
const RSI_NEUTRAL_HIGH: f64 = 60.0;

pub const SHORT_MA: usize = 20;
pub const LONG_MA: usize = 50;
/// A crossover within this many bars counts as a fresh golden/death cross
const CROSS_LOOKBACK: usize = 5;

const RANGE_BARS: usize = 20;
const NEAR_HIGH: f64 = 0.95;
const NEAR_LOW: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    Golden,
    Death,
}

/// Most recent crossing of `short` over `long` within the last `lookback` bars
///
/// Both series must end on the same bar.
pub fn recent_cross(short: &[f64], long: &[f64], lookback: usize) -> Option<Cross> {
    let len = short.len().min(long.len()).min(lookback + 1);
    if len < 2 {
        return None;
    }
    let diffs: Vec<f64> = short[short.len() - len..]
        .iter()
        .zip(&long[long.len() - len..])
        .map(|(s, l)| s - l)
        .collect();
    diffs.windows(2).rev().find_map(|w| {
        if w[0] <= 0.0 && w[1] > 0.0 {
            Some(Cross::Golden)
        } else if w[0] >= 0.0 && w[1] < 0.0 {
            Some(Cross::Death)
        } else {
            None
        }
    })
}

/// Additive RSI and moving-average signals
#[derive(Debug, Clone, Default)]
pub struct TechnicalAnalyzer {
    classifier: Classifier,
}

impl TechnicalAnalyzer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    fn score_rsi(card: &mut Scorecard, value: f64) {
        card.metric("rsi", value);
        if value < RSI_OVERSOLD {
            card.add(0.3, format!("RSI {value:.1} indicates oversold conditions"));
        } else if value > RSI_OVERBOUGHT {
            card.add(-0.3, format!("RSI {value:.1} indicates overbought conditions"));
        } else if (RSI_NEUTRAL_LOW..=RSI_NEUTRAL_HIGH).contains(&value) {
            card.add(0.05, format!("RSI {value:.1} is in the neutral zone"));
        } else {
            card.note(format!("RSI at {value:.1}"));
        }
    }

    fn score_averages(card: &mut Scorecard, price: f64, short: &[f64], long: &[f64]) {
        let (Some(&s), Some(&l)) = (short.last(), long.last()) else {
            return;
        };
        card.metric("sma_short", s);
        card.metric("sma_long", l);

        match recent_cross(short, long, CROSS_LOOKBACK) {
            Some(Cross::Golden) => card.add(
                0.3,
                format!("Golden cross: SMA{SHORT_MA} crossed above SMA{LONG_MA}"),
            ),
            Some(Cross::Death) => card.add(
                -0.3,
                format!("Death cross: SMA{SHORT_MA} crossed below SMA{LONG_MA}"),
            ),
            None if s > l => card.add(
                0.15,
                format!("SMA{SHORT_MA} above SMA{LONG_MA} (uptrend)"),
            ),
            None => card.add(
                -0.15,
                format!("SMA{SHORT_MA} below SMA{LONG_MA} (downtrend)"),
            ),
        }

        if price > s && price > l {
            card.add(0.1, "Price above both moving averages");
        } else if price < s && price < l {
            card.add(-0.1, "Price below both moving averages");
        }
    }

    fn score_range(card: &mut Scorecard, price: f64, closes: &[f64]) {
        let recent = &closes[closes.len().saturating_sub(RANGE_BARS)..];
        let high = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let low = recent.iter().copied().fold(f64::INFINITY, f64::min);
        if high <= low {
            return;
        }
        let position = ((price - low) / (high - low)).clamp(0.0, 1.0);
        card.metric("range_position", position);
        if position >= NEAR_HIGH {
            card.add(0.05, format!("Trading near the {RANGE_BARS}-day high"));
        } else if position <= NEAR_LOW {
            card.add(-0.05, format!("Trading near the {RANGE_BARS}-day low"));
        }
    }
}

impl Analyzer for TechnicalAnalyzer {
    fn name(&self) -> &str {
        TECHNICAL
    }

    fn description(&self) -> &str {
        "Technical Strategy"
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        snapshot.require_price(TECHNICAL)?;
        snapshot.require_ordered_history(TECHNICAL)?;

        let closes = snapshot.closes();
        if closes.len() < MIN_HISTORY {
            return Ok(AnalysisResult::inapplicable(
                TECHNICAL,
                format!(
                    "Insufficient price history for technical analysis ({} bars, need {MIN_HISTORY})",
                    closes.len()
                ),
            ));
        }

        let price = snapshot.current_price;
        let mut card = Scorecard::new(TECHNICAL);

        if let Some(value) = rsi(&closes, RSI_PERIOD)? {
            Self::score_rsi(&mut card, value);
        }

        let short = sma_series(&closes, SHORT_MA)?;
        let long = if closes.len() >= LONG_MA {
            sma_series(&closes, LONG_MA)?
        } else {
            Vec::new()
        };
        if long.is_empty() {
            if let Some(&s) = short.last() {
                card.metric("sma_short", s);
                if price > s {
                    card.add(0.05, format!("Price above SMA{SHORT_MA}"));
                } else if price < s {
                    card.add(-0.05, format!("Price below SMA{SHORT_MA}"));
                }
            }
        } else {
            Self::score_averages(&mut card, price, &short, &long);
        }

        Self::score_range(&mut card, price, &closes);

        Ok(card.finish(CONFIDENCE, &self.classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{daily_history, linear, snapshot_with_closes};

    #[test]
    fn test_insufficient_history() {
        let snapshot = snapshot_with_closes(&linear(100.0, 110.0, 20));
        let result = TechnicalAnalyzer::default().analyze(&snapshot).unwrap();
        assert!(!result.applicable);
        assert!(result.reasoning[0].contains("20 bars"));
    }

    #[test]
    fn test_downtrend_signals() {
        let snapshot = snapshot_with_closes(&linear(150.0, 100.0, 60));
        let result = TechnicalAnalyzer::default().analyze(&snapshot).unwrap();

        assert!(result.applicable);
        assert!(result.metrics["rsi"] < RSI_OVERSOLD);
        assert!(result.reasoning.iter().any(|r| r.contains("oversold")));
        assert!(result.reasoning.iter().any(|r| r.contains("downtrend")));
        assert!(result.reasoning.iter().any(|r| r == "Price below both moving averages"));
        // +0.3 oversold, -0.15 trend, -0.1 below averages, -0.05 at range low
        assert!(result.score.abs() < 1e-9);
        assert_eq!(result.confidence, CONFIDENCE);
    }

    #[test]
    fn test_uptrend_without_long_average() {
        let snapshot = snapshot_with_closes(&linear(100.0, 130.0, 40));
        let result = TechnicalAnalyzer::default().analyze(&snapshot).unwrap();

        assert!(result.metrics["rsi"] > RSI_OVERBOUGHT);
        assert!(!result.metrics.contains_key("sma_long"));
        // -0.3 overbought, +0.05 above SMA20, +0.05 at range high
        assert!((result.score + 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_fresh_golden_cross_after_rebound() {
        let mut closes: Vec<f64> = (0..50).map(|i| 100.0 - 0.4 * f64::from(i)).collect();
        let bottom = closes[49];
        closes.extend((1..=16).map(|i| bottom + 1.5 * f64::from(i)));
        let result = TechnicalAnalyzer::default()
            .analyze(&snapshot_with_closes(&closes))
            .unwrap();

        assert!(
            result
                .reasoning
                .iter()
                .any(|r| r == "Golden cross: SMA20 crossed above SMA50")
        );
        assert!(!result.reasoning.iter().any(|r| r.contains("uptrend")));
        assert!(result.metrics["sma_short"] > result.metrics["sma_long"]);
        // -0.3 overbought, +0.3 golden cross, +0.1 above averages, +0.05 at range high
        assert!((result.score - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_recent_cross_detection() {
        let long = vec![10.0; 8];
        let golden = vec![9.0, 9.0, 9.0, 9.0, 9.5, 10.5, 11.0, 11.0];
        assert_eq!(recent_cross(&golden, &long, 5), Some(Cross::Golden));

        let death = vec![11.0, 11.0, 11.0, 11.0, 11.0, 9.0, 9.0, 9.0];
        assert_eq!(recent_cross(&death, &long, 5), Some(Cross::Death));

        // crossing happened before the lookback window
        let old = vec![9.0, 11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 11.0];
        assert_eq!(recent_cross(&old, &long, 5), None);

        assert_eq!(recent_cross(&[1.0], &[2.0], 5), None);
    }

    #[test]
    fn test_unordered_history_is_malformed() {
        let mut history = daily_history(&linear(100.0, 110.0, 40));
        history.swap(3, 30);
        let snapshot = snapshot_with_closes(&[100.0, 101.0]).with_history(history);
        assert!(TechnicalAnalyzer::default().analyze(&snapshot).is_err());
    }
}
