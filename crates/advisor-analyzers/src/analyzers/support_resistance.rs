//! Support and resistance levels from clustered price extrema

use super::SUPPORT_RESISTANCE;
use advisor_core::{AnalysisResult, Analyzer, Classifier, Result, Scorecard, StockSnapshot};

pub const CONFIDENCE: f64 = 0.60;

pub const MIN_HISTORY: usize = 20;
/// Only the most recent closes are searched for levels
pub const LOOKBACK: usize = 120;
/// Bars on each side a local extremum must dominate
const EXTREMA_RADIUS: usize = 2;
/// Extrema within this fraction of a cluster's mean join the cluster
pub const CLUSTER_TOLERANCE: f64 = 0.02;
pub const MIN_TOUCHES: usize = 2;

const NEAR_PERCENT: f64 = 2.0;
const CLOSE_PERCENT: f64 = 5.0;
const FAVORABLE_RISK_REWARD: f64 = 2.0;
const POOR_RISK_REWARD: f64 = 0.5;

/// A price level and how often price turned there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    pub price: f64,
    pub touches: usize,
}

/// Prices of local highs and lows
pub fn local_extrema(closes: &[f64]) -> Vec<f64> {
    let r = EXTREMA_RADIUS;
    if closes.len() < 2 * r + 1 {
        return Vec::new();
    }
    (r..closes.len() - r)
        .filter_map(|i| {
            let value = closes[i];
            let neighbors = closes[i - r..=i + r]
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != r)
                .map(|(_, &v)| v);
            let (mut is_peak, mut is_trough, mut distinct) = (true, true, false);
            for v in neighbors {
                is_peak &= value >= v;
                is_trough &= value <= v;
                distinct |= value != v;
            }
            ((is_peak || is_trough) && distinct).then_some(value)
        })
        .collect()
}

/// Group extrema into levels touched at least [`MIN_TOUCHES`] times
pub fn cluster_levels(mut extrema: Vec<f64>, tolerance: f64) -> Vec<Level> {
    extrema.retain(|v| v.is_finite() && *v > 0.0);
    extrema.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for value in extrema {
        match clusters.last_mut() {
            Some(cluster) => {
                let mean = cluster.iter().sum::<f64>() / cluster.len() as f64;
                if (value - mean).abs() / mean <= tolerance {
                    cluster.push(value);
                } else {
                    clusters.push(vec![value]);
                }
            }
            None => clusters.push(vec![value]),
        }
    }

    clusters
        .into_iter()
        .filter(|c| c.len() >= MIN_TOUCHES)
        .map(|c| Level {
            price: c.iter().sum::<f64>() / c.len() as f64,
            touches: c.len(),
        })
        .collect()
}

/// Scores proximity to the nearest levels and the implied risk/reward
#[derive(Debug, Clone, Default)]
pub struct SupportResistanceAnalyzer {
    classifier: Classifier,
}

impl SupportResistanceAnalyzer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }
}

impl Analyzer for SupportResistanceAnalyzer {
    fn name(&self) -> &str {
        SUPPORT_RESISTANCE
    }

    fn description(&self) -> &str {
        "Support/Resistance Analysis"
    }

    fn default_weight(&self) -> f64 {
        1.1
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        snapshot.require_price(SUPPORT_RESISTANCE)?;
        snapshot.require_ordered_history(SUPPORT_RESISTANCE)?;

        let closes = snapshot.closes();
        if closes.len() < MIN_HISTORY {
            return Ok(AnalysisResult::inapplicable(
                SUPPORT_RESISTANCE,
                format!(
                    "Insufficient price history for support/resistance ({} bars, need {MIN_HISTORY})",
                    closes.len()
                ),
            ));
        }

        let recent = &closes[closes.len().saturating_sub(LOOKBACK)..];
        let levels = cluster_levels(local_extrema(recent), CLUSTER_TOLERANCE);
        let price = snapshot.current_price;

        let support = levels
            .iter()
            .filter(|l| l.price < price)
            .max_by(|a, b| a.price.total_cmp(&b.price))
            .copied();
        let resistance = levels
            .iter()
            .filter(|l| l.price > price)
            .min_by(|a, b| a.price.total_cmp(&b.price))
            .copied();

        if support.is_none() && resistance.is_none() {
            return Ok(AnalysisResult::inapplicable(
                SUPPORT_RESISTANCE,
                "No support or resistance level identified",
            ));
        }

        let mut card = Scorecard::new(SUPPORT_RESISTANCE);
        card.metric("levels", levels.len() as f64);

        if let Some(level) = support {
            let distance = (price - level.price) / price * 100.0;
            card.metric("support", level.price);
            card.metric("support_distance_percent", distance);
            let what = format!(
                "support at {:.2} ({} touches, {distance:.1}% below)",
                level.price, level.touches
            );
            if distance <= NEAR_PERCENT {
                card.add(0.3, format!("Price near strong {what}"));
            } else if distance <= CLOSE_PERCENT {
                card.add(0.15, format!("Price approaching {what}"));
            } else {
                card.note(format!("Nearest {what}"));
            }
        } else {
            card.add(-0.1, "Price below every identified level (breakdown)");
        }

        if let Some(level) = resistance {
            let distance = (level.price - price) / price * 100.0;
            card.metric("resistance", level.price);
            card.metric("resistance_distance_percent", distance);
            let what = format!(
                "resistance at {:.2} ({} touches, {distance:.1}% above)",
                level.price, level.touches
            );
            if distance <= NEAR_PERCENT {
                card.add(-0.3, format!("Price near strong {what}"));
            } else if distance <= CLOSE_PERCENT {
                card.add(-0.15, format!("Price approaching {what}"));
            } else {
                card.note(format!("Nearest {what}"));
            }
        } else {
            card.add(0.1, "Price above every identified level (breakout)");
        }

        if let (Some(s), Some(r)) = (support, resistance) {
            let risk = price - s.price;
            let reward = r.price - price;
            if risk > 0.0 {
                let ratio = reward / risk;
                card.metric("risk_reward", ratio);
                if ratio >= FAVORABLE_RISK_REWARD {
                    card.add(0.2, format!("Favorable risk/reward ratio of {ratio:.2}"));
                } else if ratio <= POOR_RISK_REWARD {
                    card.add(-0.2, format!("Poor risk/reward ratio of {ratio:.2}"));
                } else {
                    card.note(format!("Risk/reward ratio of {ratio:.2}"));
                }
            }
        }

        Ok(card.finish(CONFIDENCE, &self.classifier))
    }
}
