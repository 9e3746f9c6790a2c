//! Session volume against its trailing baseline

use super::VOLUME;
use advisor_core::{AnalysisResult, Analyzer, Classifier, Result, Scorecard, StockSnapshot};

/// Volume on its own is weakly predictive
pub const CONFIDENCE: f64 = 0.40;

/// Bars averaged when the snapshot has no explicit average volume
pub const BASELINE_BARS: usize = 20;

const VERY_HIGH_RATIO: f64 = 2.0;
const HIGH_RATIO: f64 = 1.5;
const LOW_RATIO: f64 = 0.5;
const CONFIRMING_MOVE_PERCENT: f64 = 1.0;

/// Scores relative volume and whether it confirms the price move
#[derive(Debug, Clone, Default)]
pub struct VolumeAnalyzer {
    classifier: Classifier,
}

impl VolumeAnalyzer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    fn baseline(snapshot: &StockSnapshot) -> Option<f64> {
        if let Some(average) = snapshot.volume.average.filter(|a| a.is_finite() && *a > 0.0) {
            return Some(average);
        }
        let recent: Vec<f64> = snapshot
            .history
            .iter()
            .rev()
            .take(BASELINE_BARS)
            .map(|p| p.volume as f64)
            .collect();
        if recent.is_empty() {
            return None;
        }
        let mean = recent.iter().sum::<f64>() / recent.len() as f64;
        (mean > 0.0).then_some(mean)
    }
}

impl Analyzer for VolumeAnalyzer {
    fn name(&self) -> &str {
        VOLUME
    }

    fn description(&self) -> &str {
        "Volume Analysis"
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        let Some(baseline) = Self::baseline(snapshot) else {
            return Ok(AnalysisResult::inapplicable(
                VOLUME,
                "No trailing volume baseline available",
            ));
        };
        if snapshot.volume.current == 0 {
            return Ok(AnalysisResult::inapplicable(
                VOLUME,
                "No volume reported for the current session",
            ));
        }

        let mut card = Scorecard::new(VOLUME);
        let ratio = snapshot.volume.current as f64 / baseline;
        card.metric("relative_volume", ratio);
        card.metric("baseline_volume", baseline);

        if ratio >= VERY_HIGH_RATIO {
            card.add(0.2, format!("Very high volume ({ratio:.1}x average)"));
        } else if ratio >= HIGH_RATIO {
            card.add(0.1, format!("High volume ({ratio:.1}x average)"));
        } else if ratio < LOW_RATIO {
            card.add(-0.2, format!("Low volume ({ratio:.1}x average) signals weak conviction"));
        } else {
            card.note(format!("Normal volume ({ratio:.1}x average)"));
        }

        if ratio >= HIGH_RATIO {
            let change = snapshot.price_change_percent();
            if change > CONFIRMING_MOVE_PERCENT {
                card.add(0.2, "High volume confirms the price gain");
            } else if change < -CONFIRMING_MOVE_PERCENT {
                card.add(-0.3, "High volume confirms selling pressure");
            }
        }

        Ok(card.finish(CONFIDENCE, &self.classifier))
    }
}
