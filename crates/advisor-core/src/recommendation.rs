//! Recommendation categories and the score classifier

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete recommendation derived from a score in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl RecommendationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongSell => "STRONG_SELL",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
            Self::Buy => "BUY",
            Self::StrongBuy => "STRONG_BUY",
        }
    }

    pub fn is_bullish(self) -> bool {
        matches!(self, Self::Buy | Self::StrongBuy)
    }

    pub fn is_bearish(self) -> bool {
        matches!(self, Self::Sell | Self::StrongSell)
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band boundaries, each the inclusive lower bound of the next band up
///
/// ```text
///        score < strong_sell  -> STRONG_SELL
/// strong_sell <= score < sell -> SELL
///        sell <= score < buy  -> HOLD
///         buy <= score < strong_buy -> BUY
///  strong_buy <= score        -> STRONG_BUY
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub strong_sell: f64,
    pub sell: f64,
    pub buy: f64,
    pub strong_buy: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            strong_sell: -0.6,
            sell: -0.2,
            buy: 0.2,
            strong_buy: 0.6,
        }
    }
}

/// Tolerance when checking that the bands mirror each other around zero
const SYMMETRY_EPSILON: f64 = 1e-9;

impl ClassifierThresholds {
    /// Boundaries must be finite, strictly increasing, inside (-1, 1) and
    /// mirrored around zero so that a zero score is HOLD
    pub fn validate(&self) -> Result<()> {
        let bounds = [self.strong_sell, self.sell, self.buy, self.strong_buy];
        if bounds.iter().any(|b| !b.is_finite() || *b <= -1.0 || *b >= 1.0) {
            return Err(AdvisorError::config(format!(
                "classifier thresholds must lie strictly between -1 and 1, got {bounds:?}"
            )));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AdvisorError::config(format!(
                "classifier thresholds must be strictly increasing (strong_sell < sell < buy < strong_buy), got {bounds:?}"
            )));
        }
        if self.sell >= 0.0 || self.buy < 0.0 {
            return Err(AdvisorError::config(format!(
                "classifier HOLD band must contain zero (sell < 0 <= buy), got {bounds:?}"
            )));
        }
        if (self.strong_sell + self.strong_buy).abs() > SYMMETRY_EPSILON
            || (self.sell + self.buy).abs() > SYMMETRY_EPSILON
        {
            return Err(AdvisorError::config(format!(
                "classifier thresholds must be symmetric around zero (strong_sell = -strong_buy, sell = -buy), got {bounds:?}"
            )));
        }
        Ok(())
    }
}

/// Maps scores to recommendation categories
///
/// The same classifier instance labels every analyzer result and the
/// composite, so per-analyzer and overall labels are comparable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Classifier {
    thresholds: ClassifierThresholds,
}

impl Classifier {
    /// Build a classifier, rejecting badly ordered thresholds
    pub fn new(thresholds: ClassifierThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Classify a score; out-of-range input is clamped and NaN is HOLD
    pub fn classify(&self, score: f64) -> RecommendationType {
        if score.is_nan() {
            return RecommendationType::Hold;
        }
        let s = score.clamp(-1.0, 1.0);
        let t = &self.thresholds;
        if s >= t.strong_buy {
            RecommendationType::StrongBuy
        } else if s >= t.buy {
            RecommendationType::Buy
        } else if s >= t.sell {
            RecommendationType::Hold
        } else if s >= t.strong_sell {
            RecommendationType::Sell
        } else {
            RecommendationType::StrongSell
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(-1.0), RecommendationType::StrongSell);
        assert_eq!(classifier.classify(0.0), RecommendationType::Hold);
        assert_eq!(classifier.classify(1.0), RecommendationType::StrongBuy);
    }

    #[test]
    fn test_lower_bound_inclusive() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(-0.6), RecommendationType::Sell);
        assert_eq!(classifier.classify(-0.2), RecommendationType::Hold);
        assert_eq!(classifier.classify(0.2), RecommendationType::Buy);
        assert_eq!(classifier.classify(0.6), RecommendationType::StrongBuy);
        assert_eq!(classifier.classify(0.599_999), RecommendationType::Buy);
        assert_eq!(classifier.classify(-0.600_001), RecommendationType::StrongSell);
    }

    #[test]
    fn test_monotonic_and_exhaustive() {
        let classifier = Classifier::default();
        let mut previous = RecommendationType::StrongSell;
        for i in -1000..=1000 {
            let score = f64::from(i) / 1000.0;
            let current = classifier.classify(score);
            assert!(current >= previous, "not monotonic at {score}");
            previous = current;
        }
        assert_eq!(previous, RecommendationType::StrongBuy);
    }

    #[test]
    fn test_out_of_range_and_nan() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(3.0), RecommendationType::StrongBuy);
        assert_eq!(classifier.classify(-3.0), RecommendationType::StrongSell);
        assert_eq!(classifier.classify(f64::NAN), RecommendationType::Hold);
    }

    #[test]
    fn test_scenario_score_is_buy() {
        let score = (0.5 * 0.7 + 0.2 * 0.6) / (0.7 + 0.6);
        assert_eq!(Classifier::default().classify(score), RecommendationType::Buy);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(ClassifierThresholds::default().validate().is_ok());

        let swapped = ClassifierThresholds {
            sell: 0.3,
            buy: 0.1,
            ..Default::default()
        };
        assert!(matches!(
            Classifier::new(swapped),
            Err(AdvisorError::Configuration(_))
        ));

        let out_of_range = ClassifierThresholds {
            strong_buy: 1.0,
            ..Default::default()
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_hold_band_must_contain_zero() {
        let shifted = ClassifierThresholds {
            strong_sell: -0.6,
            sell: 0.05,
            buy: 0.1,
            strong_buy: 0.6,
        };
        assert!(matches!(
            Classifier::new(shifted),
            Err(AdvisorError::Configuration(ref msg)) if msg.contains("zero")
        ));
    }

    #[test]
    fn test_asymmetric_thresholds_rejected() {
        let lopsided = ClassifierThresholds {
            strong_sell: -0.9,
            sell: -0.1,
            buy: 0.5,
            strong_buy: 0.55,
        };
        assert!(matches!(
            lopsided.validate(),
            Err(AdvisorError::Configuration(ref msg)) if msg.contains("symmetric")
        ));

        let outer_only = ClassifierThresholds {
            strong_sell: -0.7,
            ..Default::default()
        };
        assert!(outer_only.validate().is_err());
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = Classifier::new(ClassifierThresholds {
            strong_sell: -0.5,
            sell: -0.1,
            buy: 0.1,
            strong_buy: 0.5,
        })
        .unwrap();
        assert_eq!(classifier.classify(0.15), RecommendationType::Buy);
        assert_eq!(classifier.classify(-0.5), RecommendationType::Sell);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RecommendationType::StrongBuy).unwrap();
        assert_eq!(json, "\"STRONG_BUY\"");
        assert_eq!(RecommendationType::Hold.to_string(), "HOLD");
    }
}
