use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::margin::RootMargin;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
}

/// Fraction of an element's area that must be inside the (margin-adjusted)
/// viewport for it to count as visible. Always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// 10% of the element: a shallow trigger.
    pub const DEFAULT: Threshold = Threshold(0.1);
    /// Any intersection at all, including touching edges.
    pub const ANY: Threshold = Threshold(0.0);
    pub const FULL: Threshold = Threshold(1.0);

    pub fn new(value: f64) -> Result<Self, OptionsError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(OptionsError::ThresholdOutOfRange(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Threshold {
    type Error = OptionsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

/// How one element is watched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverOptions {
    pub threshold: Threshold,
    pub root_margin: RootMargin,
    /// Reveal once, then stop watching for good.
    pub trigger_once: bool,
}

impl ObserverOptions {
    pub fn new(threshold: Threshold, root_margin: RootMargin, trigger_once: bool) -> Self {
        Self {
            threshold,
            root_margin,
            trigger_once,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(1.0).is_ok());
        assert_eq!(
            Threshold::new(1.5),
            Err(OptionsError::ThresholdOutOfRange(1.5))
        );
        assert!(Threshold::new(-0.01).is_err());
        assert!(Threshold::new(f64::NAN).is_err());
    }

    #[test]
    fn defaults_are_shallow_and_bidirectional() {
        let options = ObserverOptions::default();
        assert_eq!(options.threshold.get(), 0.1);
        assert!(!options.trigger_once);
        assert_eq!(options.root_margin, RootMargin::EARLY_TRIGGER);
    }

    #[test]
    fn deserializes_with_validation() {
        let options: ObserverOptions =
            serde_json::from_str(r#"{"threshold": 0.5, "trigger_once": true}"#).unwrap();
        assert_eq!(options.threshold.get(), 0.5);
        assert!(options.trigger_once);
        assert_eq!(options.root_margin, RootMargin::EARLY_TRIGGER);

        assert!(serde_json::from_str::<ObserverOptions>(r#"{"threshold": 2.0}"#).is_err());
    }
}
