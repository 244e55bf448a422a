use serde::{Deserialize, Serialize};

use super::reference::{KoreanAdjustments, KOREAN_ADJUSTMENTS};

/// Configuration for tone classification with tunable parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub thresholds: ToneThresholds,
    pub adjustments: KoreanAdjustments,
    /// Inputs within this chroma distance of the season split are resolved by
    /// nearest reference color instead of the decision table.
    pub chroma_boundary_margin: f64,
    /// Same, for the deep-lightness cut
    pub lightness_boundary_margin: f64,
    /// Multiplier applied to the confidence of neutral-undertone results
    pub neutral_penalty: f64,
    /// Multiplier applied when the season came from a boundary resolution
    pub boundary_penalty: f64,
    /// ΔE00 at which proximity to the winning reference halves confidence
    pub proximity_scale: f64,
}

/// Unadjusted (Western reference) seasonal thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneThresholds {
    pub warm_hue_min: f64,
    pub cool_hue_max: f64,
    pub warm_b_min: f64,
    pub cool_b_max: f64,
    pub chroma_split: f64,
    pub deep_lightness: f64,
}

/// Thresholds after the population correction has been applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveThresholds {
    pub warm_hue_min: f64,
    pub cool_hue_max: f64,
    pub warm_b_min: f64,
    pub cool_b_max: f64,
    pub chroma_split: f64,
    pub deep_lightness: f64,
}

impl Default for ToneThresholds {
    fn default() -> Self {
        Self {
            warm_hue_min: 60.0,
            cool_hue_max: 50.0,
            warm_b_min: 18.0,
            cool_b_max: 14.0,
            chroma_split: 22.0,
            deep_lightness: 55.0,
        }
    }
}

impl ToneThresholds {
    pub fn adjusted(&self, adjustments: &KoreanAdjustments) -> EffectiveThresholds {
        EffectiveThresholds {
            warm_hue_min: self.warm_hue_min + adjustments.hue_offset,
            cool_hue_max: self.cool_hue_max + adjustments.hue_offset,
            warm_b_min: self.warm_b_min + adjustments.b_offset,
            cool_b_max: self.cool_b_max + adjustments.b_offset,
            chroma_split: self.chroma_split + adjustments.chroma_offset,
            deep_lightness: self.deep_lightness + adjustments.lightness_offset,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            thresholds: ToneThresholds::default(),
            adjustments: KOREAN_ADJUSTMENTS,
            chroma_boundary_margin: 2.5,
            lightness_boundary_margin: 2.0,
            neutral_penalty: 0.85,
            boundary_penalty: 0.9,
            proximity_scale: 10.0,
        }
    }
}

impl ClassifierConfig {
    /// Thresholds without the Korean population correction
    pub fn western() -> Self {
        Self {
            adjustments: KoreanAdjustments::NONE,
            ..Self::default()
        }
    }

    pub fn effective_thresholds(&self) -> EffectiveThresholds {
        self.thresholds.adjusted(&self.adjustments)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        let t = self.effective_thresholds();

        if t.cool_hue_max >= t.warm_hue_min {
            return Err("Cool hue maximum must be below warm hue minimum".to_string());
        }

        if t.cool_b_max >= t.warm_b_min {
            return Err("Cool b* maximum must be below warm b* minimum".to_string());
        }

        if t.chroma_split <= 0.0 {
            return Err("Chroma split must be positive".to_string());
        }

        if !(0.0..=100.0).contains(&t.deep_lightness) {
            return Err("Deep lightness must be between 0 and 100".to_string());
        }

        if self.chroma_boundary_margin < 0.0 || self.lightness_boundary_margin < 0.0 {
            return Err("Boundary margins must not be negative".to_string());
        }

        for (name, value) in [
            ("Neutral penalty", self.neutral_penalty),
            ("Boundary penalty", self.boundary_penalty),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(format!("{name} must be in (0.0, 1.0]"));
            }
        }

        if !(self.proximity_scale > 0.0) {
            return Err("Proximity scale must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn with_adjustments(mut self, adjustments: KoreanAdjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    pub fn with_boundary_margins(mut self, chroma: f64, lightness: f64) -> Self {
        self.chroma_boundary_margin = chroma.max(0.0);
        self.lightness_boundary_margin = lightness.max(0.0);
        self
    }

    pub fn with_neutral_penalty(mut self, penalty: f64) -> Self {
        self.neutral_penalty = penalty.clamp(f64::MIN_POSITIVE, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ClassifierConfig::default().validate(), Ok(()));
        assert_eq!(ClassifierConfig::western().validate(), Ok(()));
    }

    #[test]
    fn test_korean_adjustment_shifts_thresholds() {
        let korean = ClassifierConfig::default().effective_thresholds();
        let western = ClassifierConfig::western().effective_thresholds();
        assert!(korean.warm_hue_min < western.warm_hue_min);
        assert!(korean.cool_hue_max < western.cool_hue_max);
        assert!(korean.chroma_split < western.chroma_split);
        assert_eq!(korean.warm_hue_min, 56.0);
        assert_eq!(korean.chroma_split, 19.0);
    }

    #[test]
    fn test_validate_rejects_overlapping_hue_bands() {
        let mut config = ClassifierConfig::default();
        config.thresholds.cool_hue_max = 70.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_penalties() {
        let mut config = ClassifierConfig::default();
        config.boundary_penalty = 0.0;
        assert!(config.validate().is_err());

        let mut config = ClassifierConfig::default();
        config.proximity_scale = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders_clamp() {
        let config = ClassifierConfig::default()
            .with_boundary_margins(-1.0, 3.0)
            .with_neutral_penalty(4.0);
        assert_eq!(config.chroma_boundary_margin, 0.0);
        assert_eq!(config.lightness_boundary_margin, 3.0);
        assert_eq!(config.neutral_penalty, 1.0);
    }
}
