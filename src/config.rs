use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::analysis::ClassifierConfig;
use crate::color::SampleOptions;
use crate::confidence::{AggregationMethod, ConfidenceThreshold, PropagationOptions};
use crate::error::ConfigError;

const ENV_PREFIX: &str = "PERSONAL_COLOR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `personal_color=debug`
    pub log_level: String,
    pub classifier: ClassifierConfig,
    pub sampling: SampleOptions,
    pub propagation: PropagationSettings,
}

/// Serializable form of `PropagationOptions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationSettings {
    pub method: AggregationMethod,
    pub min_threshold: f64,
    pub apply_depth_decay: bool,
    pub apply_time_decay: bool,
    pub half_life_hours: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            classifier: ClassifierConfig::default(),
            sampling: SampleOptions::default(),
            propagation: PropagationSettings::default(),
        }
    }
}

impl Default for PropagationSettings {
    fn default() -> Self {
        Self {
            method: AggregationMethod::WeightedAverage,
            min_threshold: ConfidenceThreshold::DISPLAY,
            apply_depth_decay: true,
            apply_time_decay: false,
            half_life_hours: 7.0 * 24.0,
        }
    }
}

impl PropagationSettings {
    pub fn options(&self) -> PropagationOptions {
        PropagationOptions {
            method: self.method,
            min_threshold: self.min_threshold,
            apply_depth_decay: self.apply_depth_decay,
            apply_time_decay: self.apply_time_decay,
            half_life: Duration::milliseconds((self.half_life_hours * 3_600_000.0) as i64),
            reference_time: None,
        }
    }
}

impl Configuration {
    /// Defaults, overlaid with the optional file and then with
    /// `PERSONAL_COLOR__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let configuration: Configuration = builder.build()?.try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| ConfigError::Invalid(format!("log_level '{}': {e}", self.log_level)))?;

        self.classifier.validate().map_err(ConfigError::Invalid)?;

        if self.sampling.step == 0 {
            return Err(ConfigError::Invalid("Sampling step must be at least 1".to_string()));
        }
        if self.sampling.min_luma >= self.sampling.max_luma {
            return Err(ConfigError::Invalid(
                "Sampling min_luma must be below max_luma".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&self.propagation.min_threshold) {
            return Err(ConfigError::Invalid(
                "Propagation min_threshold must be between 0 and 100".to_string(),
            ));
        }
        if !(self.propagation.half_life_hours > 0.0) {
            return Err(ConfigError::Invalid(
                "Propagation half_life_hours must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("personal-color-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_is_valid() {
        assert!(Configuration::default().validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let path = write_temp(
            r#"
log_level = "debug"

[classifier]
neutral_penalty = 0.7

[classifier.adjustments]
hue_offset = 0.0
b_offset = 0.0
chroma_offset = 0.0
lightness_offset = 0.0

[propagation]
method = "minimum"
apply_time_decay = true
half_life_hours = 24.0
"#,
        );
        let configuration = Configuration::load(Some(&path)).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(configuration.log_level, "debug");
        assert_eq!(configuration.classifier.neutral_penalty, 0.7);
        assert_eq!(configuration.classifier.effective_thresholds().warm_hue_min, 60.0);
        // untouched keys keep their defaults
        assert_eq!(configuration.classifier.boundary_penalty, 0.9);
        assert_eq!(configuration.sampling.step, 1);

        let options = configuration.propagation.options();
        assert_eq!(options.method, AggregationMethod::Minimum);
        assert!(options.apply_time_decay);
        assert_eq!(options.half_life, Duration::hours(24));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = write_temp("[propagation]\nmin_threshold = 140.0\n");
        let result = Configuration::load(Some(&path));
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("personal-color-does-not-exist.toml");
        assert!(matches!(Configuration::load(Some(&path)), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_validate_catches_each_section() {
        let mut configuration = Configuration::default();
        configuration.classifier.proximity_scale = 0.0;
        assert!(configuration.validate().is_err());

        let mut configuration = Configuration::default();
        configuration.sampling.step = 0;
        assert!(configuration.validate().is_err());

        let mut configuration = Configuration::default();
        configuration.propagation.half_life_hours = -1.0;
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn test_default_options_match_library_defaults() {
        assert_eq!(
            PropagationSettings::default().options(),
            PropagationOptions::default()
        );
    }
}
