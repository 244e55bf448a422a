use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upstream analyzer that reports a confidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnalysisModule {
    /// Image quality: exposure
    Cie1,
    /// Image quality: white balance
    Cie2,
    /// Image quality: sharpness
    Cie3,
    /// Image quality: face framing
    Cie4,
    PersonalColor,
    Skin,
    Body,
    Hair,
    Makeup,
    Nutrition,
    Workout,
    OralHealth,
    Other(String),
}

impl AnalysisModule {
    pub fn code(&self) -> &str {
        match self {
            AnalysisModule::Cie1 => "CIE-1",
            AnalysisModule::Cie2 => "CIE-2",
            AnalysisModule::Cie3 => "CIE-3",
            AnalysisModule::Cie4 => "CIE-4",
            AnalysisModule::PersonalColor => "PC-1",
            AnalysisModule::Skin => "S-1",
            AnalysisModule::Body => "C-1",
            AnalysisModule::Hair => "H-1",
            AnalysisModule::Makeup => "M-1",
            AnalysisModule::Nutrition => "N-1",
            AnalysisModule::Workout => "W-1",
            AnalysisModule::OralHealth => "OH-1",
            AnalysisModule::Other(code) => code,
        }
    }

    /// Default weight when a source carries none.
    pub fn trust_weight(&self) -> f64 {
        match self {
            AnalysisModule::Cie1 => 1.0,
            AnalysisModule::Cie2 | AnalysisModule::Cie3 => 0.9,
            AnalysisModule::Cie4 => 0.85,
            AnalysisModule::PersonalColor => 0.9,
            AnalysisModule::Skin => 0.85,
            AnalysisModule::Body => 0.8,
            AnalysisModule::Hair => 0.8,
            AnalysisModule::Makeup => 0.8,
            AnalysisModule::Nutrition => 0.7,
            AnalysisModule::Workout => 0.75,
            AnalysisModule::OralHealth => 0.8,
            AnalysisModule::Other(_) => 1.0,
        }
    }

    pub fn is_image_quality(&self) -> bool {
        self.code().starts_with("CIE-")
    }
}

impl From<String> for AnalysisModule {
    fn from(code: String) -> Self {
        match code.as_str() {
            "CIE-1" => AnalysisModule::Cie1,
            "CIE-2" => AnalysisModule::Cie2,
            "CIE-3" => AnalysisModule::Cie3,
            "CIE-4" => AnalysisModule::Cie4,
            "PC-1" => AnalysisModule::PersonalColor,
            "S-1" => AnalysisModule::Skin,
            "C-1" => AnalysisModule::Body,
            "H-1" => AnalysisModule::Hair,
            "M-1" => AnalysisModule::Makeup,
            "N-1" => AnalysisModule::Nutrition,
            "W-1" => AnalysisModule::Workout,
            "OH-1" => AnalysisModule::OralHealth,
            _ => AnalysisModule::Other(code),
        }
    }
}

impl From<&str> for AnalysisModule {
    fn from(code: &str) -> Self {
        AnalysisModule::from(code.to_string())
    }
}

impl From<AnalysisModule> for String {
    fn from(module: AnalysisModule) -> Self {
        module.code().to_string()
    }
}

impl FromStr for AnalysisModule {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AnalysisModule::from(s))
    }
}

impl fmt::Display for AnalysisModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Gating levels on the 0-100 confidence scale.
pub struct ConfidenceThreshold;

impl ConfidenceThreshold {
    pub const MINIMUM: f64 = 30.0;
    pub const DISPLAY: f64 = 50.0;
    pub const PRODUCT_RECOMMENDATION: f64 = 60.0;
    pub const HIGH: f64 = 80.0;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSource {
    pub module: AnalysisModule,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ConfidenceSource {
    pub fn new(module: impl Into<AnalysisModule>, confidence: f64) -> Self {
        Self {
            module: module.into(),
            confidence,
            weight: None,
            depth: None,
            timestamp: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Reported confidence clamped to [0, 100], NaN read as 0.
    fn clamped_confidence(&self) -> f64 {
        clamp_score(self.confidence)
    }

    fn resolved_weight(&self) -> f64 {
        match self.weight {
            Some(w) if w.is_finite() => w.clamp(0.0, 1.0),
            Some(_) => 0.0,
            None => self.module.trust_weight(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Product of normalized confidences. Every source must hold up.
    Multiplicative,
    /// Weakest link.
    Minimum,
    GeometricMean,
    #[default]
    WeightedAverage,
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationMethod::Multiplicative => "multiplicative",
            AggregationMethod::Minimum => "minimum",
            AggregationMethod::GeometricMean => "geometric_mean",
            AggregationMethod::WeightedAverage => "weighted_average",
        };
        f.write_str(name)
    }
}

/// Multiplier per hop of transitive inheritance. Depth past the end uses the
/// last entry.
pub const DEPTH_DECAY: [f64; 5] = [1.0, 0.95, 0.9, 0.85, 0.8];

#[derive(Debug, Clone, PartialEq)]
pub struct PropagationOptions {
    pub method: AggregationMethod,
    pub min_threshold: f64,
    pub apply_depth_decay: bool,
    pub apply_time_decay: bool,
    pub half_life: Duration,
    /// Clock used for time decay. `None` reads the current time.
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            method: AggregationMethod::WeightedAverage,
            min_threshold: ConfidenceThreshold::DISPLAY,
            apply_depth_decay: true,
            apply_time_decay: false,
            half_life: Duration::days(7),
            reference_time: None,
        }
    }
}

impl PropagationOptions {
    pub fn with_method(method: AggregationMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDecay {
    pub depth: bool,
    pub time: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceResult {
    pub final_confidence: f64,
    pub method: AggregationMethod,
    pub meets_threshold: bool,
    pub lowest_source: Option<ConfidenceSource>,
    pub applied_decay: AppliedDecay,
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn depth_factor(depth: u32) -> f64 {
    let index = (depth as usize).min(DEPTH_DECAY.len() - 1);
    DEPTH_DECAY[index]
}

/// `0.5^(age / half_life)`. Timestamps in the future count as fresh.
fn time_factor(timestamp: DateTime<Utc>, now: DateTime<Utc>, half_life: Duration) -> f64 {
    let half_life_ms = half_life.num_milliseconds();
    if half_life_ms <= 0 {
        return 1.0;
    }
    let age_ms = (now - timestamp).num_milliseconds().max(0);
    0.5_f64.powf(age_ms as f64 / half_life_ms as f64)
}

struct Adjusted {
    confidence: f64,
    weight: f64,
}

fn aggregate(method: AggregationMethod, values: &[Adjusted]) -> f64 {
    let n = values.len() as f64;
    match method {
        AggregationMethod::Multiplicative => {
            values.iter().map(|v| v.confidence / 100.0).product::<f64>() * 100.0
        }
        AggregationMethod::Minimum => values
            .iter()
            .map(|v| v.confidence)
            .fold(f64::INFINITY, f64::min),
        AggregationMethod::GeometricMean => {
            if values.iter().any(|v| v.confidence <= 0.0) {
                return 0.0;
            }
            let log_sum: f64 = values.iter().map(|v| v.confidence.ln()).sum();
            (log_sum / n).exp()
        }
        AggregationMethod::WeightedAverage => {
            let total_weight: f64 = values.iter().map(|v| v.weight).sum();
            if total_weight > 0.0 {
                values.iter().map(|v| v.confidence * v.weight).sum::<f64>() / total_weight
            } else {
                // all weights zeroed out: plain mean
                values.iter().map(|v| v.confidence).sum::<f64>() / n
            }
        }
    }
}

/// Folds the sources into one confidence on the 0-100 scale.
///
/// Each source is first decayed by its depth (when enabled), then by the age
/// of its timestamp (when enabled), and given a weight: the explicit one,
/// otherwise the module's trust weight. `lowest_source` reports the source
/// with the smallest confidence *before* decay. An empty slice yields 0.
pub fn calculate_propagated_confidence(
    sources: &[ConfidenceSource],
    options: &PropagationOptions,
) -> ConfidenceResult {
    if sources.is_empty() {
        return ConfidenceResult {
            final_confidence: 0.0,
            method: options.method,
            meets_threshold: false,
            lowest_source: None,
            applied_decay: AppliedDecay::default(),
        };
    }

    let now = options.reference_time.unwrap_or_else(Utc::now);
    let mut applied = AppliedDecay::default();

    let adjusted: Vec<Adjusted> = sources
        .iter()
        .map(|source| {
            let mut confidence = source.clamped_confidence();

            if options.apply_depth_decay {
                if let Some(depth) = source.depth.filter(|d| *d > 0) {
                    confidence *= depth_factor(depth);
                    applied.depth = true;
                }
            }
            if options.apply_time_decay {
                if let Some(timestamp) = source.timestamp {
                    let factor = time_factor(timestamp, now, options.half_life);
                    if factor < 1.0 {
                        applied.time = true;
                    }
                    confidence *= factor;
                }
            }

            Adjusted {
                confidence,
                weight: source.resolved_weight(),
            }
        })
        .collect();

    let final_confidence = clamp_score(aggregate(options.method, &adjusted));

    let lowest_source = sources
        .iter()
        .min_by(|a, b| a.clamped_confidence().total_cmp(&b.clamped_confidence()))
        .cloned();

    debug!(
        sources = sources.len(),
        method = %options.method,
        final_confidence,
        ?applied,
        "propagated confidence"
    );

    ConfidenceResult {
        final_confidence,
        method: options.method,
        meets_threshold: final_confidence >= options.min_threshold,
        lowest_source,
        applied_decay: applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn minimum() -> PropagationOptions {
        PropagationOptions::with_method(AggregationMethod::Minimum)
    }

    #[test]
    fn test_minimum_is_weakest_link() {
        let sources = [ConfidenceSource::new("S-1", 90.0), ConfidenceSource::new("C-1", 30.0)];
        let result = calculate_propagated_confidence(&sources, &minimum());
        assert_eq!(result.final_confidence, 30.0);
        assert!(!result.meets_threshold);
        assert_eq!(result.lowest_source.unwrap().module, AnalysisModule::Body);
    }

    #[test]
    fn test_empty_sources() {
        for method in [
            AggregationMethod::Multiplicative,
            AggregationMethod::Minimum,
            AggregationMethod::GeometricMean,
            AggregationMethod::WeightedAverage,
        ] {
            let result = calculate_propagated_confidence(&[], &PropagationOptions::with_method(method));
            assert_eq!(result.final_confidence, 0.0);
            assert!(!result.meets_threshold);
            assert!(result.lowest_source.is_none());
            assert_eq!(result.applied_decay, AppliedDecay::default());
        }
    }

    #[test]
    fn test_weighted_average_uses_trust_weights() {
        // S-1 trust 0.85, N-1 trust 0.7
        let sources = [ConfidenceSource::new("S-1", 80.0), ConfidenceSource::new("N-1", 60.0)];
        let result = calculate_propagated_confidence(&sources, &PropagationOptions::default());
        let expected = (80.0 * 0.85 + 60.0 * 0.7) / (0.85 + 0.7);
        assert!((result.final_confidence - expected).abs() < 1e-9);
        assert!(result.meets_threshold);
    }

    #[test]
    fn test_explicit_weight_overrides_trust_weight() {
        let sources = [
            ConfidenceSource::new("S-1", 100.0).with_weight(1.0),
            ConfidenceSource::new("C-1", 0.0).with_weight(0.0),
        ];
        let result = calculate_propagated_confidence(&sources, &PropagationOptions::default());
        assert_eq!(result.final_confidence, 100.0);
    }

    #[test]
    fn test_zero_total_weight_falls_back_to_mean() {
        let sources = [
            ConfidenceSource::new("S-1", 40.0).with_weight(0.0),
            ConfidenceSource::new("C-1", 80.0).with_weight(0.0),
        ];
        let result = calculate_propagated_confidence(&sources, &PropagationOptions::default());
        assert_eq!(result.final_confidence, 60.0);
    }

    #[test]
    fn test_multiplicative_and_geometric_mean() {
        let sources = [ConfidenceSource::new("S-1", 80.0), ConfidenceSource::new("C-1", 50.0)];

        let product = calculate_propagated_confidence(
            &sources,
            &PropagationOptions::with_method(AggregationMethod::Multiplicative),
        );
        assert!((product.final_confidence - 40.0).abs() < 1e-9);

        let geometric = calculate_propagated_confidence(
            &sources,
            &PropagationOptions::with_method(AggregationMethod::GeometricMean),
        );
        assert!((geometric.final_confidence - (80.0_f64 * 50.0).sqrt()).abs() < 1e-9);

        let with_zero = [ConfidenceSource::new("S-1", 80.0), ConfidenceSource::new("C-1", 0.0)];
        let geometric = calculate_propagated_confidence(
            &with_zero,
            &PropagationOptions::with_method(AggregationMethod::GeometricMean),
        );
        assert_eq!(geometric.final_confidence, 0.0);
    }

    #[test]
    fn test_depth_decay_table() {
        let options = minimum();
        for (depth, factor) in [(0, 1.0), (1, 0.95), (2, 0.9), (4, 0.8), (12, 0.8)] {
            let sources = [ConfidenceSource::new("PC-1", 100.0).with_depth(depth)];
            let result = calculate_propagated_confidence(&sources, &options);
            assert!((result.final_confidence - 100.0 * factor).abs() < 1e-9, "depth {depth}");
            assert_eq!(result.applied_decay.depth, depth > 0);
        }

        let disabled = PropagationOptions {
            apply_depth_decay: false,
            ..minimum()
        };
        let sources = [ConfidenceSource::new("PC-1", 100.0).with_depth(3)];
        let result = calculate_propagated_confidence(&sources, &disabled);
        assert_eq!(result.final_confidence, 100.0);
        assert!(!result.applied_decay.depth);
    }

    #[test]
    fn test_time_decay_half_life() {
        let now = Utc::now();
        let options = PropagationOptions {
            apply_time_decay: true,
            reference_time: Some(now),
            ..minimum()
        };

        let week_old = [ConfidenceSource::new("S-1", 80.0).with_timestamp(now - Duration::days(7))];
        let result = calculate_propagated_confidence(&week_old, &options);
        assert!((result.final_confidence - 40.0).abs() < 1e-9);
        assert!(result.applied_decay.time);

        let future = [ConfidenceSource::new("S-1", 80.0).with_timestamp(now + Duration::days(3))];
        let result = calculate_propagated_confidence(&future, &options);
        assert_eq!(result.final_confidence, 80.0);
        assert!(!result.applied_decay.time);
    }

    #[test]
    fn test_time_decay_off_by_default() {
        let now = Utc::now();
        let sources = [ConfidenceSource::new("S-1", 80.0).with_timestamp(now - Duration::days(30))];
        let result = calculate_propagated_confidence(&sources, &minimum());
        assert_eq!(result.final_confidence, 80.0);
        assert!(!result.applied_decay.time);
    }

    #[test]
    fn test_lowest_source_uses_original_confidence() {
        let sources = [
            ConfidenceSource::new("S-1", 55.0),
            ConfidenceSource::new("C-1", 60.0).with_depth(4),
        ];
        let result = calculate_propagated_confidence(&sources, &minimum());
        // 60 * 0.8 = 48 after decay, but S-1 reported less
        assert!((result.final_confidence - 48.0).abs() < 1e-9);
        assert_eq!(result.lowest_source.unwrap().module, AnalysisModule::Skin);
    }

    #[test]
    fn test_final_confidence_always_in_range() {
        let mut rng = rand::rng();
        let methods = [
            AggregationMethod::Multiplicative,
            AggregationMethod::Minimum,
            AggregationMethod::GeometricMean,
            AggregationMethod::WeightedAverage,
        ];
        for _ in 0..500 {
            let count = rng.random_range(1..6);
            let sources: Vec<ConfidenceSource> = (0..count)
                .map(|_| {
                    ConfidenceSource::new("X-9", rng.random_range(-500.0..500.0))
                        .with_weight(rng.random_range(-2.0..2.0))
                        .with_depth(rng.random_range(0..10))
                })
                .collect();
            let options = PropagationOptions::with_method(methods[rng.random_range(0..methods.len())]);
            let result = calculate_propagated_confidence(&sources, &options);
            assert!((0.0..=100.0).contains(&result.final_confidence));
        }

        let nan = [ConfidenceSource::new("S-1", f64::NAN)];
        let result = calculate_propagated_confidence(&nan, &PropagationOptions::default());
        assert_eq!(result.final_confidence, 0.0);
    }

    #[test]
    fn test_module_codes() {
        assert_eq!(AnalysisModule::from("PC-1"), AnalysisModule::PersonalColor);
        assert_eq!(AnalysisModule::OralHealth.to_string(), "OH-1");
        assert_eq!(AnalysisModule::from("Z-7"), AnalysisModule::Other("Z-7".to_string()));
        assert_eq!(AnalysisModule::from("Z-7").trust_weight(), 1.0);
        assert!(AnalysisModule::Cie3.is_image_quality());
        assert!(AnalysisModule::from("CIE-9").is_image_quality());
        assert!(!AnalysisModule::PersonalColor.is_image_quality());
    }

    #[test]
    fn test_source_serde() {
        let json = r#"{"module":"S-1","confidence":72.5,"depth":1}"#;
        let source: ConfidenceSource = serde_json::from_str(json).unwrap();
        assert_eq!(source.module, AnalysisModule::Skin);
        assert_eq!(source.depth, Some(1));
        assert_eq!(serde_json::to_string(&source).unwrap(), json);
    }
}
