//! 12-tone classification of a measured skin color.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{
    config::ClassifierConfig,
    reference::ReferenceTable,
    tone::{Season, Subtype, TwelveTone, Undertone},
};
use crate::color::{calculate_derived_metrics, LabColor, LabDerivedMetrics};
use crate::error::ConfigError;

/// Skin measurements from an upstream face-analysis step, optionally with
/// the polar metrics already computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinMetrics {
    pub lightness: f64,
    pub a: f64,
    pub b: f64,
    #[serde(default)]
    pub chroma: Option<f64>,
    #[serde(default)]
    pub hue: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassificationInput {
    Lab(LabColor),
    SkinMetrics(SkinMetrics),
}

impl ClassificationInput {
    /// Sanitized Lab plus derived metrics, preferring supplied metrics when
    /// they are usable.
    fn resolve(&self) -> (LabColor, LabDerivedMetrics) {
        match self {
            ClassificationInput::Lab(lab) => {
                let lab = lab.sanitized();
                (lab, calculate_derived_metrics(&lab))
            }
            ClassificationInput::SkinMetrics(metrics) => {
                let lab = LabColor::new(metrics.lightness, metrics.a, metrics.b).sanitized();
                let computed = calculate_derived_metrics(&lab);
                let chroma = metrics
                    .chroma
                    .filter(|c| c.is_finite() && *c >= 0.0)
                    .unwrap_or(computed.chroma);
                let hue = metrics
                    .hue
                    .filter(|h| h.is_finite())
                    .map(|h| h.rem_euclid(360.0))
                    .unwrap_or(computed.hue);
                (lab, LabDerivedMetrics { chroma, hue })
            }
        }
    }
}

impl From<LabColor> for ClassificationInput {
    fn from(lab: LabColor) -> Self {
        ClassificationInput::Lab(lab)
    }
}

impl From<SkinMetrics> for ClassificationInput {
    fn from(metrics: SkinMetrics) -> Self {
        ClassificationInput::SkinMetrics(metrics)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwelveToneResult {
    pub tone: TwelveTone,
    pub undertone: Undertone,
    pub season: Season,
    pub subtype: Subtype,
    /// 0-100
    pub confidence: f64,
}

/// A classification together with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneAnalysis {
    pub result: TwelveToneResult,
    pub lab: LabColor,
    pub derived: LabDerivedMetrics,
    /// CIEDE2000 distances to the winning season's references, nearest first
    pub candidates: Vec<(TwelveTone, f64)>,
    pub boundary_resolved: bool,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonDecision {
    pub season: Season,
    pub boundary_resolved: bool,
}

pub struct ToneClassifier<'a> {
    references: &'a ReferenceTable,
    config: ClassifierConfig,
}

static DEFAULT_CLASSIFIER: Lazy<ToneClassifier<'static>> = Lazy::new(ToneClassifier::default);

/// Classifies with the built-in reference table and default configuration.
pub fn classify_12_tone(input: &ClassificationInput) -> TwelveToneResult {
    DEFAULT_CLASSIFIER.classify(input)
}

impl Default for ToneClassifier<'static> {
    fn default() -> Self {
        Self {
            references: ReferenceTable::standard(),
            config: ClassifierConfig::default(),
        }
    }
}

impl ToneClassifier<'static> {
    pub fn new(config: ClassifierConfig) -> Result<Self, ConfigError> {
        ToneClassifier::with_references(ReferenceTable::standard(), config)
    }
}

impl<'a> ToneClassifier<'a> {
    pub fn with_references(
        references: &'a ReferenceTable,
        config: ClassifierConfig,
    ) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(Self { references, config })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, input: &ClassificationInput) -> TwelveToneResult {
        self.analyze(input).result
    }

    pub fn analyze(&self, input: &ClassificationInput) -> ToneAnalysis {
        let (lab, derived) = input.resolve();

        let undertone = self.determine_undertone(&lab, &derived);
        let decision = self.determine_season(undertone, &lab, &derived);
        let (subtype, candidates) = self.determine_subtype(decision.season, &lab);

        let tone = match TwelveTone::compose(subtype, decision.season) {
            Ok(tone) => tone,
            Err(_) => unreachable!("determine_subtype only returns subtypes of the season"),
        };

        let confidence = self.confidence(&candidates, undertone, decision.boundary_resolved);

        let result = TwelveToneResult {
            tone,
            undertone,
            season: decision.season,
            subtype,
            confidence,
        };

        let reasoning = format!(
            "L={:.1} C={:.1} h={:.1}: {} undertone, {} ({}), nearest {}",
            lab.l,
            derived.chroma,
            derived.hue,
            undertone,
            decision.season,
            if decision.boundary_resolved {
                "boundary resolved by reference distance"
            } else {
                "decision table"
            },
            candidates
                .first()
                .map(|(t, d)| format!("{t} at ΔE00 {d:.2}"))
                .unwrap_or_else(|| "none".to_string()),
        );

        debug!(tone = %tone, confidence, "{}", reasoning);

        ToneAnalysis {
            result,
            lab,
            derived,
            candidates,
            boundary_resolved: decision.boundary_resolved,
            reasoning,
        }
    }

    /// Hue-angle and b* thresholding with the population correction applied.
    pub fn determine_undertone(&self, lab: &LabColor, derived: &LabDerivedMetrics) -> Undertone {
        let t = self.config.effective_thresholds();

        if derived.hue >= t.warm_hue_min && lab.b >= t.warm_b_min {
            Undertone::Warm
        } else if derived.hue <= t.cool_hue_max || lab.b <= t.cool_b_max {
            Undertone::Cool
        } else {
            Undertone::Neutral
        }
    }

    pub fn determine_season(
        &self,
        undertone: Undertone,
        lab: &LabColor,
        derived: &LabDerivedMetrics,
    ) -> SeasonDecision {
        let t = self.config.effective_thresholds();

        let candidates: &[Season] = match undertone {
            Undertone::Warm => &[Season::Spring, Season::Autumn],
            Undertone::Cool => &[Season::Winter, Season::Summer],
            Undertone::Neutral => &Season::ALL,
        };

        let near_chroma_split =
            (derived.chroma - t.chroma_split).abs() <= self.config.chroma_boundary_margin;
        let near_deep_cut =
            (lab.l - t.deep_lightness).abs() <= self.config.lightness_boundary_margin;

        let needs_reference = undertone == Undertone::Neutral || near_chroma_split || near_deep_cut;

        if needs_reference {
            if let Some(season) = self.nearest_season(lab, candidates) {
                trace!(%season, ?undertone, "season resolved by reference distance");
                return SeasonDecision {
                    season,
                    boundary_resolved: undertone != Undertone::Neutral,
                };
            }
        }

        let deep = lab.l < t.deep_lightness;
        let vivid = derived.chroma >= t.chroma_split;
        let warm_leaning = match undertone {
            Undertone::Warm => true,
            Undertone::Cool => false,
            // Only reached when the reference table is empty
            Undertone::Neutral => derived.hue >= (t.warm_hue_min + t.cool_hue_max) / 2.0,
        };

        let season = match (warm_leaning, deep, vivid) {
            (true, true, _) | (true, false, false) => Season::Autumn,
            (true, false, true) => Season::Spring,
            (false, true, _) | (false, false, true) => Season::Winter,
            (false, false, false) => Season::Summer,
        };

        SeasonDecision {
            season,
            boundary_resolved: false,
        }
    }

    /// Nearest reference among the season's subtypes. Falls back to `True`,
    /// which every season has, when the table holds none of them.
    pub fn determine_subtype(
        &self,
        season: Season,
        lab: &LabColor,
    ) -> (Subtype, Vec<(TwelveTone, f64)>) {
        let ranked = self.references.ranked_distances(lab, season.tones());
        let subtype = ranked
            .first()
            .map(|(tone, _)| tone.subtype())
            .unwrap_or(Subtype::True);
        (subtype, ranked)
    }

    fn nearest_season(&self, lab: &LabColor, seasons: &[Season]) -> Option<Season> {
        let candidates = seasons.iter().flat_map(|s| s.tones());
        self.references
            .ranked_distances(lab, candidates)
            .first()
            .map(|(tone, _)| tone.season())
    }

    /// Larger margin between winner and runner-up and a closer winner both
    /// raise confidence.
    fn confidence(
        &self,
        ranked: &[(TwelveTone, f64)],
        undertone: Undertone,
        boundary_resolved: bool,
    ) -> f64 {
        let Some(&(_, best)) = ranked.first() else {
            return 0.0;
        };

        let separation = match ranked.get(1) {
            Some(&(_, runner_up)) if runner_up > f64::EPSILON => {
                ((runner_up - best) / runner_up).clamp(0.0, 1.0)
            }
            Some(_) => 0.0,
            None => 1.0,
        };

        let proximity = 1.0 / (1.0 + best / self.config.proximity_scale);

        let mut confidence = 100.0 * (0.5 + 0.5 * separation) * proximity;
        if undertone == Undertone::Neutral {
            confidence *= self.config.neutral_penalty;
        }
        if boundary_resolved {
            confidence *= self.config.boundary_penalty;
        }

        ((confidence * 10.0).round() / 10.0).clamp(0.0, 100.0)
    }
}
