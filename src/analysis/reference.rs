use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::tone::TwelveTone;
use crate::color::{ciede2000, LabColor};

/// Constant correction applied on top of the Western seasonal thresholds.
///
/// Korean skin samples sit at lower average chroma and in a narrower,
/// yellower hue band than the data the seasonal thresholds were drawn from.
/// Unadjusted thresholds push too many of them into the cool seasons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KoreanAdjustments {
    /// Degrees added to both hue thresholds
    pub hue_offset: f64,
    /// Added to both b* thresholds
    pub b_offset: f64,
    /// Added to the spring/autumn and winter/summer chroma split
    pub chroma_offset: f64,
    /// Added to the deep-lightness cut
    pub lightness_offset: f64,
}

pub const KOREAN_ADJUSTMENTS: KoreanAdjustments = KoreanAdjustments {
    hue_offset: -4.0,
    b_offset: -2.0,
    chroma_offset: -3.0,
    lightness_offset: 2.0,
};

impl KoreanAdjustments {
    pub const NONE: KoreanAdjustments = KoreanAdjustments {
        hue_offset: 0.0,
        b_offset: 0.0,
        chroma_offset: 0.0,
        lightness_offset: 0.0,
    };
}

impl Default for KoreanAdjustments {
    fn default() -> Self {
        KOREAN_ADJUSTMENTS
    }
}

/// Reference skin Lab point per tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    points: IndexMap<TwelveTone, LabColor>,
}

static STANDARD_REFERENCES: Lazy<ReferenceTable> = Lazy::new(|| {
    ReferenceTable::from_points([
        (TwelveTone::LightSpring, LabColor::new(72.0, 9.0, 20.0)),
        (TwelveTone::TrueSpring, LabColor::new(68.0, 11.0, 24.0)),
        (TwelveTone::BrightSpring, LabColor::new(66.0, 13.0, 27.0)),
        (TwelveTone::LightSummer, LabColor::new(73.0, 9.0, 11.0)),
        (TwelveTone::TrueSummer, LabColor::new(67.0, 11.0, 10.0)),
        (TwelveTone::MutedSummer, LabColor::new(63.0, 8.0, 10.0)),
        (TwelveTone::MutedAutumn, LabColor::new(62.0, 9.0, 16.0)),
        (TwelveTone::TrueAutumn, LabColor::new(54.0, 12.0, 21.0)),
        (TwelveTone::DeepAutumn, LabColor::new(48.0, 13.0, 20.0)),
        (TwelveTone::TrueWinter, LabColor::new(56.0, 16.0, 11.0)),
        (TwelveTone::BrightWinter, LabColor::new(64.0, 19.0, 12.0)),
        (TwelveTone::DeepWinter, LabColor::new(47.0, 15.0, 10.0)),
    ])
});

impl ReferenceTable {
    /// The built-in table, constructed once per process.
    pub fn standard() -> &'static ReferenceTable {
        &STANDARD_REFERENCES
    }

    pub fn from_points(points: impl IntoIterator<Item = (TwelveTone, LabColor)>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    pub fn get(&self, tone: TwelveTone) -> Option<&LabColor> {
        self.points.get(&tone)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// CIEDE2000 distance from `lab` to every candidate that has a reference,
    /// sorted nearest first.
    pub fn ranked_distances(
        &self,
        lab: &LabColor,
        candidates: impl IntoIterator<Item = TwelveTone>,
    ) -> Vec<(TwelveTone, f64)> {
        let mut ranked: Vec<(TwelveTone, f64)> = candidates
            .into_iter()
            .filter_map(|tone| self.get(tone).map(|r| (tone, ciede2000(lab, r))))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked
    }
}

/// Reference skin color of `tone` in the built-in table.
pub fn get_reference_lab(tone: TwelveTone) -> LabColor {
    match ReferenceTable::standard().get(tone) {
        Some(lab) => *lab,
        None => unreachable!("standard reference table covers all twelve tones"),
    }
}
