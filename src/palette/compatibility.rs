use serde::{Deserialize, Serialize};
use tracing::trace;

use super::table::{ColorInfo, PaletteTable, TonePalette};
use crate::analysis::TwelveTone;
use crate::color::{ciede2000, LabColor};
use crate::error::ToneError;

/// Score returned when a palette has nothing to compare against.
const NEUTRAL_SCORE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityGrade {
    Perfect,
    Good,
    Neutral,
    Poor,
    Avoid,
}

impl CompatibilityGrade {
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => CompatibilityGrade::Perfect,
            70..=84 => CompatibilityGrade::Good,
            50..=69 => CompatibilityGrade::Neutral,
            30..=49 => CompatibilityGrade::Poor,
            _ => CompatibilityGrade::Avoid,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CompatibilityGrade::Perfect => "Excellent match for this tone",
            CompatibilityGrade::Good => "Flattering choice for this tone",
            CompatibilityGrade::Neutral => "Wearable, but not a standout",
            CompatibilityGrade::Poor => "Tends to dull this tone",
            CompatibilityGrade::Avoid => "Clashes with this tone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorCompatibility {
    pub color: LabColor,
    pub score: u8,
    pub grade: CompatibilityGrade,
    pub description: String,
}

impl ColorCompatibility {
    fn from_score(color: LabColor, score: u8) -> Self {
        let grade = CompatibilityGrade::from_score(score);
        Self {
            color,
            score,
            grade,
            description: grade.description().to_string(),
        }
    }
}

fn distances(color: &LabColor, swatches: &[ColorInfo]) -> Vec<f64> {
    swatches
        .iter()
        .filter_map(ColorInfo::lab)
        .map(|lab| ciede2000(color, &lab))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Three-branch heuristic:
/// - within 5 of a best swatch scores `95 - minBest`
/// - else averaging within 10 of the worst swatches scores `20 + avgWorst`
/// - else `50 + (avgWorst - avgBest) * 2`
///
/// The result jumps where `minBest` crosses 5 and where `avgWorst` crosses 10.
/// Callers relying on the exact scores depend on those jumps.
pub fn score_against_palette(palette: &TonePalette, color: &LabColor) -> ColorCompatibility {
    let color = color.sanitized();
    let best = distances(&color, &palette.best_colors);
    let worst = distances(&color, &palette.worst_colors);

    if best.is_empty() || worst.is_empty() {
        return ColorCompatibility::from_score(color, NEUTRAL_SCORE);
    }

    let min_best = best.iter().copied().fold(f64::INFINITY, f64::min);
    let avg_best = mean(&best);
    let avg_worst = mean(&worst);

    let raw = if min_best < 5.0 {
        95.0 - min_best
    } else if avg_worst < 10.0 {
        20.0 + avg_worst
    } else {
        50.0 + (avg_worst - avg_best) * 2.0
    };
    let score = raw.round().clamp(0.0, 100.0) as u8;

    trace!(
        tone = %palette.tone,
        min_best,
        avg_best,
        avg_worst,
        score,
        "scored color against palette"
    );
    ColorCompatibility::from_score(color, score)
}

impl PaletteTable {
    pub fn compatibility(
        &self,
        tone: TwelveTone,
        color: &LabColor,
    ) -> Result<ColorCompatibility, ToneError> {
        Ok(score_against_palette(self.palette(tone)?, color))
    }

    /// Scores every candidate and sorts best first. Ties keep input order.
    pub fn rank_colors(
        &self,
        tone: TwelveTone,
        candidates: &[LabColor],
    ) -> Result<Vec<ColorCompatibility>, ToneError> {
        let palette = self.palette(tone)?;
        let mut ranked: Vec<ColorCompatibility> = candidates
            .iter()
            .map(|color| score_against_palette(palette, color))
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(ranked)
    }
}

pub fn get_tone_compatibility(tone: TwelveTone, test_color: &LabColor) -> ColorCompatibility {
    match PaletteTable::standard().compatibility(tone, test_color) {
        Ok(result) => result,
        Err(_) => unreachable!("standard palette table covers all twelve tones"),
    }
}

pub fn rank_colors(tone: TwelveTone, candidates: &[LabColor]) -> Vec<ColorCompatibility> {
    match PaletteTable::standard().rank_colors(tone, candidates) {
        Ok(ranked) => ranked,
        Err(_) => unreachable!("standard palette table covers all twelve tones"),
    }
}
