use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::analysis::TwelveTone;
use crate::color::{hex_to_lab, LabColor};
use crate::error::ToneError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorInfo {
    pub hex: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab: Option<LabColor>,
}

impl ColorInfo {
    /// Builds a swatch, precomputing its Lab value when the hex parses.
    pub fn new(hex: &str, name: &str) -> Self {
        Self {
            hex: hex.to_string(),
            name: name.to_string(),
            lab: hex_to_lab(hex).ok(),
        }
    }

    /// Stored Lab value, falling back to parsing the hex.
    pub fn lab(&self) -> Option<LabColor> {
        self.lab.or_else(|| hex_to_lab(&self.hex).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonePalette {
    pub tone: TwelveTone,
    pub best_colors: Vec<ColorInfo>,
    pub worst_colors: Vec<ColorInfo>,
    pub lip_colors: Vec<ColorInfo>,
    pub eye_colors: Vec<ColorInfo>,
    pub blush_colors: Vec<ColorInfo>,
}

/// Immutable tone → palette map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteTable {
    palettes: IndexMap<TwelveTone, TonePalette>,
}

type Swatches = &'static [(&'static str, &'static str)];

struct PaletteEntry {
    tone: TwelveTone,
    best: Swatches,
    worst: Swatches,
    lip: Swatches,
    eye: Swatches,
    blush: Swatches,
}

static PALETTE_ENTRIES: [PaletteEntry; 12] = [
    PaletteEntry {
        tone: TwelveTone::LightSpring,
        best: &[
            ("#FFDAB9", "Peach Puff"),
            ("#FFB6A3", "Light Coral Peach"),
            ("#F9E79F", "Butter Yellow"),
            ("#A8E6CF", "Mint"),
            ("#AEDFF7", "Light Aqua"),
            ("#FFF5E1", "Ivory"),
        ],
        worst: &[
            ("#000000", "Black"),
            ("#4B0082", "Indigo"),
            ("#800020", "Burgundy"),
            ("#708090", "Slate Gray"),
        ],
        lip: &[
            ("#FF9E80", "Coral Pink"),
            ("#F7A488", "Peach Nude"),
            ("#FF8C69", "Salmon"),
        ],
        eye: &[
            ("#D2B48C", "Tan"),
            ("#E6BE8A", "Champagne Gold"),
            ("#C8A27C", "Light Bronze"),
        ],
        blush: &[("#FFB7A5", "Apricot"), ("#F8C8B8", "Peach Pink")],
    },
    PaletteEntry {
        tone: TwelveTone::TrueSpring,
        best: &[
            ("#FF7F50", "Coral"),
            ("#FFD700", "Golden Yellow"),
            ("#40E0D0", "Turquoise"),
            ("#FFA07A", "Light Salmon"),
            ("#9ACD32", "Yellow Green"),
            ("#F5DEB3", "Warm Beige"),
        ],
        worst: &[
            ("#000080", "Navy"),
            ("#2F4F4F", "Dark Slate"),
            ("#C0C0C0", "Silver Gray"),
            ("#8B008B", "Dark Magenta"),
        ],
        lip: &[
            ("#FF6F61", "Living Coral"),
            ("#E9967A", "Dark Salmon"),
            ("#F08060", "Warm Coral"),
        ],
        eye: &[
            ("#CD853F", "Peru Brown"),
            ("#DAA520", "Goldenrod"),
            ("#8FBC8F", "Sage"),
        ],
        blush: &[("#FF9966", "Orange Peach"), ("#FFA07A", "Salmon")],
    },
    PaletteEntry {
        tone: TwelveTone::BrightSpring,
        best: &[
            ("#FF6347", "Tomato"),
            ("#FFD300", "Cyber Yellow"),
            ("#00CED1", "Dark Turquoise"),
            ("#32CD32", "Lime Green"),
            ("#FF69B4", "Hot Pink"),
            ("#1E90FF", "Dodger Blue"),
        ],
        worst: &[
            ("#808000", "Olive"),
            ("#A0522D", "Sienna"),
            ("#696969", "Dim Gray"),
            ("#C2B280", "Sand"),
        ],
        lip: &[
            ("#FF4F4F", "Bright Coral Red"),
            ("#FF5E78", "Watermelon"),
            ("#E2583E", "Flame"),
        ],
        eye: &[
            ("#B8860B", "Dark Goldenrod"),
            ("#20B2AA", "Light Sea Green"),
            ("#8B4513", "Saddle Brown"),
        ],
        blush: &[("#FF7F7F", "Bright Coral"), ("#FF8C94", "Watermelon Pink")],
    },
    PaletteEntry {
        tone: TwelveTone::LightSummer,
        best: &[
            ("#E6E6FA", "Lavender"),
            ("#B0C4DE", "Light Steel Blue"),
            ("#FFB6C1", "Light Pink"),
            ("#D8BFD8", "Thistle"),
            ("#AFEEEE", "Pale Turquoise"),
            ("#F0F8FF", "Alice Blue"),
        ],
        worst: &[
            ("#FF8C00", "Dark Orange"),
            ("#8B4513", "Saddle Brown"),
            ("#000000", "Black"),
            ("#DAA520", "Goldenrod"),
        ],
        lip: &[
            ("#E8A0BF", "Rose Pink"),
            ("#F4A6B7", "Baby Pink"),
            ("#D98695", "Dusty Rose"),
        ],
        eye: &[
            ("#9A8FB5", "Soft Lavender"),
            ("#A9A9C8", "Cool Taupe"),
            ("#B8C4D6", "Powder Blue"),
        ],
        blush: &[("#F7B2C4", "Cool Pink"), ("#EFBBCC", "Cameo Pink")],
    },
    PaletteEntry {
        tone: TwelveTone::TrueSummer,
        best: &[
            ("#6495ED", "Cornflower Blue"),
            ("#DB7093", "Pale Violet Red"),
            ("#778899", "Light Slate Gray"),
            ("#5F9EA0", "Cadet Blue"),
            ("#BC8F8F", "Rosy Brown"),
            ("#9370DB", "Medium Purple"),
        ],
        worst: &[
            ("#FF8C00", "Dark Orange"),
            ("#FFD700", "Gold"),
            ("#8B4513", "Saddle Brown"),
            ("#FF4500", "Orange Red"),
        ],
        lip: &[
            ("#C76E8A", "Raspberry Rose"),
            ("#D87093", "Pale Violet Red"),
            ("#B5838D", "Mauve"),
        ],
        eye: &[
            ("#708090", "Slate Gray"),
            ("#6A5ACD", "Slate Blue"),
            ("#8E8EA8", "Cool Gray"),
        ],
        blush: &[("#E59AB0", "Rose"), ("#D8A1B3", "Mauve Pink")],
    },
    PaletteEntry {
        tone: TwelveTone::MutedSummer,
        best: &[
            ("#A3A3C2", "Dusty Lavender"),
            ("#8FA9A3", "Sage Gray"),
            ("#B39EB5", "Pastel Purple"),
            ("#9DB4C0", "Dusty Blue"),
            ("#C4A4A7", "Dusty Rose"),
            ("#A39E93", "Gray Taupe"),
        ],
        worst: &[
            ("#FF0000", "Red"),
            ("#FFFF00", "Yellow"),
            ("#FF8C00", "Dark Orange"),
            ("#000000", "Black"),
        ],
        lip: &[
            ("#B07D8A", "Muted Berry"),
            ("#C08497", "Dusty Mauve"),
            ("#A87C7C", "Rosewood"),
        ],
        eye: &[
            ("#7D7F9A", "Smoky Blue"),
            ("#9C8F96", "Taupe Mauve"),
            ("#8A9A9A", "Gray Sage"),
        ],
        blush: &[("#D2A1A9", "Soft Rose"), ("#C9A0A8", "Dusty Pink")],
    },
    PaletteEntry {
        tone: TwelveTone::MutedAutumn,
        best: &[
            ("#C2B280", "Sand"),
            ("#8F9779", "Artichoke"),
            ("#D2A679", "Camel"),
            ("#C68E5E", "Caramel"),
            ("#A0785A", "Chamoisee"),
            ("#9CAF88", "Sage Green"),
        ],
        worst: &[
            ("#FF1493", "Deep Pink"),
            ("#0000FF", "Blue"),
            ("#00FFFF", "Cyan"),
            ("#000000", "Black"),
        ],
        lip: &[
            ("#B5746B", "Muted Terracotta"),
            ("#C08081", "Old Rose"),
            ("#A0654F", "Brick Nude"),
        ],
        eye: &[
            ("#8B7D6B", "Warm Taupe"),
            ("#7A7F5C", "Olive Khaki"),
            ("#A67B5B", "Cafe au Lait"),
        ],
        blush: &[("#D09A7E", "Soft Peach"), ("#C4917C", "Warm Rose Beige")],
    },
    PaletteEntry {
        tone: TwelveTone::TrueAutumn,
        best: &[
            ("#CC5500", "Burnt Orange"),
            ("#808000", "Olive"),
            ("#DAA520", "Goldenrod"),
            ("#8B4513", "Saddle Brown"),
            ("#B7410E", "Rust"),
            ("#556B2F", "Dark Olive Green"),
        ],
        worst: &[
            ("#FF69B4", "Hot Pink"),
            ("#E6E6FA", "Lavender"),
            ("#87CEFA", "Light Sky Blue"),
            ("#C0C0C0", "Silver"),
        ],
        lip: &[
            ("#B7410E", "Rust"),
            ("#A0522D", "Sienna"),
            ("#C1440E", "Brick Red"),
        ],
        eye: &[
            ("#8B4513", "Saddle Brown"),
            ("#6B8E23", "Olive Drab"),
            ("#B8860B", "Dark Goldenrod"),
        ],
        blush: &[("#E2725B", "Terracotta"), ("#CD8C6B", "Warm Apricot")],
    },
    PaletteEntry {
        tone: TwelveTone::DeepAutumn,
        best: &[
            ("#800000", "Maroon"),
            ("#654321", "Dark Brown"),
            ("#355E3B", "Hunter Green"),
            ("#7B3F00", "Chocolate"),
            ("#B8860B", "Dark Goldenrod"),
            ("#008080", "Teal"),
        ],
        worst: &[
            ("#FFB6C1", "Light Pink"),
            ("#E0FFFF", "Light Cyan"),
            ("#FFFACD", "Lemon Chiffon"),
            ("#E6E6FA", "Lavender"),
        ],
        lip: &[
            ("#8B3A3A", "Deep Brick"),
            ("#7B2D26", "Burnt Red"),
            ("#A0522D", "Sienna"),
        ],
        eye: &[
            ("#4B3621", "Cafe Noir"),
            ("#556B2F", "Dark Olive"),
            ("#704214", "Sepia"),
        ],
        blush: &[("#B86B4B", "Deep Terracotta"), ("#C26B4E", "Burnt Peach")],
    },
    PaletteEntry {
        tone: TwelveTone::TrueWinter,
        best: &[
            ("#000000", "Black"),
            ("#FFFFFF", "Pure White"),
            ("#0000CD", "Medium Blue"),
            ("#DC143C", "Crimson"),
            ("#50C878", "Emerald"),
            ("#C71585", "Medium Violet Red"),
        ],
        worst: &[
            ("#FFA500", "Orange"),
            ("#F5DEB3", "Wheat"),
            ("#D2B48C", "Tan"),
            ("#808000", "Olive"),
        ],
        lip: &[
            ("#C41E3A", "Cardinal Red"),
            ("#B0306A", "Berry"),
            ("#990033", "Cool Burgundy"),
        ],
        eye: &[
            ("#2F4F4F", "Dark Slate Gray"),
            ("#191970", "Midnight Blue"),
            ("#696969", "Charcoal"),
        ],
        blush: &[("#D8497A", "Cool Raspberry"), ("#C54B8C", "Mulberry")],
    },
    PaletteEntry {
        tone: TwelveTone::BrightWinter,
        best: &[
            ("#FF00FF", "Magenta"),
            ("#00BFFF", "Deep Sky Blue"),
            ("#FF1744", "Bright Red"),
            ("#00C957", "Bright Emerald"),
            ("#FFFFFF", "White"),
            ("#4169E1", "Royal Blue"),
        ],
        worst: &[
            ("#D2B48C", "Tan"),
            ("#BC8F8F", "Rosy Brown"),
            ("#C2B280", "Sand"),
            ("#8B7D6B", "Warm Taupe"),
        ],
        lip: &[
            ("#E0115F", "Ruby"),
            ("#FF007F", "Rose"),
            ("#D7263D", "Bright Crimson"),
        ],
        eye: &[
            ("#1C1C1C", "Jet"),
            ("#0047AB", "Cobalt"),
            ("#5D3FD3", "Iris"),
        ],
        blush: &[("#FF5C8A", "Bright Pink"), ("#F25F8E", "Fuchsia Pink")],
    },
    PaletteEntry {
        tone: TwelveTone::DeepWinter,
        best: &[
            ("#000000", "Black"),
            ("#4B0082", "Indigo"),
            ("#800020", "Burgundy"),
            ("#013220", "Dark Green"),
            ("#191970", "Midnight Blue"),
            ("#8B008B", "Dark Magenta"),
        ],
        worst: &[
            ("#FFDAB9", "Peach Puff"),
            ("#F0E68C", "Khaki"),
            ("#FFA07A", "Light Salmon"),
            ("#DEB887", "Burlywood"),
        ],
        lip: &[
            ("#722F37", "Wine"),
            ("#800020", "Burgundy"),
            ("#8E3A59", "Plum Berry"),
        ],
        eye: &[
            ("#36454F", "Charcoal"),
            ("#301934", "Dark Purple"),
            ("#3B3C36", "Black Olive"),
        ],
        blush: &[("#A8506B", "Deep Rose"), ("#9E4A6A", "Plum Rose")],
    },
];

static STANDARD_PALETTES: Lazy<PaletteTable> = Lazy::new(|| {
    let swatches = |list: Swatches| -> Vec<ColorInfo> {
        list.iter().map(|(hex, name)| ColorInfo::new(hex, name)).collect()
    };

    PaletteTable::from_palettes(PALETTE_ENTRIES.iter().map(|entry| TonePalette {
        tone: entry.tone,
        best_colors: swatches(entry.best),
        worst_colors: swatches(entry.worst),
        lip_colors: swatches(entry.lip),
        eye_colors: swatches(entry.eye),
        blush_colors: swatches(entry.blush),
    }))
});

impl PaletteTable {
    /// The built-in table, constructed once per process.
    pub fn standard() -> &'static PaletteTable {
        &STANDARD_PALETTES
    }

    pub fn from_palettes(palettes: impl IntoIterator<Item = TonePalette>) -> Self {
        Self {
            palettes: palettes.into_iter().map(|p| (p.tone, p)).collect(),
        }
    }

    pub fn palette(&self, tone: TwelveTone) -> Result<&TonePalette, ToneError> {
        self.palettes
            .get(&tone)
            .ok_or_else(|| ToneError::UnknownTone(tone.to_string()))
    }

    /// Owned copy of a tone's palette; the shared table is never handed out
    /// mutably.
    pub fn generate(&self, tone: TwelveTone) -> Result<TonePalette, ToneError> {
        self.palette(tone).cloned()
    }

    pub fn tones(&self) -> impl Iterator<Item = TwelveTone> + '_ {
        self.palettes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}

/// Copy of the built-in palette for `tone`.
pub fn generate_tone_palette(tone: TwelveTone) -> TonePalette {
    match PaletteTable::standard().generate(tone) {
        Ok(palette) => palette,
        Err(_) => unreachable!("standard palette table covers all twelve tones"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::parse_hex;

    #[test]
    fn test_standard_table_covers_every_tone() {
        let table = PaletteTable::standard();
        assert_eq!(table.len(), 12);
        for tone in TwelveTone::ALL {
            let palette = table.palette(tone).unwrap();
            assert_eq!(palette.tone, tone);
            assert!(!palette.best_colors.is_empty());
            assert!(!palette.worst_colors.is_empty());
            assert!(!palette.lip_colors.is_empty());
            assert!(!palette.eye_colors.is_empty());
            assert!(!palette.blush_colors.is_empty());
        }
    }

    #[test]
    fn test_every_swatch_has_valid_hex_and_lab() {
        for tone in TwelveTone::ALL {
            let palette = generate_tone_palette(tone);
            for swatch in palette
                .best_colors
                .iter()
                .chain(&palette.worst_colors)
                .chain(&palette.lip_colors)
                .chain(&palette.eye_colors)
                .chain(&palette.blush_colors)
            {
                assert!(parse_hex(&swatch.hex).is_ok(), "{tone}: {}", swatch.hex);
                assert!(swatch.lab.is_some());
            }
        }
    }

    #[test]
    fn test_generated_palette_is_a_copy() {
        let mut palette = generate_tone_palette(TwelveTone::TrueAutumn);
        palette.best_colors.clear();
        palette.worst_colors.push(ColorInfo::new("#123456", "Scratch"));

        let fresh = generate_tone_palette(TwelveTone::TrueAutumn);
        assert_eq!(fresh.best_colors.len(), 6);
        assert_eq!(fresh.worst_colors.len(), 4);
    }

    #[test]
    fn test_missing_tone_in_substituted_table() {
        let table = PaletteTable::from_palettes([generate_tone_palette(TwelveTone::DeepWinter)]);
        assert!(table.palette(TwelveTone::DeepWinter).is_ok());
        assert_eq!(
            table.generate(TwelveTone::LightSpring),
            Err(ToneError::UnknownTone("light-spring".to_string()))
        );
    }

    #[test]
    fn test_color_info_lab_fallback() {
        let swatch = ColorInfo {
            hex: "#FFFFFF".to_string(),
            name: "White".to_string(),
            lab: None,
        };
        assert!(swatch.lab().is_some());

        let broken = ColorInfo::new("not-a-color", "Broken");
        assert_eq!(broken.lab, None);
        assert_eq!(broken.lab(), None);
    }
}
