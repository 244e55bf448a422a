use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::analysis::TwelveTone;
use crate::error::ToneError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jewelry {
    Gold,
    Silver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contrast {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtypeCharacteristics {
    pub tone: TwelveTone,
    pub name: String,
    pub korean_name: String,
    pub description: String,
    pub traits: Vec<String>,
    pub hair_colors: Vec<String>,
    pub jewelry: Jewelry,
    pub contrast: Contrast,
}

struct Entry {
    tone: TwelveTone,
    name: &'static str,
    description: &'static str,
    traits: &'static [&'static str],
    hair: &'static [&'static str],
    jewelry: Jewelry,
    contrast: Contrast,
}

static ENTRIES: [Entry; 12] = [
    Entry {
        tone: TwelveTone::LightSpring,
        name: "Light Spring",
        description: "Delicate, warm and luminous. Clear pastels with a golden cast keep the complexion fresh.",
        traits: &["light ivory skin with a peachy glow", "soft golden or light brown eyes", "low overall contrast"],
        hair: &["honey blonde", "light golden brown"],
        jewelry: Jewelry::Gold,
        contrast: Contrast::Low,
    },
    Entry {
        tone: TwelveTone::TrueSpring,
        name: "True Spring",
        description: "Warm and clear. Saturated warm colors such as coral and golden yellow bring out natural radiance.",
        traits: &["warm golden-beige skin", "bright amber or hazel eyes", "healthy flush on the cheeks"],
        hair: &["golden brown", "copper brown"],
        jewelry: Jewelry::Gold,
        contrast: Contrast::Medium,
    },
    Entry {
        tone: TwelveTone::BrightSpring,
        name: "Bright Spring",
        description: "Vivid and warm-leaning. High-chroma clear colors suit the sparkle in the eyes and skin.",
        traits: &["clear warm skin", "sparkling eyes with distinct whites", "medium to high contrast"],
        hair: &["warm dark brown", "chestnut"],
        jewelry: Jewelry::Gold,
        contrast: Contrast::High,
    },
    Entry {
        tone: TwelveTone::LightSummer,
        name: "Light Summer",
        description: "Soft, cool and airy. Powdery pastels with a blue base make the skin look translucent.",
        traits: &["fair pink-toned skin", "soft gray or light brown eyes", "gentle low contrast"],
        hair: &["ash brown", "soft cool brown"],
        jewelry: Jewelry::Silver,
        contrast: Contrast::Low,
    },
    Entry {
        tone: TwelveTone::TrueSummer,
        name: "True Summer",
        description: "Cool and gentle. Mid-tone cool colors such as rose and cornflower look harmonious.",
        traits: &["rosy beige skin", "cool brown or gray-brown eyes", "medium-low contrast"],
        hair: &["ash brown", "cool medium brown"],
        jewelry: Jewelry::Silver,
        contrast: Contrast::Medium,
    },
    Entry {
        tone: TwelveTone::MutedSummer,
        name: "Muted Summer",
        description: "Cool and grayed. Dusty, smoky colors flatter more than clear brights.",
        traits: &["neutral-cool skin with little flush", "grayish brown eyes", "blended low contrast"],
        hair: &["ash brown", "mushroom brown"],
        jewelry: Jewelry::Silver,
        contrast: Contrast::Low,
    },
    Entry {
        tone: TwelveTone::MutedAutumn,
        name: "Muted Autumn",
        description: "Warm and soft. Earthy grayed colors like sage and camel blend naturally with the skin.",
        traits: &["neutral-warm beige skin", "soft hazel or olive-brown eyes", "low contrast"],
        hair: &["soft brown", "warm ash brown"],
        jewelry: Jewelry::Gold,
        contrast: Contrast::Low,
    },
    Entry {
        tone: TwelveTone::TrueAutumn,
        name: "True Autumn",
        description: "Rich and warm. Golden earth tones such as rust, olive and mustard make the skin glow.",
        traits: &["golden or bronze skin", "warm brown eyes", "medium contrast"],
        hair: &["auburn", "warm chocolate brown"],
        jewelry: Jewelry::Gold,
        contrast: Contrast::Medium,
    },
    Entry {
        tone: TwelveTone::DeepAutumn,
        name: "Deep Autumn",
        description: "Deep and warm. Dark, rich colors with a warm base give depth and definition.",
        traits: &["deep warm skin", "dark brown eyes", "medium-high contrast"],
        hair: &["dark chocolate", "espresso brown"],
        jewelry: Jewelry::Gold,
        contrast: Contrast::High,
    },
    Entry {
        tone: TwelveTone::TrueWinter,
        name: "True Winter",
        description: "Cool and clear. Pure, icy and jewel colors, including black and white, look crisp.",
        traits: &["cool porcelain or olive-cool skin", "dark eyes with bright whites", "high contrast"],
        hair: &["blue black", "cool dark brown"],
        jewelry: Jewelry::Silver,
        contrast: Contrast::High,
    },
    Entry {
        tone: TwelveTone::BrightWinter,
        name: "Bright Winter",
        description: "Vivid and cool-leaning. Electric saturated colors match the striking contrast.",
        traits: &["clear cool skin", "vivid dark eyes", "very high contrast"],
        hair: &["jet black", "cool espresso"],
        jewelry: Jewelry::Silver,
        contrast: Contrast::High,
    },
    Entry {
        tone: TwelveTone::DeepWinter,
        name: "Deep Winter",
        description: "Deep and cool. Dark jewel tones and true black frame the face with intensity.",
        traits: &["deep cool or neutral skin", "very dark eyes", "high contrast"],
        hair: &["black", "dark cool brown"],
        jewelry: Jewelry::Silver,
        contrast: Contrast::High,
    },
];

/// Immutable tone → characteristics map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicsTable {
    entries: IndexMap<TwelveTone, SubtypeCharacteristics>,
}

static STANDARD_CHARACTERISTICS: Lazy<CharacteristicsTable> = Lazy::new(|| {
    let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
    CharacteristicsTable::from_entries(ENTRIES.iter().map(|entry| SubtypeCharacteristics {
        tone: entry.tone,
        name: entry.name.to_string(),
        korean_name: entry.tone.korean_name().to_string(),
        description: entry.description.to_string(),
        traits: owned(entry.traits),
        hair_colors: owned(entry.hair),
        jewelry: entry.jewelry,
        contrast: entry.contrast,
    }))
});

impl CharacteristicsTable {
    /// The built-in table, constructed once per process.
    pub fn standard() -> &'static CharacteristicsTable {
        &STANDARD_CHARACTERISTICS
    }

    pub fn from_entries(entries: impl IntoIterator<Item = SubtypeCharacteristics>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.tone, e)).collect(),
        }
    }

    pub fn get(&self, tone: TwelveTone) -> Result<&SubtypeCharacteristics, ToneError> {
        self.entries
            .get(&tone)
            .ok_or_else(|| ToneError::UnknownTone(tone.to_string()))
    }

    /// Looks a tone key up, failing with `UnknownTone` for anything outside
    /// the twelve canonical keys or missing from this table.
    pub fn lookup(&self, key: &str) -> Result<&SubtypeCharacteristics, ToneError> {
        let tone: TwelveTone = key
            .parse()
            .map_err(|_| ToneError::UnknownTone(key.to_string()))?;
        self.get(tone)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn characteristics(tone: TwelveTone) -> &'static SubtypeCharacteristics {
    match CharacteristicsTable::standard().get(tone) {
        Ok(entry) => entry,
        Err(_) => unreachable!("characteristics table covers all twelve tones"),
    }
}

pub fn get_subtype_characteristics(key: &str) -> Result<&'static SubtypeCharacteristics, ToneError> {
    CharacteristicsTable::standard().lookup(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tone_described() {
        for tone in TwelveTone::ALL {
            let entry = characteristics(tone);
            assert_eq!(entry.tone, tone);
            assert_eq!(entry.korean_name, tone.korean_name());
            assert!(!entry.description.is_empty());
            assert!(!entry.traits.is_empty());
        }
    }

    #[test]
    fn test_lookup_by_key() {
        let entry = get_subtype_characteristics("bright-winter").unwrap();
        assert_eq!(entry.name, "Bright Winter");
        assert_eq!(entry.jewelry, Jewelry::Silver);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            get_subtype_characteristics("light-winter"),
            Err(ToneError::UnknownTone("light-winter".to_string()))
        );
        assert!(get_subtype_characteristics("").is_err());
    }

    #[test]
    fn test_warm_seasons_wear_gold() {
        use crate::analysis::Undertone;
        for tone in TwelveTone::ALL {
            let expected = match tone.season().undertone() {
                Undertone::Warm => Jewelry::Gold,
                _ => Jewelry::Silver,
            };
            assert_eq!(characteristics(tone).jewelry, expected, "{tone}");
        }
    }

    #[test]
    fn test_substituted_table() {
        let mut custom = characteristics(TwelveTone::DeepAutumn).clone();
        custom.description = "House style: espresso and brass.".to_string();
        let table = CharacteristicsTable::from_entries([custom]);

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup("deep-autumn").unwrap().description,
            "House style: espresso and brass."
        );
        assert_eq!(
            table.get(TwelveTone::TrueSummer),
            Err(ToneError::UnknownTone("true-summer".to_string()))
        );
        assert_eq!(CharacteristicsTable::standard().len(), 12);
    }
}
