use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ToneError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Undertone {
    Warm,
    Cool,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subtype {
    Light,
    True,
    Bright,
    Muted,
    Deep,
}

impl Undertone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Undertone::Warm => "warm",
            Undertone::Cool => "cool",
            Undertone::Neutral => "neutral",
        }
    }
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    /// Subtypes that exist within this season.
    pub fn valid_subtypes(&self) -> [Subtype; 3] {
        match self {
            Season::Spring => [Subtype::Light, Subtype::True, Subtype::Bright],
            Season::Summer => [Subtype::Light, Subtype::True, Subtype::Muted],
            Season::Autumn => [Subtype::Muted, Subtype::True, Subtype::Deep],
            Season::Winter => [Subtype::True, Subtype::Bright, Subtype::Deep],
        }
    }

    pub fn tones(&self) -> [TwelveTone; 3] {
        self.valid_subtypes().map(|subtype| match TwelveTone::compose(subtype, *self) {
            Ok(tone) => tone,
            Err(_) => unreachable!("valid_subtypes only lists composable subtypes"),
        })
    }

    /// The undertone the season family is built around.
    pub fn undertone(&self) -> Undertone {
        match self {
            Season::Spring | Season::Autumn => Undertone::Warm,
            Season::Summer | Season::Winter => Undertone::Cool,
        }
    }
}

impl Subtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Light => "light",
            Subtype::True => "true",
            Subtype::Bright => "bright",
            Subtype::Muted => "muted",
            Subtype::Deep => "deep",
        }
    }
}

impl FromStr for Season {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            _ => Err(ToneError::InvalidTone(s.to_string())),
        }
    }
}

impl FromStr for Subtype {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Subtype::Light),
            "true" => Ok(Subtype::True),
            "bright" => Ok(Subtype::Bright),
            "muted" => Ok(Subtype::Muted),
            "deep" => Ok(Subtype::Deep),
            _ => Err(ToneError::InvalidTone(s.to_string())),
        }
    }
}

impl fmt::Display for Undertone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the twelve valid `{subtype}-{season}` combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TwelveTone {
    LightSpring,
    TrueSpring,
    BrightSpring,
    LightSummer,
    TrueSummer,
    MutedSummer,
    MutedAutumn,
    TrueAutumn,
    DeepAutumn,
    TrueWinter,
    BrightWinter,
    DeepWinter,
}

impl TwelveTone {
    pub const ALL: [TwelveTone; 12] = [
        TwelveTone::LightSpring,
        TwelveTone::TrueSpring,
        TwelveTone::BrightSpring,
        TwelveTone::LightSummer,
        TwelveTone::TrueSummer,
        TwelveTone::MutedSummer,
        TwelveTone::MutedAutumn,
        TwelveTone::TrueAutumn,
        TwelveTone::DeepAutumn,
        TwelveTone::TrueWinter,
        TwelveTone::BrightWinter,
        TwelveTone::DeepWinter,
    ];

    /// Builds a tone from its parts, rejecting pairs outside the fixed table.
    pub fn compose(subtype: Subtype, season: Season) -> Result<Self, ToneError> {
        use Season::*;
        use Subtype::*;

        let tone = match (subtype, season) {
            (Light, Spring) => TwelveTone::LightSpring,
            (True, Spring) => TwelveTone::TrueSpring,
            (Bright, Spring) => TwelveTone::BrightSpring,
            (Light, Summer) => TwelveTone::LightSummer,
            (True, Summer) => TwelveTone::TrueSummer,
            (Muted, Summer) => TwelveTone::MutedSummer,
            (Muted, Autumn) => TwelveTone::MutedAutumn,
            (True, Autumn) => TwelveTone::TrueAutumn,
            (Deep, Autumn) => TwelveTone::DeepAutumn,
            (True, Winter) => TwelveTone::TrueWinter,
            (Bright, Winter) => TwelveTone::BrightWinter,
            (Deep, Winter) => TwelveTone::DeepWinter,
            _ => return Err(ToneError::InvalidCombination { subtype, season }),
        };
        Ok(tone)
    }

    /// Parses a canonical key such as `"muted-summer"`.
    pub fn parse(key: &str) -> Result<Self, ToneError> {
        let invalid = || ToneError::InvalidTone(key.to_string());

        let (subtype, season) = key.split_once('-').ok_or_else(invalid)?;
        let subtype: Subtype = subtype.parse().map_err(|_| invalid())?;
        let season: Season = season.parse().map_err(|_| invalid())?;

        Self::compose(subtype, season).map_err(|_| invalid())
    }

    pub fn parts(&self) -> (Subtype, Season) {
        (self.subtype(), self.season())
    }

    pub fn season(&self) -> Season {
        match self {
            TwelveTone::LightSpring | TwelveTone::TrueSpring | TwelveTone::BrightSpring => {
                Season::Spring
            }
            TwelveTone::LightSummer | TwelveTone::TrueSummer | TwelveTone::MutedSummer => {
                Season::Summer
            }
            TwelveTone::MutedAutumn | TwelveTone::TrueAutumn | TwelveTone::DeepAutumn => {
                Season::Autumn
            }
            TwelveTone::TrueWinter | TwelveTone::BrightWinter | TwelveTone::DeepWinter => {
                Season::Winter
            }
        }
    }

    pub fn subtype(&self) -> Subtype {
        match self {
            TwelveTone::LightSpring | TwelveTone::LightSummer => Subtype::Light,
            TwelveTone::TrueSpring
            | TwelveTone::TrueSummer
            | TwelveTone::TrueAutumn
            | TwelveTone::TrueWinter => Subtype::True,
            TwelveTone::BrightSpring | TwelveTone::BrightWinter => Subtype::Bright,
            TwelveTone::MutedSummer | TwelveTone::MutedAutumn => Subtype::Muted,
            TwelveTone::DeepAutumn | TwelveTone::DeepWinter => Subtype::Deep,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TwelveTone::LightSpring => "light-spring",
            TwelveTone::TrueSpring => "true-spring",
            TwelveTone::BrightSpring => "bright-spring",
            TwelveTone::LightSummer => "light-summer",
            TwelveTone::TrueSummer => "true-summer",
            TwelveTone::MutedSummer => "muted-summer",
            TwelveTone::MutedAutumn => "muted-autumn",
            TwelveTone::TrueAutumn => "true-autumn",
            TwelveTone::DeepAutumn => "deep-autumn",
            TwelveTone::TrueWinter => "true-winter",
            TwelveTone::BrightWinter => "bright-winter",
            TwelveTone::DeepWinter => "deep-winter",
        }
    }

    pub fn korean_name(&self) -> &'static str {
        match self {
            TwelveTone::LightSpring => "봄 웜 라이트",
            TwelveTone::TrueSpring => "봄 웜 트루",
            TwelveTone::BrightSpring => "봄 웜 브라이트",
            TwelveTone::LightSummer => "여름 쿨 라이트",
            TwelveTone::TrueSummer => "여름 쿨 트루",
            TwelveTone::MutedSummer => "여름 쿨 뮤트",
            TwelveTone::MutedAutumn => "가을 웜 뮤트",
            TwelveTone::TrueAutumn => "가을 웜 트루",
            TwelveTone::DeepAutumn => "가을 웜 딥",
            TwelveTone::TrueWinter => "겨울 쿨 트루",
            TwelveTone::BrightWinter => "겨울 쿨 브라이트",
            TwelveTone::DeepWinter => "겨울 쿨 딥",
        }
    }
}

impl fmt::Display for TwelveTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TwelveTone {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Korean label for a tone key, or the key itself when it has none.
pub fn korean_name_for_key(key: &str) -> String {
    TwelveTone::parse(key)
        .map(|tone| tone.korean_name().to_string())
        .unwrap_or_else(|_| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_parse_round_trip() {
        let mut seen = 0;
        for season in Season::ALL {
            for subtype in season.valid_subtypes() {
                let tone = TwelveTone::compose(subtype, season).unwrap();
                let parsed = TwelveTone::parse(&tone.to_string()).unwrap();
                assert_eq!(parsed.parts(), (subtype, season));
                assert_eq!(parsed, tone);
                seen += 1;
            }
        }
        assert_eq!(seen, 12);
    }

    #[test]
    fn test_all_tones_decompose_uniquely() {
        for tone in TwelveTone::ALL {
            let (subtype, season) = tone.parts();
            assert_eq!(TwelveTone::compose(subtype, season), Ok(tone));
            assert_eq!(tone.key(), format!("{subtype}-{season}"));
        }
    }

    #[test]
    fn test_invalid_combinations_rejected() {
        assert_eq!(
            TwelveTone::compose(Subtype::Bright, Season::Summer),
            Err(ToneError::InvalidCombination {
                subtype: Subtype::Bright,
                season: Season::Summer
            })
        );
        assert!(TwelveTone::compose(Subtype::Light, Season::Winter).is_err());
        assert!(TwelveTone::compose(Subtype::Deep, Season::Spring).is_err());
        assert!(TwelveTone::compose(Subtype::Muted, Season::Winter).is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in [
            "",
            "spring",
            "bright-summer",
            "light-spring-extra",
            "Light-Spring",
            " light-spring",
            "light_spring",
            "deep-",
        ] {
            assert_eq!(
                TwelveTone::parse(bad),
                Err(ToneError::InvalidTone(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_serde_uses_canonical_keys() {
        let json = serde_json::to_string(&TwelveTone::MutedSummer).unwrap();
        assert_eq!(json, "\"muted-summer\"");
        let tone: TwelveTone = serde_json::from_str("\"deep-winter\"").unwrap();
        assert_eq!(tone, TwelveTone::DeepWinter);
        assert!(serde_json::from_str::<TwelveTone>("\"light-winter\"").is_err());
    }

    #[test]
    fn test_korean_names() {
        assert_eq!(TwelveTone::LightSpring.korean_name(), "봄 웜 라이트");
        assert_eq!(korean_name_for_key("deep-autumn"), "가을 웜 딥");
        assert_eq!(korean_name_for_key("coral-spring"), "coral-spring");
    }

    #[test]
    fn test_season_tones_cover_all_twelve() {
        let tones: Vec<TwelveTone> = Season::ALL.iter().flat_map(|s| s.tones()).collect();
        assert_eq!(tones.len(), 12);
        for tone in TwelveTone::ALL {
            assert!(tones.contains(&tone));
        }
    }
}
