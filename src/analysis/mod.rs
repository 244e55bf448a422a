pub mod classifier;
pub mod config;
pub mod reference;
pub mod tone;

pub use classifier::{
    classify_12_tone, ClassificationInput, SeasonDecision, SkinMetrics, ToneAnalysis,
    ToneClassifier, TwelveToneResult,
};
pub use config::{ClassifierConfig, ToneThresholds};
pub use reference::{get_reference_lab, KoreanAdjustments, ReferenceTable, KOREAN_ADJUSTMENTS};
pub use tone::{korean_name_for_key, Season, Subtype, TwelveTone, Undertone};
