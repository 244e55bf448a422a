pub mod analysis;
pub mod color;
pub mod confidence;
pub mod config;
pub mod error;
pub mod palette;
pub mod service;

pub use analysis::{classify_12_tone, ClassificationInput, TwelveTone, TwelveToneResult};
pub use color::{calculate_ciede2000, hex_to_lab, rgb_to_lab, LabColor};
pub use confidence::{
    calculate_propagated_confidence, validate_product_recommendation_confidence,
    ConfidenceResult, ConfidenceSource,
};
pub use config::Configuration;
pub use error::{AppError, ColorError, ConfigError, SampleError, ToneError};
pub use palette::{generate_tone_palette, get_subtype_characteristics, get_tone_compatibility};
pub use service::{AnalysisReport, AnalysisRequest, PersonalColorService};
