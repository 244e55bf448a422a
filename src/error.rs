use thiserror::Error;

use crate::analysis::tone::{Season, Subtype};

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Color Error: {0}")]
    Color(#[from] ColorError),
    #[error("Tone Error: {0}")]
    Tone(#[from] ToneError),
    #[error("Sample Error: {0}")]
    Sample(#[from] SampleError),
    #[error("Config Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// Color parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid color format '{0}', expected #RRGGBB")]
    InvalidColorFormat(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToneError {
    #[error("Invalid twelve-tone key '{0}'")]
    InvalidTone(String),
    #[error("{subtype} is not a valid subtype of {season}")]
    InvalidCombination { subtype: Subtype, season: Season },
    #[error("Unknown tone '{0}'")]
    UnknownTone(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error("Sample region is empty or outside the image")]
    EmptyRegion,
    #[error("No usable skin pixels in region ({rejected} rejected)")]
    NoUsablePixels { rejected: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
