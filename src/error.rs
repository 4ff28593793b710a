use thiserror::Error;

use crate::common::{ColorHex, ImageId};

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Color Error: {0}")]
    Color(#[from] ColorError),
    #[error("Registry Error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Palette Error: {0}")]
    Palette(#[from] PaletteError),
    #[error("Failed to load configuration: {0}")]
    ConfigSource(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to serialize export: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Color Error Type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("'{0}' is not a #RRGGBB hex color")]
    InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PivotIdError {
    #[error("Pivot id '{0}' has no '__' separator")]
    MissingSeparator(String),
    #[error("Pivot id has an invalid image id: {0}")]
    InvalidImageId(String),
    #[error("Pivot id has an invalid slot index: {0}")]
    InvalidSlot(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No unused lead color found after {attempts} attempts")]
    ColorSpaceExhausted { attempts: usize },
    #[error("Lead color {0} is already used by another group")]
    LeadColorInUse(ColorHex),
    #[error("Invalid lead color: {0}")]
    InvalidColor(#[from] ColorError),
}

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Palette task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("No colors could be sampled from image {0}")]
    EmptyPalette(ImageId),
    #[error("Image {0} is not registered")]
    UnknownImage(ImageId),
}
