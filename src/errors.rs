use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Errors raised by the I/O, configuration and pipeline layers.
///
/// The image algorithms themselves do not fail: misuse is a panic and
/// capacity limits saturate.
#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Failed to serialize configuration: {0}")]
    ConfigSave(#[from] toml::ser::Error),

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Raw buffer holds {actual} bytes, image layout needs {expected}")]
    Layout { expected: usize, actual: usize },
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, ImagingError>;
