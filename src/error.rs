use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the fallible helpers behind each scan stage.
///
/// Stage entry points (`recognize`, `read`, `find_expiry`, `match_medicine`)
/// never return these; they log and degrade to an empty or absent result.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported image format: {0} (expected JPEG or PNG)")]
    UnsupportedFormat(String),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("OCR engine error: {0}")]
    Ocr(String),

    #[error("OCR server request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Barcode decoder error: {0}")]
    Barcode(String),

    #[error("Failed to read medicine database: {0}")]
    Database(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to (de)serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Camera error: {0}")]
    Camera(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
