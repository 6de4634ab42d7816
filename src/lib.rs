//! Medicine package scanner.
//!
//! Reads text and barcodes from a photo of a medicine package, finds the
//! expiry date in the text, and looks the medicine up in a reference table.

pub mod commands;
pub mod error;
pub mod models;
pub mod services;

pub use commands::ScanService;
pub use error::{Result, ScanError};
pub use models::{AppConfig, MatchResult, MedicineRecord, RecognizedLine, ScanReport};
