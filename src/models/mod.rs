pub mod config;
pub mod language;
pub mod medicine;
pub mod ocr_result;

pub use config::AppConfig;
pub use language::{LanguageChoice, LanguageSet, OcrLanguage};
pub use medicine::{MatchResult, MedicineRecord};
pub use ocr_result::{RecognizedLine, ScanReport};
