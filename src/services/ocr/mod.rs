pub mod engine;
pub mod http_ocr;
pub mod recognizer;
pub mod registry;
#[cfg(feature = "tesseract")]
pub mod tesseract;

// Re-export main types
pub use engine::{EngineFactory, OcrEngine};
pub use http_ocr::HttpOcrClient;
pub use recognizer::{backend_factory, TextRecognizer};
pub use registry::EngineRegistry;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;
