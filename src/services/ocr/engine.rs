use crate::error::Result;
use crate::models::language::LanguageSet;
use image::RgbImage;

/// OCR Engine trait - abstraction for different OCR implementations
///
/// Engines are not assumed to be safe for parallel calls, hence `&mut self`;
/// the registry serializes access to each cached instance.
pub trait OcrEngine: Send {
    /// Recognize text segments in detection order, untrimmed
    fn recognize(&mut self, image: &RgbImage) -> Result<Vec<String>>;
}

/// Builds one engine for a language set. Creation is assumed expensive.
pub trait EngineFactory: Send + Sync {
    fn create(&self, languages: &LanguageSet) -> Result<Box<dyn OcrEngine>>;
}

impl<F> EngineFactory for F
where
    F: Fn(&LanguageSet) -> Result<Box<dyn OcrEngine>> + Send + Sync,
{
    fn create(&self, languages: &LanguageSet) -> Result<Box<dyn OcrEngine>> {
        self(languages)
    }
}
