use super::engine::OcrEngine;
use crate::error::{Result, ScanError};
use crate::models::language::LanguageSet;
use crate::services::imaging::encode_png;
use image::RgbImage;
use std::path::Path;
use tesseract::{PageSegMode, Tesseract};

/// Tesseract OCR engine implementation
pub struct TesseractEngine {
    // Tesseract instance will be created per-call for thread safety
    tessdata_dir: Option<String>,
    language: String,
}

impl TesseractEngine {
    /// Create an engine for `languages`, checking that the traineddata loads
    pub fn new(tessdata_dir: Option<&Path>, languages: &LanguageSet) -> Result<Self> {
        let tessdata_dir = tessdata_dir
            .map(|dir| {
                dir.to_str().map(str::to_string).ok_or_else(|| {
                    ScanError::Ocr(format!("Invalid tessdata path: {}", dir.display()))
                })
            })
            .transpose()?;

        let engine = Self {
            tessdata_dir,
            language: languages.tesseract_languages(),
        };

        // Fail early on missing traineddata (e.g. no hin.traineddata)
        engine.create_instance()?;
        tracing::info!(language = %engine.language, "Tesseract engine ready");

        Ok(engine)
    }

    fn create_instance(&self) -> Result<Tesseract> {
        let mut tesseract = Tesseract::new(self.tessdata_dir.as_deref(), Some(&self.language))
            .map_err(|e| ScanError::Ocr(format!("Failed to create Tesseract instance: {}", e)))?;

        // Package photos have scattered blocks of text
        tesseract.set_page_seg_mode(PageSegMode::PsmAuto);
        Ok(tesseract)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&mut self, image: &RgbImage) -> Result<Vec<String>> {
        let png = encode_png(image)?;

        let text = self
            .create_instance()?
            .set_image_from_mem(&png)
            .map_err(|e| ScanError::Ocr(format!("Failed to set image: {}", e)))?
            .get_text()
            .map_err(|e| ScanError::Ocr(format!("Failed to recognize text: {}", e)))?;

        Ok(text.lines().map(str::to_string).collect())
    }
}
