use super::engine::{EngineFactory, OcrEngine};
use super::http_ocr::HttpOcrClient;
use super::registry::EngineRegistry;
use crate::error::{Result, ScanError};
use crate::models::config::{OcrBackend, OcrConfig};
use crate::models::language::LanguageSet;
use crate::models::ocr_result::RecognizedLine;
use image::RgbImage;
use std::time::{Duration, Instant};

/// Text recognizer: image + language set -> recognized lines.
///
/// Never fails; any engine problem is logged and yields no lines.
pub struct TextRecognizer {
    registry: EngineRegistry,
}

impl TextRecognizer {
    pub fn new(factory: impl EngineFactory + 'static) -> Self {
        Self {
            registry: EngineRegistry::new(factory),
        }
    }

    /// Recognizer backed by the engine selected in the OCR config
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(backend_factory(config))
    }

    /// Recognize trimmed, non-empty lines in detection order
    pub fn recognize(&self, image: &RgbImage, languages: &LanguageSet) -> Vec<RecognizedLine> {
        match self.try_recognize(image, languages) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(languages = %languages, error = %e, "OCR failed, continuing without text");
                Vec::new()
            }
        }
    }

    fn try_recognize(&self, image: &RgbImage, languages: &LanguageSet) -> Result<Vec<RecognizedLine>> {
        let engine = self.registry.get(languages)?;

        let start = Instant::now();
        let segments = engine.lock().recognize(image)?;
        let lines: Vec<RecognizedLine> = segments
            .iter()
            .filter_map(|segment| RecognizedLine::new(segment))
            .collect();

        tracing::debug!(
            languages = %languages,
            segments = segments.len(),
            lines = lines.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "OCR complete"
        );

        Ok(lines)
    }

    /// Number of cached engines
    pub fn cached_engines(&self) -> usize {
        self.registry.initialized()
    }
}

/// Factory for the configured OCR backend
pub fn backend_factory(config: &OcrConfig) -> impl EngineFactory + 'static {
    let config = config.clone();

    move |languages: &LanguageSet| -> Result<Box<dyn OcrEngine>> {
        match config.backend {
            OcrBackend::Http => {
                let client = HttpOcrClient::new(
                    &config.server_url,
                    Duration::from_secs(config.timeout_secs),
                    languages,
                )?;
                Ok(Box::new(client))
            }
            OcrBackend::Tesseract => tesseract_engine(&config, languages),
        }
    }
}

#[cfg(feature = "tesseract")]
fn tesseract_engine(config: &OcrConfig, languages: &LanguageSet) -> Result<Box<dyn OcrEngine>> {
    let engine = super::tesseract::TesseractEngine::new(config.tessdata_dir.as_deref(), languages)?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "tesseract"))]
fn tesseract_engine(_config: &OcrConfig, _languages: &LanguageSet) -> Result<Box<dyn OcrEngine>> {
    Err(ScanError::Ocr(
        "Tesseract backend requested but medscan was built without the `tesseract` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::language::LanguageChoice;
    use image::Rgb;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedEngine(Vec<&'static str>);

    impl OcrEngine for ScriptedEngine {
        fn recognize(&mut self, _image: &RgbImage) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct BrokenEngine;

    impl OcrEngine for BrokenEngine {
        fn recognize(&mut self, _image: &RgbImage) -> Result<Vec<String>> {
            Err(ScanError::Ocr("corrupt image".to_string()))
        }
    }

    fn blank_image() -> RgbImage {
        RgbImage::from_pixel(64, 32, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_lines_are_trimmed_and_blank_dropped() {
        let recognizer = TextRecognizer::new(|_: &LanguageSet| -> Result<Box<dyn OcrEngine>> {
            Ok(Box::new(ScriptedEngine(vec![
                "  Paracetamol ",
                "",
                "   ",
                "EXP 05/2026\n",
                "Paracetamol",
            ])))
        });

        let lines = recognizer.recognize(&blank_image(), &LanguageChoice::English.to_set());
        let texts: Vec<&str> = lines.iter().map(RecognizedLine::as_str).collect();

        // Order kept, duplicates kept
        assert_eq!(texts, vec!["Paracetamol", "EXP 05/2026", "Paracetamol"]);
    }

    #[test]
    fn test_engine_error_yields_empty() {
        let recognizer = TextRecognizer::new(|_: &LanguageSet| -> Result<Box<dyn OcrEngine>> {
            Ok(Box::new(BrokenEngine))
        });

        let lines = recognizer.recognize(&blank_image(), &LanguageChoice::English.to_set());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_factory_error_yields_empty() {
        let recognizer = TextRecognizer::new(|_: &LanguageSet| -> Result<Box<dyn OcrEngine>> {
            Err(ScanError::Ocr("no model".to_string()))
        });

        let lines = recognizer.recognize(&blank_image(), &LanguageChoice::Hindi.to_set());
        assert!(lines.is_empty());
        assert_eq!(recognizer.cached_engines(), 0);
    }

    #[test]
    fn test_repeated_calls_are_identical_and_reuse_engine() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let recognizer = TextRecognizer::new(move |_: &LanguageSet| -> Result<Box<dyn OcrEngine>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedEngine(vec!["Dolo 650", "Micro Labs"])))
        });
        let both = LanguageChoice::Both.to_set();

        let first = recognizer.recognize(&blank_image(), &both);
        let second = recognizer.recognize(&blank_image(), &both);

        assert_eq!(first, second);
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unreachable_server_yields_empty() {
        let config = OcrConfig {
            server_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..OcrConfig::default()
        };
        let recognizer = TextRecognizer::from_config(&config);

        let lines = recognizer.recognize(&blank_image(), &LanguageChoice::English.to_set());
        assert!(lines.is_empty());
    }

    #[cfg(not(feature = "tesseract"))]
    #[test]
    fn test_tesseract_backend_without_feature_yields_empty() {
        let config = OcrConfig {
            backend: OcrBackend::Tesseract,
            ..OcrConfig::default()
        };
        let recognizer = TextRecognizer::from_config(&config);

        assert!(recognizer
            .recognize(&blank_image(), &LanguageChoice::English.to_set())
            .is_empty());
    }
}
