use crate::error::Result;
use crate::models::config::AppConfig;
use crate::models::language::LanguageSet;
use crate::models::ocr_result::{join_lines, ScanReport};
use crate::services::barcode::BarcodeReader;
use crate::services::database::MedicineDatabase;
use crate::services::expiry::find_expiry;
use crate::services::matcher::match_medicine;
use crate::services::ocr::TextRecognizer;
use image::RgbImage;
use std::sync::Arc;
use std::time::Instant;

/// Scan coordinator: one image in, one combined report out.
///
/// Recognition and barcode decoding run side by side; the expiry date comes
/// from the recognized lines; the matcher queries with the barcode when one
/// was read and with the joined OCR text otherwise.
pub struct ScanService {
    recognizer: TextRecognizer,
    barcode: BarcodeReader,
    database: Arc<MedicineDatabase>,
    languages: LanguageSet,
    top_k: usize,
}

impl ScanService {
    pub fn new(
        recognizer: TextRecognizer,
        barcode: BarcodeReader,
        database: Arc<MedicineDatabase>,
        languages: LanguageSet,
        top_k: usize,
    ) -> Self {
        Self {
            recognizer,
            barcode,
            database,
            languages,
            top_k,
        }
    }

    /// Build from configuration, loading the reference database
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let database = MedicineDatabase::load(&config.matching.database_path)?;

        Ok(Self::new(
            TextRecognizer::from_config(&config.ocr),
            BarcodeReader::default(),
            Arc::new(database),
            config.ocr.language.to_set(),
            config.matching.top_k,
        ))
    }

    pub fn database(&self) -> &MedicineDatabase {
        &self.database
    }

    /// Run every stage on `image`. Stages degrade independently.
    pub fn scan(&self, image: &RgbImage) -> ScanReport {
        let start = Instant::now();

        let (lines, barcode) = rayon::join(
            || self.recognizer.recognize(image, &self.languages),
            || self.barcode.read(image),
        );

        let expiry = find_expiry(&lines);
        let query = match &barcode {
            Some(code) => code.clone(),
            None => join_lines(&lines),
        };
        let matches = match_medicine(&query, &self.database, self.top_k);

        tracing::info!(
            lines = lines.len(),
            barcode = barcode.is_some(),
            expiry = expiry.is_some(),
            matches = matches.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scan complete"
        );

        ScanReport {
            lines,
            barcode,
            expiry,
            matches,
        }
    }
}
