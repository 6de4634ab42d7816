use chrono::{Datelike, Local, NaiveDate};
use image::{Rgb, RgbImage};
use medscan_lib::models::language::{LanguageChoice, LanguageSet};
use medscan_lib::services::barcode::{BarcodeDecoder, BarcodeReader, DecodedSymbol};
use medscan_lib::services::database::MedicineDatabase;
use medscan_lib::services::ocr::{OcrEngine, TextRecognizer};
use medscan_lib::{Result, ScanService};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const DATABASE_CSV: &str = "\
name,manufacturer,uses,dosage,side_effects,more_info_url,barcode
Dolo 650,Micro Labs,Fever and mild pain,1 tablet every 6 hours,Nausea,https://example.org/dolo,8901234567890
Crocin Advance,GSK,Headache,1-2 tablets,NA,,
Aspirin,Bayer,Pain relief,300 mg,Stomach upset,,4005800123456
";

struct PackageText(Vec<String>);

impl OcrEngine for PackageText {
    fn recognize(&mut self, _image: &RgbImage) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

struct PrintedCode(Option<String>);

impl BarcodeDecoder for PrintedCode {
    fn decode(&self, _image: &RgbImage) -> Result<Vec<DecodedSymbol>> {
        Ok(self
            .0
            .iter()
            .map(|code| DecodedSymbol {
                format: "EAN_13".to_string(),
                data: code.clone().into_bytes(),
            })
            .collect())
    }
}

fn database_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DATABASE_CSV.as_bytes()).unwrap();
    file
}

fn service(database: MedicineDatabase, text: &[&str], code: Option<&str>) -> ScanService {
    let text: Vec<String> = text.iter().map(|s| s.to_string()).collect();
    ScanService::new(
        TextRecognizer::new(move |_: &LanguageSet| -> Result<Box<dyn OcrEngine>> {
            Ok(Box::new(PackageText(text.clone())))
        }),
        BarcodeReader::new(PrintedCode(code.map(str::to_string))),
        Arc::new(database),
        LanguageChoice::English.to_set(),
        3,
    )
}

fn photo() -> RgbImage {
    RgbImage::from_pixel(32, 32, Rgb([240, 240, 240]))
}

#[test]
fn barcode_scan_returns_the_exact_row() {
    let file = database_file();
    let database = MedicineDatabase::load(file.path()).unwrap();
    assert_eq!(database.len(), 3);

    let year = Local::now().year() + 2;
    let expiry_line = format!("EXP: 09/{}", year);
    let scan = service(
        database,
        &["  Dolo 650 ", "Paracetamol Tablets IP", &expiry_line, ""],
        Some("8901234567890"),
    );

    let report = scan.scan(&photo());

    assert_eq!(report.lines.len(), 3);
    assert_eq!(report.expiry, NaiveDate::from_ymd_opt(year, 9, 1));
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].score, 100);
    assert_eq!(report.matches[0].record.manufacturer, "Micro Labs");
    assert_eq!(report.matches[0].record.more_info(), Some("https://example.org/dolo"));

    let text = report.to_string();
    assert!(text.contains("Barcode / QR: 8901234567890"));
    assert!(text.contains("1. Dolo 650  (Score: 100)"));
}

#[test]
fn text_scan_ranks_by_similarity() {
    let file = database_file();
    let database = MedicineDatabase::load(file.path()).unwrap();
    let scan = service(database, &["CROCIN", "advance", "GSK"], None);

    let report = scan.scan(&photo());

    assert!(report.barcode.is_none());
    assert!(report.expiry.is_none());
    assert_eq!(report.matches.len(), 3);
    assert_eq!(report.matches[0].record.name, "Crocin Advance");
    // Null marker in the file reads as an empty cell
    assert_eq!(report.matches[0].record.side_effects, "");
    assert!(report
        .matches
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn missing_database_still_reports_text_and_expiry() {
    let dir = tempfile::tempdir().unwrap();
    let database = MedicineDatabase::load(&dir.path().join("medicines.csv")).unwrap();
    assert!(database.is_empty());

    let year = Local::now().year() + 1;
    let expiry_line = format!("Expiry 12/08/{}", year);
    let scan = service(database, &["Dolo 650", &expiry_line], Some("8901234567890"));

    let report = scan.scan(&photo());

    assert_eq!(report.barcode.as_deref(), Some("8901234567890"));
    assert_eq!(report.expiry, NaiveDate::from_ymd_opt(year, 8, 12));
    assert!(report.matches.is_empty());
    assert!(report.to_string().contains("No matches found in database"));
}

#[test]
fn report_serializes_for_json_output() {
    let file = database_file();
    let database = MedicineDatabase::load(file.path()).unwrap();
    let scan = service(database, &["Aspirin"], Some("4005800123456"));

    let report = scan.scan(&photo());
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["barcode"], "4005800123456");
    assert_eq!(json["lines"][0], "Aspirin");
    assert_eq!(json["matches"][0]["name"], "Aspirin");
    assert_eq!(json["matches"][0]["score"], 100);
}
