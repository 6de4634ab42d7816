pub mod barcode;
pub mod camera;
pub mod config;
pub mod database;
pub mod date_parse;
pub mod expiry;
pub mod fuzzy;
pub mod imaging;
pub mod live_preview;
pub mod matcher;
pub mod ocr;

// Re-export main types
pub use barcode::{BarcodeDecoder, BarcodeReader, DecodedSymbol, RxingDecoder};
pub use camera::{capture_snapshot, open_camera, FrameSink, FrameSource};
pub use config::ConfigManager;
pub use database::MedicineDatabase;
pub use expiry::{find_expiry, find_expiry_at};
pub use live_preview::{LivePreview, PreviewEnd, PreviewSummary, StopHandle};
pub use matcher::match_medicine;
pub use ocr::TextRecognizer;
