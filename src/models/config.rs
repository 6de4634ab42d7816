use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::language::LanguageChoice;

/// Largest number of fuzzy matches an operator may ask for
pub const MAX_TOP_K: usize = 5;

/// OCR backend choice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Local OCR server reached over HTTP
    Http,
    /// Native Tesseract (requires the `tesseract` cargo feature)
    Tesseract,
}

impl Default for OcrBackend {
    fn default() -> Self {
        Self::Http
    }
}

/// OCR configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    pub language: LanguageChoice,
    pub backend: OcrBackend,
    pub server_url: String,
    pub timeout_secs: u64,
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: LanguageChoice::English,
            backend: OcrBackend::Http,
            server_url: "http://127.0.0.1:39835".to_string(),
            timeout_secs: 30,
            tessdata_dir: None,
        }
    }
}

/// Reference database and fuzzy matching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    pub top_k: usize,
    pub database_path: PathBuf,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            database_path: PathBuf::from("database").join("medicines.csv"),
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub live_enabled: bool,
    pub device_index: u32,
    pub frame_interval_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            live_enabled: true,
            device_index: 0,
            frame_interval_ms: 100,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub ocr: OcrConfig,
    pub matching: MatchingConfig,
    pub camera: CameraConfig,
}

impl AppConfig {
    /// Check operator-facing ranges
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_TOP_K).contains(&self.matching.top_k) {
            return Err(format!(
                "top_k must be between 1 and {}, got {}",
                MAX_TOP_K, self.matching.top_k
            ));
        }

        if self.camera.frame_interval_ms == 0 {
            return Err("camera frame interval must be greater than 0 ms".to_string());
        }

        if self.ocr.backend == OcrBackend::Http && self.ocr.server_url.trim().is_empty() {
            return Err("OCR server URL is empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.ocr.language, LanguageChoice::English);
        assert_eq!(config.ocr.backend, OcrBackend::Http);
        assert_eq!(config.ocr.server_url, "http://127.0.0.1:39835");
        assert!(config.ocr.tessdata_dir.is_none());

        assert_eq!(config.matching.top_k, 3);
        assert!(config.matching.database_path.ends_with("medicines.csv"));

        assert!(config.camera.live_enabled);
        assert_eq!(config.camera.device_index, 0);
        assert_eq!(config.camera.frame_interval_ms, 100);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();

        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "matching": { "top_k": 5 }, "ocr": { "language": "both" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.matching.top_k, 5);
        assert_eq!(config.ocr.language, LanguageChoice::Both);
        assert_eq!(config.ocr.timeout_secs, 30);
        assert!(config.camera.live_enabled);
    }

    #[test]
    fn test_validate_top_k_range() {
        let mut config = AppConfig::default();

        config.matching.top_k = 0;
        assert!(config.validate().is_err());

        config.matching.top_k = 6;
        assert!(config.validate().is_err());

        config.matching.top_k = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_frame_interval() {
        let mut config = AppConfig::default();
        config.camera.frame_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_server_url_only_for_http() {
        let mut config = AppConfig::default();
        config.ocr.server_url = "  ".to_string();
        assert!(config.validate().is_err());

        config.ocr.backend = OcrBackend::Tesseract;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_serialization() {
        assert_eq!(serde_json::to_string(&OcrBackend::Http).unwrap(), "\"http\"");
        assert_eq!(
            serde_json::to_string(&OcrBackend::Tesseract).unwrap(),
            "\"tesseract\""
        );
    }
}
