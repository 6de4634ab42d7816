use super::engine::OcrEngine;
use crate::error::{Result, ScanError};
use crate::models::language::LanguageSet;
use crate::services::imaging::encode_png;
use base64::{engine::general_purpose, Engine as _};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP OCR client that talks to a local OCR server (EasyOCR-style)
///
/// One client is bound to one language set; the server loads its reader for
/// that set on the first request.
#[derive(Clone)]
pub struct HttpOcrClient {
    client: reqwest::blocking::Client,
    base_url: String,
    languages: Vec<&'static str>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image_base64: String,
    languages: &'a [&'static str],
}

/// Single detected text box. Box coordinates are not needed: line order is
/// detection order, not layout order.
#[derive(Deserialize, Clone, Debug)]
struct TextBox {
    text: String,
    #[serde(default)]
    score: f64,
}

/// OCR response from the server
#[derive(Deserialize)]
struct OcrResponse {
    #[serde(default)]
    boxes: Vec<TextBox>,
    #[serde(default)]
    raw_text: String,
}

impl OcrResponse {
    /// Text segments in the order the server detected them.
    /// Servers that only send `raw_text` are split by line.
    fn into_segments(self) -> Vec<String> {
        if self.boxes.is_empty() {
            return self.raw_text.lines().map(str::to_string).collect();
        }

        self.boxes.into_iter().map(|b| b.text).collect()
    }
}

impl HttpOcrClient {
    /// Create a new HTTP OCR client for one language set
    pub fn new(base_url: &str, timeout: Duration, languages: &LanguageSet) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            languages: languages.codes(),
        })
    }

    /// Encode image to base64
    fn encode_image(image: &RgbImage) -> Result<String> {
        let png = encode_png(image)?;
        Ok(general_purpose::STANDARD.encode(&png))
    }

    /// Call the OCR endpoint and return the raw text segments
    fn recognize_text(&self, image: &RgbImage) -> Result<Vec<String>> {
        let image_base64 = Self::encode_image(image)?;
        let url = format!("{}/ocr", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest {
                image_base64,
                languages: &self.languages,
            })
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ScanError::Ocr(format!(
                "OCR server error ({}): {}",
                status, error_text
            )));
        }

        let data: OcrResponse = response.json()?;
        tracing::trace!(
            boxes = data.boxes.len(),
            mean_score = mean_score(&data.boxes),
            "OCR server response"
        );

        Ok(data.into_segments())
    }
}

fn mean_score(boxes: &[TextBox]) -> f64 {
    if boxes.is_empty() {
        return 0.0;
    }
    boxes.iter().map(|b| b.score).sum::<f64>() / boxes.len() as f64
}

impl OcrEngine for HttpOcrClient {
    fn recognize(&mut self, image: &RgbImage) -> Result<Vec<String>> {
        self.recognize_text(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::language::LanguageChoice;
    use image::Rgb;

    #[test]
    fn test_segments_keep_detection_order() {
        let json = r#"{
            "boxes": [
                {"box": [[10,40],[90,40],[90,60],[10,60]], "text": "EXP 05/2026", "score": 0.91},
                {"box": [[10,0],[90,0],[90,20],[10,20]], "text": " Paracetamol ", "score": 0.88}
            ],
            "raw_text": "ignored"
        }"#;
        let response: OcrResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            response.into_segments(),
            vec!["EXP 05/2026".to_string(), " Paracetamol ".to_string()]
        );
    }

    #[test]
    fn test_segments_fall_back_to_raw_text() {
        let json = r#"{ "raw_text": "Dolo 650\nMicro Labs\n" }"#;
        let response: OcrResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            response.into_segments(),
            vec!["Dolo 650".to_string(), "Micro Labs".to_string()]
        );
    }

    #[test]
    fn test_empty_response() {
        let response: OcrResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_segments().is_empty());
    }

    #[test]
    fn test_request_carries_language_codes() {
        let request = ImageRequest {
            image_base64: "AAAA".to_string(),
            languages: &["en", "hi"],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["languages"], serde_json::json!(["en", "hi"]));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpOcrClient::new(
            "http://127.0.0.1:39835/",
            Duration::from_secs(1),
            &LanguageChoice::Both.to_set(),
        )
        .unwrap();

        assert_eq!(client.base_url, "http://127.0.0.1:39835");
        assert_eq!(client.languages, vec!["en", "hi"]);
    }

    #[test]
    fn test_unreachable_server_is_error() {
        // Port 9 (discard) is closed on test machines
        let mut client = HttpOcrClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            &LanguageChoice::English.to_set(),
        )
        .unwrap();
        let image = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));

        assert!(client.recognize(&image).is_err());
    }

    #[test]
    #[ignore] // Needs a running OCR server
    fn test_recognize_against_local_server() {
        let mut client = HttpOcrClient::new(
            "http://127.0.0.1:39835",
            Duration::from_secs(30),
            &LanguageChoice::English.to_set(),
        )
        .unwrap();
        let image = RgbImage::from_pixel(200, 50, Rgb([255, 255, 255]));

        assert!(client.recognize(&image).is_ok());
    }
}
