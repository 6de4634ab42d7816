use crate::error::{Result, ScanError};
use crate::services::imaging::to_luma;
use image::RgbImage;
use std::panic::{self, AssertUnwindSafe};

/// One symbol reported by a barcode decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    pub format: String,
    pub data: Vec<u8>,
}

/// Barcode/QR decoder backend
pub trait BarcodeDecoder: Send + Sync {
    /// All symbols found in the image, in decoder order.
    /// Finding nothing is `Ok(vec![])`, not an error.
    fn decode(&self, image: &RgbImage) -> Result<Vec<DecodedSymbol>>;
}

/// rxing-based decoder covering the 1D retail codes and 2D symbologies
#[derive(Debug, Default, Clone, Copy)]
pub struct RxingDecoder;

impl BarcodeDecoder for RxingDecoder {
    fn decode(&self, image: &RgbImage) -> Result<Vec<DecodedSymbol>> {
        let luma = to_luma(image);
        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        match rxing::helpers::detect_multiple_in_luma(luma.into_raw(), width, height) {
            Ok(results) => Ok(results
                .iter()
                .map(|r| DecodedSymbol {
                    format: format!("{:?}", r.getBarcodeFormat()),
                    data: r.getText().as_bytes().to_vec(),
                })
                .collect()),
            Err(rxing::Exceptions::NotFoundException(_)) => Ok(Vec::new()),
            Err(e) => Err(ScanError::Barcode(e.to_string())),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Barcode reader: image -> first non-empty payload
pub struct BarcodeReader {
    decoder: Box<dyn BarcodeDecoder>,
}

impl Default for BarcodeReader {
    fn default() -> Self {
        Self::new(RxingDecoder)
    }
}

impl BarcodeReader {
    pub fn new(decoder: impl BarcodeDecoder + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
        }
    }

    /// First decoded payload that is non-empty once invalid UTF-8 bytes are
    /// dropped and whitespace trimmed. Decoder failures yield `None`, and so
    /// does a decoder panic (some rxing detectors index out of bounds on very
    /// thin images).
    pub fn read(&self, image: &RgbImage) -> Option<String> {
        let decoded = panic::catch_unwind(AssertUnwindSafe(|| self.decoder.decode(image)))
            .unwrap_or_else(|payload| {
                Err(ScanError::Barcode(format!(
                    "decoder panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

        let symbols = match decoded {
            Ok(symbols) => symbols,
            Err(e) => {
                tracing::warn!(error = %e, "Barcode decoding failed");
                return None;
            }
        };

        match first_payload(&symbols) {
            Some((symbol, text)) => {
                tracing::debug!(
                    payload = %text,
                    format = %symbol.format,
                    symbols = symbols.len(),
                    "Barcode found"
                );
                Some(text)
            }
            None if symbols.is_empty() => {
                tracing::trace!("No barcode in image");
                None
            }
            None => {
                tracing::debug!(symbols = symbols.len(), "Only empty barcode payloads");
                None
            }
        }
    }
}

fn first_payload(symbols: &[DecodedSymbol]) -> Option<(&DecodedSymbol, String)> {
    symbols.iter().find_map(|symbol| {
        let text: String = symbol.data.utf8_chunks().map(|chunk| chunk.valid()).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| (symbol, text.to_string()))
    })
}
