use crate::error::{Result, ScanError};
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Formats accepted for uploaded package photos
const ACCEPTED_FORMATS: [ImageFormat; 2] = [ImageFormat::Jpeg, ImageFormat::Png];

/// Load a JPEG or PNG photo from disk as an 8-bit RGB image.
///
/// The format is sniffed from the file content first, then the extension.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;

    let format = reader
        .format()
        .ok_or_else(|| ScanError::UnsupportedFormat(path.display().to_string()))?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(ScanError::UnsupportedFormat(format!("{:?}", format)));
    }

    let image = reader.decode().map_err(|source| ScanError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(image.to_rgb8())
}

/// Convert to grayscale for the barcode decoder
pub fn to_luma(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Encode as PNG bytes for transmission to an OCR engine
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(image.clone()).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
