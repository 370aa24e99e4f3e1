//! Source image decoding and input validation.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::ValidationError;

/// File extensions accepted for uploaded images.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Raster formats the slicer accepts, matching [`ALLOWED_EXTENSIONS`].
const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif];

/// Check whether a file name carries one of the allowed image extensions.
pub fn is_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// The uploaded raster image, decoded and validated.
///
/// Every region's crop rectangle is evaluated against this image's
/// `width × height` pixel bounds.
#[derive(Debug)]
pub struct SourceImage {
    image: DynamicImage,
    format: ImageFormat,
}

impl SourceImage {
    /// Decode image bytes, detecting the format from the content.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the bytes are empty, the detected
    /// format is not PNG/JPEG/GIF, or decoding fails.
    pub fn decode(data: &[u8]) -> Result<Self, ValidationError> {
        if data.is_empty() {
            return Err(ValidationError::EmptyImage);
        }

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ValidationError::Decode(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| ValidationError::UnsupportedType {
                name: "unknown".to_string(),
            })?;

        if !ALLOWED_FORMATS.contains(&format) {
            let name = format
                .extensions_str()
                .first()
                .copied()
                .unwrap_or("unknown")
                .to_string();
            return Err(ValidationError::UnsupportedType { name });
        }

        let image = reader
            .decode()
            .map_err(|e| ValidationError::Decode(e.to_string()))?;

        Ok(Self { image, format })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The detected source format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Borrow the decoded pixel data.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}
