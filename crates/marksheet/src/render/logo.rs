//! School logo decoding.

use std::path::Path;

use image::RgbaImage;

use crate::error::{MarksheetError, Result};

/// A decoded logo, flattened onto white as 8-bit RGB.
///
/// Loaded once per run and shared read-only by every rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB samples, `width * height * 3` bytes.
    pub rgb: Vec<u8>,
}

impl Logo {
    /// Read and decode a PNG/JPEG logo.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            MarksheetError::Render(format!("Failed to read logo '{}': {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            MarksheetError::Render(msg) => {
                MarksheetError::Render(format!("{} ('{}')", msg, path.display()))
            }
            other => other,
        })
    }

    /// Decode an in-memory image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| MarksheetError::Render(format!("Failed to decode logo: {}", e)))?;
        let rgba = decoded.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(MarksheetError::Render("Logo has no pixels".to_string()));
        }
        Ok(Self::flatten(&rgba))
    }

    /// Composite transparent pixels over a white background.
    fn flatten(rgba: &RgbaImage) -> Self {
        let mut rgb = Vec::with_capacity(rgba.width() as usize * rgba.height() as usize * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = u16::from(a);
            for channel in [r, g, b] {
                let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
                rgb.push(blended as u8);
            }
        }
        Self {
            width: rgba.width(),
            height: rgba.height(),
            rgb,
        }
    }

    /// Height divided by width.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}
