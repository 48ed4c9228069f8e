use std::io::Cursor;

use anyhow::Context;

use crate::bitmap::buffer::BitmapBuffer;
use crate::foundation::error::{EaselError, EaselResult};

/// Raster encodings the engine can hand to the persistence collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless PNG, alpha preserved.
    #[default]
    Png,
    /// Baseline JPEG. Alpha is dropped.
    Jpeg {
        /// Encoder quality, clamped to `1..=100`.
        quality: u8,
    },
}

impl BitmapBuffer {
    /// Decode PNG/JPEG/... bytes into a straight-alpha RGBA8 buffer.
    pub fn decode(bytes: &[u8]) -> EaselResult<Self> {
        let img = image::load_from_memory(bytes).context("decode image from memory")?;
        Ok(Self::from_source(&img))
    }

    /// Encode into `format`.
    pub fn encode(&self, format: ExportFormat) -> EaselResult<Vec<u8>> {
        if self.is_empty() {
            return Err(EaselError::EmptyBuffer);
        }
        let rgba = self.to_rgba_image()?;
        let mut buf = Vec::new();
        match format {
            ExportFormat::Png => {
                image::DynamicImage::ImageRgba8(rgba)
                    .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                    .context("encode png")?;
            }
            ExportFormat::Jpeg { quality } => {
                let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
                image::DynamicImage::ImageRgb8(rgb)
                    .write_with_encoder(encoder)
                    .context("encode jpeg")?;
            }
        }
        Ok(buf)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/codec.rs"]
mod tests;
