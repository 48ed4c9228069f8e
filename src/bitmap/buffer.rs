use crate::foundation::core::Rgba8;
use crate::foundation::error::{EaselError, EaselResult};

/// Width x height x 4 byte buffer of straight-alpha RGBA8 pixels.
///
/// `pixels.len() == width * height * 4` always holds; row-major, R,G,B,A order.
/// Methods that mutate in place say so; every effect returns a new buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct BitmapBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for BitmapBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels_len", &self.pixels.len())
            .finish()
    }
}

fn byte_len(width: u32, height: u32) -> EaselResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| EaselError::validation("bitmap size overflow"))
}

impl BitmapBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> EaselResult<Self> {
        Ok(Self {
            width,
            height,
            pixels: vec![0u8; byte_len(width, height)?],
        })
    }

    /// Buffer with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> EaselResult<Self> {
        let n = byte_len(width, height)? / 4;
        Ok(Self {
            width,
            height,
            pixels: px.to_array().repeat(n),
        })
    }

    /// Wrap raw RGBA8 bytes, validating the length invariant.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> EaselResult<Self> {
        let expected = byte_len(width, height)?;
        if pixels.len() != expected {
            return Err(EaselError::validation(format!(
                "bitmap expects {expected} bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Copy pixels out of a decoded image.
    pub fn from_source(image: &image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            pixels: rgba.into_raw(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to the RGBA8 bytes; the length cannot change.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume the buffer and return its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// `true` when the buffer has zero area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Fail with [`EaselError::EmptyBuffer`] on a zero-area buffer.
    pub fn ensure_non_empty(&self) -> EaselResult<()> {
        if self.is_empty() {
            return Err(EaselError::EmptyBuffer);
        }
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> EaselResult<usize> {
        if x >= self.width || y >= self.height {
            return Err(EaselError::out_of_bounds(x, y, self.width, self.height));
        }
        Ok(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// Read one pixel.
    pub fn get(&self, x: u32, y: u32) -> EaselResult<Rgba8> {
        let i = self.index(x, y)?;
        let p = &self.pixels[i..i + 4];
        Ok(Rgba8::new(p[0], p[1], p[2], p[3]))
    }

    /// Write one pixel in place.
    pub fn set(&mut self, x: u32, y: u32, px: Rgba8) -> EaselResult<()> {
        let i = self.index(x, y)?;
        self.pixels[i..i + 4].copy_from_slice(&px.to_array());
        Ok(())
    }

    /// Copy out the `width x height` rectangle whose top-left corner is `(x, y)`.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> EaselResult<Self> {
        let x_end = u64::from(x) + u64::from(width);
        let y_end = u64::from(y) + u64::from(height);
        if x_end > u64::from(self.width) || y_end > u64::from(self.height) {
            return Err(EaselError::out_of_bounds(x_end, y_end, self.width, self.height));
        }

        let row_bytes = width as usize * 4;
        let mut out = Vec::with_capacity(byte_len(width, height)?);
        for row in y..y + height {
            let start = ((row as usize) * (self.width as usize) + x as usize) * 4;
            out.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        Self::from_raw(width, height, out)
    }

    /// Convert into an `image` buffer for encoding or interop.
    pub fn to_rgba_image(&self) -> EaselResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| EaselError::validation("bitmap bytes do not match dimensions"))
    }

    pub(crate) fn same_size(&self, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), self.pixels.len());
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/buffer.rs"]
mod tests;
