//! 3x3 convolution filters. Border pixels read edge-clamped neighbours.

use rayon::prelude::*;

use crate::bitmap::buffer::BitmapBuffer;
use crate::foundation::error::EaselResult;
use crate::foundation::math::{luma601, to_u8};

const SOBEL_X: [f64; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const SOBEL_Y: [f64; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];
const EMBOSS: [f64; 9] = [-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0];
const SHARPEN: [f64; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Visit the 3x3 neighbourhood of `(x, y)` with clamped coordinates.
///
/// `f` receives the kernel index (row-major, 0..9) and the byte offset of the
/// neighbouring pixel.
fn for_neighbourhood(width: u32, height: u32, x: u32, y: u32, mut f: impl FnMut(usize, usize)) {
    let (w, h) = (width as i64, height as i64);
    for ky in -1i64..=1 {
        let sy = (i64::from(y) + ky).clamp(0, h - 1);
        for kx in -1i64..=1 {
            let sx = (i64::from(x) + kx).clamp(0, w - 1);
            let k = ((ky + 1) * 3 + (kx + 1)) as usize;
            f(k, ((sy * w + sx) as usize) * 4);
        }
    }
}

/// Run `per_pixel(x, y, out_px)` for every pixel into a fresh buffer, rows in parallel.
fn convolve_rows<F>(src: &BitmapBuffer, per_pixel: F) -> EaselResult<BitmapBuffer>
where
    F: Fn(u32, u32, &mut [u8]) + Sync,
{
    src.ensure_non_empty()?;
    let width = src.width();
    let row_bytes = width as usize * 4;
    let mut out = vec![0u8; src.pixels().len()];
    out.par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                per_pixel(x as u32, y as u32, px);
            }
        });
    Ok(src.same_size(out))
}

fn luma_at(pixels: &[u8], idx: usize) -> f64 {
    luma601(
        f64::from(pixels[idx]),
        f64::from(pixels[idx + 1]),
        f64::from(pixels[idx + 2]),
    )
}

/// Sobel gradient magnitude of the luminance, written as opaque-preserving grayscale.
pub fn edge_detect(src: &BitmapBuffer) -> EaselResult<BitmapBuffer> {
    let (w, h) = (src.width(), src.height());
    let data = src.pixels();
    convolve_rows(src, |x, y, out| {
        let (mut gx, mut gy) = (0.0f64, 0.0f64);
        for_neighbourhood(w, h, x, y, |k, idx| {
            let gray = luma_at(data, idx);
            gx += gray * SOBEL_X[k];
            gy += gray * SOBEL_Y[k];
        });
        let magnitude = to_u8((gx * gx + gy * gy).sqrt().min(255.0));
        let center = ((y as usize) * (w as usize) + x as usize) * 4;
        out.copy_from_slice(&[magnitude, magnitude, magnitude, data[center + 3]]);
    })
}

/// Emboss kernel on luminance, centred at 128.
pub fn emboss(src: &BitmapBuffer) -> EaselResult<BitmapBuffer> {
    let (w, h) = (src.width(), src.height());
    let data = src.pixels();
    convolve_rows(src, |x, y, out| {
        let mut sum = 0.0f64;
        for_neighbourhood(w, h, x, y, |k, idx| {
            sum += luma_at(data, idx) * EMBOSS[k];
        });
        let v = to_u8(sum + 128.0);
        let center = ((y as usize) * (w as usize) + x as usize) * 4;
        out.copy_from_slice(&[v, v, v, data[center + 3]]);
    })
}

/// Sharpen kernel applied to R, G and B independently.
pub fn sharpen(src: &BitmapBuffer) -> EaselResult<BitmapBuffer> {
    let (w, h) = (src.width(), src.height());
    let data = src.pixels();
    convolve_rows(src, |x, y, out| {
        let mut sum = [0.0f64; 3];
        for_neighbourhood(w, h, x, y, |k, idx| {
            for (c, acc) in sum.iter_mut().enumerate() {
                *acc += f64::from(data[idx + c]) * SHARPEN[k];
            }
        });
        let center = ((y as usize) * (w as usize) + x as usize) * 4;
        out.copy_from_slice(&[
            to_u8(sum[0]),
            to_u8(sum[1]),
            to_u8(sum[2]),
            data[center + 3],
        ]);
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/convolve.rs"]
mod tests;
