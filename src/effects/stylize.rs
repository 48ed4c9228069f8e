//! Neighbourhood statistics and geometric falloff effects.

use rayon::prelude::*;

use crate::bitmap::buffer::BitmapBuffer;
use crate::foundation::error::EaselResult;
use crate::foundation::math::{clamp_param, to_u8};

/// Oil-painting effect.
///
/// For each pixel, buckets the `(2 * range + 1)^2` edge-clamped neighbourhood
/// into `levels` intensity bins and writes the mean RGB of the fullest bin.
/// `range` is clamped to `1..=10`, `levels` to `1..=256`. Alpha is kept.
#[tracing::instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn oil_paint(src: &BitmapBuffer, range: u32, levels: u32) -> EaselResult<BitmapBuffer> {
    src.ensure_non_empty()?;
    let range = range.clamp(1, 10) as i64;
    let levels = levels.clamp(1, 256) as usize;
    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    let data = src.pixels();
    let row_bytes = src.width() as usize * 4;

    let mut out = vec![0u8; data.len()];
    out.par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            let mut count = vec![0u32; levels];
            let mut sums = vec![[0u32; 3]; levels];
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let x = x as i64;
                count.fill(0);
                sums.fill([0; 3]);

                for dy in -range..=range {
                    let sy = (y + dy).clamp(0, h - 1);
                    for dx in -range..=range {
                        let sx = (x + dx).clamp(0, w - 1);
                        let idx = ((sy * w + sx) as usize) * 4;
                        let (r, g, b) = (data[idx], data[idx + 1], data[idx + 2]);
                        let mean = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0 / 255.0;
                        let bin = ((mean * (levels - 1) as f64).round() as usize).min(levels - 1);
                        count[bin] += 1;
                        sums[bin][0] += u32::from(r);
                        sums[bin][1] += u32::from(g);
                        sums[bin][2] += u32::from(b);
                    }
                }

                let mut best = 0usize;
                for i in 1..levels {
                    if count[i] > count[best] {
                        best = i;
                    }
                }
                // The neighbourhood is never empty, so the winning bin has count >= 1.
                let n = f64::from(count[best].max(1));
                let center = ((y * w + x) as usize) * 4;
                px.copy_from_slice(&[
                    to_u8(f64::from(sums[best][0]) / n),
                    to_u8(f64::from(sums[best][1]) / n),
                    to_u8(f64::from(sums[best][2]) / n),
                    data[center + 3],
                ]);
            }
        });
    Ok(src.same_size(out))
}

/// Replace each `block_size` square tile with its mean RGB. Alpha is kept.
///
/// `block_size` is clamped to `1..=256`; partial tiles at the right and bottom
/// edges average only the pixels they cover.
pub fn mosaic(src: &BitmapBuffer, block_size: u32) -> EaselResult<BitmapBuffer> {
    src.ensure_non_empty()?;
    let block = block_size.clamp(1, 256);
    let (w, h) = (src.width(), src.height());
    let mut out = src.pixels().to_vec();

    for ty in (0..h).step_by(block as usize) {
        for tx in (0..w).step_by(block as usize) {
            let y_end = (ty + block).min(h);
            let x_end = (tx + block).min(w);

            let mut sum = [0u64; 3];
            let mut n = 0u64;
            for y in ty..y_end {
                for x in tx..x_end {
                    let idx = ((y as usize) * (w as usize) + x as usize) * 4;
                    for c in 0..3 {
                        sum[c] += u64::from(out[idx + c]);
                    }
                    n += 1;
                }
            }
            let avg = sum.map(|s| ((s + n / 2) / n) as u8);

            for y in ty..y_end {
                for x in tx..x_end {
                    let idx = ((y as usize) * (w as usize) + x as usize) * 4;
                    out[idx..idx + 3].copy_from_slice(&avg);
                }
            }
        }
    }
    Ok(src.same_size(out))
}

/// Darken towards the corners: `factor = 1 - (dist / max_dist) * intensity`.
///
/// Distances are measured from the canvas centre; `intensity` is clamped to `[0, 1]`.
pub fn vignette(src: &BitmapBuffer, intensity: f64) -> EaselResult<BitmapBuffer> {
    src.ensure_non_empty()?;
    let intensity = clamp_param(intensity, 0.0, 1.0, 0.5);
    let (w, h) = (src.width(), src.height());
    let cx = f64::from(w) / 2.0;
    let cy = f64::from(h) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();

    let mut out = src.pixels().to_vec();
    for y in 0..h {
        for x in 0..w {
            let dx = f64::from(x) - cx;
            let dy = f64::from(y) - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let factor = 1.0 - (dist / max_dist) * intensity;

            let idx = ((y as usize) * (w as usize) + x as usize) * 4;
            for c in 0..3 {
                out[idx + c] = to_u8(f64::from(out[idx + c]) * factor);
            }
        }
    }
    Ok(src.same_size(out))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/stylize.rs"]
mod tests;
