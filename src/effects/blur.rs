use rayon::prelude::*;

use crate::bitmap::buffer::BitmapBuffer;
use crate::foundation::error::EaselResult;

/// Largest accepted radius on either axis.
pub const MAX_BLUR_RADIUS: u32 = 100;
/// Largest accepted number of cascaded passes.
pub const MAX_BLUR_QUALITY: u32 = 20;

/// Cascaded separable box blur.
///
/// Each iteration averages a `2 * h_radius + 1` window horizontally and then a
/// `2 * v_radius + 1` window vertically, sampling edge-clamped. Repeating the
/// pair `quality` times approximates a gaussian. Radii are clamped to
/// [`MAX_BLUR_RADIUS`] and `quality` to `1..=`[`MAX_BLUR_QUALITY`].
#[tracing::instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn box_blur(
    src: &BitmapBuffer,
    h_radius: u32,
    v_radius: u32,
    quality: u32,
) -> EaselResult<BitmapBuffer> {
    src.ensure_non_empty()?;
    let h_radius = h_radius.min(MAX_BLUR_RADIUS);
    let v_radius = v_radius.min(MAX_BLUR_RADIUS);
    let quality = quality.clamp(1, MAX_BLUR_QUALITY);
    if h_radius == 0 && v_radius == 0 {
        return Ok(src.clone());
    }

    let (width, height) = (src.width(), src.height());
    let mut cur = src.pixels().to_vec();
    let mut tmp = vec![0u8; cur.len()];
    for _ in 0..quality {
        horizontal_pass(&cur, &mut tmp, width, h_radius);
        vertical_pass(&tmp, &mut cur, width, height, v_radius);
    }
    Ok(src.same_size(cur))
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, radius: u32) {
    let r = radius as i64;
    let w = width as i64;
    let row_len = width as usize * 4;
    let count = 2 * radius + 1;
    dst.par_chunks_exact_mut(row_len)
        .zip(src.par_chunks_exact(row_len))
        .for_each(|(out, row)| {
            for x in 0..w {
                let mut acc = [0u32; 4];
                for dx in -r..=r {
                    let idx = ((x + dx).clamp(0, w - 1) as usize) * 4;
                    for c in 0..4 {
                        acc[c] += u32::from(row[idx + c]);
                    }
                }
                let o = (x as usize) * 4;
                for c in 0..4 {
                    out[o + c] = div_round(acc[c], count);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: u32) {
    let r = radius as i64;
    let h = height as i64;
    let row_len = width as usize * 4;
    let count = 2 * radius + 1;
    dst.par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, out)| {
            let y = y as i64;
            for o in (0..row_len).step_by(4) {
                let mut acc = [0u32; 4];
                for dy in -r..=r {
                    let idx = ((y + dy).clamp(0, h - 1) as usize) * row_len + o;
                    for c in 0..4 {
                        acc[c] += u32::from(src[idx + c]);
                    }
                }
                for c in 0..4 {
                    out[o + c] = div_round(acc[c], count);
                }
            }
        });
}

fn div_round(acc: u32, count: u32) -> u8 {
    ((acc + count / 2) / count).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
