//! Straight-alpha compositing with separable blend modes.

use rayon::prelude::*;

use crate::bitmap::buffer::BitmapBuffer;
use crate::foundation::core::BlendMode;
use crate::foundation::error::{EaselError, EaselResult};
use crate::foundation::math::{mul_div255_u8, to_u8};

fn blend_channel(mode: BlendMode, cb: f64, cs: f64) -> f64 {
    match mode {
        BlendMode::SourceOver => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => cb + cs - cb * cs,
        BlendMode::Overlay => {
            if cb <= 0.5 {
                2.0 * cb * cs
            } else {
                1.0 - 2.0 * (1.0 - cb) * (1.0 - cs)
            }
        }
        BlendMode::Darken => cb.min(cs),
        BlendMode::Lighten => cb.max(cs),
        BlendMode::Difference => (cb - cs).abs(),
    }
}

/// Draw `src` over `dst` with `opacity` in `[0, 1]` and the given blend mode.
pub(crate) fn composite(dst: [u8; 4], src: [u8; 4], opacity: f64, mode: BlendMode) -> [u8; 4] {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    if sa == 255 && mode == BlendMode::SourceOver {
        return [src[0], src[1], src[2], 255];
    }

    let a_s = f64::from(sa) / 255.0;
    let a_b = f64::from(dst[3]) / 255.0;
    let a_o = a_s + a_b * (1.0 - a_s);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let cs = f64::from(src[i]) / 255.0;
        let cb = f64::from(dst[i]) / 255.0;
        let mixed = (1.0 - a_b) * cs + a_b * blend_channel(mode, cb, cs);
        let co = a_s * mixed + a_b * cb * (1.0 - a_s);
        out[i] = to_u8(co / a_o * 255.0);
    }
    out[3] = to_u8(a_o * 255.0);
    out
}

/// Composite a whole layer onto `dst`. Both buffers must have the same size.
pub(crate) fn composite_in_place(
    dst: &mut BitmapBuffer,
    src: &BitmapBuffer,
    opacity: f64,
    mode: BlendMode,
) -> EaselResult<()> {
    if dst.width() != src.width() || dst.height() != src.height() {
        return Err(EaselError::validation(format!(
            "composite expects equal sizes, got {}x{} and {}x{}",
            dst.width(),
            dst.height(),
            src.width(),
            src.height()
        )));
    }
    dst.pixels_mut()
        .par_chunks_exact_mut(4)
        .zip(src.pixels().par_chunks_exact(4))
        .for_each(|(d, s)| {
            let out = composite([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity, mode);
            d.copy_from_slice(&out);
        });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composite.rs"]
mod tests;
