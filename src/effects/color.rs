//! Per-pixel colour-space adjustments.
//!
//! Every function here reads one pixel and writes one pixel, so they share
//! [`map_pixels`]. Alpha passes through unless a function says otherwise.

use rayon::prelude::*;

use crate::bitmap::buffer::BitmapBuffer;
use crate::foundation::error::EaselResult;
use crate::foundation::math::{clamp_param, luma601, luma709, to_u8};

pub(crate) fn map_pixels<F>(src: &BitmapBuffer, f: F) -> EaselResult<BitmapBuffer>
where
    F: Fn([u8; 4]) -> [u8; 4] + Sync,
{
    src.ensure_non_empty()?;
    let mut out = src.pixels().to_vec();
    out.par_chunks_exact_mut(4).for_each(|px| {
        let mapped = f([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&mapped);
    });
    Ok(src.same_size(out))
}

/// RGB (0..=255) to HSL, each component in `[0, 1]`.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> [f64; 3] {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;
    let l = (max + min) / 2.0;
    if chroma == 0.0 {
        return [0.0, 0.0, l];
    }

    let mut h = if r == max {
        (g - b) / chroma + if g < b { 6.0 } else { 0.0 }
    } else if g == max {
        (b - r) / chroma + 2.0
    } else {
        (r - g) / chroma + 4.0
    };
    h /= 6.0;

    let s = if l > 0.5 {
        chroma / (2.0 - max - min)
    } else {
        chroma / (max + min)
    };
    [h, s, l]
}

/// HSL (each in `[0, 1]`) back to rounded RGB bytes.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    if s == 0.0 {
        let v = to_u8(l * 255.0);
        return [v, v, v];
    }

    let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let m1 = l * 2.0 - m2;

    let mut out = [0u8; 3];
    let mut hue = h + 1.0 / 3.0;
    for c in &mut out {
        if hue < 0.0 {
            hue += 1.0;
        } else if hue > 1.0 {
            hue -= 1.0;
        }

        let v = if 6.0 * hue < 1.0 {
            m1 + (m2 - m1) * hue * 6.0
        } else if 2.0 * hue < 1.0 {
            m2
        } else if 3.0 * hue < 2.0 {
            m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
        } else {
            m1
        };
        *c = to_u8(v * 255.0);
        hue -= 1.0 / 3.0;
    }
    out
}

/// Shift hue, scale saturation and move lightness toward white or black.
///
/// `hue_delta_deg` in `[-180, 180]`, `sat_delta_pct` and `lightness_pct` in
/// `[-100, 100]`; values outside are clamped.
pub fn hsl_adjust(
    src: &BitmapBuffer,
    hue_delta_deg: f64,
    sat_delta_pct: f64,
    lightness_pct: f64,
) -> EaselResult<BitmapBuffer> {
    let hue_delta = clamp_param(hue_delta_deg, -180.0, 180.0, 0.0) / 360.0;
    let sat_delta = clamp_param(sat_delta_pct, -100.0, 100.0, 0.0) / 100.0;
    let lightness = clamp_param(lightness_pct, -100.0, 100.0, 0.0) / 100.0;

    map_pixels(src, |[r, g, b, a]| {
        let [h, s, l] = rgb_to_hsl(r, g, b);

        let h = (h + hue_delta).rem_euclid(1.0);
        let s = (s * (1.0 + sat_delta)).clamp(0.0, 1.0);
        let l = if lightness > 0.0 {
            l + (1.0 - l) * lightness
        } else if lightness < 0.0 {
            l + l * lightness
        } else {
            l
        };

        let [r, g, b] = hsl_to_rgb(h, s, l);
        [r, g, b, a]
    })
}

/// Rotate hue by `degrees` (wrapped into `[-180, 180]`).
pub fn hue_rotate(src: &BitmapBuffer, degrees: f64) -> EaselResult<BitmapBuffer> {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    hsl_adjust(src, wrapped, 0.0, 0.0)
}

/// Per-channel affine map `out = clamp(in * multiplier + offset)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChannelTransform {
    /// R, G, B, A multipliers, clamped to `[0, 10]`.
    pub multipliers: [f64; 4],
    /// R, G, B, A offsets, clamped to `[-255, 255]`.
    pub offsets: [f64; 4],
}

impl Default for ChannelTransform {
    fn default() -> Self {
        Self {
            multipliers: [1.0; 4],
            offsets: [0.0; 4],
        }
    }
}

impl ChannelTransform {
    /// Transform touching only the red channel.
    pub fn red(multiplier: f64, offset: f64) -> Self {
        Self::default().with_channel(0, multiplier, offset)
    }

    /// Replace the multiplier/offset of channel `idx` (0 = R .. 3 = A).
    pub fn with_channel(mut self, idx: usize, multiplier: f64, offset: f64) -> Self {
        if idx < 4 {
            self.multipliers[idx] = multiplier;
            self.offsets[idx] = offset;
        }
        self
    }

    fn clamped(self) -> Self {
        Self {
            multipliers: self.multipliers.map(|m| clamp_param(m, 0.0, 10.0, 1.0)),
            offsets: self.offsets.map(|o| clamp_param(o, -255.0, 255.0, 0.0)),
        }
    }
}

/// Apply a [`ChannelTransform`] to every pixel.
pub fn channel_transform(src: &BitmapBuffer, t: ChannelTransform) -> EaselResult<BitmapBuffer> {
    let t = t.clamped();
    map_pixels(src, |px| {
        let mut out = [0u8; 4];
        for c in 0..4 {
            out[c] = to_u8(f64::from(px[c]) * t.multipliers[c] + t.offsets[c]);
        }
        out
    })
}

pub(crate) fn blend_k(intensity_pct: f64) -> f64 {
    clamp_param(intensity_pct, 0.0, 100.0, 100.0) / 100.0
}

/// Rec. 601 grayscale blended with the source by `intensity` (`0..=100`).
pub fn grayscale(src: &BitmapBuffer, intensity: f64) -> EaselResult<BitmapBuffer> {
    let k = blend_k(intensity);
    map_pixels(src, |[r, g, b, a]| {
        let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
        let gray = luma601(r, g, b);
        [
            to_u8(r * (1.0 - k) + gray * k),
            to_u8(g * (1.0 - k) + gray * k),
            to_u8(b * (1.0 - k) + gray * k),
            a,
        ]
    })
}

/// Colour inversion blended with the source by `intensity` (`0..=100`).
pub fn invert(src: &BitmapBuffer, intensity: f64) -> EaselResult<BitmapBuffer> {
    let k = blend_k(intensity);
    map_pixels(src, |[r, g, b, a]| {
        let inv = |v: u8| {
            let v = f64::from(v);
            to_u8(v * (1.0 - k) + (255.0 - v) * k)
        };
        [inv(r), inv(g), inv(b), a]
    })
}

/// Classic sepia matrix blended with the source by `intensity` (`0..=100`).
pub fn sepia(src: &BitmapBuffer, intensity: f64) -> EaselResult<BitmapBuffer> {
    let k = blend_k(intensity);
    map_pixels(src, |[r, g, b, a]| {
        let s = sepia_rgb(f64::from(r), f64::from(g), f64::from(b));
        let mix = |orig: u8, t: f64| to_u8(f64::from(orig) * (1.0 - k) + t * k);
        [mix(r, s[0]), mix(g, s[1]), mix(b, s[2]), a]
    })
}

pub(crate) fn sepia_rgb(r: f64, g: f64, b: f64) -> [f64; 3] {
    [
        (r * 0.393 + g * 0.769 + b * 0.189).min(255.0),
        (r * 0.349 + g * 0.686 + b * 0.168).min(255.0),
        (r * 0.272 + g * 0.534 + b * 0.131).min(255.0),
    ]
}

/// Invert every RGB channel brighter than `threshold` (`0..=255`).
pub fn solarize(src: &BitmapBuffer, threshold: f64) -> EaselResult<BitmapBuffer> {
    let t = to_u8(clamp_param(threshold, 0.0, 255.0, 128.0));
    map_pixels(src, |[r, g, b, a]| {
        let s = |v: u8| if v > t { 255 - v } else { v };
        [s(r), s(g), s(b), a]
    })
}

/// Binary black/white split on Rec. 709 luminance. Fully transparent pixels are kept.
pub fn threshold(src: &BitmapBuffer, threshold: f64) -> EaselResult<BitmapBuffer> {
    let t = clamp_param(threshold, 0.0, 255.0, 128.0);
    map_pixels(src, |px @ [r, g, b, a]| {
        if a == 0 {
            return px;
        }
        let gray = luma709(f64::from(r), f64::from(g), f64::from(b)).round();
        let c = if gray <= t { 0 } else { 255 };
        [c, c, c, a]
    })
}

/// Push each channel away from the pixel average, scaled by the pixel's own saturation.
///
/// `amount` in `0..=100`.
pub fn vibrance(src: &BitmapBuffer, amount: f64) -> EaselResult<BitmapBuffer> {
    let factor = clamp_param(amount, 0.0, 100.0, 50.0) / 100.0;
    map_pixels(src, |[r, g, b, a]| {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
        let avg = (r + g + b) / 3.0;
        let sat = if max == 0 {
            0.0
        } else {
            1.0 - f64::from(min) / f64::from(max)
        };

        let adjustment = sat * factor;
        [
            to_u8(r + (r - avg) * adjustment),
            to_u8(g + (g - avg) * adjustment),
            to_u8(b + (b - avg) * adjustment),
            a,
        ]
    })
}

/// Additive brightness; `value` in `[-100, 100]` maps to `[-255, 255]`.
pub fn brightness(src: &BitmapBuffer, value: f64) -> EaselResult<BitmapBuffer> {
    let delta = clamp_param(value, -100.0, 100.0, 0.0) / 100.0 * 255.0;
    map_pixels(src, |[r, g, b, a]| {
        let f = |v: u8| to_u8(f64::from(v) + delta);
        [f(r), f(g), f(b), a]
    })
}

/// Contrast about mid-gray; `value` in `[-100, 100]`.
pub fn contrast(src: &BitmapBuffer, value: f64) -> EaselResult<BitmapBuffer> {
    let c = clamp_param(value, -100.0, 100.0, 0.0) / 100.0 * 255.0;
    let factor = 259.0 * (c + 255.0) / (255.0 * (259.0 - c));
    map_pixels(src, |[r, g, b, a]| {
        let f = |v: u8| to_u8(factor * (f64::from(v) - 128.0) + 128.0);
        [f(r), f(g), f(b), a]
    })
}

/// Saturation toward (negative) or away from (positive) the brightest channel.
///
/// `value` in `[-100, 100]`.
pub fn saturation(src: &BitmapBuffer, value: f64) -> EaselResult<BitmapBuffer> {
    let adjust = -clamp_param(value, -100.0, 100.0, 0.0) / 100.0;
    map_pixels(src, |[r, g, b, a]| {
        let max = f64::from(r.max(g).max(b));
        let f = |v: u8| {
            let v = f64::from(v);
            to_u8(v + (max - v) * adjust)
        };
        [f(r), f(g), f(b), a]
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color.rs"]
mod tests;
