//! Fixed stylistic recipes ("Instagram" presets).
//!
//! Each recipe is a literal sequence of per-channel multipliers and
//! contrast-about-average steps. Intermediate results are stored as bytes
//! between steps, so outputs are reproducible to the bit.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bitmap::buffer::BitmapBuffer;
use crate::effects::color::{blend_k, map_pixels, sepia_rgb};
use crate::foundation::error::EaselResult;
use crate::foundation::math::{luma601, noise01, to_u8};

/// Named preset recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    /// Warm tone: red and green up, blue down.
    #[serde(rename = "1977")]
    Vintage1977,
    /// Darkened, low-contrast warm wash.
    #[serde(rename = "aden")]
    Aden,
    /// Contrast and saturation boost.
    #[serde(rename = "clarendon")]
    Clarendon,
    /// Desaturated with a blue cast.
    #[serde(rename = "gingham")]
    Gingham,
    /// High-contrast monochrome.
    #[serde(rename = "inkwell")]
    Inkwell,
    /// Saturated, contrasty.
    #[serde(rename = "lofi")]
    LoFi,
    /// Warm with strong contrast.
    #[serde(rename = "toaster")]
    Toaster,
    /// Warm, slightly faded.
    #[serde(rename = "valencia")]
    Valencia,
    /// Cross-processed look.
    #[serde(rename = "xpro2")]
    XPro2,
}

impl Preset {
    /// Every preset, in catalog order.
    pub const ALL: [Preset; 9] = [
        Preset::Vintage1977,
        Preset::Aden,
        Preset::Clarendon,
        Preset::Gingham,
        Preset::Inkwell,
        Preset::LoFi,
        Preset::Toaster,
        Preset::Valencia,
        Preset::XPro2,
    ];

    /// Catalog key (`"1977"`, `"aden"`, ...).
    pub fn key(self) -> &'static str {
        match self {
            Preset::Vintage1977 => "1977",
            Preset::Aden => "aden",
            Preset::Clarendon => "clarendon",
            Preset::Gingham => "gingham",
            Preset::Inkwell => "inkwell",
            Preset::LoFi => "lofi",
            Preset::Toaster => "toaster",
            Preset::Valencia => "valencia",
            Preset::XPro2 => "xpro2",
        }
    }

    /// Reverse of [`Preset::key`].
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    fn recipe(self, [r, g, b]: [f64; 3]) -> [f64; 3] {
        match self {
            Preset::Vintage1977 => [st(r * 1.1), st(g * 1.05), st(b * 0.9)],
            Preset::Aden => {
                let dark = [st(r * 0.8), st(g * 0.8), st(b * 0.8)];
                let warm = [st(dark[0] * 1.05), dark[1], st(dark[2] * 0.95)];
                let flat = contrast_about_avg(warm, 0.9, [1.0, 1.0, 1.0]);
                [st(flat[0] * 1.2), st(flat[1] * 1.2), st(flat[2] * 1.2)]
            }
            Preset::Clarendon => contrast_about_avg([r, g, b], 1.2, [1.1, 1.05, 0.95]),
            Preset::Gingham => {
                let gray = luma601(r, g, b);
                [st(gray * 0.95), st(gray * 0.98), st(gray * 1.05)]
            }
            Preset::Inkwell => {
                let v = st((luma601(r, g, b) - 128.0) * 1.3 + 128.0);
                [v, v, v]
            }
            Preset::LoFi => contrast_about_avg([r, g, b], 1.15, [1.2, 1.1, 0.9]),
            Preset::Toaster => {
                let warm = [st(r * 1.15), st(g * 1.05), st(b * 0.85)];
                contrast_about_avg(warm, 1.2, [1.0, 1.0, 1.0])
            }
            Preset::Valencia => {
                let [r, g, b] = [st(r * 1.08), st(g * 1.02), st(b * 0.95)];
                let gray = luma601(r, g, b);
                [
                    st(r * 0.9 + gray * 0.1),
                    st(g * 0.9 + gray * 0.1),
                    st(b * 0.9 + gray * 0.1),
                ]
            }
            Preset::XPro2 => {
                let [r, g, b] = contrast_about_avg([r, g, b], 1.25, [1.15, 1.1, 1.05]);
                [st(r * 1.05), g, st(b * 0.95)]
            }
        }
    }
}

/// Store through a byte.
fn st(v: f64) -> f64 {
    f64::from(to_u8(v))
}

fn contrast_about_avg(rgb: [f64; 3], contrast: f64, gains: [f64; 3]) -> [f64; 3] {
    let avg = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
    [
        st(avg + (rgb[0] - avg) * contrast * gains[0]),
        st(avg + (rgb[1] - avg) * contrast * gains[1]),
        st(avg + (rgb[2] - avg) * contrast * gains[2]),
    ]
}

/// Run `preset`, blended with the source by `intensity` (`0..=100`).
pub fn apply_preset(src: &BitmapBuffer, preset: Preset, intensity: f64) -> EaselResult<BitmapBuffer> {
    let k = blend_k(intensity);
    map_pixels(src, |[r, g, b, a]| {
        let orig = [f64::from(r), f64::from(g), f64::from(b)];
        let out = preset.recipe(orig);
        [
            to_u8(orig[0] * (1.0 - k) + out[0] * k),
            to_u8(orig[1] * (1.0 - k) + out[1] * k),
            to_u8(orig[2] * (1.0 - k) + out[2] * k),
            a,
        ]
    })
}

/// Sepia followed by grain of up to +-10 added equally to R, G and B.
///
/// The grain is a hash of the pixel position and `seed`.
pub fn vintage(src: &BitmapBuffer, seed: u32) -> EaselResult<BitmapBuffer> {
    src.ensure_non_empty()?;
    let mut out = src.pixels().to_vec();
    let row_bytes = src.width() as usize * 4;
    out.par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let s = sepia_rgb(f64::from(px[0]), f64::from(px[1]), f64::from(px[2]));
                let noise = (noise01(x as u32, y as u32, seed) - 0.5) * 20.0;
                for c in 0..3 {
                    px[c] = to_u8(st(s[c]) + noise);
                }
            }
        });
    Ok(src.same_size(out))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/presets.rs"]
mod tests;
