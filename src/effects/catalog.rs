//! The effect catalog: named, parameterised effects as the editor exposes them.
//!
//! A layer filter chain stores effects by name and a loose `name -> number`
//! map. [`Effect::parse`] turns that pair into a typed [`Effect`], filling
//! defaults and clamping every value into its documented range.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bitmap::buffer::BitmapBuffer;
use crate::effects::blur::box_blur;
use crate::effects::color::{
    ChannelTransform, brightness, channel_transform, contrast, grayscale, hsl_adjust, hue_rotate,
    invert, saturation, sepia, solarize, threshold, vibrance,
};
use crate::effects::convolve::{edge_detect, emboss, sharpen};
use crate::effects::presets::{Preset, apply_preset, vintage};
use crate::effects::stylize::{mosaic, oil_paint, vignette};
use crate::foundation::error::{EaselError, EaselResult};
use crate::foundation::math::{clamp_param, to_u8};

/// Grouping used by effect pickers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectCategory {
    /// Everyday adjustments.
    Common,
    /// Fixed stylistic presets.
    Instagram,
    /// Stylize, convolution and statistical filters.
    Other,
}

impl EffectCategory {
    /// Lowercase name, as serialized.
    pub fn key(self) -> &'static str {
        match self {
            EffectCategory::Common => "common",
            EffectCategory::Instagram => "instagram",
            EffectCategory::Other => "other",
        }
    }
}

/// One numeric parameter of a catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ParamDef {
    /// Key in a filter's parameter map.
    pub name: &'static str,
    /// Value used when the parameter is missing.
    pub default: f64,
    /// Lower clamp.
    pub min: f64,
    /// Upper clamp.
    pub max: f64,
}

impl ParamDef {
    const fn new(name: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            default,
            min,
            max,
        }
    }
}

/// A catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EffectDef {
    /// Stable identifier stored in filter specs.
    pub key: &'static str,
    /// Display name.
    pub title: &'static str,
    /// Picker group.
    pub category: EffectCategory,
    /// Accepted parameters.
    pub params: &'static [ParamDef],
}

impl EffectDef {
    /// Parameter by name.
    pub fn param(&self, name: &str) -> Option<&'static ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }
}

const INTENSITY_100: &[ParamDef] = &[ParamDef::new("intensity", 100.0, 0.0, 100.0)];
const INTENSITY_200: &[ParamDef] = &[ParamDef::new("intensity", 100.0, 0.0, 200.0)];
const THRESHOLD: &[ParamDef] = &[ParamDef::new("threshold", 128.0, 0.0, 255.0)];
const CHANNEL_PARAMS: &[ParamDef] = &[
    ParamDef::new("redMultiplier", 1.0, 0.0, 10.0),
    ParamDef::new("redOffset", 0.0, -255.0, 255.0),
    ParamDef::new("greenMultiplier", 1.0, 0.0, 10.0),
    ParamDef::new("greenOffset", 0.0, -255.0, 255.0),
    ParamDef::new("blueMultiplier", 1.0, 0.0, 10.0),
    ParamDef::new("blueOffset", 0.0, -255.0, 255.0),
    ParamDef::new("alphaMultiplier", 1.0, 0.0, 10.0),
    ParamDef::new("alphaOffset", 0.0, -255.0, 255.0),
];

macro_rules! preset_def {
    ($key:literal, $title:literal) => {
        EffectDef {
            key: $key,
            title: $title,
            category: EffectCategory::Instagram,
            params: INTENSITY_100,
        }
    };
}

static EFFECTS: &[EffectDef] = &[
    EffectDef {
        key: "box-blur",
        title: "Box Blur",
        category: EffectCategory::Common,
        params: &[
            ParamDef::new("hRadius", 3.0, 0.0, 20.0),
            ParamDef::new("vRadius", 3.0, 0.0, 20.0),
            ParamDef::new("quality", 3.0, 1.0, 20.0),
        ],
    },
    EffectDef {
        key: "sepia",
        title: "Sepia",
        category: EffectCategory::Common,
        params: &[ParamDef::new("value", 60.0, 0.0, 100.0)],
    },
    EffectDef {
        key: "grayscale",
        title: "Grayscale",
        category: EffectCategory::Common,
        params: INTENSITY_100,
    },
    EffectDef {
        key: "invert",
        title: "Invert",
        category: EffectCategory::Common,
        params: INTENSITY_100,
    },
    EffectDef {
        key: "brightness",
        title: "Brightness",
        category: EffectCategory::Common,
        params: &[ParamDef::new("value", 30.0, -100.0, 100.0)],
    },
    EffectDef {
        key: "contrast",
        title: "Contrast",
        category: EffectCategory::Common,
        params: &[ParamDef::new("value", 40.0, -100.0, 100.0)],
    },
    EffectDef {
        key: "saturate",
        title: "Saturate",
        category: EffectCategory::Common,
        params: &[ParamDef::new("value", -50.0, -100.0, 100.0)],
    },
    EffectDef {
        key: "hue-rotate",
        title: "Hue Rotate",
        category: EffectCategory::Common,
        params: &[ParamDef::new("value", 90.0, 0.0, 360.0)],
    },
    EffectDef {
        key: "hsl",
        title: "Hue / Saturation / Lightness",
        category: EffectCategory::Common,
        params: &[
            ParamDef::new("hue", 0.0, -180.0, 180.0),
            ParamDef::new("saturation", 0.0, -100.0, 100.0),
            ParamDef::new("lightness", 0.0, -100.0, 100.0),
        ],
    },
    EffectDef {
        key: "channel-transform",
        title: "Channel Transform",
        category: EffectCategory::Common,
        params: CHANNEL_PARAMS,
    },
    preset_def!("1977", "1977"),
    preset_def!("aden", "Aden"),
    preset_def!("clarendon", "Clarendon"),
    preset_def!("gingham", "Gingham"),
    preset_def!("inkwell", "Inkwell"),
    preset_def!("lofi", "Lo-Fi"),
    preset_def!("toaster", "Toaster"),
    preset_def!("valencia", "Valencia"),
    preset_def!("xpro2", "X-Pro II"),
    EffectDef {
        key: "black-and-white",
        title: "Black and White",
        category: EffectCategory::Other,
        params: THRESHOLD,
    },
    EffectDef {
        key: "edge",
        title: "Edge",
        category: EffectCategory::Other,
        params: INTENSITY_200,
    },
    EffectDef {
        key: "emboss",
        title: "Emboss",
        category: EffectCategory::Other,
        params: INTENSITY_200,
    },
    EffectDef {
        key: "sharpen",
        title: "Sharpen",
        category: EffectCategory::Other,
        params: INTENSITY_200,
    },
    EffectDef {
        key: "solarize",
        title: "Solarize",
        category: EffectCategory::Other,
        params: THRESHOLD,
    },
    EffectDef {
        key: "mosaic",
        title: "Mosaic",
        category: EffectCategory::Other,
        params: &[ParamDef::new("blockSize", 10.0, 2.0, 50.0)],
    },
    EffectDef {
        key: "oil",
        title: "Oil",
        category: EffectCategory::Other,
        params: &[
            ParamDef::new("range", 3.0, 1.0, 10.0),
            ParamDef::new("levels", 20.0, 1.0, 256.0),
        ],
    },
    EffectDef {
        key: "vignette",
        title: "Vignette",
        category: EffectCategory::Other,
        params: &[ParamDef::new("intensity", 0.5, 0.0, 1.0)],
    },
    EffectDef {
        key: "vibrance",
        title: "Vibrance",
        category: EffectCategory::Other,
        params: &[ParamDef::new("amount", 50.0, 0.0, 100.0)],
    },
    EffectDef {
        key: "vintage",
        title: "Vintage",
        category: EffectCategory::Other,
        params: &[
            ParamDef::new("intensity", 100.0, 0.0, 100.0),
            ParamDef::new("seed", 0.0, 0.0, 4_294_967_295.0),
        ],
    },
];

/// Every catalog entry, in picker order.
pub fn effect_definitions() -> &'static [EffectDef] {
    EFFECTS
}

/// Catalog entry by key.
pub fn find_effect(key: &str) -> Option<&'static EffectDef> {
    EFFECTS.iter().find(|d| d.key == key)
}

/// A fully-resolved effect with typed, in-range parameters.
///
/// Field names follow the catalog parameters of the same effect.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Effect {
    /// Cascaded separable box blur.
    BoxBlur {
        h_radius: u32,
        v_radius: u32,
        quality: u32,
    },
    /// Sepia tone blended by intensity.
    Sepia {
        intensity: f64,
    },
    /// Rec. 601 grayscale blended by intensity.
    Grayscale {
        intensity: f64,
    },
    /// Colour inversion blended by intensity.
    Invert {
        intensity: f64,
    },
    /// Additive brightness.
    Brightness {
        value: f64,
    },
    /// Contrast about mid-gray.
    Contrast {
        value: f64,
    },
    /// Saturation relative to the brightest channel.
    Saturate {
        value: f64,
    },
    /// Hue rotation in degrees.
    HueRotate {
        degrees: f64,
    },
    /// Combined hue, saturation and lightness adjustment.
    Hsl {
        hue: f64,
        saturation: f64,
        lightness: f64,
    },
    /// Per-channel multiply and offset.
    ChannelTransform {
        transform: ChannelTransform,
    },
    /// One of the fixed preset recipes.
    Preset {
        preset: Preset,
        intensity: f64,
    },
    /// Luminance threshold to pure black and white.
    BlackAndWhite {
        threshold: f64,
    },
    /// Sobel edge magnitude.
    Edge {
        intensity: f64,
    },
    /// Emboss relief centred on 128.
    Emboss {
        intensity: f64,
    },
    /// 3x3 sharpen.
    Sharpen {
        intensity: f64,
    },
    /// Invert channels above a threshold.
    Solarize {
        threshold: f64,
    },
    /// Block-average tiles.
    Mosaic {
        block_size: u32,
    },
    /// Oil-painting histogram filter.
    Oil {
        range: u32,
        levels: u32,
    },
    /// Radial darkening towards the corners.
    Vignette {
        intensity: f64,
    },
    /// Saturation-weighted chroma boost.
    Vibrance {
        amount: f64,
    },
    /// Sepia with reproducible grain.
    Vintage {
        intensity: f64,
        seed: u32,
    },
}

impl Effect {
    /// Build an effect from a catalog key and loose parameters.
    ///
    /// Missing parameters take their defaults; out-of-range values are
    /// clamped. Unknown keys fail with [`EaselError::Validation`]; unknown
    /// parameter names are ignored.
    pub fn parse(name: &str, params: &BTreeMap<String, f64>) -> EaselResult<Self> {
        let def = find_effect(name)
            .ok_or_else(|| EaselError::validation(format!("unknown effect '{name}'")))?;

        for key in params.keys() {
            if def.param(key).is_none() {
                tracing::debug!(effect = def.key, param = %key, "ignoring unknown effect parameter");
            }
        }
        let get = |n: &str| -> f64 {
            match def.param(n) {
                Some(p) => params
                    .get(n)
                    .map_or(p.default, |&v| clamp_param(v, p.min, p.max, p.default)),
                None => 0.0,
            }
        };
        let get_u32 = |n: &str| get(n).round() as u32;

        if let Some(preset) = Preset::from_key(def.key) {
            return Ok(Effect::Preset {
                preset,
                intensity: get("intensity"),
            });
        }

        let effect = match def.key {
            "box-blur" => Effect::BoxBlur {
                h_radius: get_u32("hRadius"),
                v_radius: get_u32("vRadius"),
                quality: get_u32("quality"),
            },
            "sepia" => Effect::Sepia {
                intensity: get("value"),
            },
            "grayscale" => Effect::Grayscale {
                intensity: get("intensity"),
            },
            "invert" => Effect::Invert {
                intensity: get("intensity"),
            },
            "brightness" => Effect::Brightness {
                value: get("value"),
            },
            "contrast" => Effect::Contrast {
                value: get("value"),
            },
            "saturate" => Effect::Saturate {
                value: get("value"),
            },
            "hue-rotate" => Effect::HueRotate {
                degrees: get("value"),
            },
            "hsl" => Effect::Hsl {
                hue: get("hue"),
                saturation: get("saturation"),
                lightness: get("lightness"),
            },
            "channel-transform" => Effect::ChannelTransform {
                transform: ChannelTransform {
                    multipliers: [
                        get("redMultiplier"),
                        get("greenMultiplier"),
                        get("blueMultiplier"),
                        get("alphaMultiplier"),
                    ],
                    offsets: [
                        get("redOffset"),
                        get("greenOffset"),
                        get("blueOffset"),
                        get("alphaOffset"),
                    ],
                },
            },
            "black-and-white" => Effect::BlackAndWhite {
                threshold: get("threshold"),
            },
            "edge" => Effect::Edge {
                intensity: get("intensity"),
            },
            "emboss" => Effect::Emboss {
                intensity: get("intensity"),
            },
            "sharpen" => Effect::Sharpen {
                intensity: get("intensity"),
            },
            "solarize" => Effect::Solarize {
                threshold: get("threshold"),
            },
            "mosaic" => Effect::Mosaic {
                block_size: get_u32("blockSize"),
            },
            "oil" => Effect::Oil {
                range: get_u32("range"),
                levels: get_u32("levels"),
            },
            "vignette" => Effect::Vignette {
                intensity: get("intensity"),
            },
            "vibrance" => Effect::Vibrance {
                amount: get("amount"),
            },
            "vintage" => Effect::Vintage {
                intensity: get("intensity"),
                seed: get("seed") as u32,
            },
            other => {
                return Err(EaselError::validation(format!(
                    "effect '{other}' has no implementation"
                )));
            }
        };
        Ok(effect)
    }

    /// Catalog key this effect was built from.
    pub fn key(&self) -> &'static str {
        match self {
            Effect::BoxBlur { .. } => "box-blur",
            Effect::Sepia { .. } => "sepia",
            Effect::Grayscale { .. } => "grayscale",
            Effect::Invert { .. } => "invert",
            Effect::Brightness { .. } => "brightness",
            Effect::Contrast { .. } => "contrast",
            Effect::Saturate { .. } => "saturate",
            Effect::HueRotate { .. } => "hue-rotate",
            Effect::Hsl { .. } => "hsl",
            Effect::ChannelTransform { .. } => "channel-transform",
            Effect::Preset { preset, .. } => preset.key(),
            Effect::BlackAndWhite { .. } => "black-and-white",
            Effect::Edge { .. } => "edge",
            Effect::Emboss { .. } => "emboss",
            Effect::Sharpen { .. } => "sharpen",
            Effect::Solarize { .. } => "solarize",
            Effect::Mosaic { .. } => "mosaic",
            Effect::Oil { .. } => "oil",
            Effect::Vignette { .. } => "vignette",
            Effect::Vibrance { .. } => "vibrance",
            Effect::Vintage { .. } => "vintage",
        }
    }

    /// Run the effect, producing a new buffer of the same size.
    #[tracing::instrument(skip(src), fields(effect = self.key(), width = src.width(), height = src.height()))]
    pub fn apply(&self, src: &BitmapBuffer) -> EaselResult<BitmapBuffer> {
        match *self {
            Effect::BoxBlur {
                h_radius,
                v_radius,
                quality,
            } => box_blur(src, h_radius, v_radius, quality),
            Effect::Sepia { intensity } => sepia(src, intensity),
            Effect::Grayscale { intensity } => grayscale(src, intensity),
            Effect::Invert { intensity } => invert(src, intensity),
            Effect::Brightness { value } => brightness(src, value),
            Effect::Contrast { value } => contrast(src, value),
            Effect::Saturate { value } => saturation(src, value),
            Effect::HueRotate { degrees } => hue_rotate(src, degrees),
            Effect::Hsl {
                hue,
                saturation,
                lightness,
            } => hsl_adjust(src, hue, saturation, lightness),
            Effect::ChannelTransform { transform } => channel_transform(src, transform),
            Effect::Preset { preset, intensity } => apply_preset(src, preset, intensity),
            Effect::BlackAndWhite { threshold: t } => threshold(src, t),
            Effect::Edge { intensity } => mix(src, &edge_detect(src)?, intensity),
            Effect::Emboss { intensity } => mix(src, &emboss(src)?, intensity),
            Effect::Sharpen { intensity } => mix(src, &sharpen(src)?, intensity),
            Effect::Solarize { threshold } => solarize(src, threshold),
            Effect::Mosaic { block_size } => mosaic(src, block_size),
            Effect::Oil { range, levels } => oil_paint(src, range, levels),
            Effect::Vignette { intensity } => vignette(src, intensity),
            Effect::Vibrance { amount } => vibrance(src, amount),
            Effect::Vintage { intensity, seed } => mix(src, &vintage(src, seed)?, intensity),
        }
    }
}

/// `src * (1 - k) + fx * k` on RGB with `k = intensity / 100`; `k > 1` extrapolates.
fn mix(src: &BitmapBuffer, fx: &BitmapBuffer, intensity: f64) -> EaselResult<BitmapBuffer> {
    let k = clamp_param(intensity, 0.0, 200.0, 100.0) / 100.0;
    if k == 1.0 {
        return Ok(fx.clone());
    }
    let out = src
        .pixels()
        .chunks_exact(4)
        .zip(fx.pixels().chunks_exact(4))
        .flat_map(|(a, b)| {
            let m = |c: usize| to_u8(f64::from(a[c]) * (1.0 - k) + f64::from(b[c]) * k);
            [m(0), m(1), m(2), b[3]]
        })
        .collect();
    Ok(src.same_size(out))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/catalog.rs"]
mod tests;
