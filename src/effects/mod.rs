pub(crate) mod blur;
pub(crate) mod catalog;
pub(crate) mod color;
pub(crate) mod convolve;
pub(crate) mod presets;
pub(crate) mod stylize;
pub(crate) mod trim;

pub use blur::{MAX_BLUR_QUALITY, MAX_BLUR_RADIUS, box_blur};
pub use catalog::{Effect, EffectCategory, EffectDef, ParamDef, effect_definitions, find_effect};
pub use color::{
    ChannelTransform, brightness, channel_transform, contrast, grayscale, hsl_adjust, hsl_to_rgb,
    hue_rotate, invert, rgb_to_hsl, saturation, sepia, solarize, threshold, vibrance,
};
pub use convolve::{edge_detect, emboss, sharpen};
pub use presets::{Preset, apply_preset, vintage};
pub use stylize::{mosaic, oil_paint, vignette};
pub use trim::{TrimBounds, TrimOptions, detect_trim, trim};
