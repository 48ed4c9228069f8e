use std::fmt;

use crate::foundation::error::EaselError;

pub use kurbo::{Point, Rect, Vec2};

/// Straight (non-premultiplied) RGBA8 pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// Build a pixel from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in R,G,B,A order.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build a pixel from channels in R,G,B,A order.
    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(px: [u8; 4]) -> Self {
        Self::from_array(px)
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(px: Rgba8) -> Self {
        px.to_array()
    }
}

/// What kind of drawable a scene object is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Vector shape (rectangle, ellipse).
    Shape,
    /// Raster image; the only kind that accepts pixel filters.
    Image,
    /// Text run.
    Text,
    /// Container of other drawables.
    Group,
}

impl ObjectKind {
    /// Lowercase label, as used in default layer names.
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Shape => "shape",
            ObjectKind::Image => "image",
            ObjectKind::Text => "text",
            ObjectKind::Group => "group",
        }
    }
}

/// Canvas composite operation applied when an object is drawn over what lies beneath.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Plain alpha compositing.
    #[default]
    SourceOver,
    /// Channel product; darkens.
    Multiply,
    /// Inverse product; lightens.
    Screen,
    /// Multiply or screen depending on the backdrop.
    Overlay,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
    /// Absolute channel difference.
    Difference,
}

impl BlendMode {
    /// Every mode, in menu order.
    pub const ALL: [BlendMode; 7] = [
        BlendMode::SourceOver,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::Difference,
    ];

    /// Canvas name of the mode (`"source-over"`, `"multiply"`, ...).
    pub fn key(self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::Difference => "difference",
        }
    }
}

impl std::str::FromStr for BlendMode {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| EaselError::validation(format!("unknown blend mode '{s}'")))
    }
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value of the handle.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

handle!(
    /// Handle issued by the scene graph when an object is inserted.
    ///
    /// Layers store it as a weak reference: a lookup key, never ownership.
    ObjectId,
    "object"
);

handle!(
    /// Stable identifier of a layer inside a [`crate::LayerManager`].
    LayerId,
    "layer"
);

handle!(
    /// Identifier of one filter entry on a layer's filter chain.
    FilterId,
    "filter"
);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
