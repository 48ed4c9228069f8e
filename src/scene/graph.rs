//! Boundary traits for the scene-graph collaborator.
//!
//! The editing engine never looks at concrete drawable types. It sees objects
//! through [`SceneObject`], and reaches pixel operations only through the
//! [`PixelEditable`] capability, which non-image objects simply don't offer.

use crate::bitmap::buffer::BitmapBuffer;
use crate::effects::catalog::Effect;
use crate::foundation::core::{BlendMode, ObjectId, ObjectKind};
use crate::foundation::error::EaselResult;

/// Summary of one scene object, as listed by [`SceneGraph::objects`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneObjectInfo {
    /// Handle issued at insertion.
    pub id: ObjectId,
    /// Drawable kind.
    pub kind: ObjectKind,
    /// Optional user-facing name.
    pub name: Option<String>,
}

/// Pixel operations offered by raster objects.
pub trait PixelEditable {
    /// Encoded bytes (PNG) of the unfiltered source image.
    fn pixel_source(&self) -> &[u8];

    /// Replace the source with new encoded bytes. The active chain is kept and re-run.
    fn replace_pixel_source(&mut self, encoded: Vec<u8>) -> EaselResult<()>;

    /// Current filter chain.
    fn filter_chain(&self) -> &[Effect];

    /// Replace the filter chain without running it.
    fn set_filter_chain(&mut self, chain: Vec<Effect>);

    /// Run the chain over the source and cache the result for rendering.
    fn apply_filter_chain(&mut self) -> EaselResult<()>;
}

/// Presentation state every scene object carries.
pub trait SceneObject {
    /// Handle of this object.
    fn id(&self) -> ObjectId;
    /// Drawable kind.
    fn kind(&self) -> ObjectKind;
    /// Opacity in `[0, 1]`.
    fn opacity(&self) -> f64;
    /// Set opacity in `[0, 1]`.
    fn set_opacity(&mut self, opacity: f64);
    /// Drawn when `true`.
    fn visible(&self) -> bool;
    /// Show or hide.
    fn set_visible(&mut self, visible: bool);
    /// Composite operation.
    fn blend_mode(&self) -> BlendMode;
    /// Set the composite operation.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Pixel capability, if this object is a raster.
    fn pixel_editable(&self) -> Option<&dyn PixelEditable> {
        None
    }

    /// Mutable pixel capability, if this object is a raster.
    fn pixel_editable_mut(&mut self) -> Option<&mut dyn PixelEditable> {
        None
    }
}

/// Scene-graph collaborator driven by the editor session.
pub trait SceneGraph {
    /// Stored object type.
    type Object: SceneObject;
    /// What callers hand to [`SceneGraph::add_object`].
    type Drawable;

    /// Insert on top of the stack and return the new handle.
    fn add_object(&mut self, drawable: Self::Drawable) -> EaselResult<ObjectId>;

    /// Remove an object.
    fn remove_object(&mut self, id: ObjectId) -> EaselResult<()>;

    /// Every object, bottom to top.
    fn objects(&self) -> Vec<SceneObjectInfo>;

    /// Object by handle.
    fn object(&self, id: ObjectId) -> Option<&Self::Object>;

    /// Mutable object by handle.
    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Self::Object>;

    /// Serialize the entire scene. The result shares no state with the live scene.
    fn to_snapshot(&self) -> EaselResult<String>;

    /// Replace the entire scene with a snapshot.
    ///
    /// A snapshot that fails to parse or validate leaves the live scene untouched.
    fn restore_from_snapshot(&mut self, snapshot: &str) -> EaselResult<()>;

    /// Swap with the object above.
    fn bring_forward(&mut self, id: ObjectId) -> EaselResult<()>;
    /// Swap with the object below.
    fn send_backward(&mut self, id: ObjectId) -> EaselResult<()>;
    /// Move to the top.
    fn bring_to_front(&mut self, id: ObjectId) -> EaselResult<()>;
    /// Move to the bottom.
    fn send_to_back(&mut self, id: ObjectId) -> EaselResult<()>;

    /// Rasterise the visible scene.
    fn render(&self) -> EaselResult<BitmapBuffer>;
}
