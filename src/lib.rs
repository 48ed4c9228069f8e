//! Easel is the editing engine behind a canvas image editor.
//!
//! It owns the parts of an editor that are not UI: layer metadata kept in
//! step with a scene graph, snapshot-based linear undo, and a library of CPU
//! pixel effects over straight-alpha RGBA8 bitmaps.
//!
//! - Wrap any [`SceneGraph`] (or the bundled in-memory [`Scene`]) in an [`EditorSession`]
//! - Edit layers through the session so every change lands in the [`HistoryStack`]
//! - Run [`effects`] directly on a [`BitmapBuffer`], or as layer filter chains
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod bitmap;
/// Pixel effects over [`BitmapBuffer`]s and the effect catalog.
pub mod effects;
pub(crate) mod history;
pub(crate) mod layers;
pub(crate) mod persist;
pub(crate) mod scene;
pub(crate) mod session;

pub use crate::foundation::core::{
    BlendMode, FilterId, LayerId, ObjectId, ObjectKind, Point, Rect, Rgba8, Vec2,
};
pub use crate::foundation::error::{EaselError, EaselResult};

pub use crate::bitmap::buffer::BitmapBuffer;
pub use crate::bitmap::codec::ExportFormat;
pub use crate::effects::{Effect, TrimBounds, TrimOptions};
pub use crate::history::stack::{DEFAULT_HISTORY_CAPACITY, HistoryStack, HistoryState};
pub use crate::layers::manager::{LayerManager, MAX_LAYER_ORDER, SyncReport};
pub use crate::layers::model::{FilterSpec, LayerMetadata, LayerPatch, LayerTable};
pub use crate::layers::renderer::{
    apply_all, apply_filters_to_object, apply_layer_to_object, build_filter_chain,
    remove_filters_from_object, update_filter_on_object,
};
pub use crate::persist::fs::FsAssetStore;
pub use crate::persist::store::{
    AssetStore, MemoryAssetStore, StoredAsset, UploadReceipt, normalize_folder,
};
pub use crate::scene::graph::{PixelEditable, SceneGraph, SceneObject, SceneObjectInfo};
pub use crate::scene::memory::{Drawable, ImageSource, Scene, SceneNode};
pub use crate::scene::snapshot::{SCENE_SNAPSHOT_VERSION, SceneSnapshot};
pub use crate::session::cache::BitmapCache;
pub use crate::session::config::{DEFAULT_CACHE_CAPACITY, EditorConfig};
pub use crate::session::document::{DOCUMENT_VERSION, EditorDocument};
pub use crate::session::editor::{EditorSession, HistoryEntry};
