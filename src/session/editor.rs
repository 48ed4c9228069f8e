//! Editor session: the one owner of scene, layers and history.
//!
//! Every public mutation runs through [`EditorSession::commit`]. A successful
//! change is recorded as a new history entry; a failed one is rolled back to
//! the current entry so history and scene never disagree.

use std::collections::BTreeMap;

use crate::bitmap::buffer::BitmapBuffer;
use crate::bitmap::codec::ExportFormat;
use crate::effects::catalog::Effect;
use crate::effects::trim::{TrimBounds, TrimOptions, trim};
use crate::foundation::core::{BlendMode, FilterId, LayerId, ObjectId};
use crate::foundation::error::{EaselError, EaselResult};
use crate::history::stack::HistoryStack;
use crate::layers::manager::LayerManager;
use crate::layers::model::{FilterSpec, LayerMetadata, LayerPatch, LayerTable};
use crate::layers::renderer::{apply_all, apply_filters_to_object, apply_layer_to_object};
use crate::persist::store::{AssetStore, UploadReceipt};
use crate::scene::graph::{SceneGraph, SceneObject};
use crate::session::cache::BitmapCache;
use crate::session::config::EditorConfig;
use crate::session::document::EditorDocument;

/// One undo step: the serialized scene plus the layer table that went with it.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    /// Output of [`SceneGraph::to_snapshot`].
    pub scene: String,
    /// Layer metadata at the same moment.
    pub layers: LayerTable,
}

/// Scene-graph editing session with layer metadata and linear undo.
#[derive(Debug)]
pub struct EditorSession<S: SceneGraph> {
    scene: S,
    layers: LayerManager,
    history: HistoryStack<HistoryEntry>,
    cache: BitmapCache,
    config: EditorConfig,
}

impl<S: SceneGraph> EditorSession<S> {
    /// Take ownership of `scene`, build layers for its objects and record the
    /// initial history entry.
    pub fn attach(scene: S, config: EditorConfig) -> EaselResult<Self> {
        let config = config.normalized();
        let mut session = Self {
            scene,
            layers: LayerManager::new(),
            history: HistoryStack::new(config.history_capacity),
            cache: BitmapCache::new(config.cache_capacity),
            config,
        };
        session.resync()?;
        let entry = session.capture()?;
        session.history.save(entry);
        tracing::debug!(layers = session.layers.len(), "attached editor session");
        Ok(session)
    }

    /// The scene graph.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Layer metadata.
    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    /// Layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&LayerMetadata> {
        self.layers.get_layer(id)
    }

    /// Undo history.
    pub fn history(&self) -> &HistoryStack<HistoryEntry> {
        &self.history
    }

    /// Decoded-bitmap cache.
    pub fn cache(&self) -> &BitmapCache {
        &self.cache
    }

    /// Settings this session was attached with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Give the scene back, dropping layers and history.
    pub fn into_scene(self) -> S {
        self.scene
    }

    fn capture(&self) -> EaselResult<HistoryEntry> {
        Ok(HistoryEntry {
            scene: self.scene.to_snapshot()?,
            layers: self.layers.snapshot(),
        })
    }

    /// Run `op`, then record a history entry if anything changed.
    ///
    /// On error the scene and layers are put back to the current entry.
    fn commit<R>(&mut self, op: impl FnOnce(&mut Self) -> EaselResult<R>) -> EaselResult<R> {
        match op(self) {
            Ok(out) => {
                let entry = match self.capture() {
                    Ok(entry) => entry,
                    Err(err) => {
                        self.rollback();
                        return Err(err);
                    }
                };
                if self.history.current() != Some(&entry) {
                    self.history.save(entry);
                }
                Ok(out)
            }
            Err(err) => {
                self.rollback();
                Err(err)
            }
        }
    }

    fn rollback(&mut self) {
        let Some(current) = self.history.current().cloned() else {
            return;
        };
        if self.capture().is_ok_and(|now| now == current) {
            return;
        }
        if let Err(err) = restore_entry(&mut self.scene, &mut self.layers, &current) {
            tracing::warn!(%err, "rollback to current history entry failed");
        }
    }

    /// Create layers for new objects and drop layers of removed ones.
    fn resync(&mut self) -> EaselResult<()> {
        let report = self.layers.sync_with_scene_objects(&self.scene.objects());
        for id in report.created {
            self.push_layer(id)?;
        }
        Ok(())
    }

    /// Push the full layer state, filters included, onto its object.
    fn push_layer(&mut self, id: LayerId) -> EaselResult<()> {
        let layer = self
            .layers
            .get_layer(id)
            .ok_or_else(|| EaselError::not_found(format!("layer {id}")))?;
        if let Some(object) = self.scene.object_mut(layer.object_id) {
            apply_layer_to_object(object, layer)?;
        }
        Ok(())
    }

    /// Push opacity, visibility and blend mode only.
    fn push_properties(&mut self, id: LayerId) -> EaselResult<()> {
        let layer = self
            .layers
            .get_layer(id)
            .ok_or_else(|| EaselError::not_found(format!("layer {id}")))?;
        if let Some(object) = self.scene.object_mut(layer.object_id) {
            object.set_opacity(layer.opacity / 100.0);
            object.set_visible(layer.visible);
            object.set_blend_mode(layer.blend_mode);
        }
        Ok(())
    }

    /// Re-run the layer's filter chain on its object.
    fn push_filters(&mut self, id: LayerId) -> EaselResult<()> {
        let layer = self
            .layers
            .get_layer(id)
            .ok_or_else(|| EaselError::not_found(format!("layer {id}")))?;
        if let Some(object) = self.scene.object_mut(layer.object_id) {
            apply_filters_to_object(object, &layer.filters)?;
        }
        Ok(())
    }

    /// Add a drawable on top of the stack and give it a layer.
    pub fn add_object(&mut self, drawable: S::Drawable) -> EaselResult<(ObjectId, LayerId)> {
        self.commit(|s| {
            let object = s.scene.add_object(drawable)?;
            s.resync()?;
            let layer = s
                .layers
                .get_layer_by_object(object)
                .map(|l| l.id)
                .ok_or_else(|| EaselError::not_found(format!("layer for {object}")))?;
            Ok((object, layer))
        })
    }

    /// Remove an object and its layer.
    pub fn remove_object(&mut self, object: ObjectId) -> EaselResult<()> {
        self.commit(|s| {
            s.scene.remove_object(object)?;
            s.resync()
        })
    }

    /// Mutate the scene directly, then reconcile layers and record history.
    pub fn edit_scene<R>(&mut self, edit: impl FnOnce(&mut S) -> EaselResult<R>) -> EaselResult<R> {
        self.commit(|s| {
            let out = edit(&mut s.scene)?;
            s.resync()?;
            Ok(out)
        })
    }

    /// Set opacity in percent (clamped to `0..=100`).
    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f64) -> EaselResult<()> {
        self.commit(|s| {
            s.layers.set_opacity(id, opacity)?;
            s.push_properties(id)
        })
    }

    /// Show or hide a layer.
    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> EaselResult<()> {
        self.update_layer(
            id,
            LayerPatch {
                visible: Some(visible),
                ..LayerPatch::default()
            },
        )
    }

    /// Flip visibility; returns the new state.
    pub fn toggle_layer_visibility(&mut self, id: LayerId) -> EaselResult<bool> {
        self.commit(|s| {
            let visible = s.layers.toggle_visibility(id)?;
            s.push_properties(id)?;
            Ok(visible)
        })
    }

    /// Change the composite operation.
    pub fn set_layer_blend_mode(&mut self, id: LayerId, mode: BlendMode) -> EaselResult<()> {
        self.commit(|s| {
            s.layers.set_blend_mode(id, mode)?;
            s.push_properties(id)
        })
    }

    /// Rename a layer.
    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> EaselResult<()> {
        self.update_layer(
            id,
            LayerPatch {
                name: Some(name.into()),
                ..LayerPatch::default()
            },
        )
    }

    /// Lock or unlock a layer.
    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> EaselResult<()> {
        self.update_layer(
            id,
            LayerPatch {
                locked: Some(locked),
                ..LayerPatch::default()
            },
        )
    }

    /// Apply a partial update and push the result onto the object.
    ///
    /// `order` changes the layer panel ordering only; use the z-order moves to
    /// restack the scene itself.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> EaselResult<()> {
        let filters_changed = patch.filters.is_some();
        self.commit(|s| {
            s.layers.update_layer(id, patch)?;
            if filters_changed {
                s.push_layer(id)
            } else {
                s.push_properties(id)
            }
        })
    }

    /// Put a layer inside a group layer, or back at top level with `None`.
    pub fn set_layer_parent(&mut self, id: LayerId, parent: Option<LayerId>) -> EaselResult<()> {
        self.commit(|s| s.layers.set_parent(id, parent))
    }

    /// Append a catalog effect to the layer's filter chain and re-run it.
    ///
    /// Unknown effect names are rejected here rather than skipped later.
    pub fn add_filter(
        &mut self,
        id: LayerId,
        name: &str,
        params: BTreeMap<String, f64>,
    ) -> EaselResult<FilterId> {
        Effect::parse(name, &params)?;
        self.commit(|s| {
            let filter = s.layers.add_filter(id, name, params)?;
            s.push_filters(id)?;
            Ok(filter)
        })
    }

    /// Drop one filter and re-run the rest of the chain.
    pub fn remove_filter(&mut self, id: LayerId, filter: FilterId) -> EaselResult<FilterSpec> {
        self.commit(|s| {
            let removed = s.layers.remove_filter(id, filter)?;
            s.push_filters(id)?;
            Ok(removed)
        })
    }

    /// Merge new parameter values into a filter and re-run the chain.
    pub fn update_filter(
        &mut self,
        id: LayerId,
        filter: FilterId,
        params: BTreeMap<String, f64>,
    ) -> EaselResult<()> {
        self.commit(|s| {
            s.layers.update_filter(id, filter, params)?;
            s.push_filters(id)
        })
    }

    fn restack(&mut self) {
        let order: Vec<ObjectId> = self.scene.objects().iter().map(|o| o.id).collect();
        self.layers.restack(&order);
    }

    /// Move one step up the stack.
    pub fn bring_forward(&mut self, object: ObjectId) -> EaselResult<()> {
        self.commit(|s| {
            s.scene.bring_forward(object)?;
            s.restack();
            Ok(())
        })
    }

    /// Move one step down the stack.
    pub fn send_backward(&mut self, object: ObjectId) -> EaselResult<()> {
        self.commit(|s| {
            s.scene.send_backward(object)?;
            s.restack();
            Ok(())
        })
    }

    /// Move to the top of the stack.
    pub fn bring_to_front(&mut self, object: ObjectId) -> EaselResult<()> {
        self.commit(|s| {
            s.scene.bring_to_front(object)?;
            s.restack();
            Ok(())
        })
    }

    /// Move to the bottom of the stack.
    pub fn send_to_back(&mut self, object: ObjectId) -> EaselResult<()> {
        self.commit(|s| {
            s.scene.send_to_back(object)?;
            s.restack();
            Ok(())
        })
    }

    /// Bake `effect` into an image object's source pixels.
    ///
    /// Returns `false` without touching history when the object has no pixels
    /// to edit.
    #[tracing::instrument(skip(self, effect), fields(effect = effect.key()))]
    pub fn apply_effect(&mut self, object: ObjectId, effect: &Effect) -> EaselResult<bool> {
        self.commit(|s| {
            let node = s
                .scene
                .object_mut(object)
                .ok_or_else(|| EaselError::not_found(format!("scene {object}")))?;
            let kind = node.kind();
            let Some(target) = node.pixel_editable_mut() else {
                let err = EaselError::unsupported(kind.label());
                tracing::warn!(%object, %err, "effect not applied");
                return Ok(false);
            };
            let source = s.cache.decode(target.pixel_source())?;
            let edited = effect.apply(&source)?;
            target.replace_pixel_source(edited.encode(ExportFormat::Png)?)?;
            Ok(true)
        })
    }

    /// Crop an image object's source to its content.
    ///
    /// `None` options fall back to the session config. Returns `None` for
    /// objects without pixels.
    pub fn trim_image(
        &mut self,
        object: ObjectId,
        options: Option<TrimOptions>,
    ) -> EaselResult<Option<TrimBounds>> {
        let options = options.unwrap_or(self.config.trim);
        self.commit(|s| {
            let node = s
                .scene
                .object_mut(object)
                .ok_or_else(|| EaselError::not_found(format!("scene {object}")))?;
            let kind = node.kind();
            let Some(target) = node.pixel_editable_mut() else {
                let err = EaselError::unsupported(kind.label());
                tracing::warn!(%object, %err, "trim not applied");
                return Ok(None);
            };
            let source = s.cache.decode(target.pixel_source())?;
            let (trimmed, bounds) = trim(&source, options)?;
            if trimmed.width() != source.width() || trimmed.height() != source.height() {
                target.replace_pixel_source(trimmed.encode(ExportFormat::Png)?)?;
            }
            Ok(Some(bounds))
        })
    }

    /// `true` when there is an older entry to go back to.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// `true` when an undone entry can be re-applied.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one entry. `Ok(false)` at the oldest entry.
    ///
    /// If the restore fails the cursor stays put and the live state is
    /// returned to the current entry.
    pub fn undo(&mut self) -> EaselResult<bool> {
        let Self {
            scene,
            layers,
            history,
            ..
        } = &mut *self;
        let moved = history.undo_with(|entry| restore_entry(scene, layers, entry));
        self.settle("undo", moved)
    }

    /// Step forward one entry. `Ok(false)` at the newest entry.
    pub fn redo(&mut self) -> EaselResult<bool> {
        let Self {
            scene,
            layers,
            history,
            ..
        } = &mut *self;
        let moved = history.redo_with(|entry| restore_entry(scene, layers, entry));
        self.settle("redo", moved)
    }

    fn settle(&mut self, op: &'static str, moved: EaselResult<bool>) -> EaselResult<bool> {
        match moved {
            Ok(moved) => {
                if moved {
                    tracing::debug!(op, cursor = ?self.history.cursor(), "restored history entry");
                }
                Ok(moved)
            }
            Err(err) => {
                self.rollback();
                Err(err)
            }
        }
    }

    /// Rasterise the scene.
    pub fn render(&self) -> EaselResult<BitmapBuffer> {
        self.scene.render()
    }

    /// Render and encode. `None` uses the configured format.
    pub fn export_raster(&self, format: Option<ExportFormat>) -> EaselResult<Vec<u8>> {
        self.render()?.encode(format.unwrap_or(self.config.export))
    }

    /// Serialize scene and layers.
    pub fn export_document(&self) -> EaselResult<EditorDocument> {
        EditorDocument::new(&self.scene.to_snapshot()?, self.layers.snapshot())
    }

    /// Replace scene and layers with a saved document and start a fresh history.
    ///
    /// Nothing changes if the document fails to restore.
    #[tracing::instrument(skip(self, document), fields(layers = document.layers.layers.len()))]
    pub fn load_document(&mut self, document: &EditorDocument) -> EaselResult<()> {
        let entry = HistoryEntry {
            scene: document.scene_snapshot()?,
            layers: document.layers.clone(),
        };
        if let Err(err) = restore_entry(&mut self.scene, &mut self.layers, &entry) {
            self.rollback();
            return Err(err);
        }
        self.history.clear();
        let entry = self.capture()?;
        self.history.save(entry);
        Ok(())
    }

    /// Upload the rendered PNG with the document as its sidecar.
    pub fn publish(&self, store: &mut dyn AssetStore, folder: &str) -> EaselResult<UploadReceipt> {
        let png = self.export_raster(Some(ExportFormat::Png))?;
        let json = self.export_document()?.to_json_string()?;
        let receipt = store.upload(&png, folder, Some(&json))?;
        tracing::debug!(asset_id = %receipt.asset_id, "published canvas");
        Ok(receipt)
    }
}

/// Replace scene and layers with `entry`. The layer table is checked before
/// the scene is touched.
fn restore_entry<S: SceneGraph>(
    scene: &mut S,
    layers: &mut LayerManager,
    entry: &HistoryEntry,
) -> EaselResult<()> {
    let mut restored = LayerManager::new();
    restored.restore(entry.layers.clone())?;
    scene.restore_from_snapshot(&entry.scene)?;
    restored.sync_with_scene_objects(&scene.objects());
    *layers = restored;
    apply_all(scene, layers)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
