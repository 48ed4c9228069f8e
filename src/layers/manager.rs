//! Layer metadata store, decoupled from the scene objects it annotates.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::foundation::core::{BlendMode, FilterId, LayerId, ObjectId, ObjectKind};
use crate::foundation::error::{EaselError, EaselResult};
use crate::foundation::math::clamp_param;
use crate::layers::model::{FilterSpec, LayerMetadata, LayerPatch, LayerTable};
use crate::scene::graph::SceneObjectInfo;

/// Largest accepted `order` magnitude. Keeps the `+ 1` shifts far from overflow.
pub const MAX_LAYER_ORDER: i64 = 1 << 48;

/// Result of [`LayerManager::sync_with_scene_objects`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Layers created for objects that had none.
    pub created: Vec<LayerId>,
    /// Layers dropped because their object is gone.
    pub removed: Vec<LayerId>,
    /// Layers whose `order` was bumped to break a tie.
    pub reordered: Vec<LayerId>,
}

impl SyncReport {
    /// `true` when the sync changed nothing.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty() && self.reordered.is_empty()
    }
}

/// Owns every [`LayerMetadata`] of a session, keyed by [`LayerId`].
#[derive(Clone, Debug)]
pub struct LayerManager {
    layers: BTreeMap<LayerId, LayerMetadata>,
    next_layer_id: u64,
    next_filter_id: u64,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerManager {
    /// Empty manager; ids start at 1.
    pub fn new() -> Self {
        Self {
            layers: BTreeMap::new(),
            next_layer_id: 1,
            next_filter_id: 1,
        }
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// `true` when no layers exist.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn max_order(&self) -> Option<i64> {
        self.layers.values().map(|l| l.order).max()
    }

    fn layer_mut(&mut self, id: LayerId) -> EaselResult<&mut LayerMetadata> {
        self.layers
            .get_mut(&id)
            .ok_or_else(|| EaselError::not_found(format!("layer {id}")))
    }

    /// Create a layer for `object`, on top of every existing layer.
    ///
    /// The default name is `"<kind> #<n>"` where `n` is the numeric layer id.
    pub fn create_layer(
        &mut self,
        object: ObjectId,
        kind: ObjectKind,
        name: Option<&str>,
    ) -> LayerMetadata {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        let order = self.max_order().map_or(0, |m| m.saturating_add(1));

        let layer = LayerMetadata {
            id,
            object_id: object,
            name: name.map_or_else(|| format!("{} #{}", kind.label(), id.get()), str::to_owned),
            kind,
            visible: true,
            locked: false,
            opacity: 100.0,
            blend_mode: BlendMode::SourceOver,
            filters: Vec::new(),
            order,
            parent_id: None,
            is_group: kind == ObjectKind::Group,
            children: Vec::new(),
        };
        tracing::debug!(layer = %id, object = %object, order, "created layer");
        self.layers.insert(id, layer.clone());
        layer
    }

    /// Layer by id.
    pub fn get_layer(&self, id: LayerId) -> Option<&LayerMetadata> {
        self.layers.get(&id)
    }

    /// Layer annotating `object`. Linear scan.
    pub fn get_layer_by_object(&self, object: ObjectId) -> Option<&LayerMetadata> {
        self.layers.values().find(|l| l.object_id == object)
    }

    /// Apply a partial update. An `order` change goes through [`Self::reorder`].
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> EaselResult<()> {
        let LayerPatch {
            name,
            visible,
            locked,
            opacity,
            blend_mode,
            order,
            filters,
        } = patch;

        if let Some(order) = order {
            check_order(order)?;
        }
        let layer = self.layer_mut(id)?;
        if let Some(name) = name {
            layer.name = name;
        }
        if let Some(visible) = visible {
            layer.visible = visible;
        }
        if let Some(locked) = locked {
            layer.locked = locked;
        }
        if let Some(opacity) = opacity {
            layer.opacity = clamp_opacity(opacity, layer.opacity);
        }
        if let Some(mode) = blend_mode {
            layer.blend_mode = mode;
        }
        if let Some(filters) = filters {
            layer.filters = filters;
        }
        if let Some(order) = order {
            self.reorder(id, order)?;
        }
        Ok(())
    }

    /// Remove a layer, detaching it from its parent and orphaning its children.
    pub fn delete_layer(&mut self, id: LayerId) -> EaselResult<LayerMetadata> {
        let layer = self
            .layers
            .remove(&id)
            .ok_or_else(|| EaselError::not_found(format!("layer {id}")))?;
        if let Some(parent) = layer.parent_id.and_then(|p| self.layers.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        for child in &layer.children {
            if let Some(child) = self.layers.get_mut(child) {
                child.parent_id = None;
            }
        }
        tracing::debug!(layer = %id, "deleted layer");
        Ok(layer)
    }

    /// Set opacity in percent, clamped to `0..=100`.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f64) -> EaselResult<()> {
        let layer = self.layer_mut(id)?;
        layer.opacity = clamp_opacity(opacity, layer.opacity);
        Ok(())
    }

    /// Set the composite operation.
    pub fn set_blend_mode(&mut self, id: LayerId, mode: BlendMode) -> EaselResult<()> {
        self.layer_mut(id)?.blend_mode = mode;
        Ok(())
    }

    /// Flip visibility and return the new value.
    pub fn toggle_visibility(&mut self, id: LayerId) -> EaselResult<bool> {
        let layer = self.layer_mut(id)?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    /// Move a layer to `new_order`.
    ///
    /// If a sibling (same parent) already sits at `new_order`, every sibling at
    /// or above it moves up by one so orders stay unique. Orders beyond
    /// [`MAX_LAYER_ORDER`] are rejected.
    pub fn reorder(&mut self, id: LayerId, new_order: i64) -> EaselResult<()> {
        check_order(new_order)?;
        let parent = self
            .get_layer(id)
            .ok_or_else(|| EaselError::not_found(format!("layer {id}")))?
            .parent_id;

        let collides = self
            .layers
            .values()
            .any(|l| l.id != id && l.parent_id == parent && l.order == new_order);
        if collides {
            for l in self.layers.values_mut() {
                if l.id != id && l.parent_id == parent && l.order >= new_order {
                    l.order = l.order.saturating_add(1);
                }
            }
        }
        self.layer_mut(id)?.order = new_order;
        Ok(())
    }

    /// Append a filter to the layer's chain.
    pub fn add_filter(
        &mut self,
        id: LayerId,
        name: &str,
        params: BTreeMap<String, f64>,
    ) -> EaselResult<FilterId> {
        let filter_id = FilterId(self.next_filter_id);
        self.layer_mut(id)?.filters.push(FilterSpec {
            id: filter_id,
            name: name.to_owned(),
            params,
        });
        self.next_filter_id += 1;
        Ok(filter_id)
    }

    /// Remove one filter from the chain.
    pub fn remove_filter(&mut self, id: LayerId, filter: FilterId) -> EaselResult<FilterSpec> {
        let layer = self.layer_mut(id)?;
        let pos = layer
            .filters
            .iter()
            .position(|f| f.id == filter)
            .ok_or_else(|| EaselError::not_found(format!("{filter} on layer {id}")))?;
        Ok(layer.filters.remove(pos))
    }

    /// Merge `params` into an existing filter's parameters.
    pub fn update_filter(
        &mut self,
        id: LayerId,
        filter: FilterId,
        params: BTreeMap<String, f64>,
    ) -> EaselResult<&FilterSpec> {
        let layer = self.layer_mut(id)?;
        let spec = layer
            .filters
            .iter_mut()
            .find(|f| f.id == filter)
            .ok_or_else(|| EaselError::not_found(format!("{filter} on layer {id}")))?;
        spec.params.extend(params);
        Ok(spec)
    }

    /// Layers ordered topmost first (`order` descending, ties by id).
    pub fn sorted_layers(&self) -> Vec<&LayerMetadata> {
        let mut out: Vec<_> = self.layers.values().collect();
        out.sort_by(|a, b| b.order.cmp(&a.order).then(a.id.cmp(&b.id)));
        out
    }

    /// Every layer in id order.
    pub fn all_layers(&self) -> impl Iterator<Item = &LayerMetadata> {
        self.layers.values()
    }

    /// Attach `id` under `parent`, or detach it with `None`.
    pub fn set_parent(&mut self, id: LayerId, parent: Option<LayerId>) -> EaselResult<()> {
        if !self.layers.contains_key(&id) {
            return Err(EaselError::not_found(format!("layer {id}")));
        }
        if let Some(p) = parent {
            if !self.layers.contains_key(&p) {
                return Err(EaselError::not_found(format!("layer {p}")));
            }
            // Walk up from the new parent; reaching `id` would make a cycle.
            let mut cursor = Some(p);
            while let Some(c) = cursor {
                if c == id {
                    return Err(EaselError::validation(format!(
                        "cannot parent {id} under its own descendant {p}"
                    )));
                }
                cursor = self.layers.get(&c).and_then(|l| l.parent_id);
            }
        }

        let old = self.layer_mut(id)?.parent_id.take();
        if let Some(old) = old.and_then(|o| self.layers.get_mut(&o)) {
            old.children.retain(|c| *c != id);
        }
        if let Some(p) = parent {
            let group = self.layer_mut(p)?;
            group.is_group = true;
            group.children.push(id);
        }
        self.layer_mut(id)?.parent_id = parent;
        Ok(())
    }

    /// Reconcile with the scene's current objects (bottom to top).
    ///
    /// Drops layers whose object is gone, creates layers for new objects, then
    /// makes every `order` distinct. Ties keep the object scanned first in
    /// place and bump the others upward. Running it twice in a row is a no-op.
    pub fn sync_with_scene_objects(&mut self, objects: &[SceneObjectInfo]) -> SyncReport {
        let mut report = SyncReport::default();
        let live: HashSet<ObjectId> = objects.iter().map(|o| o.id).collect();

        let stale: Vec<LayerId> = self
            .layers
            .values()
            .filter(|l| !live.contains(&l.object_id))
            .map(|l| l.id)
            .collect();
        for id in stale {
            if self.delete_layer(id).is_ok() {
                report.removed.push(id);
            }
        }

        for obj in objects {
            if self.get_layer_by_object(obj.id).is_none() {
                let layer = self.create_layer(obj.id, obj.kind, obj.name.as_deref());
                report.created.push(layer.id);
            }
        }

        report.reordered = self.make_orders_unique(objects.iter().map(|o| o.id));
        if !report.is_noop() {
            tracing::debug!(
                created = report.created.len(),
                removed = report.removed.len(),
                reordered = report.reordered.len(),
                "synced layers with scene"
            );
        }
        report
    }

    /// Break `order` ties by position in `scan`, then by id for unlisted layers.
    fn make_orders_unique(&mut self, scan: impl IntoIterator<Item = ObjectId>) -> Vec<LayerId> {
        let scan_pos: HashMap<ObjectId, usize> =
            scan.into_iter().enumerate().map(|(i, o)| (o, i)).collect();
        let mut by_order: Vec<(i64, usize, LayerId)> = self
            .layers
            .values()
            .map(|l| {
                let pos = scan_pos.get(&l.object_id).copied().unwrap_or(usize::MAX);
                (l.order, pos, l.id)
            })
            .collect();
        by_order.sort();

        let mut bumped = Vec::new();
        let mut prev: Option<i64> = None;
        for (order, _, id) in by_order {
            let next = match prev {
                Some(p) if order <= p => p.saturating_add(1),
                _ => order,
            };
            if next != order {
                if let Some(l) = self.layers.get_mut(&id) {
                    l.order = next;
                }
                bumped.push(id);
            }
            prev = Some(next);
        }
        bumped
    }

    /// Realign `order` with the scene stacking (`objects` bottom to top).
    ///
    /// Layers whose object is not listed keep their order relative to the rest.
    pub fn restack(&mut self, objects: &[ObjectId]) {
        for (pos, object) in objects.iter().enumerate() {
            if let Some(layer) = self.layers.values_mut().find(|l| l.object_id == *object) {
                layer.order = pos as i64;
            }
        }
        self.make_orders_unique(objects.iter().copied());
    }

    /// Drop every layer and reset the id counters.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.next_layer_id = 1;
        self.next_filter_id = 1;
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> LayerTable {
        LayerTable {
            layers: self.layers.values().cloned().collect(),
            next_layer_id: self.next_layer_id,
            next_filter_id: self.next_filter_id,
        }
    }

    /// Replace the full state. The table is checked before anything changes.
    pub fn restore(&mut self, table: LayerTable) -> EaselResult<()> {
        let mut layers = BTreeMap::new();
        let mut objects = HashSet::new();
        for layer in table.layers {
            if !objects.insert(layer.object_id) {
                return Err(EaselError::validation(format!(
                    "object {} is annotated by more than one layer",
                    layer.object_id
                )));
            }
            check_order(layer.order)?;
            if let Some(dup) = layers.insert(layer.id, layer) {
                return Err(EaselError::validation(format!("duplicate layer id {}", dup.id)));
            }
        }

        let max_layer = layers.keys().map(|id| id.get()).max().unwrap_or(0);
        let max_filter = layers
            .values()
            .flat_map(|l| l.filters.iter().map(|f| f.id.get()))
            .max()
            .unwrap_or(0);

        self.layers = layers;
        self.next_layer_id = table.next_layer_id.max(max_layer + 1);
        self.next_filter_id = table.next_filter_id.max(max_filter + 1);
        Ok(())
    }
}

fn check_order(order: i64) -> EaselResult<()> {
    if order.unsigned_abs() > MAX_LAYER_ORDER.unsigned_abs() {
        return Err(EaselError::validation(format!(
            "layer order {order} outside +/-{MAX_LAYER_ORDER}"
        )));
    }
    Ok(())
}

fn clamp_opacity(value: f64, current: f64) -> f64 {
    clamp_param(value, 0.0, 100.0, current)
}

#[cfg(test)]
#[path = "../../tests/unit/layers/manager.rs"]
mod tests;
