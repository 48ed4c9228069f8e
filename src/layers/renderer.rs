//! Pushes layer metadata onto scene objects.
//!
//! Stateless: every function reads a [`LayerMetadata`] and mutates the
//! matching scene object. Filter chains reach only objects that expose
//! [`PixelEditable`]; everything else is skipped without error.

use crate::effects::catalog::Effect;
use crate::foundation::core::FilterId;
use crate::foundation::error::{EaselError, EaselResult};
use crate::layers::manager::LayerManager;
use crate::layers::model::{FilterSpec, LayerMetadata};
use crate::scene::graph::{PixelEditable, SceneGraph, SceneObject};

/// Resolve filter specs against the effect catalog. Unknown names are skipped.
pub fn build_filter_chain(filters: &[FilterSpec]) -> Vec<Effect> {
    filters
        .iter()
        .filter_map(|spec| match Effect::parse(&spec.name, &spec.params) {
            Ok(effect) => Some(effect),
            Err(err) => {
                tracing::warn!(filter = %spec.id, name = %spec.name, %err, "skipping filter");
                None
            }
        })
        .collect()
}

fn run_chain(target: &mut dyn PixelEditable, filters: &[FilterSpec]) -> EaselResult<()> {
    target.set_filter_chain(build_filter_chain(filters));
    target.apply_filter_chain()
}

/// Copy opacity, visibility and blend mode onto `object`, then rebuild its
/// filter chain if it supports one.
pub fn apply_layer_to_object<O>(object: &mut O, layer: &LayerMetadata) -> EaselResult<()>
where
    O: SceneObject + ?Sized,
{
    object.set_opacity(layer.opacity / 100.0);
    object.set_visible(layer.visible);
    object.set_blend_mode(layer.blend_mode);
    apply_filters_to_object(object, &layer.filters)?;
    Ok(())
}

/// Replace the object's filter chain with `filters` and run it.
///
/// Returns `false` (and does nothing) when the object is not pixel-editable.
pub fn apply_filters_to_object<O>(object: &mut O, filters: &[FilterSpec]) -> EaselResult<bool>
where
    O: SceneObject + ?Sized,
{
    let id = object.id();
    match object.pixel_editable_mut() {
        Some(target) => {
            run_chain(target, filters)?;
            Ok(true)
        }
        None => {
            if !filters.is_empty() {
                let err = EaselError::unsupported(object.kind().label());
                tracing::debug!(object = %id, %err, "filter chain not applied");
            }
            Ok(false)
        }
    }
}

/// Clear the chain and re-run it, restoring the unfiltered source.
pub fn remove_filters_from_object<O>(object: &mut O) -> EaselResult<bool>
where
    O: SceneObject + ?Sized,
{
    apply_filters_to_object(object, &[])
}

/// Re-apply after one filter of `layer` changed.
///
/// The whole chain is rebuilt so positions stay in step with the layer's list.
pub fn update_filter_on_object<O>(
    object: &mut O,
    layer: &LayerMetadata,
    filter: FilterId,
) -> EaselResult<bool>
where
    O: SceneObject + ?Sized,
{
    if !layer.filters.iter().any(|f| f.id == filter) {
        return Err(EaselError::not_found(format!("{filter} on layer {}", layer.id)));
    }
    apply_filters_to_object(object, &layer.filters)
}

/// Apply every layer to its object. Layers whose object is missing are skipped.
///
/// Returns how many objects were updated.
pub fn apply_all<S: SceneGraph>(scene: &mut S, layers: &LayerManager) -> EaselResult<usize> {
    let mut applied = 0;
    for layer in layers.all_layers() {
        if let Some(object) = scene.object_mut(layer.object_id) {
            apply_layer_to_object(object, layer)?;
            applied += 1;
        }
    }
    Ok(applied)
}

#[cfg(test)]
#[path = "../../tests/unit/layers/renderer.rs"]
mod tests;
