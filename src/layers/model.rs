use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{BlendMode, FilterId, LayerId, ObjectId, ObjectKind};

/// One entry of a layer's filter chain: a catalog effect name plus loose parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Identifier unique within the owning manager.
    pub id: FilterId,
    /// Effect catalog key.
    pub name: String,
    /// Parameter overrides; missing keys take the catalog defaults.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

/// Editor-side metadata for one scene object.
///
/// The scene object itself is owned by the scene graph; `object_id` is a
/// lookup key only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMetadata {
    /// Stable layer id.
    pub id: LayerId,
    /// Scene object this layer annotates.
    pub object_id: ObjectId,
    /// Display name.
    pub name: String,
    /// Kind of the annotated object.
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Drawn when `true`.
    pub visible: bool,
    /// Locked layers are shown but not editable from the UI.
    pub locked: bool,
    /// Opacity in percent, `0..=100`.
    pub opacity: f64,
    /// Composite operation.
    pub blend_mode: BlendMode,
    /// Filter chain, applied in list order.
    pub filters: Vec<FilterSpec>,
    /// Z-order; larger is closer to the top.
    pub order: i64,
    /// Enclosing group layer, if any.
    pub parent_id: Option<LayerId>,
    /// Whether this layer groups others.
    pub is_group: bool,
    /// Child layers of a group, in insertion order.
    pub children: Vec<LayerId>,
}

/// Partial update for [`crate::LayerManager::update_layer`]. `None` leaves a field as is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerPatch {
    /// New display name.
    pub name: Option<String>,
    /// New visibility.
    pub visible: Option<bool>,
    /// New lock state.
    pub locked: Option<bool>,
    /// New opacity (clamped to `0..=100`).
    pub opacity: Option<f64>,
    /// New blend mode.
    pub blend_mode: Option<BlendMode>,
    /// New z-order; goes through `reorder`.
    pub order: Option<i64>,
    /// Replacement filter chain.
    pub filters: Option<Vec<FilterSpec>>,
}

/// Serialisable copy of a manager's full state: layers plus id counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerTable {
    /// Every layer, in id order.
    pub layers: Vec<LayerMetadata>,
    /// Next layer id to issue.
    pub next_layer_id: u64,
    /// Next filter id to issue.
    pub next_filter_id: u64,
}

impl LayerTable {
    /// Layer annotating `object`, if any.
    pub fn layer_for(&self, object: ObjectId) -> Option<&LayerMetadata> {
        self.layers.iter().find(|l| l.object_id == object)
    }
}
