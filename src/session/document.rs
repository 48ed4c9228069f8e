//! Serialized scene format: scene snapshot plus the layer table, keyed by object id.

use serde::{Deserialize, Serialize};

use crate::foundation::error::{EaselError, EaselResult};
use crate::layers::model::LayerTable;

/// Document format version written by this crate.
pub const DOCUMENT_VERSION: u32 = 1;

/// A saved editing session.
///
/// `scene` is whatever the scene graph produced from `to_snapshot`, embedded
/// as JSON rather than as an escaped string. `layers` carries the layer
/// metadata out of band, each layer naming the object it annotates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorDocument {
    /// Must equal [`DOCUMENT_VERSION`].
    pub version: u32,
    /// Scene snapshot.
    pub scene: serde_json::Value,
    /// Layer metadata.
    pub layers: LayerTable,
}

impl EditorDocument {
    /// Wrap a scene snapshot string and a layer table.
    pub fn new(scene_snapshot: &str, layers: LayerTable) -> EaselResult<Self> {
        Ok(Self {
            version: DOCUMENT_VERSION,
            scene: serde_json::from_str(scene_snapshot)?,
            layers,
        })
    }

    /// Parse and version-check.
    pub fn from_json_str(json: &str) -> EaselResult<Self> {
        let doc: Self = serde_json::from_str(json)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(EaselError::validation(format!(
                "unsupported document version {} (expected {DOCUMENT_VERSION})",
                doc.version
            )));
        }
        Ok(doc)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> EaselResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The scene part as snapshot text for `restore_from_snapshot`.
    pub fn scene_snapshot(&self) -> EaselResult<String> {
        Ok(serde_json::to_string(&self.scene)?)
    }
}
