//! Versioned JSON snapshot of an in-memory [`Scene`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{EaselError, EaselResult};
use crate::scene::memory::{Scene, SceneNode};

/// Snapshot format version written by this crate.
pub const SCENE_SNAPSHOT_VERSION: u32 = 1;

/// Full serialised scene: canvas, id counter and every object bottom to top.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    /// Format version; must equal [`SCENE_SNAPSHOT_VERSION`].
    pub version: u32,
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Canvas background.
    pub background: Rgba8,
    /// Next object id the scene will issue.
    pub next_id: u64,
    /// Objects, bottom to top.
    pub objects: Vec<SceneNode>,
}

impl SceneSnapshot {
    pub(crate) fn of(scene: &Scene) -> Self {
        Self {
            version: SCENE_SNAPSHOT_VERSION,
            width: scene.width,
            height: scene.height,
            background: scene.background,
            next_id: scene.next_id,
            objects: scene.nodes.clone(),
        }
    }

    /// Structural checks that do not need to decode images.
    pub fn validate(&self) -> EaselResult<()> {
        if self.version != SCENE_SNAPSHOT_VERSION {
            return Err(EaselError::validation(format!(
                "unsupported snapshot version {} (expected {SCENE_SNAPSHOT_VERSION})",
                self.version
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(EaselError::validation("snapshot canvas must be non-empty"));
        }

        let mut seen = HashSet::new();
        for node in &self.objects {
            if !seen.insert(node.id) {
                return Err(EaselError::validation(format!("duplicate object id {}", node.id)));
            }
            if node.id.get() >= self.next_id {
                return Err(EaselError::validation(format!(
                    "object id {} is not below next id {}",
                    node.id, self.next_id
                )));
            }
            if !(0.0..=1.0).contains(&node.opacity) {
                return Err(EaselError::validation(format!(
                    "object {} opacity {} outside [0, 1]",
                    node.id, node.opacity
                )));
            }
        }
        Ok(())
    }
}

/// Serde adapter storing byte blobs as standard base64 strings.
pub(crate) mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: impl AsRef<[u8]>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        STANDARD.decode(text.as_bytes()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/snapshot.rs"]
mod tests;
