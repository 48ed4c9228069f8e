//! Persistence collaborator: where finished rasters go.

use std::collections::BTreeMap;

use xxhash_rust::xxh3::xxh3_64;

use crate::foundation::error::{EaselError, EaselResult};

/// What an [`AssetStore`] hands back after a successful upload.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Identifier accepted by [`AssetStore::delete`].
    pub asset_id: String,
    /// Where the raster can be fetched from.
    pub url: String,
}

/// Destination for encoded rasters plus an optional serialized-scene sidecar.
///
/// The engine never interprets folders beyond normalising them.
pub trait AssetStore {
    /// Store `encoded` (a complete PNG/JPEG file) under `folder`.
    fn upload(
        &mut self,
        encoded: &[u8],
        folder: &str,
        scene_json: Option<&str>,
    ) -> EaselResult<UploadReceipt>;

    /// Remove a previously uploaded asset and its sidecar.
    fn delete(&mut self, asset_id: &str) -> EaselResult<()>;
}

/// Normalise a folder path to forward slashes without empty or `.` segments.
///
/// Absolute paths and `..` segments are refused. An empty result means the
/// store root.
pub fn normalize_folder(folder: &str) -> EaselResult<String> {
    let s = folder.replace('\\', "/");
    if s.starts_with('/') {
        return Err(EaselError::validation("asset folders must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(EaselError::validation("asset folders must not contain '..'"));
        }
        out.push(part);
    }
    Ok(out.join("/"))
}

/// Content-addressed id: `<folder>/<xxh3 of bytes>`.
pub(crate) fn asset_id_for(folder: &str, encoded: &[u8]) -> String {
    let digest = format!("{:016x}", xxh3_64(encoded));
    if folder.is_empty() {
        digest
    } else {
        format!("{folder}/{digest}")
    }
}

/// One asset held by [`MemoryAssetStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAsset {
    /// Encoded raster.
    pub encoded: Vec<u8>,
    /// Serialized-scene sidecar, if one was uploaded.
    pub scene_json: Option<String>,
}

/// Asset store that keeps everything in a map. Useful for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: BTreeMap<String, StoredAsset>,
}

impl MemoryAssetStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored asset by id.
    pub fn get(&self, asset_id: &str) -> Option<&StoredAsset> {
        self.assets.get(asset_id)
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    fn upload(
        &mut self,
        encoded: &[u8],
        folder: &str,
        scene_json: Option<&str>,
    ) -> EaselResult<UploadReceipt> {
        let folder = normalize_folder(folder)?;
        let asset_id = asset_id_for(&folder, encoded);
        self.assets.insert(
            asset_id.clone(),
            StoredAsset {
                encoded: encoded.to_vec(),
                scene_json: scene_json.map(str::to_owned),
            },
        );
        tracing::debug!(%asset_id, bytes = encoded.len(), "stored asset in memory");
        Ok(UploadReceipt {
            url: format!("memory://{asset_id}"),
            asset_id,
        })
    }

    fn delete(&mut self, asset_id: &str) -> EaselResult<()> {
        self.assets
            .remove(asset_id)
            .map(|_| ())
            .ok_or_else(|| EaselError::not_found(format!("asset '{asset_id}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/persist/store.rs"]
mod tests;
