use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{EaselError, EaselResult};
use crate::persist::store::{AssetStore, UploadReceipt, asset_id_for, normalize_folder};

/// Asset store rooted at a directory.
///
/// An upload writes `<root>/<asset_id>.png` and, when a scene is attached,
/// `<root>/<asset_id>.json` next to it.
#[derive(Clone, Debug)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    /// Store writing below `root`. The directory is created on first upload.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, asset_id: &str) -> EaselResult<(PathBuf, PathBuf)> {
        let rel = normalize_folder(asset_id)?;
        if rel.is_empty() {
            return Err(EaselError::validation("asset id must be non-empty"));
        }
        let base = self.root.join(rel);
        Ok((base.with_extension("png"), base.with_extension("json")))
    }
}

impl AssetStore for FsAssetStore {
    fn upload(
        &mut self,
        encoded: &[u8],
        folder: &str,
        scene_json: Option<&str>,
    ) -> EaselResult<UploadReceipt> {
        let folder = normalize_folder(folder)?;
        let asset_id = asset_id_for(&folder, encoded);
        let (raster, sidecar) = self.paths(&asset_id)?;

        if let Some(parent) = raster.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create asset folder '{}'", parent.display()))?;
        }
        std::fs::write(&raster, encoded)
            .with_context(|| format!("write asset '{}'", raster.display()))?;
        if let Some(json) = scene_json {
            std::fs::write(&sidecar, json)
                .with_context(|| format!("write scene sidecar '{}'", sidecar.display()))?;
        }

        tracing::debug!(%asset_id, path = %raster.display(), "stored asset on disk");
        Ok(UploadReceipt {
            url: format!("file://{}", raster.display()),
            asset_id,
        })
    }

    fn delete(&mut self, asset_id: &str) -> EaselResult<()> {
        let (raster, sidecar) = self.paths(asset_id)?;
        if !raster.is_file() {
            return Err(EaselError::not_found(format!("asset '{asset_id}'")));
        }
        std::fs::remove_file(&raster)
            .with_context(|| format!("remove asset '{}'", raster.display()))?;
        if sidecar.is_file() {
            std::fs::remove_file(&sidecar)
                .with_context(|| format!("remove scene sidecar '{}'", sidecar.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/persist/fs.rs"]
mod tests;
