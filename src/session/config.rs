use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::bitmap::codec::ExportFormat;
use crate::effects::trim::TrimOptions;
use crate::foundation::error::EaselResult;
use crate::history::stack::DEFAULT_HISTORY_CAPACITY;

/// Default number of decoded bitmaps a session keeps around.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Per-session editor settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum retained history entries. Values below 1 become 1.
    pub history_capacity: usize,
    /// Format used by `export_raster` when none is given.
    pub export: ExportFormat,
    /// Options used by `trim_image` when none are given.
    pub trim: TrimOptions,
    /// Decoded bitmaps kept by the session cache.
    pub cache_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            export: ExportFormat::default(),
            trim: TrimOptions::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> EaselResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        Ok(cfg.normalized())
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> EaselResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read editor config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Clamp out-of-range values.
    pub fn normalized(mut self) -> Self {
        self.history_capacity = self.history_capacity.max(1);
        if let ExportFormat::Jpeg { quality } = &mut self.export {
            *quality = (*quality).clamp(1, 100);
        }
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
