/// Convenience result type used across Easel.
pub type EaselResult<T> = Result<T, EaselError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum EaselError {
    /// Pixel coordinate or rectangle outside the bitmap. Always a caller bug.
    #[error("out of bounds: ({x}, {y}) is outside {width}x{height} bitmap")]
    OutOfBounds {
        /// Requested column.
        x: u64,
        /// Requested row.
        y: u64,
        /// Bitmap width.
        width: u32,
        /// Bitmap height.
        height: u32,
    },

    /// Zero-area bitmap handed to an effect.
    #[error("empty buffer: effect requires a bitmap with non-zero area")]
    EmptyBuffer,

    /// Pixel operation requested on an object that has no pixel source.
    #[error("unsupported object type: '{0}' has no pixel source")]
    UnsupportedObjectType(String),

    /// Malformed or foreign snapshot; the live scene was left untouched.
    #[error("snapshot restore failed: {0}")]
    SnapshotRestore(String),

    /// Unknown layer, filter or object handle.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from codecs or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EaselError {
    /// Build an [`EaselError::OutOfBounds`] value.
    pub fn out_of_bounds(x: impl Into<u64>, y: impl Into<u64>, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x: x.into(),
            y: y.into(),
            width,
            height,
        }
    }

    /// Build an [`EaselError::UnsupportedObjectType`] value.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedObjectType(kind.into())
    }

    /// Build an [`EaselError::SnapshotRestore`] value.
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::SnapshotRestore(msg.into())
    }

    /// Build an [`EaselError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build an [`EaselError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`EaselError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for EaselError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
