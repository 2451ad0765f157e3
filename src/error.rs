//! Error types for polysmooth.
//!
//! Only structural problems are errors. Degenerate or inverted polygons are a
//! property of the geometry and are reported through
//! [`MeshQuality`](crate::quality::MeshQuality) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building, loading, saving or smoothing meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no polygons.
    #[error("mesh has no polygons")]
    EmptyMesh,

    /// A polygon references a node index that does not exist.
    #[error("polygon {polygon} references invalid node index {node}")]
    InvalidNodeIndex {
        /// The polygon index.
        polygon: usize,
        /// The invalid node index.
        node: usize,
    },

    /// A polygon has fewer than three nodes.
    #[error("polygon {polygon} has {count} nodes, at least 3 are required")]
    TooFewNodes {
        /// The polygon index.
        polygon: usize,
        /// Number of nodes found.
        count: usize,
    },

    /// A polygon lists the same node more than once.
    #[error("polygon {polygon} references node {node} more than once")]
    DuplicateNode {
        /// The polygon index.
        polygon: usize,
        /// The repeated node index.
        node: usize,
    },

    /// A fixed-node index does not correspond to an existing node.
    #[error("fixed node index {node} is out of range")]
    InvalidFixedNode {
        /// The invalid node index.
        node: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path} (line {line}): {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// 1-based line number where parsing failed, 0 if not line related.
        line: usize,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a load error for a specific line of a file.
    pub(crate) fn load_at(path: &std::path::Path, line: usize, message: impl Into<String>) -> Self {
        MeshError::LoadError {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    /// Create a save error for a file.
    pub(crate) fn save_at(path: &std::path::Path, message: impl std::fmt::Display) -> Self {
        MeshError::SaveError {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_message() {
        let err = MeshError::invalid_param("tolerance", -1.0, "must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid parameter: tolerance = -1 (must be non-negative)"
        );
    }

    #[test]
    fn test_structural_messages() {
        let err = MeshError::TooFewNodes { polygon: 3, count: 2 };
        assert_eq!(err.to_string(), "polygon 3 has 2 nodes, at least 3 are required");

        let err = MeshError::load_at(std::path::Path::new("a.obj"), 7, "bad vertex");
        assert_eq!(err.to_string(), "failed to load mesh from a.obj (line 7): bad vertex");
    }
}
