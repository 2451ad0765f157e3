//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Fixed nodes |
//! |--------|-----------|-------------|
//! | Wavefront OBJ | `.obj` | boundary nodes on load, not stored |
//! | Medit | `.mesh` | `FixedNodes` section |
//!
//! # Usage
//!
//! The format is picked from the file extension:
//!
//! ```no_run
//! use polysmooth::io::{load, save};
//! use polysmooth::mesh::PolygonalMesh;
//!
//! let mesh: PolygonalMesh = load("domain.obj").unwrap();
//! save(&mesh, "domain.mesh").unwrap();
//! ```
//!
//! Format-specific functions are available as well:
//!
//! ```no_run
//! use polysmooth::io::medit;
//! use polysmooth::mesh::PolygonalMesh;
//!
//! let mesh: PolygonalMesh = medit::load("domain.mesh").unwrap();
//! medit::save(&mesh, "copy.mesh").unwrap();
//! ```

pub mod medit;
pub mod obj;

use std::path::Path;

use log::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolygonalMesh};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// Medit `.mesh` format.
    Medit,
}

/// Reader and writer of one format.
struct Codec<I: MeshIndex> {
    read: fn(&Path) -> Result<PolygonalMesh<I>>,
    write: fn(&PolygonalMesh<I>, &Path) -> Result<()>,
}

impl Format {
    /// All supported formats.
    pub const ALL: [Format; 2] = [Format::Obj, Format::Medit];

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "mesh" => Some(Format::Medit),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Like [`from_path`](Self::from_path), but an unknown extension is an error.
    pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Format> {
        let path = path.as_ref();
        Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        })
    }

    /// Canonical file extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Obj => "obj",
            Format::Medit => "mesh",
        }
    }

    fn codec<I: MeshIndex>(self) -> Codec<I> {
        match self {
            Format::Obj => Codec {
                read: obj::read_file::<I>,
                write: obj::write_file::<I>,
            },
            Format::Medit => Codec {
                read: medit::read_file::<I>,
                write: medit::write_file::<I>,
            },
        }
    }
}

/// Load a mesh from a file with automatic format detection.
///
/// # Errors
/// [`MeshError::UnsupportedFormat`] for unknown extensions, otherwise any
/// I/O, parse or mesh construction error.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<PolygonalMesh<I>> {
    let path = path.as_ref();
    let format = Format::resolve(path)?;
    let mesh = (format.codec::<I>().read)(path)?;
    debug!(
        "Loaded {} ({} nodes, {} polygons)",
        path.display(),
        mesh.num_nodes(),
        mesh.num_polygons()
    );
    Ok(mesh)
}

/// Save a mesh to a file with automatic format detection.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &PolygonalMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = Format::resolve(path)?;
    (format.codec::<I>().write)(mesh, path)?;
    debug!("Saved {}", path.display());
    Ok(())
}
