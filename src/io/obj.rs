//! Wavefront OBJ format support.
//!
//! Only `v` and `f` records are used. Vertices are read as `v x y [z]`, the
//! z coordinate is dropped. Face entries may take the `i`, `i/t`, `i//n` or
//! `i/t/n` forms and may be negative, counting back from the last vertex
//! read. All other records are skipped.
//!
//! OBJ has no notion of fixed nodes, so nodes on the mesh boundary (edges
//! used by a single polygon) are fixed on load.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{trace, warn};
use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::mesh::{boundary_nodes, build_from_nodes, MeshIndex, Node, PolygonalMesh};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use polysmooth::io::obj;
/// use polysmooth::mesh::PolygonalMesh;
///
/// let mesh: PolygonalMesh = obj::load("domain.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<PolygonalMesh<I>> {
    read_file(path.as_ref())
}

/// Save a mesh to an OBJ file. Fixed flags are not stored.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &PolygonalMesh<I>, path: P) -> Result<()> {
    write_file(mesh, path.as_ref())
}

pub(crate) fn read_file<I: MeshIndex>(path: &Path) -> Result<PolygonalMesh<I>> {
    let file = File::open(path)?;
    parse(BufReader::new(file), path)
}

pub(crate) fn write_file<I: MeshIndex>(mesh: &PolygonalMesh<I>, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| MeshError::save_at(path, e))?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Parse OBJ text. `path` is only used in error messages.
pub(crate) fn parse<R: BufRead, I: MeshIndex>(reader: R, path: &Path) -> Result<PolygonalMesh<I>> {
    let mut positions: Vec<Point2<f64>> = Vec::new();
    let mut polygons: Vec<Vec<usize>> = Vec::new();
    let mut dropped_z = false;

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_index + 1;
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let coords: Vec<&str> = parts.collect();
                if coords.len() < 2 {
                    return Err(MeshError::load_at(path, line_number, "vertex needs x and y"));
                }
                let x = parse_coordinate(coords[0], path, line_number)?;
                let y = parse_coordinate(coords[1], path, line_number)?;
                if let Some(z) = coords.get(2) {
                    dropped_z |= parse_coordinate(z, path, line_number)? != 0.0;
                }
                positions.push(Point2::new(x, y));
            }
            Some("f") => {
                let polygon = parts
                    .map(|entry| parse_face_entry(entry, positions.len(), path, line_number))
                    .collect::<Result<Vec<usize>>>()?;
                polygons.push(polygon);
            }
            Some(keyword) if !keyword.starts_with('#') => {
                trace!("{}:{}: skipping '{}' record", path.display(), line_number, keyword);
            }
            _ => {}
        }
    }

    if dropped_z {
        warn!("{}: non-zero z coordinates were dropped", path.display());
    }

    let fixed = boundary_nodes(positions.len(), &polygons);
    let nodes = positions
        .into_iter()
        .zip(fixed)
        .map(|(position, fixed)| Node { position, fixed })
        .collect();
    build_from_nodes(nodes, &polygons)
}

fn parse_coordinate(token: &str, path: &Path, line: usize) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MeshError::load_at(path, line, format!("invalid coordinate '{}'", token))),
    }
}

/// Resolve a face entry to a 0-based node index.
fn parse_face_entry(entry: &str, num_vertices: usize, path: &Path, line: usize) -> Result<usize> {
    let index_part = entry.split('/').next().unwrap_or(entry);
    let index: i64 = index_part
        .parse()
        .map_err(|_| MeshError::load_at(path, line, format!("invalid face index '{}'", entry)))?;

    let resolved = match index {
        i if i > 0 => Some(i as usize - 1),
        i if i < 0 => num_vertices.checked_sub(i.unsigned_abs() as usize),
        _ => None,
    };
    resolved.ok_or_else(|| {
        MeshError::load_at(path, line, format!("face index {} is out of range", index))
    })
}

/// Write OBJ text.
pub(crate) fn write<W: Write, I: MeshIndex>(mesh: &PolygonalMesh<I>, writer: &mut W) -> Result<()> {
    writeln!(writer, "# Generated by polysmooth")?;
    writeln!(
        writer,
        "# {} nodes, {} polygons",
        mesh.num_nodes(),
        mesh.num_polygons()
    )?;

    for node in mesh.nodes() {
        writeln!(writer, "v {} {} 0", node.position.x, node.position.y)?;
    }

    for polygon in mesh.polygons() {
        write!(writer, "f")?;
        for n in polygon.nodes() {
            write!(writer, " {}", n.index() + 1)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::NodeId;
    use std::io::Cursor;

    fn parse_str(text: &str) -> Result<PolygonalMesh> {
        parse(Cursor::new(text), Path::new("test.obj"))
    }

    #[test]
    fn test_parse_quad_strip() {
        let text = "\
# two quads
o strip
v 0 0 0
v 1 0 0
v 2 0 0
v 0 1 0
v 1 1 0
v 2 1 0
vt 0 0
f 1/1 2/1 5/1 4/1
f 2//1 3//1 -1//1 -2//1
";
        let mesh = parse_str(text).unwrap();
        assert_eq!(mesh.num_nodes(), 6);
        assert_eq!(mesh.num_polygons(), 2);

        let second: Vec<usize> = mesh.polygons()[1].nodes().iter().map(|n| n.index()).collect();
        assert_eq!(second, vec![1, 2, 5, 4]);

        // Every node of a two-quad strip lies on the boundary.
        assert_eq!(mesh.num_fixed_nodes(), 6);
    }

    #[test]
    fn test_interior_node_is_free() {
        let text = "\
v 0 0
v 1 0
v 1 1
v 0 1
v 0.5 0.5
f 1 2 5
f 2 3 5
f 3 4 5
f 4 1 5
";
        let mesh = parse_str(text).unwrap();
        assert!(!mesh.is_fixed(NodeId::new(4)));
        assert_eq!(mesh.num_fixed_nodes(), 4);
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse_str("v 0 0\nv 1 zero\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 2, .. }));

        let err = parse_str("v 0 0\nv 1 0\nv 0 1\nf 1 2 0\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 4, .. }));

        let err = parse_str("v 0 0\nf -3 1 2\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 2, .. }));

        let err = parse_str("v 0 0\nv 1 0\nv 0 1\nf 1 2 7\n").unwrap_err();
        assert!(matches!(err, MeshError::InvalidNodeIndex { polygon: 0, node: 6 }));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let err = parse_str("v 0 0\nv NaN 1\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 2, .. }));

        let err = parse_str("v 0 inf\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 1, .. }));

        let err = parse_str("v 0 0 -infinity\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 1, .. }));
    }

    #[test]
    fn test_no_faces_is_empty_mesh() {
        assert!(matches!(parse_str("v 0 0\n"), Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_roundtrip() {
        use tempfile::tempdir;

        let text = "v 0 0\nv 1 0\nv 1 1\nv 0 1\nv 0.3 0.45\nf 1 2 5\nf 2 3 4 5\nf 4 1 5\n";
        let mesh = parse_str(text).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("mesh.obj");
        save(&mesh, &path).unwrap();
        let loaded: PolygonalMesh = load(&path).unwrap();

        assert_eq!(loaded, mesh);
    }
}
