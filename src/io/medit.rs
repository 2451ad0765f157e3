//! Medit-style `.mesh` format support.
//!
//! A keyword-driven ASCII format. Each section keyword is followed by an
//! entry count and the entries; `#` starts a comment. Indices are 1-based
//! and every element row ends with a reference number, which is written as
//! 0 and ignored on load.
//!
//! ```text
//! MeshVersionFormatted 2
//! Dimension 2
//! Vertices
//! 4
//! 0 0 0
//! 1 0 0
//! 1 1 0
//! 0 1 0
//! Quadrilaterals
//! 1
//! 1 2 3 4 0
//! FixedNodes
//! 2
//! 1 2
//! End
//! ```
//!
//! Supported sections are `Vertices`, `Triangles`, `Quadrilaterals`,
//! `Polygons` (each row starts with its node count) and `FixedNodes`.
//! Element sections are appended in file order. Without a `FixedNodes`
//! section, boundary nodes are fixed as for OBJ files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use log::trace;
use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::mesh::{boundary_nodes, build_from_nodes, MeshIndex, Node, PolygonalMesh};

/// Load a mesh from a `.mesh` file.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<PolygonalMesh<I>> {
    read_file(path.as_ref())
}

/// Save a mesh, including its fixed nodes, to a `.mesh` file.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &PolygonalMesh<I>, path: P) -> Result<()> {
    write_file(mesh, path.as_ref())
}

pub(crate) fn read_file<I: MeshIndex>(path: &Path) -> Result<PolygonalMesh<I>> {
    let text = std::fs::read_to_string(path)?;
    parse(&text, path)
}

pub(crate) fn write_file<I: MeshIndex>(mesh: &PolygonalMesh<I>, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| MeshError::save_at(path, e))?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Whitespace-separated tokens with their 1-based line numbers.
struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
    path: &'a Path,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str, path: &'a Path) -> Self {
        let tokens = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| {
                let content = line.split('#').next().unwrap_or("");
                content.split_whitespace().map(move |t| (i + 1, t))
            })
            .collect();
        Self {
            tokens,
            pos: 0,
            path,
        }
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(0, |&(line, _)| line)
    }

    fn error(&self, line: usize, message: impl Into<String>) -> MeshError {
        MeshError::load_at(self.path, line, message)
    }

    fn value<T: FromStr>(&mut self, what: &str) -> Result<T> {
        match self.next() {
            Some((line, token)) => token
                .parse()
                .map_err(|_| self.error(line, format!("invalid {} '{}'", what, token))),
            None => Err(self.error(self.line(), format!("unexpected end of file, expected {}", what))),
        }
    }

    /// A finite floating-point coordinate.
    fn coordinate(&mut self, what: &str) -> Result<f64> {
        let line = self.line();
        let value: f64 = self.value(what)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.error(line, format!("{} must be finite, got {}", what, value)))
        }
    }

    /// Upper bound on the entries still in the file, for capping reservations.
    fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    /// A 1-based index, returned 0-based.
    fn index(&mut self, what: &str) -> Result<usize> {
        let line = self.line();
        match self.value::<usize>(what)? {
            0 => Err(self.error(line, format!("{} indices start at 1", what))),
            i => Ok(i - 1),
        }
    }
}

/// Parse `.mesh` text. `path` is only used in error messages.
pub(crate) fn parse<I: MeshIndex>(text: &str, path: &Path) -> Result<PolygonalMesh<I>> {
    let mut tokens = Tokens::new(text, path);
    let mut positions: Vec<Point2<f64>> = Vec::new();
    let mut polygons: Vec<Vec<usize>> = Vec::new();
    let mut fixed: Option<Vec<usize>> = None;

    while let Some((line, keyword)) = tokens.next() {
        match keyword {
            "MeshVersionFormatted" => {
                tokens.value::<u32>("version")?;
            }
            "Dimension" => {
                let dimension: u32 = tokens.value("dimension")?;
                if dimension != 2 {
                    return Err(tokens.error(line, format!("unsupported dimension {}", dimension)));
                }
            }
            "Vertices" => {
                let count: usize = tokens.value("vertex count")?;
                positions.reserve(count.min(tokens.remaining() / 3));
                for _ in 0..count {
                    let x = tokens.coordinate("x coordinate")?;
                    let y = tokens.coordinate("y coordinate")?;
                    tokens.value::<i64>("vertex reference")?;
                    positions.push(Point2::new(x, y));
                }
            }
            "Triangles" | "Quadrilaterals" | "Polygons" => {
                let fixed_size = match keyword {
                    "Triangles" => Some(3),
                    "Quadrilaterals" => Some(4),
                    _ => None,
                };
                let count: usize = tokens.value("element count")?;
                polygons.reserve(count.min(tokens.remaining() / 4));
                for _ in 0..count {
                    let size = match fixed_size {
                        Some(size) => size,
                        None => tokens.value("polygon node count")?,
                    };
                    let polygon = (0..size)
                        .map(|_| tokens.index("node"))
                        .collect::<Result<Vec<usize>>>()?;
                    tokens.value::<i64>("element reference")?;
                    polygons.push(polygon);
                }
            }
            "FixedNodes" => {
                let count: usize = tokens.value("fixed node count")?;
                let indices = (0..count)
                    .map(|_| tokens.index("fixed node"))
                    .collect::<Result<Vec<usize>>>()?;
                fixed.get_or_insert_with(Vec::new).extend(indices);
            }
            "End" => break,
            other => {
                return Err(tokens.error(line, format!("unknown keyword '{}'", other)));
            }
        }
    }

    let mut nodes: Vec<Node> = positions.into_iter().map(Node::new).collect();
    match fixed {
        Some(indices) => {
            for i in indices {
                let node = nodes.get_mut(i).ok_or(MeshError::InvalidFixedNode { node: i })?;
                node.fixed = true;
            }
        }
        None => {
            trace!("{}: no FixedNodes section, fixing boundary nodes", path.display());
            let boundary = boundary_nodes(nodes.len(), &polygons);
            for (node, on_boundary) in nodes.iter_mut().zip(boundary) {
                node.fixed = on_boundary;
            }
        }
    }

    build_from_nodes(nodes, &polygons)
}

/// Write `.mesh` text.
///
/// Uses a single element section so polygon order survives a round trip:
/// `Triangles` or `Quadrilaterals` for uniform meshes, `Polygons` otherwise.
pub(crate) fn write<W: Write, I: MeshIndex>(mesh: &PolygonalMesh<I>, writer: &mut W) -> Result<()> {
    writeln!(writer, "# Generated by polysmooth")?;
    writeln!(writer, "MeshVersionFormatted 2")?;
    writeln!(writer, "Dimension 2")?;

    writeln!(writer, "Vertices")?;
    writeln!(writer, "{}", mesh.num_nodes())?;
    for node in mesh.nodes() {
        writeln!(writer, "{} {} 0", node.position.x, node.position.y)?;
    }

    let sizes: Vec<usize> = mesh.polygons().iter().map(|p| p.num_nodes()).collect();
    let uniform = sizes.windows(2).all(|w| w[0] == w[1]);
    let section = match sizes.first() {
        Some(3) if uniform => "Triangles",
        Some(4) if uniform => "Quadrilaterals",
        _ => "Polygons",
    };

    writeln!(writer, "{}", section)?;
    writeln!(writer, "{}", mesh.num_polygons())?;
    for polygon in mesh.polygons() {
        if section == "Polygons" {
            write!(writer, "{} ", polygon.num_nodes())?;
        }
        for n in polygon.nodes() {
            write!(writer, "{} ", n.index() + 1)?;
        }
        writeln!(writer, "0")?;
    }

    let fixed = mesh.fixed_node_ids();
    writeln!(writer, "FixedNodes")?;
    writeln!(writer, "{}", fixed.len())?;
    for n in &fixed {
        writeln!(writer, "{}", n.index() + 1)?;
    }

    writeln!(writer, "End")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_polygons, NodeId};

    fn parse_str(text: &str) -> Result<PolygonalMesh> {
        parse(text, Path::new("test.mesh"))
    }

    const SQUARE_FAN: &str = "\
MeshVersionFormatted 2
Dimension 2
# corners and one interior node
Vertices
5
0 0 0
1 0 0
1 1 0
0 1 0
0.4 0.6 0   # off center
Triangles
2
1 2 5 0
2 3 5 0
Polygons 1
3 3 4 5 0
Quadrilaterals 0
FixedNodes
4
1 2 3 4
End
";

    #[test]
    fn test_parse_sections_in_order() {
        let mesh = parse_str(SQUARE_FAN).unwrap();
        assert_eq!(mesh.num_nodes(), 5);
        assert_eq!(mesh.num_polygons(), 3);
        assert_eq!(*mesh.position(NodeId::new(4)), Point2::new(0.4, 0.6));
        assert_eq!(mesh.num_fixed_nodes(), 4);
        assert!(!mesh.is_fixed(NodeId::new(4)));

        let last: Vec<usize> = mesh.polygons()[2].nodes().iter().map(|n| n.index()).collect();
        assert_eq!(last, vec![2, 3, 4]);
    }

    #[test]
    fn test_boundary_nodes_fixed_without_section() {
        let text = SQUARE_FAN.replace("FixedNodes\n4\n1 2 3 4\n", "");
        let mesh = parse_str(&text).unwrap();
        // The fan has no triangle 4-1-5, so the interior node lies on the boundary.
        assert!(mesh.is_fixed(NodeId::new(0)));
        assert!(mesh.is_fixed(NodeId::new(4)));
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_str("Dimension 3\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 1, .. }));

        let err = parse_str("Dimension 2\nVertices\n2\n0 0 0\n1 x 0\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 5, .. }));

        let err = parse_str("Vertices\n1\n0 0 0\nTriangles\n1\n0 1 1 0\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 6, .. }));

        let err = parse_str("Vertices\n1\n0 0\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { .. }));

        let err = parse_str("Edges\n0\n").unwrap_err();
        assert!(err.to_string().contains("unknown keyword 'Edges'"));

        let err = parse_str("Vertices\n3\n0 0 0\n1 0 0\n0 1 0\nTriangles\n1\n1 2 3 0\nFixedNodes\n1\n9\n")
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidFixedNode { node: 8 }));
    }

    #[test]
    fn test_oversized_counts_are_load_errors() {
        let err = parse_str("Dimension 2\nVertices\n18446744073709551615\n0 0 0\nEnd\n").unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 5, .. }));

        let err = parse_str("Vertices\n3\n0 0 0\n1 0 0\n0 1 0\nTriangles\n2305843009213693951\n1 2 3 0\nEnd\n")
            .unwrap_err();
        assert!(matches!(err, MeshError::LoadError { line: 9, .. }));

        let err = parse_str("Vertices\n3\n0 0 0\n1 0 0\n0 1 0\nPolygons\n1\n4000000000 1 2 3 0\n")
            .unwrap_err();
        assert!(matches!(err, MeshError::LoadError { .. }));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        for bad in ["nan", "inf", "-inf"] {
            let text = format!("Vertices\n2\n0 0 0\n1 {} 0\n", bad);
            let err = parse_str(&text).unwrap_err();
            assert!(matches!(err, MeshError::LoadError { line: 4, .. }), "{}", bad);
            assert!(err.to_string().contains("must be finite"));
        }
    }

    #[test]
    fn test_writer_picks_single_section() {
        let positions = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let quad: PolygonalMesh = build_from_polygons(&positions, &[vec![0, 1, 2, 3]], &[0]).unwrap();
        let mut out = Vec::new();
        write(&quad, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Quadrilaterals\n1\n1 2 3 4 0\n"));
        assert!(text.contains("FixedNodes\n1\n1\n"));
        assert!(text.ends_with("End\n"));

        let mixed = parse_str(SQUARE_FAN).unwrap();
        let mut out = Vec::new();
        write(&mixed, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Polygons\n3\n3 1 2 5 0\n"));
    }

    #[test]
    fn test_roundtrip() {
        use tempfile::tempdir;

        let positions = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.1),
            Point2::new(0.0, 1.0),
            Point2::new(1.0 / 3.0, 0.9),
            Point2::new(2.2, 1.0),
            Point2::new(1.2, 1.7),
        ];
        let polygons = vec![vec![0, 1, 4, 3], vec![1, 2, 5, 6, 4]];
        let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[0, 2, 6]).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("mesh.mesh");
        save(&mesh, &path).unwrap();
        let loaded: PolygonalMesh = load(&path).unwrap();

        assert_eq!(loaded, mesh);
    }
}
