//! Plain-text reports on meshes and smoothing results.
//!
//! Every function writes into an [`std::io::Write`], so callers decide whether
//! the report goes to stdout, a file or a buffer.
//!
//! ```text
//! Initial mesh consist of 49 nodes (24 fixed) and 42 polygons.
//!   elements: 12 triangles, 30 quadrilaterals
//!   x-dimension: 6, y-dimension: 6
//!   mesh quality: qmin=0.3870, qmean=0.8012
//! GETMe smoothing result
//!   mesh quality: qmin=0.9342, qmean=0.9456
//!   smoothing time: 0.012s
//!   iterations: 40/59
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::algo::SmoothingResult;
use crate::error::Result;
use crate::mesh::{MeshIndex, PolygonalMesh};
use crate::quality::MeshQuality;

/// Input name suffix dropped when deriving result file names.
const INITIAL_SUFFIX: &str = "_initial";

/// Name of a polygon with `num_nodes` nodes.
pub fn polygon_name(num_nodes: usize) -> String {
    match num_nodes {
        3 => "triangle".to_string(),
        4 => "quadrilateral".to_string(),
        5 => "pentagon".to_string(),
        6 => "hexagon".to_string(),
        8 => "octagon".to_string(),
        12 => "dodecagon".to_string(),
        n => format!("{}-gon", n),
    }
}

/// Node and polygon counts, element statistics, dimensions and quality.
pub fn write_initial_mesh_information<W: Write, I: MeshIndex>(
    out: &mut W,
    mesh: &PolygonalMesh<I>,
) -> Result<()> {
    writeln!(
        out,
        "Initial mesh consist of {} nodes ({} fixed) and {} polygons.",
        mesh.num_nodes(),
        mesh.num_fixed_nodes(),
        mesh.num_polygons()
    )?;
    write_element_statistics(out, mesh)?;
    write_mesh_dimension(out, mesh)?;
    write_mesh_quality(out, &MeshQuality::new(mesh), "  ")
}

/// Polygon counts by node count, e.g. `  elements: 2 triangles, 1 pentagon`.
pub fn write_element_statistics<W: Write, I: MeshIndex>(
    out: &mut W,
    mesh: &PolygonalMesh<I>,
) -> Result<()> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for polygon in mesh.polygons() {
        *counts.entry(polygon.num_nodes()).or_insert(0) += 1;
    }

    let entries: Vec<String> = counts
        .iter()
        .map(|(&num_nodes, &count)| {
            let plural = if count == 1 { "" } else { "s" };
            format!("{} {}{}", count, polygon_name(num_nodes), plural)
        })
        .collect();
    writeln!(out, "  elements: {}", entries.join(", "))?;
    Ok(())
}

fn write_mesh_dimension<W: Write, I: MeshIndex>(
    out: &mut W,
    mesh: &PolygonalMesh<I>,
) -> Result<()> {
    let (x, y) = mesh
        .bounding_box()
        .map_or((0.0, 0.0), |bb| (bb.x_dimension(), bb.y_dimension()));
    writeln!(out, "  x-dimension: {}, y-dimension: {}", x, y)?;
    Ok(())
}

/// Quality summary line.
///
/// With an empty `prefix` the line starts with `Mesh quality:`, otherwise
/// with `prefix` followed by `mesh quality:`.
pub fn write_mesh_quality<W: Write>(out: &mut W, quality: &MeshQuality, prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        write!(out, "Mesh quality: ")?;
    } else {
        write!(out, "{}mesh quality: ", prefix)?;
    }

    if quality.q_min() < 0.0 {
        match quality.invalid_elements() {
            Some(count) => writeln!(out, "{} invalid elements", count)?,
            None => writeln!(out, "invalid mesh")?,
        }
    } else {
        write!(out, "qmin={:.4}", quality.q_min())?;
        if let Some(q_min_star) = quality.q_min_star() {
            write!(out, ", qmin*={:.4}", q_min_star)?;
        }
        writeln!(out, ", qmean={:.4}", quality.q_mean())?;
    }
    Ok(())
}

/// Algorithm name, final quality, wall-clock time and iteration counts.
pub fn write_smoothing_result<W: Write, I: MeshIndex>(
    out: &mut W,
    result: &SmoothingResult<I>,
) -> Result<()> {
    writeln!(out, "{} smoothing result", result.algorithm)?;
    write_mesh_quality(out, &result.quality, "  ")?;
    writeln!(out, "  smoothing time: {:.3}s", result.elapsed.as_secs_f64())?;
    writeln!(out, "  iterations: {}", result.iterations)?;
    Ok(())
}

/// Path of a result mesh: `<output_dir>/<stem>_<mesh_name>.<ext>`.
///
/// `stem` and `ext` come from `input`; an `_initial` suffix of the stem is
/// dropped, so `square_initial.obj` yields `square_getme.obj`.
pub fn result_mesh_path(output_dir: &Path, input: &Path, mesh_name: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh");
    let stem = stem.strip_suffix(INITIAL_SUFFIX).unwrap_or(stem);

    let mut file_name = format!("{}_{}", stem, mesh_name);
    if let Some(ext) = input.extension().and_then(|e| e.to_str()) {
        file_name.push('.');
        file_name.push_str(ext);
    }
    output_dir.join(file_name)
}
