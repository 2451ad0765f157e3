//! GETMe smoothing.
//!
//! The geometric element transformation method improves a mesh by repeatedly
//! moving polygons towards regular polygons (see [`transform`](super::transform))
//! and runs in two phases:
//!
//! - **Simultaneous**: every polygon is transformed independently and each
//!   node moves to the quality-weighted mean of the positions proposed by its
//!   incident polygons. Poor polygons get larger weights, so they pull harder.
//!   Per-polygon transforms are computed in parallel when enabled; the
//!   per-node reduction runs serially in polygon order, so results do not
//!   depend on the thread count.
//! - **Sequential**: each pass transforms the polygons one after the other
//!   in index order with a small relaxation factor, committing every update
//!   immediately so later polygons see earlier moves. Always serial.
//!   [`SequentialSelection::WorstFirst`] restricts a pass to the worst
//!   polygons, which targets the minimum quality more directly.
//!
//! Both phases keep the best mesh seen, stop once quality plateaus, and never
//! accept a step that inverts a polygon that was not inverted before. Such a
//! step is undone and retried with half the relaxation.
//!
//! # Example
//!
//! ```
//! use polysmooth::algo::getme::{getme, GetmeConfig};
//! use polysmooth::mesh::{build_from_polygons, PolygonalMesh};
//! use nalgebra::Point2;
//!
//! let positions = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//!     Point2::new(0.8, 0.7),
//! ];
//! let polygons = vec![vec![0, 1, 4], vec![1, 2, 4], vec![2, 3, 4], vec![3, 0, 4]];
//! let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &[0, 1, 2, 3]).unwrap();
//!
//! let config = GetmeConfig::new(mesh.max_polygon_nodes());
//! let result = getme(&mesh, &config).unwrap();
//! // Right isosceles triangles around the centered node are optimal here.
//! assert!(result.quality.q_min() > 0.86);
//! ```

use std::time::Instant;

use log::{debug, trace, warn};
use nalgebra::{Point2, Vector2};
use rayon::prelude::*;

use super::progress::Progress;
use super::result::{Algorithm, IterationCounts, SmoothingResult, Termination};
use super::transform::transform_polygon;
use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolygonId, PolygonalMesh};
use crate::quality::{polygon_quality, MeshQuality};

/// Default simultaneous relaxation factor for every polygon size.
const DEFAULT_SIMULTANEOUS_RELAXATION: f64 = 0.6;

/// Keeps weights positive for polygons of quality 1.
const WEIGHT_OFFSET: f64 = 1e-3;

/// Which polygons a sequential pass transforms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SequentialSelection {
    /// Every polygon with a free node, in index order.
    #[default]
    AllInOrder,
    /// The worst `fraction` of the polygons with a free node (at least one),
    /// ordered by ascending quality at the start of the pass.
    WorstFirst {
        /// Share of polygons transformed per pass, in `(0, 1]`.
        fraction: f64,
    },
}

/// Options for GETMe smoothing.
#[derive(Debug, Clone)]
pub struct GetmeConfig {
    /// Simultaneous relaxation factor per polygon size; entry `k` applies to
    /// polygons with `k + 3` nodes. Larger polygons use the last entry.
    pub simultaneous_relaxation: Vec<f64>,

    /// Exponent η of the node averaging weight `(1 - q + 0.001)^η`.
    /// Zero gives every incident polygon the same weight.
    pub quality_weight_exponent: f64,

    /// Maximum number of accepted simultaneous iterations. Zero skips the phase.
    pub simultaneous_max_iterations: usize,

    /// Minimum quality gain that counts as progress in the simultaneous phase.
    pub simultaneous_tolerance: f64,

    /// Relaxation factor of the sequential phase.
    pub sequential_relaxation: f64,

    /// Polygons transformed per sequential pass.
    pub sequential_selection: SequentialSelection,

    /// Maximum number of accepted sequential passes. Zero skips the phase.
    pub sequential_max_iterations: usize,

    /// Minimum quality gain that counts as progress in the sequential phase.
    pub sequential_tolerance: f64,

    /// Consecutive steps without progress after which a phase stops.
    pub plateau_window: usize,

    /// How often a phase may halve its relaxation after a step inverted a
    /// polygon. One more rejection ends the phase.
    pub max_relaxation_retries: usize,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl GetmeConfig {
    /// Default configuration for meshes whose largest polygon has
    /// `max_polygon_nodes` nodes.
    pub fn new(max_polygon_nodes: usize) -> Self {
        let sizes = max_polygon_nodes.max(3) - 2;
        Self {
            simultaneous_relaxation: vec![DEFAULT_SIMULTANEOUS_RELAXATION; sizes],
            quality_weight_exponent: 1.0,
            simultaneous_max_iterations: 1000,
            simultaneous_tolerance: 1e-4,
            sequential_relaxation: 0.05,
            sequential_selection: SequentialSelection::AllInOrder,
            sequential_max_iterations: 5000,
            sequential_tolerance: 1e-6,
            plateau_window: 10,
            max_relaxation_retries: 5,
            parallel: true,
        }
    }

    /// Simultaneous relaxation factor for polygons with `num_nodes` nodes.
    pub fn simultaneous_relaxation_for(&self, num_nodes: usize) -> f64 {
        let index = num_nodes.saturating_sub(3);
        self.simultaneous_relaxation
            .get(index)
            .or_else(|| self.simultaneous_relaxation.last())
            .copied()
            .unwrap_or(DEFAULT_SIMULTANEOUS_RELAXATION)
    }

    /// Use the same simultaneous relaxation factor for every polygon size.
    pub fn with_simultaneous_relaxation(mut self, relaxation: f64) -> Self {
        for r in self.simultaneous_relaxation.iter_mut() {
            *r = relaxation;
        }
        self
    }

    /// Set the averaging weight exponent.
    pub fn with_quality_weight_exponent(mut self, exponent: f64) -> Self {
        self.quality_weight_exponent = exponent;
        self
    }

    /// Set the simultaneous iteration cap.
    pub fn with_simultaneous_max_iterations(mut self, max_iterations: usize) -> Self {
        self.simultaneous_max_iterations = max_iterations;
        self
    }

    /// Set the sequential pass cap.
    pub fn with_sequential_max_iterations(mut self, max_iterations: usize) -> Self {
        self.sequential_max_iterations = max_iterations;
        self
    }

    /// Set the sequential relaxation factor.
    pub fn with_sequential_relaxation(mut self, relaxation: f64) -> Self {
        self.sequential_relaxation = relaxation;
        self
    }

    /// Set which polygons a sequential pass transforms.
    pub fn with_sequential_selection(mut self, selection: SequentialSelection) -> Self {
        self.sequential_selection = selection;
        self
    }

    /// Set the plateau window of both phases.
    pub fn with_plateau_window(mut self, window: usize) -> Self {
        self.plateau_window = window;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that all parameters are in range.
    pub fn validate(&self) -> Result<()> {
        if self.simultaneous_relaxation.is_empty() {
            return Err(MeshError::invalid_param(
                "simultaneous_relaxation",
                "[]",
                "needs at least one entry",
            ));
        }
        for &r in &self.simultaneous_relaxation {
            check_relaxation("simultaneous_relaxation", r)?;
        }
        check_relaxation("sequential_relaxation", self.sequential_relaxation)?;

        if let SequentialSelection::WorstFirst { fraction } = self.sequential_selection {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(MeshError::invalid_param(
                    "sequential_selection.fraction",
                    fraction,
                    "must be in (0, 1]",
                ));
            }
        }
        if !self.quality_weight_exponent.is_finite() || self.quality_weight_exponent < 0.0 {
            return Err(MeshError::invalid_param(
                "quality_weight_exponent",
                self.quality_weight_exponent,
                "must be finite and non-negative",
            ));
        }
        for (name, tolerance) in [
            ("simultaneous_tolerance", self.simultaneous_tolerance),
            ("sequential_tolerance", self.sequential_tolerance),
        ] {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(MeshError::invalid_param(
                    name,
                    tolerance,
                    "must be finite and non-negative",
                ));
            }
        }
        if self.plateau_window == 0 {
            return Err(MeshError::invalid_param(
                "plateau_window",
                self.plateau_window,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for GetmeConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

fn check_relaxation(name: &'static str, relaxation: f64) -> Result<()> {
    if relaxation > 0.0 && relaxation <= 1.0 {
        Ok(())
    } else {
        Err(MeshError::invalid_param(name, relaxation, "must be in (0, 1]"))
    }
}

/// Smooth a copy of `mesh` with GETMe.
///
/// Runs the simultaneous phase followed by the sequential phase, which starts
/// from the best mesh of the first. The input is left untouched.
///
/// # Errors
/// Returns [`MeshError::InvalidParameter`] if `config` is invalid.
pub fn getme<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
    config: &GetmeConfig,
) -> Result<SmoothingResult<I>> {
    getme_internal(mesh, config, None)
}

/// GETMe smoothing with progress reporting.
///
/// Progress is reported per accepted step, with the simultaneous phase in
/// the first and the sequential phase in the second half of the range.
pub fn getme_with_progress<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
    config: &GetmeConfig,
    progress: &Progress,
) -> Result<SmoothingResult<I>> {
    getme_internal(mesh, config, Some(progress))
}

fn getme_internal<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
    config: &GetmeConfig,
    progress: Option<&Progress>,
) -> Result<SmoothingResult<I>> {
    config.validate()?;
    let start = Instant::now();

    let quality = MeshQuality::evaluate(mesh, config.parallel);
    let free_polygons: Vec<PolygonId<I>> = mesh
        .polygon_ids()
        .filter(|&p| !mesh.is_polygon_fixed(p))
        .collect();

    if free_polygons.is_empty() {
        debug!("GETMe: no movable polygons");
        return Ok(SmoothingResult::new(
            Algorithm::Getme,
            mesh.clone(),
            quality,
            start.elapsed(),
            IterationCounts::Getme {
                simultaneous: 0,
                sequential: 0,
            },
            Termination::Converged,
        ));
    }

    let simultaneous = run_phase(
        Phase::Simultaneous,
        PhaseOutcome::start(mesh.clone(), quality),
        config,
        progress,
        |m, scale| {
            let positions = simultaneous_positions(m, config, scale);
            m.apply_positions(&positions);
        },
    );

    let sequential = run_phase(
        Phase::Sequential,
        PhaseOutcome::start(simultaneous.mesh, simultaneous.quality),
        config,
        progress,
        |m, scale| sequential_pass(m, &free_polygons, config, scale),
    );

    let termination = if config.sequential_max_iterations == 0 {
        simultaneous.termination
    } else {
        sequential.termination
    };

    let result = SmoothingResult::new(
        Algorithm::Getme,
        sequential.mesh,
        sequential.quality,
        start.elapsed(),
        IterationCounts::Getme {
            simultaneous: simultaneous.iterations,
            sequential: sequential.iterations,
        },
        termination,
    );
    debug!(
        "GETMe: {} iterations, qmin {:.4}, {}",
        result.iterations,
        result.quality.q_min(),
        result.termination
    );
    Ok(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Simultaneous,
    Sequential,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Simultaneous => "GETMe simultaneous",
            Phase::Sequential => "GETMe sequential",
        }
    }

    fn index(self) -> usize {
        match self {
            Phase::Simultaneous => 0,
            Phase::Sequential => 1,
        }
    }

    fn tolerance(self, config: &GetmeConfig) -> f64 {
        match self {
            Phase::Simultaneous => config.simultaneous_tolerance,
            Phase::Sequential => config.sequential_tolerance,
        }
    }

    fn max_iterations(self, config: &GetmeConfig) -> usize {
        match self {
            Phase::Simultaneous => config.simultaneous_max_iterations,
            Phase::Sequential => config.sequential_max_iterations,
        }
    }
}

struct PhaseOutcome<I: MeshIndex> {
    mesh: PolygonalMesh<I>,
    quality: MeshQuality,
    iterations: usize,
    termination: Termination,
}

impl<I: MeshIndex> PhaseOutcome<I> {
    fn start(mesh: PolygonalMesh<I>, quality: MeshQuality) -> Self {
        Self {
            mesh,
            quality,
            iterations: 0,
            termination: Termination::Converged,
        }
    }
}

/// Run one phase from `start`, returning the best mesh it produced.
///
/// `step` moves the nodes of a copy of the current mesh, given a relaxation
/// scale in `(0, 1]`.
fn run_phase<I, F>(
    phase: Phase,
    start: PhaseOutcome<I>,
    config: &GetmeConfig,
    progress: Option<&Progress>,
    mut step: F,
) -> PhaseOutcome<I>
where
    I: MeshIndex,
    F: FnMut(&mut PolygonalMesh<I>, f64),
{
    let tolerance = phase.tolerance(config);
    let max_iterations = phase.max_iterations(config);

    let mut current = start.mesh;
    let mut inverted = inverted_polygons(&current);
    let mut best_mesh = current.clone();
    let mut best_quality = start.quality;
    let mut best = best_quality.smoothable_min();

    let mut scale = 1.0;
    let mut rejections = 0;
    let mut stalled = 0;
    let mut iterations = 0;

    let termination = loop {
        if 1.0 - best < tolerance {
            break Termination::OptimalQuality;
        }
        if iterations >= max_iterations {
            break Termination::IterationLimit;
        }

        let mut candidate = current.clone();
        step(&mut candidate, scale);
        let candidate_inverted = inverted_polygons(&candidate);

        if creates_inversion(&inverted, &candidate_inverted) {
            rejections += 1;
            warn!(
                "{}: step {} inverts an element, halving relaxation ({} of {} retries)",
                phase.name(),
                iterations + 1,
                rejections,
                config.max_relaxation_retries
            );
            if rejections > config.max_relaxation_retries {
                break Termination::RetriesExhausted;
            }
            scale *= 0.5;
            continue;
        }

        current = candidate;
        inverted = candidate_inverted;
        iterations += 1;

        let quality = MeshQuality::evaluate(&current, config.parallel);
        let q = quality.smoothable_min();
        trace!("{} step {}: qmin {:.6} (best {:.6})", phase.name(), iterations, q, best);

        if let Some(p) = progress {
            p.report_phase(phase.index(), 2, iterations, max_iterations, phase.name());
        }

        if q > best + tolerance {
            stalled = 0;
        } else {
            stalled += 1;
        }
        if q > best {
            best = q;
            best_mesh = current.clone();
            best_quality = quality;
        }
        if stalled >= config.plateau_window {
            break Termination::Converged;
        }
    };

    debug!(
        "{}: {} steps, best qmin {:.6}, {}",
        phase.name(),
        iterations,
        best,
        termination
    );

    PhaseOutcome {
        mesh: best_mesh,
        quality: best_quality,
        iterations,
        termination,
    }
}

/// Per-polygon flag: negative signed area.
fn inverted_polygons<I: MeshIndex>(mesh: &PolygonalMesh<I>) -> Vec<bool> {
    mesh.polygon_ids()
        .map(|p| mesh.polygon_signed_area(p) < 0.0)
        .collect()
}

/// Whether `after` has an inverted polygon that was not inverted `before`.
fn creates_inversion(before: &[bool], after: &[bool]) -> bool {
    before.iter().zip(after).any(|(&was, &is)| is && !was)
}

/// One simultaneous iteration: weighted mean of all per-polygon targets.
fn simultaneous_positions<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
    config: &GetmeConfig,
    scale: f64,
) -> Vec<Point2<f64>> {
    let exponent = config.quality_weight_exponent;
    let transform_one = |i: usize| {
        let points = mesh.polygon_positions(PolygonId::new(i));
        let weight = (1.0 - polygon_quality(&points) + WEIGHT_OFFSET).powf(exponent);
        let relaxation = config.simultaneous_relaxation_for(points.len()) * scale;
        (weight, transform_polygon(&points, relaxation))
    };

    let transformed: Vec<(f64, Vec<Point2<f64>>)> = if config.parallel {
        (0..mesh.num_polygons())
            .into_par_iter()
            .map(transform_one)
            .collect()
    } else {
        (0..mesh.num_polygons()).map(transform_one).collect()
    };

    let mut sums = vec![Vector2::zeros(); mesh.num_nodes()];
    let mut weights = vec![0.0; mesh.num_nodes()];
    for (polygon, (weight, points)) in mesh.polygons().iter().zip(&transformed) {
        for (node, point) in polygon.nodes().iter().zip(points) {
            sums[node.index()] += point.coords * *weight;
            weights[node.index()] += *weight;
        }
    }

    mesh.nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| {
            if node.fixed || weights[i] <= 0.0 {
                node.position
            } else {
                Point2::from(sums[i] / weights[i])
            }
        })
        .collect()
}

/// One sequential pass, committing each transform before the next polygon.
fn sequential_pass<I: MeshIndex>(
    mesh: &mut PolygonalMesh<I>,
    free_polygons: &[PolygonId<I>],
    config: &GetmeConfig,
    scale: f64,
) {
    let relaxation = config.sequential_relaxation * scale;
    for p in sequential_order(mesh, free_polygons, config.sequential_selection) {
        let targets = transform_polygon(&mesh.polygon_positions(p), relaxation);
        let nodes = mesh.polygon(p).nodes().to_vec();
        for (node, target) in nodes.into_iter().zip(targets) {
            mesh.set_position(node, target);
        }
    }
}

/// Polygons visited by one sequential pass, in visiting order.
fn sequential_order<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
    free_polygons: &[PolygonId<I>],
    selection: SequentialSelection,
) -> Vec<PolygonId<I>> {
    match selection {
        SequentialSelection::AllInOrder => free_polygons.to_vec(),
        SequentialSelection::WorstFirst { fraction } => {
            let mut ranked: Vec<(f64, PolygonId<I>)> = free_polygons
                .iter()
                .map(|&p| (polygon_quality(&mesh.polygon_positions(p)), p))
                .collect();
            ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let count = ((ranked.len() as f64 * fraction) as usize)
                .max(1)
                .min(ranked.len());
            ranked.into_iter().take(count).map(|(_, p)| p).collect()
        }
    }
}
