//! Smart-Laplace smoothing.
//!
//! Classic Laplacian smoothing moves every free node to the mean of its
//! neighbours. It is fast but can invert elements near concave regions. The
//! smart variant guards it twice:
//!
//! 1. With [`SmartLaplaceConfig::local_quality_check`], a node only moves if
//!    the minimum quality of its incident polygons does not drop.
//! 2. After each iteration the mesh quality is re-evaluated; an iteration
//!    that lowers the smoothable minimum quality by more than the tolerance
//!    is discarded and smoothing stops.
//!
//! The engine is a small state machine ([`SmartLaplaceState`]) driven by
//! [`SmartLaplaceSmoother::step`]. [`smart_laplace`] runs it to completion.
//!
//! # Example
//!
//! ```
//! use polysmooth::algo::smart_laplace::{smart_laplace, SmartLaplaceConfig};
//! use polysmooth::mesh::{build_from_polygons, PolygonalMesh};
//! use nalgebra::Point2;
//!
//! // Four squares around a displaced center node.
//! let mut positions = Vec::new();
//! for j in 0..3 {
//!     for i in 0..3 {
//!         positions.push(Point2::new(i as f64, j as f64));
//!     }
//! }
//! positions[4] = Point2::new(1.4, 1.3);
//! let polygons = vec![
//!     vec![0, 1, 4, 3],
//!     vec![1, 2, 5, 4],
//!     vec![3, 4, 7, 6],
//!     vec![4, 5, 8, 7],
//! ];
//! let fixed = [0, 1, 2, 3, 5, 6, 7, 8];
//! let mesh: PolygonalMesh = build_from_polygons(&positions, &polygons, &fixed).unwrap();
//!
//! let result = smart_laplace(&mesh, &SmartLaplaceConfig::default()).unwrap();
//! assert!(result.quality.q_min() > 0.99);
//! ```

use std::time::Instant;

use log::{debug, trace};
use nalgebra::Point2;

use super::progress::Progress;
use super::result::{Algorithm, IterationCounts, SmoothingResult, Termination};
use crate::error::{MeshError, Result};
use crate::math::centroid;
use crate::mesh::{MeshIndex, MeshTopology, NodeId, PolygonalMesh};
use crate::quality::{polygon_quality, MeshQuality};

/// How the Laplacian target position of a node is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaplaceWeighting {
    /// Mean of the edge-adjacent nodes.
    #[default]
    NeighborNodes,
    /// Mean of the centroids of the incident polygons.
    PolygonCentroids,
}

/// Options for Smart-Laplace smoothing.
#[derive(Debug, Clone)]
pub struct SmartLaplaceConfig {
    /// Maximum number of accepted iterations.
    pub max_iterations: usize,

    /// Quality change below which smoothing has converged, and the largest
    /// quality drop an iteration may cause before it is rolled back.
    pub tolerance: f64,

    /// Target position rule.
    pub weighting: LaplaceWeighting,

    /// Keep a node in place if moving it lowers the minimum quality of its
    /// incident polygons.
    pub local_quality_check: bool,

    /// Whether to evaluate mesh quality in parallel (default: true).
    pub parallel: bool,
}

impl Default for SmartLaplaceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-4,
            weighting: LaplaceWeighting::NeighborNodes,
            local_quality_check: true,
            parallel: true,
        }
    }
}

impl SmartLaplaceConfig {
    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence and rollback tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the target position rule.
    pub fn with_weighting(mut self, weighting: LaplaceWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Enable or disable the per-node quality check.
    pub fn with_local_quality_check(mut self, enabled: bool) -> Self {
        self.local_quality_check = enabled;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that all parameters are in range.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(MeshError::invalid_param(
                "max_iterations",
                self.max_iterations,
                "must be at least 1",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MeshError::invalid_param(
                "tolerance",
                self.tolerance,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// States of a Smart-Laplace run.
///
/// `Initializing → Iterating → Converged`, or
/// `Iterating → RolledBack → Terminated` when an iteration was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartLaplaceState {
    /// Created, no iteration run yet.
    Initializing,
    /// Iterations are being accepted.
    Iterating,
    /// Finished after a small improvement or the iteration cap.
    Converged,
    /// The last iteration was discarded.
    RolledBack,
    /// Finished after a rollback.
    Terminated,
}

/// Step-wise Smart-Laplace smoother working on its own copy of a mesh.
#[derive(Debug)]
pub struct SmartLaplaceSmoother<I: MeshIndex = u32> {
    config: SmartLaplaceConfig,
    topology: MeshTopology<I>,
    mesh: PolygonalMesh<I>,
    quality: MeshQuality,
    state: SmartLaplaceState,
    iterations: usize,
    termination: Option<Termination>,
}

impl<I: MeshIndex> SmartLaplaceSmoother<I> {
    /// Validate `config` and prepare smoothing a copy of `mesh`.
    pub fn new(mesh: &PolygonalMesh<I>, config: &SmartLaplaceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            topology: MeshTopology::new(mesh),
            mesh: mesh.clone(),
            quality: MeshQuality::evaluate(mesh, config.parallel),
            state: SmartLaplaceState::Initializing,
            iterations: 0,
            termination: None,
        })
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> SmartLaplaceState {
        self.state
    }

    /// Whether no further step changes anything.
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            SmartLaplaceState::Converged | SmartLaplaceState::Terminated
        )
    }

    /// Number of accepted iterations so far.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The last accepted mesh.
    #[inline]
    pub fn mesh(&self) -> &PolygonalMesh<I> {
        &self.mesh
    }

    /// Quality of the last accepted mesh.
    #[inline]
    pub fn quality(&self) -> &MeshQuality {
        &self.quality
    }

    /// Advance the state machine by one transition.
    pub fn step(&mut self) -> SmartLaplaceState {
        match self.state {
            SmartLaplaceState::Initializing => {
                if self.mesh.num_fixed_nodes() == self.mesh.num_nodes() {
                    self.finish(SmartLaplaceState::Converged, Termination::Converged);
                } else {
                    self.state = SmartLaplaceState::Iterating;
                }
            }
            SmartLaplaceState::Iterating => self.iterate(),
            SmartLaplaceState::RolledBack => self.state = SmartLaplaceState::Terminated,
            SmartLaplaceState::Converged | SmartLaplaceState::Terminated => {}
        }
        self.state
    }

    /// Package the last accepted mesh into a result.
    ///
    /// A run stopped before it finished counts as
    /// [`Termination::IterationLimit`].
    pub fn into_result(self, elapsed: std::time::Duration) -> SmoothingResult<I> {
        SmoothingResult::new(
            Algorithm::SmartLaplace,
            self.mesh,
            self.quality,
            elapsed,
            IterationCounts::SmartLaplace {
                iterations: self.iterations,
            },
            self.termination.unwrap_or(Termination::IterationLimit),
        )
    }

    fn finish(&mut self, state: SmartLaplaceState, termination: Termination) {
        self.state = state;
        self.termination = Some(termination);
    }

    fn iterate(&mut self) {
        let positions: Vec<Point2<f64>> = self
            .mesh
            .node_ids()
            .map(|n| self.candidate_position(n))
            .collect();

        let mut candidate = self.mesh.clone();
        candidate.apply_positions(&positions);
        let quality = MeshQuality::evaluate(&candidate, self.config.parallel);

        let delta = quality.smoothable_min() - self.quality.smoothable_min();
        trace!(
            "Smart Laplace iteration {}: qmin {:.6} -> {:.6}",
            self.iterations + 1,
            self.quality.smoothable_min(),
            quality.smoothable_min()
        );

        if delta < -self.config.tolerance {
            debug!(
                "Smart Laplace: discarding iteration {} (quality drop {:.3e})",
                self.iterations + 1,
                -delta
            );
            self.finish(SmartLaplaceState::RolledBack, Termination::RolledBack);
            return;
        }

        self.mesh = candidate;
        self.quality = quality;
        self.iterations += 1;

        if delta < self.config.tolerance {
            self.finish(SmartLaplaceState::Converged, Termination::Converged);
        } else if self.iterations >= self.config.max_iterations {
            self.finish(SmartLaplaceState::Converged, Termination::IterationLimit);
        }
    }

    /// New position of `node` for the next iteration, from the current mesh.
    fn candidate_position(&self, node: NodeId<I>) -> Point2<f64> {
        let current = *self.mesh.position(node);
        if self.mesh.is_fixed(node) {
            return current;
        }

        let target = match self.laplace_target(node) {
            Some(target) => target,
            None => return current,
        };

        if self.config.local_quality_check
            && self.local_min_quality(node, &target) < self.local_min_quality(node, &current)
        {
            current
        } else {
            target
        }
    }

    fn laplace_target(&self, node: NodeId<I>) -> Option<Point2<f64>> {
        let points: Vec<Point2<f64>> = match self.config.weighting {
            LaplaceWeighting::NeighborNodes => self
                .topology
                .node_neighbors(node)
                .iter()
                .map(|&n| *self.mesh.position(n))
                .collect(),
            LaplaceWeighting::PolygonCentroids => self
                .topology
                .node_polygons(node)
                .iter()
                .map(|&p| self.mesh.polygon_centroid(p))
                .collect(),
        };

        if points.is_empty() {
            None
        } else {
            Some(centroid(&points))
        }
    }

    /// Minimum quality of the polygons around `node` with `node` moved to `position`.
    fn local_min_quality(&self, node: NodeId<I>, position: &Point2<f64>) -> f64 {
        self.topology
            .node_polygons(node)
            .iter()
            .map(|&p| {
                let points: Vec<Point2<f64>> = self
                    .mesh
                    .polygon(p)
                    .nodes()
                    .iter()
                    .map(|&n| if n == node { *position } else { *self.mesh.position(n) })
                    .collect();
                polygon_quality(&points)
            })
            .fold(f64::INFINITY, f64::min)
    }
}

/// Smooth a copy of `mesh` with Smart-Laplace.
///
/// The input is left untouched. The returned mesh's `q_min` is never below the
/// input's `q_min` minus [`SmartLaplaceConfig::tolerance`].
///
/// # Errors
/// Returns [`MeshError::InvalidParameter`] if `config` is invalid.
pub fn smart_laplace<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
    config: &SmartLaplaceConfig,
) -> Result<SmoothingResult<I>> {
    smart_laplace_internal(mesh, config, None)
}

/// Smart-Laplace smoothing with progress reporting.
///
/// See [`smart_laplace`] for details.
pub fn smart_laplace_with_progress<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
    config: &SmartLaplaceConfig,
    progress: &Progress,
) -> Result<SmoothingResult<I>> {
    smart_laplace_internal(mesh, config, Some(progress))
}

fn smart_laplace_internal<I: MeshIndex>(
    mesh: &PolygonalMesh<I>,
    config: &SmartLaplaceConfig,
    progress: Option<&Progress>,
) -> Result<SmoothingResult<I>> {
    let start = Instant::now();
    let mut smoother = SmartLaplaceSmoother::new(mesh, config)?;

    while !smoother.is_finished() {
        smoother.step();
        if let Some(p) = progress {
            p.report(smoother.iterations(), config.max_iterations, "Smart Laplace smoothing");
        }
    }

    let result = smoother.into_result(start.elapsed());
    debug!(
        "Smart Laplace: {} iterations, qmin {:.4}, {}",
        result.iterations, result.quality.q_min(), result.termination
    );
    Ok(result)
}
