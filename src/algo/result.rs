//! Outcome of a smoothing run.

use std::fmt;
use std::time::Duration;

use crate::mesh::{MeshIndex, PolygonalMesh};
use crate::quality::MeshQuality;

/// The smoothing algorithm that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Laplacian smoothing with quality-based acceptance.
    SmartLaplace,
    /// Geometric element transformation method.
    Getme,
}

impl Algorithm {
    /// Human-readable name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::SmartLaplace => "Smart Laplace",
            Algorithm::Getme => "GETMe",
        }
    }

    /// Suffix appended to output file stems.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Algorithm::SmartLaplace => "smart_laplace",
            Algorithm::Getme => "getme",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepted iterations, per algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationCounts {
    /// Smart-Laplace runs a single loop.
    SmartLaplace {
        /// Accepted iterations.
        iterations: usize,
    },
    /// GETMe runs a simultaneous and a sequential phase.
    Getme {
        /// Accepted simultaneous iterations.
        simultaneous: usize,
        /// Accepted sequential passes.
        sequential: usize,
    },
}

impl IterationCounts {
    /// Total number of accepted iterations over all phases.
    pub fn total(&self) -> usize {
        match *self {
            IterationCounts::SmartLaplace { iterations } => iterations,
            IterationCounts::Getme {
                simultaneous,
                sequential,
            } => simultaneous + sequential,
        }
    }
}

/// Formats as `n` or `simultaneous/sequential`.
impl fmt::Display for IterationCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            IterationCounts::SmartLaplace { iterations } => write!(f, "{}", iterations),
            IterationCounts::Getme {
                simultaneous,
                sequential,
            } => write!(f, "{}/{}", simultaneous, sequential),
        }
    }
}

/// Why a smoothing run stopped.
///
/// For GETMe this is the reason the last executed phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Quality improvement fell below the tolerance.
    Converged,
    /// The iteration cap was reached.
    IterationLimit,
    /// An iteration lowered quality beyond the tolerance and was discarded.
    RolledBack,
    /// The relaxation factor was halved too often after inverting elements.
    RetriesExhausted,
    /// Quality is within the tolerance of the optimum 1.
    OptimalQuality,
}

impl Termination {
    /// Short description used in logs.
    pub fn description(self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::IterationLimit => "iteration limit reached",
            Termination::RolledBack => "rolled back last iteration",
            Termination::RetriesExhausted => "relaxation retries exhausted",
            Termination::OptimalQuality => "optimal quality reached",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Smoothed mesh together with its quality and run statistics.
#[derive(Debug, Clone)]
pub struct SmoothingResult<I: MeshIndex = u32> {
    /// Algorithm that produced this result.
    pub algorithm: Algorithm,
    /// The smoothed mesh.
    pub mesh: PolygonalMesh<I>,
    /// Quality of [`mesh`](Self::mesh).
    pub quality: MeshQuality,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
    /// Accepted iterations.
    pub iterations: IterationCounts,
    /// Why the run stopped.
    pub termination: Termination,
}

impl<I: MeshIndex> SmoothingResult<I> {
    /// Compose a result.
    pub fn new(
        algorithm: Algorithm,
        mesh: PolygonalMesh<I>,
        quality: MeshQuality,
        elapsed: Duration,
        iterations: IterationCounts,
        termination: Termination,
    ) -> Self {
        Self {
            algorithm,
            mesh,
            quality,
            elapsed,
            iterations,
            termination,
        }
    }
}
