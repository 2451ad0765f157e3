//! Progress reporting for the smoothing engines.
//!
//! Engines accept an optional [`Progress`] through their `*_with_progress`
//! variants and report once per iteration. Because the engines stop as soon
//! as quality stops improving, `total` is the iteration cap and a run usually
//! finishes well before reaching it.
//!
//! # Example
//!
//! ```
//! use polysmooth::algo::progress::Progress;
//! use polysmooth::algo::smart_laplace::{smart_laplace_with_progress, SmartLaplaceConfig};
//! use polysmooth::mesh::{build_from_polygons, PolygonalMesh};
//! use nalgebra::Point2;
//!
//! let positions = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.5, 0.8),
//! ];
//! let mesh: PolygonalMesh = build_from_polygons(&positions, &[vec![0, 1, 2]], &[0, 1]).unwrap();
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! let result = smart_laplace_with_progress(&mesh, &SmartLaplaceConfig::default(), &progress).unwrap();
//! assert!(result.quality.q_min() > 0.0);
//! ```

/// Callback receiving `(current, total, message)` updates.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a progress reporter from a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report `current` out of `total` steps.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report a step of one phase of a multi-phase run.
    ///
    /// Phase `phase` of `num_phases` owns the slice `[phase, phase + 1)` of
    /// the overall progress; `current / total` is scaled into it in
    /// thousandths.
    pub fn report_phase(
        &self,
        phase: usize,
        num_phases: usize,
        current: usize,
        total: usize,
        message: &str,
    ) {
        if total == 0 || num_phases == 0 {
            return;
        }
        let fraction = (current.min(total) * 1000) / total;
        (self.callback)(phase * 1000 + fraction, num_phases * 1000, message);
    }

    /// A reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
