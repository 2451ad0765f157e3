//! Mesh smoothing algorithms.
//!
//! - [`smart_laplace`](smart_laplace::smart_laplace): Laplacian smoothing that
//!   only accepts moves and iterations which do not lower mesh quality.
//! - [`getme`](getme::getme): geometric element transformation method, a
//!   simultaneous phase followed by a sequential phase of regularizing
//!   polygon transforms.
//!
//! Both engines take the mesh by reference, smooth their own copy and return
//! a [`SmoothingResult`].

pub mod getme;
pub mod progress;
pub mod result;
pub mod smart_laplace;
pub mod transform;

pub use getme::{getme, getme_with_progress, GetmeConfig, SequentialSelection};
pub use progress::Progress;
pub use result::{Algorithm, IterationCounts, SmoothingResult, Termination};
pub use smart_laplace::{
    smart_laplace, smart_laplace_with_progress, LaplaceWeighting, SmartLaplaceConfig,
    SmartLaplaceSmoother, SmartLaplaceState,
};
pub use transform::{regular_target, transform_polygon};
