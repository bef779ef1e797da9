//! Sampler interface for dietcqm.
//!
//! This module provides:
//! - The `Sampler` trait, the seam between model building and solving
//! - Matrix stuffing to convert models to solver format
//! - Clarabel relaxation solves and a branch-and-bound sampler built on them

pub mod branch;
pub mod clarabel;
pub mod convexity;
pub mod stuffing;

pub use self::clarabel::{solve, Relaxation, Settings, SolveStatus};
pub use branch::{BranchAndBoundSampler, SamplerSettings};
pub use stuffing::{ConeDims, StuffedModel, StuffedProblem, VariableMap};

use crate::error::Result;
use crate::model::ConstrainedQuadraticModel;
use crate::sample::SampleSet;

/// A solver that returns a set of samples for a constrained quadratic model.
///
/// Implementations may be local (branch-and-bound) or wrap a remote
/// service. Returned sets may contain infeasible samples; callers filter
/// with [`SampleSet::feasible`].
pub trait Sampler: Send + Sync {
    /// Sampler name for logging.
    fn name(&self) -> &'static str;

    /// Sample the model.
    fn sample_cqm(&self, cqm: &ConstrainedQuadraticModel) -> Result<SampleSet>;
}
