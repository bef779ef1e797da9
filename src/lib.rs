//! # dietcqm
//!
//! Diet planning as a constrained quadratic model (CQM).
//!
//! dietcqm provides a small modeling layer for constrained quadratic models
//! over binary, integer and real variables, a local sampler that solves them
//! by branch-and-bound over Clarabel relaxations, and a diet formulation that
//! trades taste against cost under calorie and nutrient limits.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dietcqm::prelude::*;
//!
//! let problem = DietProblem::default_catalog();
//! let planner = DietPlanner::new(problem, BranchAndBoundSampler::new());
//!
//! let outcome = planner.plan(&Weights::combined())?;
//! println!("{}", outcome.best);
//! ```
//!
//! ## Building models directly
//!
//! ```ignore
//! use dietcqm::prelude::*;
//!
//! let x = VariableBuilder::integer("x").upper(10.0).build();
//! let y = real("y");
//!
//! let mut cqm = ConstrainedQuadraticModel::new();
//! cqm.set_objective(-2.0 * &x + &y)?;
//! cqm.add_constraint((&x + &y).le(7.5), Some("budget"))?;
//!
//! let samples = BranchAndBoundSampler::new().sample_cqm(&cqm)?;
//! let best = samples.feasible().first().cloned();
//! ```
//!
//! ## Architecture
//!
//! - **Expressions** are sparse polynomials of degree at most two keyed by label
//! - **Models** hold variables with vartypes and bounds, an objective and
//!   labelled constraints
//! - **Samplers** implement the `Sampler` trait and return sample sets that
//!   may include infeasible samples
//! - **Matrix stuffing** turns a model into Clarabel's `P`, `q`, `A`, `b` form

pub mod config;
pub mod constraints;
pub mod diet;
pub mod error;
pub mod expr;
pub mod logging;
pub mod model;
pub mod sample;
pub mod solver;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use dietcqm::prelude::*;
/// ```
pub mod prelude {
    // Expression types
    pub use crate::expr::{binary, integer, real, Expr, VariableBuilder, VariableData, Vartype};

    // Constraints
    pub use crate::constraints::{Constraint, ConstraintExt, Sense};

    // Model
    pub use crate::model::{ConstrainedQuadraticModel, ConstraintData};

    // Samples
    pub use crate::sample::{Sample, SampleRecord, SampleSet};

    // Solver
    pub use crate::solver::{BranchAndBoundSampler, Sampler, SamplerSettings, Settings};

    // Diet
    pub use crate::diet::{
        DietPlanner, DietProblem, DietReport, Food, PlanOutcome, Requirement, Units, Weights,
    };

    // Errors
    pub use crate::error::{DietError, Result};
}

// Re-export main types at crate root
pub use config::Config;
pub use error::{DietError, Result};
pub use model::ConstrainedQuadraticModel;
pub use sample::{Sample, SampleSet};
pub use solver::{BranchAndBoundSampler, Sampler};
