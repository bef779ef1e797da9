//! Diet planning on top of constrained quadratic models.
//!
//! - `Food`, `Requirement` - the data
//! - `DietProblem`, `Weights` - the formulation
//! - `DietReport` - post-processing of samples
//! - `DietPlanner` - sampling and weight tuning

pub mod food;
pub mod planner;
pub mod problem;
pub mod report;

pub use food::{Food, Requirement, Units};
pub use planner::{DietPlanner, PlanOutcome};
pub use problem::{DietProblem, Weights, CALORIES};
pub use report::{ConstraintLine, DietReport, Portion};
