//! Constraints for constrained quadratic models.

pub mod constraint;

pub use constraint::{Constraint, ConstraintExt, Sense};
