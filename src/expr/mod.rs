//! Expression types and creation utilities.
//!
//! This module provides the building blocks for constrained quadratic models:
//! - `Expr` - a polynomial of degree at most two over labelled variables
//! - `Vartype` - the domain of a variable (binary, integer or real)
//! - Variable creation via `real()`, `integer()`, `binary()` and `VariableBuilder`

pub mod expression;
mod ops;
pub mod variable;

// Re-export main types
pub use expression::Expr;
pub use variable::{
    binary, integer, real, VariableBuilder, VariableData, Vartype, DEFAULT_UPPER_BOUND,
};
