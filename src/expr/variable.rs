//! Variable creation with builder pattern.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::expression::Expr;

/// Upper bound used for variables with no explicit upper bound.
pub const DEFAULT_UPPER_BOUND: f64 = 1e30;

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vartype {
    /// Takes values in {0, 1}.
    Binary,
    /// Takes integer values within its bounds.
    Integer,
    /// Takes any real value within its bounds.
    Real,
}

impl Vartype {
    /// Whether values of this vartype must be integral.
    pub fn is_integral(&self) -> bool {
        matches!(self, Vartype::Binary | Vartype::Integer)
    }

    /// Default `(lower, upper)` bounds for this vartype.
    pub fn default_bounds(&self) -> (f64, f64) {
        match self {
            Vartype::Binary => (0.0, 1.0),
            Vartype::Integer | Vartype::Real => (0.0, DEFAULT_UPPER_BOUND),
        }
    }
}

impl fmt::Display for Vartype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Vartype::Binary => "BINARY",
            Vartype::Integer => "INTEGER",
            Vartype::Real => "REAL",
        };
        f.write_str(name)
    }
}

/// Declaration of a labelled variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableData {
    /// Unique label.
    pub label: String,
    /// Variable domain.
    pub vartype: Vartype,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

/// Builder for creating variables with various attributes.
pub struct VariableBuilder {
    label: String,
    vartype: Vartype,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl VariableBuilder {
    /// Create a new variable builder with the given label and vartype.
    pub fn new(label: impl Into<String>, vartype: Vartype) -> Self {
        Self {
            label: label.into(),
            vartype,
            lower: None,
            upper: None,
        }
    }

    /// Create a real-valued variable builder.
    pub fn real(label: impl Into<String>) -> Self {
        Self::new(label, Vartype::Real)
    }

    /// Create an integer variable builder.
    pub fn integer(label: impl Into<String>) -> Self {
        Self::new(label, Vartype::Integer)
    }

    /// Create a binary variable builder.
    pub fn binary(label: impl Into<String>) -> Self {
        Self::new(label, Vartype::Binary)
    }

    /// Set the lower bound.
    pub fn lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    /// Set the upper bound.
    pub fn upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    /// Build the variable declaration.
    pub fn data(self) -> VariableData {
        let (lower, upper) = self.vartype.default_bounds();
        VariableData {
            label: self.label,
            vartype: self.vartype,
            lower: self.lower.unwrap_or(lower),
            upper: self.upper.unwrap_or(upper),
        }
    }

    /// Build the variable expression.
    pub fn build(self) -> Expr {
        Expr::variable(self.data())
    }
}

/// Create a real-valued variable with default bounds `[0, 1e30]`.
///
/// # Examples
///
/// ```
/// use dietcqm::expr::real;
///
/// let rice = real("rice");
/// assert!(rice.is_linear());
/// ```
pub fn real(label: impl Into<String>) -> Expr {
    VariableBuilder::real(label).build()
}

/// Create an integer variable with default bounds `[0, 1e30]`.
pub fn integer(label: impl Into<String>) -> Expr {
    VariableBuilder::integer(label).build()
}

/// Create a binary variable.
pub fn binary(label: impl Into<String>) -> Expr {
    VariableBuilder::binary(label).build()
}
