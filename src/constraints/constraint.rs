//! Constraint types for constrained quadratic models.
//!
//! A constraint compares an expression against a scalar right-hand side:
//! - Le: lhs <= rhs
//! - Ge: lhs >= rhs
//! - Eq: lhs == rhs
//!
//! The constant part of the left-hand side is folded into `rhs` on
//! construction, so `lhs` never carries an offset.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::expr::Expr;
use crate::sample::Sample;

/// Comparison sense of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sense {
    /// lhs <= rhs.
    Le,
    /// lhs >= rhs.
    Ge,
    /// lhs == rhs.
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "==",
        };
        f.write_str(op)
    }
}

/// A constraint in a constrained quadratic model.
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Left-hand side, with no constant term.
    pub lhs: Expr,
    /// Comparison sense.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

impl Constraint {
    /// Create a constraint `lhs sense rhs`.
    pub fn new(lhs: Expr, sense: Sense, rhs: f64) -> Self {
        let rhs = rhs - lhs.offset();
        Constraint {
            lhs: lhs.without_offset(),
            sense,
            rhs,
        }
    }

    /// Create an inequality constraint: lhs <= rhs.
    pub fn le(lhs: Expr, rhs: f64) -> Self {
        Self::new(lhs, Sense::Le, rhs)
    }

    /// Create an inequality constraint: lhs >= rhs.
    pub fn ge(lhs: Expr, rhs: f64) -> Self {
        Self::new(lhs, Sense::Ge, rhs)
    }

    /// Create an equality constraint: lhs == rhs.
    pub fn eq(lhs: Expr, rhs: f64) -> Self {
        Self::new(lhs, Sense::Eq, rhs)
    }

    /// Check whether the left-hand side is linear.
    pub fn is_linear(&self) -> bool {
        self.lhs.is_linear()
    }

    /// Value of the left-hand side at a sample.
    pub fn lhs_energy(&self, sample: &Sample) -> Result<f64> {
        self.lhs.energy(sample)
    }

    /// Amount by which a sample violates this constraint (0 if satisfied).
    pub fn violation(&self, sample: &Sample) -> Result<f64> {
        let lhs = self.lhs_energy(sample)?;
        Ok(self.violation_at(lhs))
    }

    pub(crate) fn violation_at(&self, lhs: f64) -> f64 {
        match self.sense {
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
            Sense::Eq => (lhs - self.rhs).abs(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.sense, self.rhs)
    }
}

/// Extension trait for creating constraints from expressions.
pub trait ConstraintExt {
    /// Create inequality constraint: self <= rhs.
    fn le(&self, rhs: f64) -> Constraint;

    /// Create inequality constraint: self >= rhs.
    fn ge(&self, rhs: f64) -> Constraint;

    /// Create equality constraint: self == rhs.
    fn equals(&self, rhs: f64) -> Constraint;
}

impl ConstraintExt for Expr {
    fn le(&self, rhs: f64) -> Constraint {
        Constraint::le(self.clone(), rhs)
    }

    fn ge(&self, rhs: f64) -> Constraint {
        Constraint::ge(self.clone(), rhs)
    }

    fn equals(&self, rhs: f64) -> Constraint {
        Constraint::eq(self.clone(), rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::real;

    fn sample(pairs: &[(&str, f64)]) -> Sample {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_offset_moves_to_rhs() {
        let x = real("x");
        let c = (&x + 5.0).le(8.0);
        assert_eq!(c.rhs, 3.0);
        assert_eq!(c.lhs.offset(), 0.0);
        assert_eq!(c.sense, Sense::Le);
    }

    #[test]
    fn test_violation_le() {
        let c = real("x").le(2.0);
        assert_eq!(c.violation(&sample(&[("x", 1.0)])).unwrap(), 0.0);
        assert_eq!(c.violation(&sample(&[("x", 3.5)])).unwrap(), 1.5);
    }

    #[test]
    fn test_violation_ge() {
        let c = real("x").ge(2.0);
        assert_eq!(c.violation(&sample(&[("x", 3.0)])).unwrap(), 0.0);
        assert_eq!(c.violation(&sample(&[("x", 0.5)])).unwrap(), 1.5);
    }

    #[test]
    fn test_violation_eq() {
        let c = real("x").equals(2.0);
        assert_eq!(c.violation(&sample(&[("x", 1.0)])).unwrap(), 1.0);
        assert_eq!(c.violation(&sample(&[("x", 3.0)])).unwrap(), 1.0);
    }

    #[test]
    fn test_quadratic_constraint_not_linear() {
        let x = real("x");
        let c = x.try_mul(&x).unwrap().le(4.0);
        assert!(!c.is_linear());
    }

    #[test]
    fn test_display() {
        let c = (2.0 * real("x")).ge(1.0);
        assert_eq!(c.to_string(), "2*x >= 1");
    }
}
