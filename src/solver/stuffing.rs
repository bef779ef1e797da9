//! Matrix stuffing: converts a constrained quadratic model to solver format.
//!
//! This module builds the matrices (P, q, A, b) and cone specifications
//! required by Clarabel:
//!
//! ```text
//! minimize    (1/2) x' P x + q' x
//! subject to  A x + s = b,  s in K
//! ```
//!
//! Constraint rows do not change between branch-and-bound nodes, so they are
//! stuffed once into a `StuffedModel`; each node only adds its bound rows.

use std::collections::HashMap;

use nalgebra_sparse::CscMatrix;

use crate::constraints::Sense;
use crate::error::{DietError, Result};
use crate::expr::Expr;
use crate::model::ConstrainedQuadraticModel;
use crate::sparse::Triplets;

/// Bounds at or beyond this magnitude are treated as infinite.
pub const INFINITE_BOUND: f64 = 1e20;

/// Cone dimensions for Clarabel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConeDims {
    /// Number of zero cone (equality) rows.
    pub zero: usize,
    /// Number of nonnegative cone rows.
    pub nonneg: usize,
}

impl ConeDims {
    /// Total number of constraint rows.
    pub fn total(&self) -> usize {
        self.zero + self.nonneg
    }
}

/// Mapping from variable labels to columns of the optimization variable.
///
/// Column `i` is the `i`-th variable in model declaration order.
#[derive(Debug, Clone)]
pub struct VariableMap {
    /// Labels by column.
    pub labels: Vec<String>,
    columns: HashMap<String, usize>,
}

impl VariableMap {
    /// Build from a model's variables.
    pub fn from_model(cqm: &ConstrainedQuadraticModel) -> Self {
        let labels: Vec<String> = cqm.variables().iter().map(|v| v.label.clone()).collect();
        let columns = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        VariableMap { labels, columns }
    }

    /// Column of a variable.
    pub fn column(&self, label: &str) -> Result<usize> {
        self.columns
            .get(label)
            .copied()
            .ok_or_else(|| DietError::UnknownVariable(label.to_string()))
    }

    /// Total number of optimization variables.
    pub fn total_vars(&self) -> usize {
        self.labels.len()
    }
}

/// Objective and constraint rows of a model, independent of variable bounds.
#[derive(Debug, Clone)]
pub struct StuffedModel {
    /// Quadratic cost matrix P (n x n, upper triangle).
    pub p: CscMatrix<f64>,
    /// Linear cost vector q (n).
    pub q: Vec<f64>,
    /// Constant offset in objective.
    pub objective_offset: f64,
    /// Equality rows and right-hand sides.
    zero_rows: Triplets,
    zero_b: Vec<f64>,
    /// Inequality rows (in `<=` form) and right-hand sides.
    nonneg_rows: Triplets,
    nonneg_b: Vec<f64>,
    /// Variable mapping for solution recovery.
    pub var_map: VariableMap,
}

/// Stuffed problem ready for Clarabel.
#[derive(Debug)]
pub struct StuffedProblem {
    /// Quadratic cost matrix P (n x n, upper triangle).
    pub p: CscMatrix<f64>,
    /// Linear cost vector q (n).
    pub q: Vec<f64>,
    /// Constraint matrix A (m x n).
    pub a: CscMatrix<f64>,
    /// Constraint vector b (m).
    pub b: Vec<f64>,
    /// Cone dimensions.
    pub cone_dims: ConeDims,
    /// Constant offset in objective.
    pub objective_offset: f64,
}

impl StuffedProblem {
    /// Number of columns.
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Objective value `x'Px/2 + q'x + offset` at a point.
    pub fn objective_at(&self, x: &[f64]) -> f64 {
        let linear: f64 = self.q.iter().zip(x).map(|(q, v)| q * v).sum();
        let quadratic: f64 = self
            .p
            .triplet_iter()
            .map(|(i, j, v)| {
                // off-diagonal entries stand in for both triangles
                let weight = if i == j { 0.5 } else { 1.0 };
                weight * v * x[i] * x[j]
            })
            .sum();
        linear + quadratic + self.objective_offset
    }
}

impl StuffedModel {
    /// Stuff the objective and constraints of a model.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedModel` if any constraint is quadratic.
    pub fn new(cqm: &ConstrainedQuadraticModel) -> Result<Self> {
        let var_map = VariableMap::from_model(cqm);
        let column = |label: &str| var_map.column(label);

        let (p, q) = stuff_objective(cqm.objective(), var_map.total_vars(), &column)?;

        let mut zero_rows = Triplets::new();
        let mut zero_b = Vec::new();
        let mut nonneg_rows = Triplets::new();
        let mut nonneg_b = Vec::new();

        for lc in cqm.constraints() {
            let c = &lc.constraint;
            if !c.is_linear() {
                return Err(DietError::UnsupportedModel(format!(
                    "constraint '{}' is quadratic",
                    lc.label
                )));
            }

            match c.sense {
                // a'x = rhs
                Sense::Eq => {
                    let row = zero_b.len();
                    for (label, coeff) in c.lhs.linear_terms() {
                        zero_rows.push(row, column(label)?, coeff);
                    }
                    zero_b.push(c.rhs);
                }
                // a'x + s = rhs, s >= 0
                Sense::Le => {
                    let row = nonneg_b.len();
                    for (label, coeff) in c.lhs.linear_terms() {
                        nonneg_rows.push(row, column(label)?, coeff);
                    }
                    nonneg_b.push(c.rhs);
                }
                // a'x >= rhs  <=>  -a'x + s = -rhs, s >= 0
                Sense::Ge => {
                    let row = nonneg_b.len();
                    for (label, coeff) in c.lhs.linear_terms() {
                        nonneg_rows.push(row, column(label)?, -coeff);
                    }
                    nonneg_b.push(-c.rhs);
                }
            }
        }

        Ok(StuffedModel {
            p,
            q,
            objective_offset: cqm.objective().offset(),
            zero_rows,
            zero_b,
            nonneg_rows,
            nonneg_b,
            var_map,
        })
    }

    /// Number of optimization variables.
    pub fn num_vars(&self) -> usize {
        self.var_map.total_vars()
    }

    /// Build the full problem for the given per-variable bounds.
    ///
    /// Fixed variables (`lower == upper`) become equality rows; infinite
    /// bounds produce no row.
    pub fn with_bounds(&self, lower: &[f64], upper: &[f64]) -> StuffedProblem {
        let n = self.num_vars();

        let mut zero = self.zero_rows.clone();
        let mut b_zero = self.zero_b.clone();
        let mut bound_rows = Triplets::new();
        let mut b_bound = Vec::new();

        for i in 0..n {
            let (lo, hi) = (lower[i], upper[i]);
            if lo == hi {
                zero.push(b_zero.len(), i, 1.0);
                b_zero.push(lo);
                continue;
            }
            if hi < INFINITE_BOUND {
                bound_rows.push(b_bound.len(), i, 1.0);
                b_bound.push(hi);
            }
            if lo > -INFINITE_BOUND {
                bound_rows.push(b_bound.len(), i, -1.0);
                b_bound.push(-lo);
            }
        }

        // Zero cone rows first, then nonnegative rows
        let zero_count = b_zero.len();
        let mut a = zero;
        a.extend_shifted(&self.nonneg_rows, zero_count);
        a.extend_shifted(&bound_rows, zero_count + self.nonneg_b.len());

        let mut b = b_zero;
        b.extend_from_slice(&self.nonneg_b);
        b.extend_from_slice(&b_bound);

        let cone_dims = ConeDims {
            zero: zero_count,
            nonneg: self.nonneg_b.len() + b_bound.len(),
        };

        StuffedProblem {
            p: self.p.clone(),
            q: self.q.clone(),
            a: a.to_csc(cone_dims.total(), n),
            b,
            cone_dims,
            objective_offset: self.objective_offset,
        }
    }
}

/// Stuff the objective into P and q.
///
/// A term `c * x_i * x_j` contributes `c` to `P[i, j]` for `i < j` and `2c`
/// to `P[i, i]`, so that `(1/2) x' P x` reproduces the quadratic part.
fn stuff_objective(
    objective: &Expr,
    n: usize,
    column: &impl Fn(&str) -> Result<usize>,
) -> Result<(CscMatrix<f64>, Vec<f64>)> {
    let mut q = vec![0.0; n];
    for (label, coeff) in objective.linear_terms() {
        q[column(label)?] += coeff;
    }

    let mut p = Triplets::new();
    for (a, b, coeff) in objective.quadratic_terms() {
        let (i, j) = (column(a)?, column(b)?);
        if i == j {
            p.push(i, i, 2.0 * coeff);
        } else {
            // Clarabel expects the upper triangle only
            p.push(i.min(j), i.max(j), coeff);
        }
    }

    Ok((p.to_csc(n, n), q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintExt;
    use crate::expr::real;
    use crate::sparse::csc_to_dense;

    fn model() -> ConstrainedQuadraticModel {
        let x = real("x");
        let y = real("y");
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.set_objective(2.0 * &x - &y + x.try_mul(&y).unwrap() + 3.0)
            .unwrap();
        cqm.add_constraint((&x + &y).le(4.0), None).unwrap();
        cqm.add_constraint(x.ge(1.0), None).unwrap();
        cqm.add_constraint((&x - &y).equals(0.0), None).unwrap();
        cqm
    }

    #[test]
    fn test_objective() {
        let stuffed = StuffedModel::new(&model()).unwrap();
        assert_eq!(stuffed.q, vec![2.0, -1.0]);
        assert_eq!(stuffed.objective_offset, 3.0);
        let p = csc_to_dense(&stuffed.p);
        assert_eq!(p[(0, 1)], 1.0);
        assert_eq!(p[(1, 0)], 0.0);
    }

    #[test]
    fn test_objective_at_matches_energy() {
        let cqm = model();
        let problem = StuffedModel::new(&cqm)
            .unwrap()
            .with_bounds(&[0.0, 0.0], &[10.0, 10.0]);
        // 2*1.5 - 2 + 1.5*2 + 3
        let value = problem.objective_at(&[1.5, 2.0]);
        assert!((value - 7.0).abs() < 1e-12);
        assert_eq!(problem.num_vars(), 2);
    }

    #[test]
    fn test_variable_map_columns() {
        let map = VariableMap::from_model(&model());
        assert_eq!(map.column("x").unwrap(), 0);
        assert_eq!(map.column("y").unwrap(), 1);
        assert!(matches!(map.column("z"), Err(DietError::UnknownVariable(_))));
    }

    #[test]
    fn test_square_term_doubles_diagonal() {
        let x = real("x");
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.set_objective(x.try_mul(&x).unwrap() * 3.0).unwrap();
        let stuffed = StuffedModel::new(&cqm).unwrap();
        assert_eq!(csc_to_dense(&stuffed.p)[(0, 0)], 6.0);
    }

    #[test]
    fn test_rows_and_cones() {
        let stuffed = StuffedModel::new(&model()).unwrap();
        let problem = stuffed.with_bounds(&[0.0, 0.0], &[10.0, 1e30]);

        // 1 equality; 2 inequalities + 2 lower bounds + 1 finite upper bound
        assert_eq!(problem.cone_dims, ConeDims { zero: 1, nonneg: 5 });
        assert_eq!(problem.b, vec![0.0, 4.0, -1.0, 10.0, -0.0, -0.0]);

        let a = csc_to_dense(&problem.a);
        assert_eq!(a.nrows(), 6);
        // equality row: x - y
        assert_eq!((a[(0, 0)], a[(0, 1)]), (1.0, -1.0));
        // x >= 1 stored as -x <= -1
        assert_eq!(a[(2, 0)], -1.0);
        // x <= 10
        assert_eq!(a[(3, 0)], 1.0);
    }

    #[test]
    fn test_fixed_variable_is_equality() {
        let stuffed = StuffedModel::new(&model()).unwrap();
        let problem = stuffed.with_bounds(&[2.0, 0.0], &[2.0, 5.0]);
        assert_eq!(problem.cone_dims.zero, 2);
        assert_eq!(problem.b[1], 2.0);
    }

    #[test]
    fn test_quadratic_constraint_rejected() {
        let x = real("x");
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_constraint(x.try_mul(&x).unwrap().le(1.0), Some("sq"))
            .unwrap();
        assert!(matches!(
            StuffedModel::new(&cqm),
            Err(DietError::UnsupportedModel(_))
        ));
    }
}
