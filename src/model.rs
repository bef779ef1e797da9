//! Constrained quadratic model definition.
//!
//! A `ConstrainedQuadraticModel` holds:
//! - Labelled variables with a vartype and bounds
//! - A quadratic objective to minimize
//! - Labelled constraints
//!
//! ```ignore
//! let mut cqm = ConstrainedQuadraticModel::new();
//! cqm.set_objective(-taste + 6.0 * cost)?;
//! cqm.add_constraint(calories.le(2000.0), Some("Calories"))?;
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::constraints::{Constraint, Sense};
use crate::error::{DietError, Result};
use crate::expr::{Expr, VariableData, Vartype};
use crate::sample::Sample;

/// A constraint together with its label.
#[derive(Debug, Clone)]
pub struct LabeledConstraint {
    /// Unique label.
    pub label: String,
    /// The constraint.
    pub constraint: Constraint,
}

/// Evaluation of one constraint at a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintData {
    /// Constraint label.
    pub label: String,
    /// Comparison sense.
    pub sense: Sense,
    /// Value of the left-hand side.
    pub lhs_energy: f64,
    /// Right-hand side.
    pub rhs_energy: f64,
    /// Amount of violation (0 if satisfied).
    pub violation: f64,
    /// Whether the violation is zero.
    pub is_satisfied: bool,
}

/// A constrained quadratic model: minimize a quadratic objective subject to
/// labelled constraints over bounded variables.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedQuadraticModel {
    variables: Vec<VariableData>,
    index: HashMap<String, usize>,
    objective: Expr,
    constraints: Vec<LabeledConstraint>,
}

impl ConstrainedQuadraticModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable with default bounds.
    ///
    /// Adding a label that already exists with the same vartype is a no-op.
    pub fn add_variable(&mut self, vartype: Vartype, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        let (lower, upper) = vartype.default_bounds();
        self.declare(&VariableData {
            label,
            vartype,
            lower,
            upper,
        })
    }

    fn declare(&mut self, data: &VariableData) -> Result<()> {
        if let Some(&i) = self.index.get(&data.label) {
            let existing = &self.variables[i];
            if existing.vartype != data.vartype {
                return Err(DietError::VartypeConflict {
                    label: data.label.clone(),
                    existing: existing.vartype.to_string(),
                    requested: data.vartype.to_string(),
                });
            }
            return Ok(());
        }

        check_bounds(&data.label, data.vartype, data.lower, data.upper)?;
        self.index.insert(data.label.clone(), self.variables.len());
        self.variables.push(data.clone());
        Ok(())
    }

    fn declare_all(&mut self, expr: &Expr) -> Result<()> {
        for data in expr.declarations() {
            self.declare(data)?;
        }
        Ok(())
    }

    /// Set the objective, replacing any previous one.
    pub fn set_objective(&mut self, objective: Expr) -> Result<()> {
        self.declare_all(&objective)?;
        self.objective = objective;
        Ok(())
    }

    /// Add a constraint and return its label.
    ///
    /// Without an explicit label, one of the form `c<n>` is generated.
    pub fn add_constraint(&mut self, constraint: Constraint, label: Option<&str>) -> Result<String> {
        let label = match label {
            Some(l) => {
                if self.constraint(l).is_some() {
                    return Err(DietError::DuplicateLabel(l.to_string()));
                }
                l.to_string()
            }
            None => self.next_constraint_label(),
        };

        self.declare_all(&constraint.lhs)?;
        self.constraints.push(LabeledConstraint {
            label: label.clone(),
            constraint,
        });
        Ok(label)
    }

    fn next_constraint_label(&self) -> String {
        let mut n = self.constraints.len();
        loop {
            let candidate = format!("c{}", n);
            if self.constraint(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    fn variable_mut(&mut self, label: &str) -> Result<&mut VariableData> {
        let i = *self
            .index
            .get(label)
            .ok_or_else(|| DietError::UnknownVariable(label.to_string()))?;
        Ok(&mut self.variables[i])
    }

    /// Set the upper bound of a variable.
    pub fn set_upper_bound(&mut self, label: &str, upper: f64) -> Result<()> {
        let var = self.variable_mut(label)?;
        check_bounds(label, var.vartype, var.lower, upper)?;
        var.upper = upper;
        Ok(())
    }

    /// Set the lower bound of a variable.
    pub fn set_lower_bound(&mut self, label: &str, lower: f64) -> Result<()> {
        let var = self.variable_mut(label)?;
        check_bounds(label, var.vartype, lower, var.upper)?;
        var.lower = lower;
        Ok(())
    }

    /// Upper bound of a variable.
    pub fn upper_bound(&self, label: &str) -> Result<f64> {
        self.variable(label).map(|v| v.upper)
    }

    /// Lower bound of a variable.
    pub fn lower_bound(&self, label: &str) -> Result<f64> {
        self.variable(label).map(|v| v.lower)
    }

    /// Vartype of a variable.
    pub fn vartype(&self, label: &str) -> Result<Vartype> {
        self.variable(label).map(|v| v.vartype)
    }

    /// Declaration of a variable.
    pub fn variable(&self, label: &str) -> Result<&VariableData> {
        self.index
            .get(label)
            .map(|&i| &self.variables[i])
            .ok_or_else(|| DietError::UnknownVariable(label.to_string()))
    }

    /// All variables in declaration order.
    pub fn variables(&self) -> &[VariableData] {
        &self.variables
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// All constraints in insertion order.
    pub fn constraints(&self) -> &[LabeledConstraint] {
        &self.constraints
    }

    /// Look up a constraint by label.
    pub fn constraint(&self, label: &str) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| c.label == label)
            .map(|c| &c.constraint)
    }

    /// The objective.
    pub fn objective(&self) -> &Expr {
        &self.objective
    }

    /// Objective value at a sample.
    pub fn objective_energy(&self, sample: &Sample) -> Result<f64> {
        self.objective.energy(sample)
    }

    /// Evaluate every constraint at a sample.
    pub fn iter_constraint_data(&self, sample: &Sample) -> Result<Vec<ConstraintData>> {
        self.constraints
            .iter()
            .map(|lc| {
                let lhs = lc.constraint.lhs_energy(sample)?;
                let violation = lc.constraint.violation_at(lhs);
                Ok(ConstraintData {
                    label: lc.label.clone(),
                    sense: lc.constraint.sense,
                    lhs_energy: lhs,
                    rhs_energy: lc.constraint.rhs,
                    violation,
                    is_satisfied: violation == 0.0,
                })
            })
            .collect()
    }

    /// Check whether a sample satisfies every constraint, bound and
    /// integrality requirement within `atol`.
    pub fn check_feasible(&self, sample: &Sample, atol: f64) -> Result<bool> {
        for var in &self.variables {
            let value = sample
                .get(&var.label)
                .ok_or_else(|| DietError::UnknownVariable(var.label.clone()))?;
            if value < var.lower - atol || value > var.upper + atol {
                return Ok(false);
            }
            if var.vartype.is_integral() && (value - value.round()).abs() > atol {
                return Ok(false);
            }
        }

        for data in self.iter_constraint_data(sample)? {
            if data.violation > atol {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn check_bounds(label: &str, vartype: Vartype, lower: f64, upper: f64) -> Result<()> {
    let invalid = lower.is_nan()
        || upper.is_nan()
        || lower > upper
        || (vartype == Vartype::Binary && (lower < 0.0 || upper > 1.0));
    if invalid {
        return Err(DietError::InvalidBounds {
            label: label.to_string(),
            lower,
            upper,
        });
    }
    Ok(())
}
