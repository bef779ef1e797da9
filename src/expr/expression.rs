//! Core expression type for dietcqm.
//!
//! An `Expr` is a polynomial of degree at most two over labelled variables:
//!
//! ```text
//! sum_ij Q_ij x_i x_j + sum_i c_i x_i + offset
//! ```
//!
//! Expressions carry the declarations of the variables they mention, so a
//! model learns its variables from the objective and constraints it is given.

use std::collections::HashMap;
use std::fmt;

use super::variable::VariableData;
use crate::error::{DietError, Result};
use crate::sample::Sample;

/// A quadratic polynomial over labelled variables.
#[derive(Debug, Clone, Default)]
pub struct Expr {
    /// Variable declarations in first-seen order.
    vars: Vec<VariableData>,
    /// Linear coefficients by label.
    linear: HashMap<String, f64>,
    /// Quadratic coefficients keyed by an ordered label pair (`a <= b`).
    quadratic: HashMap<(String, String), f64>,
    /// Constant term.
    offset: f64,
}

impl Expr {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: f64) -> Self {
        Expr {
            offset: value,
            ..Self::default()
        }
    }

    /// A single-variable expression with unit coefficient.
    pub fn variable(data: VariableData) -> Self {
        let mut linear = HashMap::new();
        linear.insert(data.label.clone(), 1.0);
        Expr {
            vars: vec![data],
            linear,
            quadratic: HashMap::new(),
            offset: 0.0,
        }
    }

    /// Weighted sum `sum_i coeffs[i] * exprs[i]`.
    ///
    /// Extra entries on either side are ignored.
    pub fn dot<'a>(exprs: impl IntoIterator<Item = &'a Expr>, coeffs: &[f64]) -> Expr {
        exprs
            .into_iter()
            .zip(coeffs)
            .map(|(e, &c)| e.scale(c))
            .sum()
    }

    /// Variable declarations carried by this expression.
    pub fn declarations(&self) -> &[VariableData] {
        &self.vars
    }

    /// Labels of the variables with a nonzero coefficient, in declaration order.
    pub fn variables(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for v in &self.vars {
            let used = self.linear.contains_key(&v.label)
                || self
                    .quadratic
                    .keys()
                    .any(|(a, b)| *a == v.label || *b == v.label);
            if used && !labels.contains(&v.label.as_str()) {
                labels.push(&v.label);
            }
        }
        labels
    }

    /// Linear coefficient of a variable (0 if absent).
    pub fn linear_coefficient(&self, label: &str) -> f64 {
        self.linear.get(label).copied().unwrap_or(0.0)
    }

    /// Quadratic coefficient of `a * b` (0 if absent).
    pub fn quadratic_coefficient(&self, a: &str, b: &str) -> f64 {
        self.quadratic
            .get(&quad_key(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Iterate over the linear terms.
    pub fn linear_terms(&self) -> impl Iterator<Item = (&str, f64)> {
        self.linear.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterate over the quadratic terms.
    pub fn quadratic_terms(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.quadratic
            .iter()
            .map(|((a, b), v)| (a.as_str(), b.as_str(), *v))
    }

    /// Constant term.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Polynomial degree (0, 1 or 2).
    pub fn degree(&self) -> usize {
        if !self.quadratic.is_empty() {
            2
        } else if !self.linear.is_empty() {
            1
        } else {
            0
        }
    }

    /// True if there are no quadratic terms.
    pub fn is_linear(&self) -> bool {
        self.quadratic.is_empty()
    }

    /// Evaluate the expression at a sample.
    pub fn energy(&self, sample: &Sample) -> Result<f64> {
        let value = |label: &str| {
            sample
                .get(label)
                .ok_or_else(|| DietError::UnknownVariable(label.to_string()))
        };

        let mut total = self.offset;
        for (label, c) in &self.linear {
            total += c * value(label)?;
        }
        for ((a, b), c) in &self.quadratic {
            total += c * value(a)? * value(b)?;
        }
        Ok(total)
    }

    /// Product of two expressions.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedModel` if the product would have degree above 2.
    pub fn try_mul(&self, other: &Expr) -> Result<Expr> {
        if self.degree() + other.degree() > 2 {
            return Err(DietError::UnsupportedModel(format!(
                "product of degree {} and degree {} expressions exceeds degree 2",
                self.degree(),
                other.degree()
            )));
        }

        let mut out = Expr::constant(self.offset * other.offset);
        out.declare_all(&self.vars);
        out.declare_all(&other.vars);

        for (label, c) in &self.linear {
            add_coeff(&mut out.linear, label.clone(), c * other.offset);
        }
        for (label, c) in &other.linear {
            add_coeff(&mut out.linear, label.clone(), c * self.offset);
        }
        for (key, c) in &self.quadratic {
            add_coeff(&mut out.quadratic, key.clone(), c * other.offset);
        }
        for (key, c) in &other.quadratic {
            add_coeff(&mut out.quadratic, key.clone(), c * self.offset);
        }
        for (a, ca) in &self.linear {
            for (b, cb) in &other.linear {
                add_coeff(&mut out.quadratic, quad_key(a, b), ca * cb);
            }
        }
        out.prune();
        Ok(out)
    }

    /// Multiply every coefficient by a scalar.
    pub fn scale(&self, scalar: f64) -> Expr {
        let mut out = self.clone();
        out.scale_in_place(scalar);
        out
    }

    pub(crate) fn scale_in_place(&mut self, scalar: f64) {
        for c in self.linear.values_mut() {
            *c *= scalar;
        }
        for c in self.quadratic.values_mut() {
            *c *= scalar;
        }
        self.offset *= scalar;
        self.prune();
    }

    /// Add `other` into `self`.
    pub(crate) fn add_in_place(&mut self, other: &Expr) {
        self.declare_all(&other.vars);
        for (label, c) in &other.linear {
            add_coeff(&mut self.linear, label.clone(), *c);
        }
        for (key, c) in &other.quadratic {
            add_coeff(&mut self.quadratic, key.clone(), *c);
        }
        self.offset += other.offset;
        self.prune();
    }

    pub(crate) fn add_constant(&mut self, value: f64) {
        self.offset += value;
    }

    /// Copy of this expression with the constant term removed.
    pub(crate) fn without_offset(&self) -> Expr {
        let mut out = self.clone();
        out.offset = 0.0;
        out
    }

    /// Record declarations, keeping one entry per (label, vartype).
    ///
    /// A label declared with two vartypes keeps both entries so that the
    /// model rejects it when the expression is attached.
    fn declare_all(&mut self, vars: &[VariableData]) {
        for v in vars {
            if !self
                .vars
                .iter()
                .any(|existing| existing.label == v.label && existing.vartype == v.vartype)
            {
                self.vars.push(v.clone());
            }
        }
    }

    fn prune(&mut self) {
        self.linear.retain(|_, c| *c != 0.0);
        self.quadratic.retain(|_, c| *c != 0.0);
    }

    /// Position of a label in the declaration list, used for stable output.
    fn order_of(&self, label: &str) -> usize {
        self.vars
            .iter()
            .position(|v| v.label == label)
            .unwrap_or(usize::MAX)
    }
}

fn quad_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn add_coeff<K: std::hash::Hash + Eq>(map: &mut HashMap<K, f64>, key: K, value: f64) {
    *map.entry(key).or_insert(0.0) += value;
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // (is_quadratic, first index, second index, rendered name, coefficient)
        let mut terms: Vec<(bool, usize, usize, String, f64)> = Vec::new();
        for (label, c) in &self.linear {
            let i = self.order_of(label);
            terms.push((false, i, i, label.clone(), *c));
        }
        for ((a, b), c) in &self.quadratic {
            let (ia, ib) = (self.order_of(a), self.order_of(b));
            terms.push((true, ia.min(ib), ia.max(ib), format!("{}*{}", a, b), *c));
        }
        terms.sort_by_key(|(quad, i, j, _, _)| (*quad, *i, *j));

        let mut first = true;
        for (_, _, _, name, c) in terms {
            let (sign, magnitude) = if c < 0.0 { ("-", -c) } else { ("+", c) };
            if first {
                if sign == "-" {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {} ", sign)?;
            }
            if magnitude == 1.0 {
                write!(f, "{}", name)?;
            } else {
                write!(f, "{}*{}", magnitude, name)?;
            }
            first = false;
        }

        if first {
            write!(f, "{}", self.offset)
        } else if self.offset > 0.0 {
            write!(f, " + {}", self.offset)
        } else if self.offset < 0.0 {
            write!(f, " - {}", -self.offset)
        } else {
            Ok(())
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}
