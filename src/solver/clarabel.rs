//! Continuous relaxations solved with Clarabel.
//!
//! Every branch-and-bound node hands its stuffed problem to Clarabel's
//! interior-point method. Integrality is ignored here.

use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::{
    DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT,
};
use nalgebra_sparse::CscMatrix;
use serde::Deserialize;

use super::stuffing::{ConeDims, StuffedProblem};
use crate::error::{DietError, Result};

/// Outcome of a relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Solved to tolerance (or nearly so).
    Optimal,
    /// No point satisfies the node's constraints and bounds.
    Infeasible,
    /// Objective decreases without limit.
    Unbounded,
    /// Iteration or time budget exhausted.
    MaxIterations,
    /// Solver stopped on numerical trouble or insufficient progress.
    NumericalError,
    /// Any other solver outcome.
    Unknown,
}

impl SolveStatus {
    /// Check if the relaxation was solved.
    pub fn is_optimal(&self) -> bool {
        *self == SolveStatus::Optimal
    }
}

impl From<SolverStatus> for SolveStatus {
    fn from(status: SolverStatus) -> Self {
        use SolverStatus::*;
        match status {
            Solved | AlmostSolved => Self::Optimal,
            PrimalInfeasible | AlmostPrimalInfeasible => Self::Infeasible,
            DualInfeasible | AlmostDualInfeasible => Self::Unbounded,
            MaxIterations | MaxTime => Self::MaxIterations,
            NumericalError | InsufficientProgress => Self::NumericalError,
            _ => Self::Unknown,
        }
    }
}

/// Clarabel settings for relaxation solves.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Print solver output.
    pub verbose: bool,
    /// Maximum interior-point iterations.
    pub max_iter: u32,
    /// Seconds per relaxation.
    pub time_limit: f64,
    /// Absolute duality gap tolerance.
    pub tol_gap_abs: f64,
    /// Relative duality gap tolerance.
    pub tol_gap_rel: f64,
    /// Feasibility tolerance.
    pub tol_feas: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            verbose: false,
            max_iter: 200,
            time_limit: f64::INFINITY,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            tol_feas: 1e-8,
        }
    }
}

impl Settings {
    fn to_clarabel(&self) -> Result<DefaultSettings<f64>> {
        DefaultSettingsBuilder::default()
            .verbose(self.verbose)
            .max_iter(self.max_iter)
            .time_limit(self.time_limit)
            .tol_gap_abs(self.tol_gap_abs)
            .tol_gap_rel(self.tol_gap_rel)
            .tol_feas(self.tol_feas)
            .build()
            .map_err(|e| DietError::SolverError(format!("invalid relaxation settings: {e}")))
    }
}

/// A solved (or failed) continuous relaxation.
#[derive(Debug, Clone)]
pub struct Relaxation {
    /// Solve outcome.
    pub status: SolveStatus,
    /// Objective value with the constant offset, when optimal.
    pub value: Option<f64>,
    /// Primal point in model column order, when optimal.
    pub primal: Option<Vec<f64>>,
    /// Solver time in seconds.
    pub solve_time: f64,
    /// Interior-point iterations used.
    pub iterations: u32,
}

/// Solve the continuous relaxation of a stuffed problem.
///
/// # Errors
///
/// Returns `SolverError` for settings or data Clarabel rejects and `NumericalError`
/// if an optimal point contains non-finite values.
pub fn solve(problem: &StuffedProblem, settings: &Settings) -> Result<Relaxation> {
    let p = clarabel_matrix(&problem.p);
    let a = clarabel_matrix(&problem.a);
    let cones = clarabel_cones(&problem.cone_dims);

    let mut solver = DefaultSolver::new(
        &p,
        &problem.q,
        &a,
        &problem.b,
        &cones,
        settings.to_clarabel()?,
    )
    .map_err(|e| DietError::SolverError(format!("relaxation setup failed: {e:?}")))?;
    solver.solve();

    let status = SolveStatus::from(solver.solution.status);
    let mut relaxation = Relaxation {
        status,
        value: None,
        primal: None,
        solve_time: solver.solution.solve_time,
        iterations: solver.info.iterations,
    };

    if status.is_optimal() {
        let x = std::mem::take(&mut solver.solution.x);
        if !x.iter().all(|v| v.is_finite()) {
            return Err(DietError::NumericalError(
                "relaxation returned non-finite values".into(),
            ));
        }
        relaxation.value = Some(problem.objective_at(&x));
        relaxation.primal = Some(x);
    }
    Ok(relaxation)
}

fn clarabel_matrix(m: &CscMatrix<f64>) -> ClarabelCsc<f64> {
    let (offsets, rows, values) = m.csc_data();
    ClarabelCsc::new(
        m.nrows(),
        m.ncols(),
        offsets.to_vec(),
        rows.to_vec(),
        values.to_vec(),
    )
}

/// Zero cone rows first, then nonnegative rows, matching the stuffed row order.
fn clarabel_cones(dims: &ConeDims) -> Vec<SupportedConeT<f64>> {
    [
        (dims.zero > 0).then(|| SupportedConeT::ZeroConeT(dims.zero)),
        (dims.nonneg > 0).then(|| SupportedConeT::NonnegativeConeT(dims.nonneg)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintExt;
    use crate::expr::real;
    use crate::model::ConstrainedQuadraticModel;
    use crate::solver::stuffing::StuffedModel;

    const TOL: f64 = 1e-5;

    #[test]
    fn test_settings_accepted() {
        let settings = Settings::default();
        assert_eq!(settings.max_iter, 200);
        assert!(settings.to_clarabel().is_ok());
    }

    #[test]
    fn test_cones_skip_empty() {
        assert_eq!(clarabel_cones(&ConeDims { zero: 2, nonneg: 3 }).len(), 2);
        assert_eq!(clarabel_cones(&ConeDims { zero: 0, nonneg: 3 }).len(), 1);
        assert!(clarabel_cones(&ConeDims { zero: 0, nonneg: 0 }).is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(SolveStatus::from(SolverStatus::AlmostSolved), SolveStatus::Optimal);
        assert_eq!(
            SolveStatus::from(SolverStatus::AlmostDualInfeasible),
            SolveStatus::Unbounded
        );
        assert_eq!(SolveStatus::from(SolverStatus::MaxTime), SolveStatus::MaxIterations);
    }

    #[test]
    fn test_solve_lp_relaxation() {
        // minimize x + 2y s.t. x + y >= 3, x <= 2
        // optimal: x = 2, y = 1, value = 4
        let x = real("x");
        let y = real("y");
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.set_objective(&x + 2.0 * &y).unwrap();
        cqm.add_constraint((&x + &y).ge(3.0), None).unwrap();

        let stuffed = StuffedModel::new(&cqm).unwrap();
        let problem = stuffed.with_bounds(&[0.0, 0.0], &[2.0, 1e30]);
        let result = solve(&problem, &Settings::default()).unwrap();

        assert_eq!(result.status, SolveStatus::Optimal);
        let value = result.value.unwrap();
        assert!((value - 4.0).abs() < TOL, "Expected ~4.0, got {}", value);
        let primal = result.primal.unwrap();
        assert!((primal[0] - 2.0).abs() < TOL);
        assert!((primal[1] - 1.0).abs() < TOL);
    }

    #[test]
    fn test_solve_qp_relaxation() {
        // minimize (x - 1.5)^2 = x^2 - 3x + 2.25 over [0, 10]
        let x = real("x");
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.set_objective(x.try_mul(&x).unwrap() - 3.0 * &x + 2.25)
            .unwrap();

        let stuffed = StuffedModel::new(&cqm).unwrap();
        let problem = stuffed.with_bounds(&[0.0], &[10.0]);
        let result = solve(&problem, &Settings::default()).unwrap();

        assert!(result.status.is_optimal());
        let primal = result.primal.unwrap();
        assert!((primal[0] - 1.5).abs() < TOL, "Expected x ~1.5, got {}", primal[0]);
        assert!(result.value.unwrap().abs() < TOL);
    }

    #[test]
    fn test_infeasible_relaxation() {
        let x = real("x");
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.set_objective(x.clone()).unwrap();
        cqm.add_constraint(x.ge(5.0), None).unwrap();

        let stuffed = StuffedModel::new(&cqm).unwrap();
        let problem = stuffed.with_bounds(&[0.0], &[2.0]);
        let result = solve(&problem, &Settings::default()).unwrap();

        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(result.primal.is_none());
        assert!(result.value.is_none());
    }
}
