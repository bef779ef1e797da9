//! Sampling diet models and comparing objective weightings.

use serde::Serialize;
use tracing::info;

use super::problem::{DietProblem, Weights};
use super::report::DietReport;
use crate::error::{DietError, Result};
use crate::solver::Sampler;

/// The best diet found for one weighting.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    /// Weights the model was built with.
    pub weights: Weights,
    /// Number of feasible samples returned.
    pub feasible: usize,
    /// Total number of samples returned.
    pub total: usize,
    /// Report for the lowest-energy feasible sample.
    pub best: DietReport,
}

/// Builds diet models and samples them.
pub struct DietPlanner<S: Sampler> {
    problem: DietProblem,
    sampler: S,
}

impl<S: Sampler> DietPlanner<S> {
    pub fn new(problem: DietProblem, sampler: S) -> Self {
        DietPlanner { problem, sampler }
    }

    pub fn problem(&self) -> &DietProblem {
        &self.problem
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Sample the model for `weights` and report the best feasible diet.
    ///
    /// # Errors
    ///
    /// Returns `NoFeasibleSample` if the sampler returned no feasible sample.
    pub fn plan(&self, weights: &Weights) -> Result<PlanOutcome> {
        let cqm = self.problem.build_cqm(weights)?;
        let sampleset = self.sampler.sample_cqm(&cqm)?;
        let feasible = sampleset.feasible();

        info!(
            sampler = self.sampler.name(),
            taste = weights.taste,
            cost = weights.cost,
            "{} feasible solutions of {}",
            feasible.len(),
            sampleset.len()
        );

        let best = feasible
            .first()
            .ok_or(DietError::NoFeasibleSample(sampleset.len()))?;
        let report = DietReport::from_record(&self.problem, &cqm, best)?;

        Ok(PlanOutcome {
            weights: *weights,
            feasible: feasible.len(),
            total: sampleset.len(),
            best: report,
        })
    }

    /// Plan once per weighting.
    ///
    /// With no weightings given, compares the combined objective against
    /// taste alone and cost alone.
    pub fn tune(&self, weightings: &[Weights]) -> Result<Vec<PlanOutcome>> {
        let defaults = [
            Weights::combined(),
            Weights::taste_only(),
            Weights::cost_only(),
        ];
        let weightings = if weightings.is_empty() {
            &defaults[..]
        } else {
            weightings
        };

        weightings.iter().map(|w| self.plan(w)).collect()
    }
}
