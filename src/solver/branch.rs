//! Branch-and-bound sampler.
//!
//! Depth-first branch-and-bound over the integer and binary variables of a
//! model, solving each node's continuous relaxation with Clarabel. Every
//! visited node contributes a rounded sample, so the returned set mixes
//! feasible incumbents with infeasible roundings, and callers filter by
//! feasibility.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::clarabel::{solve, Settings, SolveStatus};
use super::convexity::ensure_convex;
use super::stuffing::StuffedModel;
use super::Sampler;
use crate::error::{DietError, Result};
use crate::expr::VariableData;
use crate::model::ConstrainedQuadraticModel;
use crate::sample::{Sample, SampleSet, SampleSetInfo};

/// Settings for the branch-and-bound sampler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Settings for each relaxation solve.
    pub relaxation: Settings,
    /// Maximum number of nodes to explore.
    pub max_nodes: usize,
    /// Wall-time limit in seconds.
    pub time_limit: f64,
    /// Distance from an integer below which a value counts as integral.
    pub integrality_tol: f64,
    /// Tolerance used when judging sample feasibility.
    pub feasibility_tol: f64,
    /// Maximum number of samples to collect.
    pub max_samples: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        SamplerSettings {
            relaxation: Settings::default(),
            max_nodes: 10_000,
            time_limit: 10.0,
            integrality_tol: 1e-6,
            feasibility_tol: 1e-5,
            max_samples: 1_000,
        }
    }
}

impl SamplerSettings {
    /// Check that limits and tolerances are usable.
    ///
    /// `time_limit` may be infinite, which disables the wall-time limit.
    pub fn validate(&self) -> Result<()> {
        if self.time_limit.is_nan() || self.time_limit < 0.0 {
            return Err(DietError::InvalidSettings(format!(
                "time_limit must be non-negative, got {}",
                self.time_limit
            )));
        }
        for (name, tol) in [
            ("integrality_tol", self.integrality_tol),
            ("feasibility_tol", self.feasibility_tol),
        ] {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(DietError::InvalidSettings(format!(
                    "{name} must be finite and non-negative, got {tol}"
                )));
            }
        }
        Ok(())
    }
}

/// A search node: per-variable bounds.
#[derive(Debug, Clone)]
struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
    depth: usize,
}

/// Local sampler running branch-and-bound over Clarabel relaxations.
#[derive(Debug, Clone, Default)]
pub struct BranchAndBoundSampler {
    settings: SamplerSettings,
}

impl BranchAndBoundSampler {
    /// Create a sampler with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sampler with custom settings.
    pub fn with_settings(settings: SamplerSettings) -> Self {
        BranchAndBoundSampler { settings }
    }

    /// The sampler settings.
    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    fn root(&self, vars: &[VariableData]) -> Node {
        let tol = self.settings.integrality_tol;
        let (lower, upper) = vars
            .iter()
            .map(|v| {
                if v.vartype.is_integral() {
                    ((v.lower - tol).ceil(), (v.upper + tol).floor())
                } else {
                    (v.lower, v.upper)
                }
            })
            .unzip();
        Node {
            lower,
            upper,
            depth: 0,
        }
    }

    /// Round integral variables to the nearest integer and clamp every
    /// value into the node's bounds.
    fn round_sample(&self, x: &[f64], vars: &[VariableData], node: &Node) -> Sample {
        vars.iter()
            .enumerate()
            .map(|(i, v)| {
                let value = if v.vartype.is_integral() {
                    x[i].round()
                } else {
                    x[i]
                };
                (v.label.clone(), value.clamp(node.lower[i], node.upper[i]))
            })
            .collect()
    }

    /// Index and value of the most fractional integral variable, if any.
    fn most_fractional(&self, x: &[f64], vars: &[VariableData]) -> Option<(usize, f64)> {
        let tol = self.settings.integrality_tol;
        vars.iter()
            .enumerate()
            .filter(|(_, v)| v.vartype.is_integral())
            .map(|(i, _)| (i, x[i], (x[i] - x[i].round()).abs()))
            .filter(|(_, _, frac)| *frac > tol)
            .max_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(i, value, _)| (i, value))
    }
}

/// Objective improvement required to count as better than the incumbent.
fn improves(value: f64, incumbent: Option<f64>) -> bool {
    match incumbent {
        None => true,
        Some(best) => value < best - 1e-9 * best.abs().max(1.0),
    }
}

impl Sampler for BranchAndBoundSampler {
    fn name(&self) -> &'static str {
        "branch-and-bound"
    }

    fn sample_cqm(&self, cqm: &ConstrainedQuadraticModel) -> Result<SampleSet> {
        self.settings.validate()?;
        let start = Instant::now();
        // infinite or out-of-range limits mean no limit
        let time_limit = Duration::try_from_secs_f64(self.settings.time_limit).ok();
        let atol = self.settings.feasibility_tol;

        let stuffed = StuffedModel::new(cqm)?;
        ensure_convex(&stuffed.p)?;

        let vars = cqm.variables();
        let root = self.root(vars);
        if root.lower.iter().zip(&root.upper).any(|(lo, hi)| lo > hi) {
            warn!("integer variable bounds admit no integer value");
            return Ok(SampleSet::default().with_info(SampleSetInfo {
                sampler: self.name().to_string(),
                nodes: 0,
                run_time: start.elapsed().as_secs_f64(),
            }));
        }

        let mut stack = vec![root];
        let mut samples: Vec<Sample> = Vec::new();
        let mut incumbent: Option<f64> = None;
        let mut nodes = 0usize;

        while let Some(node) = stack.pop() {
            if nodes >= self.settings.max_nodes {
                info!(nodes, "node limit reached");
                break;
            }
            if time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                info!(nodes, "time limit reached");
                break;
            }
            if samples.len() >= self.settings.max_samples {
                debug!(samples = samples.len(), "sample limit reached");
                break;
            }
            nodes += 1;

            let problem = stuffed.with_bounds(&node.lower, &node.upper);
            let relaxation = solve(&problem, &self.settings.relaxation)?;

            let (x, bound) = match (relaxation.status, relaxation.primal, relaxation.value) {
                (SolveStatus::Optimal, Some(x), Some(value)) => (x, value),
                (SolveStatus::Infeasible, _, _) => {
                    debug!(depth = node.depth, "relaxation infeasible, pruning");
                    continue;
                }
                (SolveStatus::Unbounded, _, _) => {
                    return Err(DietError::UnsupportedModel(
                        "objective is unbounded below".into(),
                    ));
                }
                (status, _, _) => {
                    warn!(depth = node.depth, ?status, "relaxation not solved, skipping node");
                    continue;
                }
            };

            if !improves(bound, incumbent) {
                debug!(depth = node.depth, bound, "bound no better than incumbent, pruning");
                continue;
            }

            let rounded = self.round_sample(&x, vars, &node);

            match self.most_fractional(&x, vars) {
                None => {
                    debug!(depth = node.depth, energy = bound, "new incumbent");
                    incumbent = Some(bound);
                    samples.push(rounded);
                }
                Some((i, value)) => {
                    if cqm.check_feasible(&rounded, atol)? {
                        let energy = cqm.objective_energy(&rounded)?;
                        if improves(energy, incumbent) {
                            debug!(depth = node.depth, energy, "rounded relaxation is a new incumbent");
                            incumbent = Some(energy);
                        }
                    }
                    samples.push(rounded);

                    let mut down = node.clone();
                    down.upper[i] = value.floor();
                    down.depth += 1;
                    let mut up = node;
                    up.lower[i] = value.ceil();
                    up.depth += 1;

                    // Depth-first: the child pushed last is explored first
                    if value - value.floor() < 0.5 {
                        stack.push(up);
                        stack.push(down);
                    } else {
                        stack.push(down);
                        stack.push(up);
                    }
                }
            }
        }

        let run_time = start.elapsed().as_secs_f64();
        let set = SampleSet::from_samples(cqm, samples, atol)?.with_info(SampleSetInfo {
            sampler: self.name().to_string(),
            nodes,
            run_time,
        });

        info!(
            nodes,
            samples = set.len(),
            best = ?incumbent,
            run_time,
            "sampling finished"
        );
        Ok(set)
    }
}
