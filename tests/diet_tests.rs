//! End-to-end tests for the diet model with the built-in catalog.

use dietcqm::diet::CALORIES;
use dietcqm::prelude::*;
use dietcqm::Config;

/// Tolerance for comparing floating point results
const TOL: f64 = 1e-4;

/// Energy of banana 1, bread 5.2, avocado 1 under the combined weights.
/// That diet is feasible, so the optimum can be no worse.
const KNOWN_FEASIBLE_ENERGY: f64 = -15.2;

fn planner() -> DietPlanner<BranchAndBoundSampler> {
    DietPlanner::new(DietProblem::default_catalog(), BranchAndBoundSampler::new())
}

fn total(problem: &DietProblem, report: &DietReport, category: &str) -> f64 {
    problem
        .foods
        .iter()
        .map(|f| f.attribute(category).unwrap() * report.quantity(&f.name).unwrap())
        .sum()
}

#[test]
fn test_combined_plan_is_feasible() {
    let planner = planner();
    let outcome = planner.plan(&Weights::combined()).unwrap();
    let best = &outcome.best;

    assert!(outcome.feasible >= 1);
    assert!(outcome.feasible <= outcome.total);
    assert!(
        best.energy <= KNOWN_FEASIBLE_ENERGY + TOL,
        "expected energy at most {}, got {}",
        KNOWN_FEASIBLE_ENERGY,
        best.energy
    );

    // Discrete foods come in whole portions
    for food in ["banana", "avocado"] {
        let q = best.quantity(food).unwrap();
        assert_eq!(q, q.round(), "{} should be whole, got {}", food, q);
    }

    for line in &best.constraints {
        if line.label == CALORIES {
            assert!(line.value <= line.nominal + 1.0, "{:?}", line);
        } else {
            assert!(line.value >= line.nominal - 1.0, "{:?}", line);
        }
    }
}

#[test]
fn test_combined_plan_respects_limits_unrounded() {
    let problem = DietProblem::default_catalog();
    let cqm = problem.build_cqm(&Weights::combined()).unwrap();
    let set = BranchAndBoundSampler::new().sample_cqm(&cqm).unwrap();
    let feasible = set.feasible();
    let best = feasible.first().expect("no feasible diet");

    for data in cqm.iter_constraint_data(&best.sample).unwrap() {
        assert!(data.violation <= 1e-5, "{} violated by {}", data.label, data.violation);
    }
    assert!(best.is_satisfied.iter().all(|(_, ok)| *ok));
    for v in cqm.variables() {
        let q = best.sample.get(&v.label).unwrap();
        assert!(q >= -TOL && q <= v.upper + TOL, "{} = {} out of bounds", v.label, q);
    }
}

#[test]
fn test_report_matches_sample() {
    let problem = DietProblem::default_catalog();
    let outcome = planner().plan(&Weights::combined()).unwrap();
    let report = &outcome.best;

    // Quantities are rounded to one decimal, so totals agree loosely
    let taste = total(&problem, report, "Taste");
    assert!((taste - report.taste_total).abs() < 2.0);

    let text = report.to_string();
    assert!(text.starts_with("Diet: {rice: "));
    assert!(text.contains("Total taste of"));
    assert!(text.contains("Calories (nominal: 2000): "));
    assert!(text.contains("Fiber (nominal: 30): "));
}

#[test]
fn test_tune_tradeoff() {
    let outcomes = planner().tune(&[]).unwrap();
    assert_eq!(outcomes.len(), 3);

    let combined = &outcomes[0].best;
    let taste_only = &outcomes[1].best;
    let cost_only = &outcomes[2].best;

    // Each single objective does at least as well on its own measure
    assert!(taste_only.taste_total >= combined.taste_total - 0.1);
    assert!(cost_only.cost_total <= combined.cost_total + 0.1);
    assert!(taste_only.taste_total >= cost_only.taste_total - 0.1);
}

#[test]
fn test_reweight_existing_model() {
    let problem = DietProblem::default_catalog();
    let mut cqm = problem.build_cqm(&Weights::combined()).unwrap();
    problem.reweight(&mut cqm, &Weights::cost_only()).unwrap();

    let set = BranchAndBoundSampler::new().sample_cqm(&cqm).unwrap();
    let feasible = set.feasible();
    let best = feasible.first().expect("no feasible diet");

    // Cost only: the energy is the total cost
    let cost: f64 = problem
        .foods
        .iter()
        .map(|f| f.cost * best.sample.get(&f.name).unwrap())
        .sum();
    assert!((best.energy - cost).abs() < TOL);
}

#[test]
fn test_impossible_requirements() {
    let mut problem = DietProblem::default_catalog();
    problem.max_calories = 100.0;

    let planner = DietPlanner::new(problem, BranchAndBoundSampler::new());
    let err = planner.plan(&Weights::combined()).unwrap_err();
    assert!(matches!(err, DietError::NoFeasibleSample(_)));
}

#[test]
fn test_plan_from_config() {
    let config = Config::from_toml_str(
        r#"
        max_calories = 2000

        [weights]
        taste = 1
        cost = 6

        [sampler]
        time_limit = 30.0
        max_nodes = 5000
        "#,
    )
    .unwrap();

    let sampler = BranchAndBoundSampler::with_settings(config.sampler_settings());
    let planner = DietPlanner::new(config.problem(), sampler);
    let outcome = planner.plan(&config.weights).unwrap();
    assert!(outcome.best.energy <= KNOWN_FEASIBLE_ENERGY + TOL);
}

#[test]
fn test_plan_without_time_limit() {
    let config = Config::from_toml_str(
        r#"
        [sampler]
        time_limit = inf
        "#,
    )
    .unwrap();

    let sampler = BranchAndBoundSampler::with_settings(config.sampler_settings());
    let planner = DietPlanner::new(config.problem(), sampler);
    let outcome = planner.plan(&config.weights).unwrap();
    assert!(outcome.best.energy <= KNOWN_FEASIBLE_ENERGY + TOL);
}
