//! Diet Planning Example
//!
//! Builds the diet model for the built-in catalog, samples it, and then
//! compares the combined objective with taste alone and cost alone:
//!
//! minimize    -w_taste * taste + w_cost * cost
//! subject to  calories <= 2000
//!             protein >= 50, fat >= 30, carbs >= 130, fiber >= 30
//!             0 <= q_food <= 2000 / calories_food

use dietcqm::prelude::*;

fn main() -> Result<()> {
    println!("=== Diet Planning ===\n");

    let problem = DietProblem::default_catalog();

    println!("Foods:");
    for food in &problem.foods {
        println!(
            "  {:<8} {:>4} kcal  taste {:>2}  cost {:>4}  {:?}",
            food.name, food.calories, food.taste, food.cost, food.units
        );
    }

    // Model with taste weighted against a sixfold cost
    let cqm = problem.build_cqm(&Weights::combined())?;
    println!("\nObjective: {}", cqm.objective());
    for c in cqm.constraints() {
        println!("  {}: {}", c.label, c.constraint);
    }

    println!("\nSampling...");
    let sampler = BranchAndBoundSampler::new();
    let sampleset = sampler.sample_cqm(&cqm)?;
    let feasible = sampleset.feasible();
    println!(
        "{} feasible solutions of {} ({} nodes).",
        feasible.len(),
        sampleset.len(),
        sampleset.info.nodes
    );

    if let Some(best) = feasible.first() {
        println!("\nBest diet:");
        println!("{}", DietReport::from_record(&problem, &cqm, best)?);
    }

    // Tuning: each objective on its own, then both together
    println!("\n=== Tuning ===");
    let planner = DietPlanner::new(problem, sampler);
    for outcome in planner.tune(&[])? {
        println!(
            "\nWeights taste={} cost={}, energy {:.2}:",
            outcome.weights.taste, outcome.weights.cost, outcome.best.energy
        );
        println!("{}", outcome.best);
    }

    Ok(())
}
