//! Command-line interface definitions and handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use dietcqm::diet::{DietPlanner, Units, Weights};
use dietcqm::expr::VariableData;
use dietcqm::{BranchAndBoundSampler, Config};

/// dietcqm - tasty, cheap diets from a constrained quadratic model.
#[derive(Parser, Debug)]
#[command(name = "dietcqm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (built-in catalog if omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the best diet for one weighting of taste and cost
    Solve(WeightArgs),

    /// Compare the combined objective with taste alone and cost alone
    Tune,

    /// Print the model's variables, objective and constraints
    Model(WeightArgs),

    /// List the food catalog
    Foods,
}

/// Objective weight overrides.
#[derive(Args, Debug, Default)]
pub struct WeightArgs {
    /// Weight on maximizing taste
    #[arg(long)]
    pub taste: Option<f64>,

    /// Weight on minimizing cost
    #[arg(long)]
    pub cost: Option<f64>,
}

impl WeightArgs {
    fn resolve(&self, base: Weights) -> Weights {
        Weights {
            taste: self.taste.unwrap_or(base.taste),
            cost: self.cost.unwrap_or(base.cost),
        }
    }
}

impl Cli {
    /// Load the configuration and apply command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        Ok(config)
    }
}

/// Run the selected command.
pub fn execute(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Solve(args) => run_solve(config, args.resolve(config.weights), cli.json),
        Commands::Tune => run_tune(config, cli.json),
        Commands::Model(args) => run_model(config, args.resolve(config.weights), cli.json),
        Commands::Foods => run_foods(config, cli.json),
    }
}

fn planner(config: &Config) -> DietPlanner<BranchAndBoundSampler> {
    let sampler = BranchAndBoundSampler::with_settings(config.sampler_settings());
    DietPlanner::new(config.problem(), sampler)
}

fn run_solve(config: &Config, weights: Weights, json: bool) -> Result<()> {
    let outcome = planner(config)
        .plan(&weights)
        .context("failed to plan diet")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "{} feasible solutions of {}.",
            outcome.feasible, outcome.total
        );
        println!("{}", outcome.best);
    }
    Ok(())
}

fn run_tune(config: &Config, json: bool) -> Result<()> {
    let outcomes = planner(config).tune(&[]).context("failed to tune weights")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    for outcome in &outcomes {
        println!(
            "Weights taste={} cost={}: best energy {:.2} ({} feasible of {})",
            outcome.weights.taste,
            outcome.weights.cost,
            outcome.best.energy,
            outcome.feasible,
            outcome.total
        );
        println!("{}\n", outcome.best);
    }
    Ok(())
}

#[derive(Serialize)]
struct ModelSummary<'a> {
    variables: &'a [VariableData],
    objective: String,
    constraints: Vec<ConstraintSummary>,
}

#[derive(Serialize)]
struct ConstraintSummary {
    label: String,
    constraint: String,
}

fn run_model(config: &Config, weights: Weights, json: bool) -> Result<()> {
    let cqm = config
        .problem()
        .build_cqm(&weights)
        .context("failed to build model")?;
    info!(
        variables = cqm.num_variables(),
        constraints = cqm.num_constraints(),
        "model built"
    );

    if json {
        let summary = ModelSummary {
            variables: cqm.variables(),
            objective: cqm.objective().to_string(),
            constraints: cqm
                .constraints()
                .iter()
                .map(|c| ConstraintSummary {
                    label: c.label.clone(),
                    constraint: c.constraint.to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Variables:");
    for v in cqm.variables() {
        println!("  {} {} [{}, {}]", v.label, v.vartype, v.lower, v.upper);
    }
    println!("Objective:\n  {}", cqm.objective());
    println!("Constraints:");
    for c in cqm.constraints() {
        println!("  {}: {}", c.label, c.constraint);
    }
    Ok(())
}

fn run_foods(config: &Config, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.foods)?);
        return Ok(());
    }

    println!(
        "{:<12} {:>8} {:>6} {:>6} {:<10} nutrients",
        "food", "calories", "taste", "cost", "units"
    );
    for food in &config.foods {
        let units = match food.units {
            Units::Continuous => "continuous",
            Units::Discrete => "discrete",
        };
        let nutrients = food
            .nutrients
            .iter()
            .map(|(name, amount)| format!("{name}={amount}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<12} {:>8} {:>6} {:>6} {:<10} {}",
            food.name, food.calories, food.taste, food.cost, units, nutrients
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_solve_with_weights() {
        let cli = Cli::parse_from(["dietcqm", "solve", "--taste", "2", "--cost", "0.5", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Solve(args) => {
                let w = args.resolve(Weights::combined());
                assert_eq!(w, Weights::new(2.0, 0.5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_partial_override_keeps_config_weight() {
        let args = WeightArgs {
            taste: None,
            cost: Some(0.0),
        };
        assert_eq!(args.resolve(Weights::combined()), Weights::new(1.0, 0.0));
    }

    #[test]
    fn test_log_level_override() {
        let cli = Cli::parse_from(["dietcqm", "--log-level", "debug", "foods"]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.foods.len(), 6);
    }
}
