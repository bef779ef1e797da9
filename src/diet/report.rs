//! Post-processing of sampled diets into readable reports.

use std::fmt;

use serde::Serialize;

use super::problem::DietProblem;
use crate::error::{DietError, Result};
use crate::model::ConstrainedQuadraticModel;
use crate::sample::{round_to, SampleRecord};

/// Quantity of one food in a diet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portion {
    pub food: String,
    pub quantity: f64,
}

/// A constraint's nominal value next to the diet's actual total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintLine {
    pub label: String,
    pub nominal: f64,
    pub value: f64,
}

/// A diet read back from a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietReport {
    /// Per-food quantities rounded to one decimal, in food order.
    pub diet: Vec<Portion>,
    /// Total taste rounded to two decimals.
    pub taste_total: f64,
    /// Total cost rounded to two decimals.
    pub cost_total: f64,
    /// Objective value of the sample.
    pub energy: f64,
    /// Every constraint, with its total rounded to an integer.
    pub constraints: Vec<ConstraintLine>,
}

impl DietReport {
    /// Build a report from a sample record of a diet model.
    pub fn from_record(
        problem: &DietProblem,
        cqm: &ConstrainedQuadraticModel,
        record: &SampleRecord,
    ) -> Result<Self> {
        let mut diet = Vec::with_capacity(problem.foods.len());
        let mut taste_total = 0.0;
        let mut cost_total = 0.0;

        for food in &problem.foods {
            let amount = record
                .sample
                .get(&food.name)
                .ok_or_else(|| DietError::UnknownVariable(food.name.clone()))?;
            taste_total += food.taste * amount;
            cost_total += food.cost * amount;
            diet.push(Portion {
                food: food.name.clone(),
                quantity: round_to(amount, 1),
            });
        }

        let constraints = cqm
            .iter_constraint_data(&record.sample)?
            .into_iter()
            .map(|d| ConstraintLine {
                label: d.label,
                nominal: d.rhs_energy,
                value: round_to(d.lhs_energy, 0),
            })
            .collect();

        Ok(DietReport {
            diet,
            taste_total: round_to(taste_total, 2),
            cost_total: round_to(cost_total, 2),
            energy: record.energy,
            constraints,
        })
    }

    /// Quantity of a food in the diet.
    pub fn quantity(&self, food: &str) -> Option<f64> {
        self.diet
            .iter()
            .find(|p| p.food == food)
            .map(|p| p.quantity)
    }
}

impl fmt::Display for DietReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Diet: {{")?;
        for (i, portion) in self.diet.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", portion.food, portion.quantity)?;
        }
        writeln!(f, "}}")?;
        writeln!(
            f,
            "Total taste of {} at cost {}",
            self.taste_total, self.cost_total
        )?;
        for (i, line) in self.constraints.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} (nominal: {}): {}", line.label, line.nominal, line.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diet::Weights;
    use crate::sample::{Sample, SampleSet};

    fn record(problem: &DietProblem, cqm: &ConstrainedQuadraticModel, values: &[f64]) -> SampleRecord {
        let sample: Sample = problem
            .foods
            .iter()
            .zip(values)
            .map(|(f, v)| (f.name.clone(), *v))
            .collect();
        SampleSet::from_samples(cqm, vec![sample], 1e-6)
            .unwrap()
            .first()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_report_totals() {
        let problem = DietProblem::default_catalog();
        let cqm = problem.build_cqm(&Weights::default()).unwrap();
        // bread 5.2, avocado 1, banana 1
        let rec = record(&problem, &cqm, &[0.0, 0.0, 1.0, 0.0, 5.2, 1.0]);
        let report = DietReport::from_record(&problem, &cqm, &rec).unwrap();

        assert_eq!(report.quantity("bread"), Some(5.2));
        assert_eq!(report.taste_total, 41.0);
        assert_eq!(report.cost_total, 4.3);
        assert_eq!(report.constraints[0].label, "Calories");
        assert_eq!(report.constraints[0].nominal, 2000.0);
        assert_eq!(report.constraints[0].value, 1794.0);
        assert!(rec.is_feasible);
    }

    #[test]
    fn test_display() {
        let problem = DietProblem::default_catalog();
        let cqm = problem.build_cqm(&Weights::default()).unwrap();
        let rec = record(&problem, &cqm, &[0.0, 0.0, 1.0, 0.0, 5.2, 1.0]);
        let text = DietReport::from_record(&problem, &cqm, &rec)
            .unwrap()
            .to_string();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Diet: {rice: 0.0, tofu: 0.0, banana: 1.0, lentils: 0.0, bread: 5.2, avocado: 1.0}")
        );
        assert_eq!(lines.next(), Some("Total taste of 41 at cost 4.3"));
        assert_eq!(lines.next(), Some("Calories (nominal: 2000): 1794"));
        assert_eq!(lines.next(), Some("Protein (nominal: 50): 52"));
    }

    #[test]
    fn test_missing_food_in_sample() {
        let problem = DietProblem::default_catalog();
        let cqm = problem.build_cqm(&Weights::default()).unwrap();
        let rec = SampleRecord {
            sample: Sample::new(),
            energy: 0.0,
            num_occurrences: 1,
            is_feasible: false,
            is_satisfied: Vec::new(),
        };
        assert!(DietReport::from_record(&problem, &cqm, &rec).is_err());
    }
}
