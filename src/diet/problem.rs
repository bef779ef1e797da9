//! Diet problem formulation.
//!
//! The goal is a diet that tastes as good as possible while keeping to a
//! budget and to daily macro-nutrient requirements. Two objectives pull
//! against each other, so they are combined with priority weights:
//!
//! ```text
//! minimize  -w_taste * sum(q_i * taste_i) + w_cost * sum(q_i * cost_i)
//! ```
//!
//! Taste is maximized by minimizing its negation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::food::{Food, Requirement, Units};
use crate::constraints::ConstraintExt;
use crate::error::{DietError, Result};
use crate::expr::{Expr, VariableBuilder};
use crate::model::ConstrainedQuadraticModel;

/// Label of the calorie-cap constraint.
pub const CALORIES: &str = "Calories";

/// Priority weights for the taste and cost objectives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub taste: f64,
    pub cost: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self::combined()
    }
}

impl Weights {
    pub fn new(taste: f64, cost: f64) -> Self {
        Weights { taste, cost }
    }

    /// Taste against cost, with cost weighted six times as heavily.
    pub fn combined() -> Self {
        Weights::new(1.0, 6.0)
    }

    /// Maximize taste only.
    pub fn taste_only() -> Self {
        Weights::new(1.0, 0.0)
    }

    /// Minimize cost only.
    pub fn cost_only() -> Self {
        Weights::new(0.0, 1.0)
    }

    /// Weights must be finite, non-negative and not both zero.
    pub fn validate(&self) -> Result<()> {
        let ok = |w: f64| w.is_finite() && w >= 0.0;
        if !ok(self.taste) || !ok(self.cost) {
            return Err(DietError::InvalidDiet(format!(
                "weights must be finite and non-negative, got taste={} cost={}",
                self.taste, self.cost
            )));
        }
        if self.taste == 0.0 && self.cost == 0.0 {
            return Err(DietError::InvalidDiet("weights are both zero".into()));
        }
        Ok(())
    }
}

/// Foods, nutrient minimums and a calorie cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietProblem {
    pub foods: Vec<Food>,
    pub requirements: Vec<Requirement>,
    pub max_calories: f64,
}

impl DietProblem {
    /// Check that the data can be turned into a model.
    pub fn validate(&self) -> Result<()> {
        if self.foods.is_empty() {
            return Err(DietError::InvalidDiet("no foods given".into()));
        }
        if !(self.max_calories.is_finite() && self.max_calories > 0.0) {
            return Err(DietError::InvalidDiet(format!(
                "max_calories must be positive, got {}",
                self.max_calories
            )));
        }

        let mut required = HashSet::new();
        for req in &self.requirements {
            if matches!(req.nutrient.as_str(), CALORIES | "Taste" | "Cost") {
                return Err(DietError::InvalidDiet(format!(
                    "'{}' is not a nutrient",
                    req.nutrient
                )));
            }
            if !required.insert(req.nutrient.as_str()) {
                return Err(DietError::InvalidDiet(format!(
                    "nutrient '{}' required twice",
                    req.nutrient
                )));
            }
        }

        let mut seen = HashSet::new();
        for food in &self.foods {
            if !seen.insert(food.name.as_str()) {
                return Err(DietError::InvalidDiet(format!(
                    "food '{}' listed twice",
                    food.name
                )));
            }
            if !(food.calories.is_finite() && food.calories > 0.0) {
                return Err(DietError::InvalidDiet(format!(
                    "food '{}' must have positive calories",
                    food.name
                )));
            }
            for req in &self.requirements {
                if food.attribute(&req.nutrient).is_none() {
                    return Err(DietError::InvalidDiet(format!(
                        "food '{}' has no value for nutrient '{}'",
                        food.name, req.nutrient
                    )));
                }
            }
        }
        Ok(())
    }

    /// One quantity variable per food, in food order.
    ///
    /// No single food may exceed the calorie cap on its own, so each
    /// quantity is bounded above by `max_calories / calories`. The lower
    /// bound stays at zero.
    pub fn quantities(&self) -> Vec<Expr> {
        self.foods
            .iter()
            .map(|food| {
                let builder = match food.units {
                    Units::Continuous => VariableBuilder::real(&food.name),
                    Units::Discrete => VariableBuilder::integer(&food.name),
                };
                builder.upper(self.max_calories / food.calories).build()
            })
            .collect()
    }

    /// Total of a category over all foods: `sum_i q_i * food_i[category]`.
    pub fn total_mix(&self, quantities: &[Expr], category: &str) -> Result<Expr> {
        let coeffs = self
            .foods
            .iter()
            .map(|food| {
                food.attribute(category).ok_or_else(|| {
                    DietError::InvalidDiet(format!(
                        "food '{}' has no value for '{}'",
                        food.name, category
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Expr::dot(quantities, &coeffs))
    }

    /// Weighted objective `-w_taste * taste + w_cost * cost`.
    pub fn objective(&self, quantities: &[Expr], weights: &Weights) -> Result<Expr> {
        let taste = self.total_mix(quantities, "Taste")?;
        let cost = self.total_mix(quantities, "Cost")?;
        Ok(-weights.taste * taste + weights.cost * cost)
    }

    /// Build the constrained quadratic model for the given weights.
    pub fn build_cqm(&self, weights: &Weights) -> Result<ConstrainedQuadraticModel> {
        self.validate()?;
        weights.validate()?;

        let quantities = self.quantities();
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.set_objective(self.objective(&quantities, weights)?)?;

        let calories = self.total_mix(&quantities, CALORIES)?;
        cqm.add_constraint(calories.le(self.max_calories), Some(CALORIES))?;

        for req in &self.requirements {
            let total = self.total_mix(&quantities, &req.nutrient)?;
            cqm.add_constraint(total.ge(req.minimum), Some(&req.nutrient))?;
        }

        Ok(cqm)
    }

    /// Re-weight an existing model in place.
    pub fn reweight(&self, cqm: &mut ConstrainedQuadraticModel, weights: &Weights) -> Result<()> {
        weights.validate()?;
        let quantities = self.quantities();
        cqm.set_objective(self.objective(&quantities, weights)?)
    }

    /// The built-in six-food catalog.
    pub fn default_catalog() -> Self {
        let food = |name: &str,
                    calories: f64,
                    protein: f64,
                    fat: f64,
                    carbs: f64,
                    fiber: f64,
                    taste: f64,
                    cost: f64,
                    units: Units| Food {
            name: name.to_string(),
            calories,
            taste,
            cost,
            units,
            nutrients: [
                ("Protein".to_string(), protein),
                ("Fat".to_string(), fat),
                ("Carbs".to_string(), carbs),
                ("Fiber".to_string(), fiber),
            ]
            .into_iter()
            .collect(),
        };

        DietProblem {
            foods: vec![
                food("rice", 100.0, 3.0, 1.0, 22.0, 2.0, 7.0, 2.5, Units::Continuous),
                food("tofu", 140.0, 17.0, 9.0, 3.0, 2.0, 2.0, 4.0, Units::Continuous),
                food("banana", 90.0, 1.0, 0.0, 23.0, 3.0, 10.0, 1.0, Units::Discrete),
                food("lentils", 150.0, 9.0, 0.0, 25.0, 4.0, 3.0, 1.3, Units::Continuous),
                food("bread", 270.0, 9.0, 3.0, 50.0, 3.0, 5.0, 0.25, Units::Continuous),
                food("avocado", 300.0, 4.0, 30.0, 20.0, 14.0, 5.0, 2.0, Units::Discrete),
            ],
            requirements: vec![
                Requirement { nutrient: "Protein".into(), minimum: 50.0 },
                Requirement { nutrient: "Fat".into(), minimum: 30.0 },
                Requirement { nutrient: "Carbs".into(), minimum: 130.0 },
                Requirement { nutrient: "Fiber".into(), minimum: 30.0 },
            ],
            max_calories: 2000.0,
        }
    }
}

impl Default for DietProblem {
    fn default() -> Self {
        Self::default_catalog()
    }
}
