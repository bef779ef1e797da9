//! Foods and nutrient requirements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::expr::Vartype;

/// How a food can be portioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Any non-negative real quantity.
    Continuous,
    /// Whole portions only.
    Discrete,
}

impl Units {
    /// Variable type used for quantities of this food.
    pub fn vartype(&self) -> Vartype {
        match self {
            Units::Continuous => Vartype::Real,
            Units::Discrete => Vartype::Integer,
        }
    }
}

/// A food with per-portion attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub name: String,
    pub calories: f64,
    pub taste: f64,
    pub cost: f64,
    pub units: Units,
    #[serde(default)]
    pub nutrients: BTreeMap<String, f64>,
}

impl Food {
    /// Look up a per-portion attribute by category name.
    ///
    /// `Calories`, `Taste` and `Cost` resolve to the named fields; anything
    /// else is looked up among the nutrients.
    pub fn attribute(&self, category: &str) -> Option<f64> {
        match category {
            "Calories" => Some(self.calories),
            "Taste" => Some(self.taste),
            "Cost" => Some(self.cost),
            nutrient => self.nutrients.get(nutrient).copied(),
        }
    }
}

/// Minimum daily amount of a nutrient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub nutrient: String,
    pub minimum: f64,
}
