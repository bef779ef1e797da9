//! Samples and sample sets returned by samplers.
//!
//! A `SampleSet` holds one record per distinct sample, sorted by energy, with
//! feasibility and per-constraint satisfaction already evaluated against the
//! model that produced it.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::model::ConstrainedQuadraticModel;

/// An assignment of values to labelled variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sample {
    values: Vec<(String, f64)>,
}

impl Sample {
    /// Create an empty sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of a variable, replacing any existing value.
    pub fn insert(&mut self, label: impl Into<String>, value: f64) {
        let label = label.into();
        match self.values.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.values.push((label, value)),
        }
    }

    /// Value of a variable.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    /// Iterate over `(label, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(l, v)| (l.as_str(), *v))
    }

    /// Number of variables in the sample.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the sample has no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if two samples assign the same values, in any label order.
    pub fn same_assignment(&self, other: &Sample) -> bool {
        self.len() == other.len() && self.iter().all(|(l, v)| other.get(l) == Some(v))
    }

    /// Copy of this sample with every value rounded to `decimals` places.
    pub fn round(&self, decimals: i32) -> Sample {
        self.values
            .iter()
            .map(|(l, v)| (l.clone(), round_to(*v, decimals)))
            .collect()
    }
}

impl FromIterator<(String, f64)> for Sample {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut sample = Sample::new();
        for (label, value) in iter {
            sample.insert(label, value);
        }
        sample
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (label, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", label, value)?;
        }
        write!(f, "}}")
    }
}

/// Round half away from zero to the given number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // Avoid printing "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// A sample together with its evaluation against a model.
#[derive(Debug, Clone, Serialize)]
pub struct SampleRecord {
    /// Variable assignment.
    pub sample: Sample,
    /// Objective value.
    pub energy: f64,
    /// How many times the sampler returned this assignment.
    pub num_occurrences: usize,
    /// Whether every constraint and bound is satisfied.
    pub is_feasible: bool,
    /// Satisfaction of each constraint, in model order.
    pub is_satisfied: Vec<(String, bool)>,
}

/// Metadata describing how a sample set was produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SampleSetInfo {
    /// Name of the sampler.
    pub sampler: String,
    /// Number of search nodes explored.
    pub nodes: usize,
    /// Wall time in seconds.
    pub run_time: f64,
}

/// A collection of evaluated samples, sorted by ascending energy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SampleSet {
    records: Vec<SampleRecord>,
    /// Sampler metadata.
    pub info: SampleSetInfo,
}

impl SampleSet {
    /// Evaluate raw samples against a model and build a sorted sample set.
    ///
    /// Samples assigning identical values are merged into one record,
    /// whatever order their labels come in.
    pub fn from_samples(
        cqm: &ConstrainedQuadraticModel,
        samples: impl IntoIterator<Item = Sample>,
        atol: f64,
    ) -> Result<Self> {
        let mut records: Vec<SampleRecord> = Vec::new();

        for sample in samples {
            if let Some(existing) = records
                .iter_mut()
                .find(|r| r.sample.same_assignment(&sample))
            {
                existing.num_occurrences += 1;
                continue;
            }

            let energy = cqm.objective_energy(&sample)?;
            let data = cqm.iter_constraint_data(&sample)?;
            let is_satisfied: Vec<(String, bool)> = data
                .iter()
                .map(|d| (d.label.clone(), d.violation <= atol))
                .collect();
            let is_feasible = cqm.check_feasible(&sample, atol)?;

            records.push(SampleRecord {
                sample,
                energy,
                num_occurrences: 1,
                is_feasible,
                is_satisfied,
            });
        }

        let mut set = SampleSet {
            records,
            info: SampleSetInfo::default(),
        };
        set.sort();
        Ok(set)
    }

    /// Attach sampler metadata.
    pub fn with_info(mut self, info: SampleSetInfo) -> Self {
        self.info = info;
        self
    }

    fn sort(&mut self) {
        self.records.sort_by(|a, b| {
            a.energy
                .total_cmp(&b.energy)
                .then_with(|| b.is_feasible.cmp(&a.is_feasible))
        });
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in ascending energy.
    pub fn iter(&self) -> impl Iterator<Item = &SampleRecord> {
        self.records.iter()
    }

    /// Keep only the records matching a predicate.
    pub fn filter(&self, predicate: impl Fn(&SampleRecord) -> bool) -> SampleSet {
        SampleSet {
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
            info: self.info.clone(),
        }
    }

    /// Keep only feasible records.
    pub fn feasible(&self) -> SampleSet {
        self.filter(|r| r.is_feasible)
    }

    /// The lowest-energy record.
    pub fn first(&self) -> Option<&SampleRecord> {
        self.records.first()
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a SampleRecord;
    type IntoIter = std::slice::Iter<'a, SampleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
