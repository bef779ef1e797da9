//! Error types for dietcqm.

use thiserror::Error;

/// Error type for dietcqm operations.
#[derive(Debug, Error)]
pub enum DietError {
    /// A constraint label is already taken.
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    /// A variable label is not part of the model or sample.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// The same label was declared with two different vartypes.
    #[error("Variable {label} declared as {existing} and {requested}")]
    VartypeConflict {
        label: String,
        existing: String,
        requested: String,
    },

    /// Lower bound exceeds upper bound, or a bound is out of the vartype's domain.
    #[error("Invalid bounds for {label}: [{lower}, {upper}]")]
    InvalidBounds { label: String, lower: f64, upper: f64 },

    /// The model uses a feature the sampler cannot handle.
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    /// Solver error.
    #[error("Solver error: {0}")]
    SolverError(String),

    /// Numerical error.
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Sampling returned no sample satisfying every constraint.
    #[error("No feasible sample among {0} returned")]
    NoFeasibleSample(usize),

    /// The diet data or weights are malformed.
    #[error("Invalid diet: {0}")]
    InvalidDiet(String),

    /// Sampler limits or tolerances are unusable.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O failure while reading configuration.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for dietcqm operations.
pub type Result<T> = std::result::Result<T, DietError>;
