//! Error handling for configuration sampling, clearance evaluation and experiment loading

use std::io;
use crate::sampler::SamplerError;

/// Failures of the configuration generator and the clearance evaluator.
#[derive(Debug)]
pub enum SamplingError {
    /// The attempt cap was reached before enough configurations were accepted.
    AttemptsExhausted { accepted: usize, requested: usize, attempts: usize },
    /// Collision filtering needs at least one companion pose.
    EmptyCompanionTrajectory,
    /// The motion planner could not connect start and goal.
    PlannerFailed(String),
    Sampler(SamplerError),
}

impl std::fmt::Display for SamplingError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            SamplingError::AttemptsExhausted { accepted, requested, attempts } =>
                write!(f, "Only {} of {} configurations accepted after {} attempts",
                       accepted, requested, attempts),
            SamplingError::EmptyCompanionTrajectory =>
                write!(f, "Companion trajectory is empty"),
            SamplingError::PlannerFailed(ref msg) =>
                write!(f, "Planner failed: {}", msg),
            SamplingError::Sampler(ref err) =>
                write!(f, "Sampler Error: {}", err),
        }
    }
}

impl std::error::Error for SamplingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SamplingError::Sampler(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SamplerError> for SamplingError {
    fn from(err: SamplerError) -> Self {
        SamplingError::Sampler(err)
    }
}

/// Unified error to report failures while reading the experiment description.
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    WrongType { field: String, expected: &'static str },
    InvalidLength { field: String, expected: usize, found: usize },
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ConfigError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ConfigError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ConfigError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            ConfigError::WrongType { ref field, expected } =>
                write!(f, "Field {} must be {}", field, expected),
            ConfigError::InvalidLength { ref field, expected, found } =>
                write!(f, "Invalid Length of {}: expected {}, found {}", field, expected, found),
            ConfigError::InvalidValue(ref msg) =>
                write!(f, "Invalid Value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<SamplerError> for ConfigError {
    fn from(err: SamplerError) -> Self {
        ConfigError::InvalidValue(err.to_string())
    }
}
