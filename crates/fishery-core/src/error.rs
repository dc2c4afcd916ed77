//! Error types for the simulation.

use crate::types::SimulationId;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid settings: {}", join_violations(.0))]
    InvalidSettings(Vec<SettingViolation>),

    #[error("Simulation with ID {0} not found")]
    SimulationNotFound(SimulationId),

    #[error("Invalid step count {0}: must be between 0 and {max}", max = crate::MAX_STEPS_PER_CALL)]
    InvalidStepCount(i64),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// A single settings field outside its accepted range.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingViolation {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

impl SettingViolation {
    pub fn new(field: &'static str, value: impl fmt::Display, expected: impl Into<String>) -> Self {
        Self {
            field,
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

impl fmt::Display for SettingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is invalid ({}), expected {}", self.field, self.value, self.expected)
    }
}

fn join_violations(violations: &[SettingViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_settings_message_lists_every_field() {
        let err = Error::InvalidSettings(vec![
            SettingViolation::new("size_x", 0, "1..=1000"),
            SettingViolation::new("fishing_chance", 1.5, "0.0..=1.0"),
        ]);
        let message = err.to_string();
        assert!(message.contains("size_x is invalid (0)"));
        assert!(message.contains("fishing_chance is invalid (1.5)"));
    }

    #[test]
    fn test_step_count_message() {
        let err = Error::InvalidStepCount(-3);
        assert_eq!(
            err.to_string(),
            "Invalid step count -3: must be between 0 and 100000"
        );
    }
}
