// src/error.rs

use crate::protocol::StepStatus;
use thiserror::Error;

/// Why a submission was turned away. Neither is fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("command is empty")]
    EmptyCommand,
    #[error("a command is already executing")]
    AlreadyExecuting,
}

impl SubmitError {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SubmitError::EmptyCommand => {
                Some("Type a command, e.g. 'search for laptops under 50k and list top 5'")
            }
            SubmitError::AlreadyExecuting => Some("Wait for the current command to finish."),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no step at index {0}")]
    UnknownStep(usize),
    #[error("step {index} cannot move from {from} to {to}")]
    InvalidTransition {
        index: usize,
        from: StepStatus,
        to: StepStatus,
    },
    #[error("{0} step(s) have not completed")]
    IncompleteSteps(usize),
    #[error("no command is executing")]
    NotExecuting,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("minimum step delay ({min_ms} ms) exceeds the maximum ({max_ms} ms)")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },
    #[error("error rate must be within 0.0..=1.0, got {0}")]
    InvalidErrorRate(f64),
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid keyword rule: {0}")]
    Rule(#[from] regex::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("session state error: {0}")]
    Session(#[from] SessionError),
}

impl AgentError {
    /// The submission never started; state is untouched.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AgentError::Submit(_))
    }
}
