// src/validation/command.rs

use crate::error::SubmitError;

/// Rejects blank submissions. The command text itself is passed through untouched.
pub fn validate_command(command: &str) -> Result<&str, SubmitError> {
    if command.trim().is_empty() {
        return Err(SubmitError::EmptyCommand);
    }
    Ok(command)
}
