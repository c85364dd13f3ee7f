// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code >1)
/// Internal errors are for unexpected system failures, database corruption, etc.
pub fn internal_error(message: &str) -> ! {
    eprintln!("Internal error: {}", message);
    process::exit(2);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Is this failure the environment's fault (database, filesystem, corrupt
/// data) rather than the user's?
pub fn is_internal(error: &anyhow::Error) -> bool {
    if error.downcast_ref::<crate::error::XbitoError>().is_some() {
        return false;
    }
    error.chain().any(|cause| {
        cause.is::<rusqlite::Error>() || cause.is::<std::io::Error>() || cause.is::<serde_json::Error>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XbitoError;
    use crate::models::TaskKey;
    use anyhow::Context;

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty("test", "field").is_ok());
        assert!(validate_non_empty("", "field").is_err());
        assert!(validate_non_empty("   ", "field").is_err());
    }

    #[test]
    fn test_is_internal() {
        let not_found: anyhow::Error = XbitoError::TaskNotFound(TaskKey::new("a", "1")).into();
        assert!(!is_internal(&not_found));

        let io: anyhow::Result<()> = Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into());
        let io = io.context("Failed to read task snapshot").unwrap_err();
        assert!(is_internal(&io));

        assert!(!is_internal(&anyhow::anyhow!("Unknown filter: 'x'")));
    }
}
