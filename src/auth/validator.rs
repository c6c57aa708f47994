//! Authentication validator
//!
//! Checks the client-supplied admin password against the configured
//! secret. The secret lives in server configuration only and is never
//! sent to the client.

use crate::config::StartupConfig;
use crate::error::AuthError;

const MAX_PASSWORD_LENGTH: usize = 128;

/// Basic input sanitation for credentials
fn is_valid_input(input: &str) -> bool {
    !input.trim().is_empty()
        && input.len() <= MAX_PASSWORD_LENGTH
        && !input.contains(['\r', '\n', '\0'])
}

/// Validates the admin password against the configured secret
pub fn validate_password(password: &str, config: &StartupConfig) -> Result<(), AuthError> {
    if !is_valid_input(password) {
        return Err(AuthError::MalformedInput("Invalid password format".into()));
    }

    if password == config.admin_password {
        Ok(())
    } else {
        Err(AuthError::InvalidPassword)
    }
}
