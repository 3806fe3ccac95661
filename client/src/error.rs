//! Error types for the command-line client.
//!
//! Core errors are wrapped as-is; the client adds configuration, export
//! and local I/O failures on top.

use sitetester_core::{ApiError, SubmitError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::export::ExportError;

// =============================================================================
// CLI Errors (top-level)
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Submit(#[from] SubmitError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The action needs an access token and none was configured.
    #[error("Please log in to continue.")]
    LoginRequired,

    /// The session ended without results.
    #[error("{0}")]
    Session(&'static str),

    #[error("{0}")]
    Input(String),
}

impl CliError {
    /// Process exit code: 2 when the user must log in, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        let needs_login = match self {
            CliError::LoginRequired => true,
            CliError::Api(err) => err.is_unauthorized(),
            CliError::Submit(err) => err.navigation().is_some(),
            _ => false,
        };
        if needs_login {
            2
        } else {
            1
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sitetester_core::ValidationError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::LoginRequired.exit_code(), 2);
        assert_eq!(CliError::Api(ApiError::Unauthorized).exit_code(), 2);
        assert_eq!(
            CliError::Submit(ValidationError::MissingCredentials.into()).exit_code(),
            2
        );
        assert_eq!(
            CliError::Submit(ValidationError::NoResolutions.into()).exit_code(),
            1
        );
        assert_eq!(CliError::Input("bad".into()).exit_code(), 1);
    }
}
