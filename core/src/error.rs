//! Error types shared by every SiteTester client.
//!
//! The hierarchy mirrors the three places a session can go wrong:
//!
//! - [`ValidationError`] - local precondition failures, raised before any request
//! - [`ApiError`] - transport and server failures on an HTTP call
//! - [`SubmitError`] - top-level error of a submission (either of the above)
//!
//! Conversion is automatic via `From` implementations so `?` works across
//! the boundary between validation and transport.

use thiserror::Error;

use crate::notice::{Navigation, Notice};

// =============================================================================
// Validation Errors
// =============================================================================

/// Local precondition failures of the upload form.
///
/// Each variant carries its own user-facing title and text; none of them
/// ever reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No bearer token in the cookie store.
    #[error("Please log in to start an audit.")]
    MissingCredentials,

    /// No file selected and the profile does not accept typed URLs.
    #[error("Please select a urls.txt file to continue.")]
    MissingFile,

    /// Neither a file nor typed URLs were provided.
    #[error("{text}")]
    MissingInput {
        title: &'static str,
        text: &'static str,
    },

    /// No browser left after the profile's browser filter.
    #[error("{0}")]
    NoBrowsers(&'static str),

    /// No resolution selected.
    #[error("Please select at least one resolution to continue.")]
    NoResolutions,

    /// Phone audit without a number to look for.
    #[error("Please enter a target phone number to search for.")]
    MissingTargetNumber,

    /// Blank session name.
    #[error("Please enter a name for this audit session.")]
    MissingSessionName,
}

impl ValidationError {
    /// Dialog title for this failure.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingCredentials => "Authentication Required",
            ValidationError::MissingFile => "File Required",
            ValidationError::MissingInput { title, .. } => title,
            ValidationError::NoBrowsers(_) => "Browser Selection Required",
            ValidationError::NoResolutions => "Resolution Selection Required",
            ValidationError::MissingTargetNumber => "Target Number Required",
            ValidationError::MissingSessionName => "Session Name Required",
        }
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Failures of a single HTTP exchange with the audit backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 401; the caller must send the user to the login route.
    #[error("Your session has expired. Please log in again.")]
    Unauthorized,

    /// Any other non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a [`ApiError::Server`] from a status and an optional error body.
    ///
    /// The backend reports failures as `{"error": ...}` or `{"detail": ...}`;
    /// when neither is present the message falls back to `HTTP {status}`.
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }

        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["error", "detail"]
                    .iter()
                    .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
            })
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        ApiError::Server { status, message }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

// =============================================================================
// Submission Errors (top-level)
// =============================================================================

/// Why a submission did not produce a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    Api(#[from] ApiError),
}

impl SubmitError {
    /// The dialog to show for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            SubmitError::Invalid(ValidationError::MissingCredentials) => {
                Notice::warning("Authentication Required", "Please log in to start an audit.")
            }
            SubmitError::Invalid(err) => Notice::info(err.title(), err.to_string()),
            SubmitError::Api(ApiError::Unauthorized) => Notice::warning(
                "Session Expired",
                "Your session has expired. Please log in again.",
            ),
            SubmitError::Api(ApiError::Server { message, .. }) => {
                Notice::error("Upload Failed", message.clone())
            }
            SubmitError::Api(_) => Notice::error(
                "Upload Failed",
                "An error occurred during upload. Please try again.",
            ),
        }
    }

    /// Where the user must go after the dialog, if anywhere.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            SubmitError::Invalid(ValidationError::MissingCredentials)
            | SubmitError::Api(ApiError::Unauthorized) => Some(Navigation::Login),
            _ => None,
        }
    }

    /// Whether the UI must go back to the upload view.
    ///
    /// Validation failures never left it in the first place.
    pub fn reverts_to_upload(&self) -> bool {
        matches!(self, SubmitError::Api(err) if !err.is_unauthorized())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for HTTP operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for submissions.
pub type SubmitResult<T> = Result<T, SubmitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Severity;

    #[test]
    fn test_server_message_prefers_error_then_detail() {
        let err = ApiError::from_status(400, r#"{"error": "Bad file"}"#);
        assert_eq!(err.to_string(), "Bad file");

        let err = ApiError::from_status(422, r#"{"detail": "session_name missing"}"#);
        assert_eq!(err.to_string(), "session_name missing");

        let err = ApiError::from_status(500, "<html>oops</html>");
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_401_is_unauthorized() {
        let err = ApiError::from_status(401, r#"{"detail": "Not authenticated"}"#);
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_unauthorized_submission_redirects_without_generic_error() {
        let err: SubmitError = ApiError::Unauthorized.into();
        assert_eq!(err.navigation(), Some(Navigation::Login));
        assert_eq!(err.notice().title, "Session Expired");
        assert!(!err.reverts_to_upload());
    }

    #[test]
    fn test_network_failure_reverts_with_generic_message() {
        let err: SubmitError = ApiError::Network("connection refused".into()).into();
        let notice = err.notice();
        assert_eq!(notice.severity, Severity::Error);
        assert!(notice.text.contains("Please try again"));
        assert!(err.reverts_to_upload());
        assert_eq!(err.navigation(), None);
    }

    #[test]
    fn test_validation_titles_are_distinct() {
        let errors = [
            ValidationError::MissingCredentials,
            ValidationError::MissingFile,
            ValidationError::MissingInput {
                title: "Input Required",
                text: "x",
            },
            ValidationError::NoBrowsers("x"),
            ValidationError::NoResolutions,
            ValidationError::MissingTargetNumber,
            ValidationError::MissingSessionName,
        ];
        let mut titles: Vec<_> = errors.iter().map(|e| e.title()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), errors.len());
    }
}
