//! Selection state and upload validation.
//!
//! The form collects a URL source, checkbox lists and free-text fields.
//! [`SelectionState::validate`] checks them against the audit profile in a
//! fixed order and, when everything is present, produces the multipart
//! [`UploadRequest`]. Nothing here touches the network.

use crate::credentials::BearerToken;
use crate::error::ValidationError;
use crate::profile::{AuditKind, AuditProfile};

/// Name of the file part synthesized from typed URLs.
pub const MANUAL_URLS_FILENAME: &str = "manual_urls.txt";

// =============================================================================
// URL Source
// =============================================================================

/// Where the URL list comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlSource {
    /// A user-selected file.
    File { name: String, bytes: Vec<u8> },
    /// Freeform text, one URL per line.
    Manual(String),
}

impl UrlSource {
    /// Multipart file part for this source.
    pub fn into_file_part(self) -> FilePart {
        match self {
            UrlSource::File { name, bytes } => FilePart {
                name,
                content_type: "text/plain",
                bytes,
            },
            UrlSource::Manual(text) => FilePart {
                name: MANUAL_URLS_FILENAME.to_string(),
                content_type: "text/plain",
                bytes: text.into_bytes(),
            },
        }
    }

    /// Non-empty lines of the source, trimmed.
    pub fn urls(&self) -> Vec<String> {
        let text = match self {
            UrlSource::File { bytes, .. } => String::from_utf8_lossy(bytes).into_owned(),
            UrlSource::Manual(text) => text.clone(),
        };
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// The `file` part of a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePart {
    pub name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Upload Request
// =============================================================================

/// A validated, ready-to-send upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRequest {
    pub kind: AuditKind,
    /// Absent for the performance audit, which sends its URLs as a text field.
    pub file: Option<FilePart>,
    /// Text fields in submission order.
    pub fields: Vec<(&'static str, String)>,
    /// Browsers after the profile's filter.
    pub browsers: Vec<String>,
    pub resolutions: Vec<String>,
    /// Number of URLs in the source.
    pub url_count: u64,
}

impl UploadRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn json_array(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

// =============================================================================
// Selection State
// =============================================================================

/// Transient form state; consumed by validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Selected file, if any.
    pub file: Option<UrlSource>,
    pub manual_text: String,
    pub browsers: Vec<String>,
    pub resolutions: Vec<String>,
    /// Phone audit scan options.
    pub options: Vec<String>,
    pub session_name: String,
    pub target_number: String,
}

impl SelectionState {
    /// Check the selection against `profile`; the first failing check wins.
    ///
    /// Order: credentials, input, browsers, resolutions, target number,
    /// session name.
    pub fn validate(
        self,
        profile: &AuditProfile,
        token: Option<&BearerToken>,
    ) -> Result<UploadRequest, ValidationError> {
        if token.is_none() {
            return Err(ValidationError::MissingCredentials);
        }

        let source = self.url_source(profile)?;
        let url_count = source.urls().len() as u64;

        if profile.kind == AuditKind::Performance {
            return Ok(UploadRequest {
                kind: profile.kind,
                file: None,
                fields: vec![("urls", source.urls().join("\n"))],
                browsers: Vec::new(),
                resolutions: Vec::new(),
                url_count,
            });
        }

        let browsers = profile.filter_browsers(&self.browsers);
        if profile.requires_browsers && browsers.is_empty() {
            return Err(ValidationError::NoBrowsers(match profile.browser_filter {
                Some(_) => "Please select at least one supported browser (Chrome or Edge).",
                None => "Please select at least one browser to continue.",
            }));
        }

        if profile.requires_resolutions && self.resolutions.is_empty() {
            return Err(ValidationError::NoResolutions);
        }

        let target_number = self.target_number.trim().to_string();
        if profile.requires_target_number && target_number.is_empty() {
            return Err(ValidationError::MissingTargetNumber);
        }

        let session_name = self.session_name.trim().to_string();
        if profile.requires_session_name && session_name.is_empty() {
            return Err(ValidationError::MissingSessionName);
        }

        let mut fields = Vec::new();
        if profile.requires_browsers {
            fields.push(("browsers", json_array(&browsers)));
        }
        if profile.requires_resolutions {
            fields.push(("resolutions", json_array(&self.resolutions)));
        }
        fields.push(("session_name", session_name));
        if profile.requires_target_number {
            fields.push(("target_number", target_number));
            fields.push(("options", json_array(&self.options)));
        }

        Ok(UploadRequest {
            kind: profile.kind,
            file: Some(source.into_file_part()),
            fields,
            browsers,
            resolutions: self.resolutions,
            url_count,
        })
    }

    /// The selected file, else typed URLs when the profile accepts them.
    fn url_source(&self, profile: &AuditProfile) -> Result<UrlSource, ValidationError> {
        if let Some(file) = &self.file {
            return Ok(file.clone());
        }
        if profile.accepts_manual_urls && !self.manual_text.trim().is_empty() {
            return Ok(UrlSource::Manual(self.manual_text.clone()));
        }

        Err(match profile.kind {
            AuditKind::Performance => ValidationError::MissingInput {
                title: "URLs Required",
                text: "Please enter at least one URL to analyze.",
            },
            AuditKind::Dynamic => ValidationError::MissingInput {
                title: "URLs Required",
                text: "Please select a file OR enter URLs manually.",
            },
            _ if profile.accepts_manual_urls => ValidationError::MissingInput {
                title: "Input Required",
                text: "Please select a urls.txt file or enter URLs manually.",
            },
            _ => ValidationError::MissingFile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> BearerToken {
        BearerToken::new("t")
    }

    fn complete() -> SelectionState {
        SelectionState {
            file: Some(UrlSource::File {
                name: "urls.txt".into(),
                bytes: b"https://a.com\n\nhttps://b.com\n".to_vec(),
            }),
            browsers: vec!["Chrome".into(), "Firefox".into()],
            resolutions: vec!["1920x1080".into()],
            session_name: "  Launch check ".into(),
            target_number: "+1 555 0100".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_credentials_checked_first() {
        let err = SelectionState::default()
            .validate(&AuditKind::Static.profile(), None)
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingCredentials);
    }

    #[test]
    fn test_missing_input_per_profile() {
        let err = SelectionState::default()
            .validate(&AuditKind::H1.profile(), Some(&token()))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingFile);

        let err = SelectionState {
            manual_text: "   \n".into(),
            ..Default::default()
        }
        .validate(&AuditKind::Phone.profile(), Some(&token()))
        .unwrap_err();
        assert_eq!(err.title(), "Input Required");

        let err = SelectionState::default()
            .validate(&AuditKind::Dynamic.profile(), Some(&token()))
            .unwrap_err();
        assert_eq!(err.title(), "URLs Required");
    }

    #[test]
    fn test_each_missing_selection_has_its_own_message() {
        let profile = AuditKind::Static.profile();

        let mut selection = complete();
        selection.browsers.clear();
        let no_browsers = selection.validate(&profile, Some(&token())).unwrap_err();

        let mut selection = complete();
        selection.resolutions.clear();
        let no_resolutions = selection.validate(&profile, Some(&token())).unwrap_err();

        let mut selection = complete();
        selection.session_name = "   ".into();
        let no_name = selection.validate(&profile, Some(&token())).unwrap_err();

        assert_eq!(no_browsers.title(), "Browser Selection Required");
        assert_eq!(no_resolutions, ValidationError::NoResolutions);
        assert_eq!(no_name, ValidationError::MissingSessionName);
        assert_ne!(no_browsers.to_string(), no_resolutions.to_string());
        assert_ne!(no_resolutions.to_string(), no_name.to_string());
    }

    #[test]
    fn test_dynamic_rejects_unsupported_browsers_only() {
        let mut selection = complete();
        selection.browsers = vec!["Firefox".into(), "Safari".into()];
        let err = selection
            .validate(&AuditKind::Dynamic.profile(), Some(&token()))
            .unwrap_err();
        assert!(err.to_string().contains("Chrome or Edge"));
    }

    #[test]
    fn test_phone_checks_target_before_name() {
        let mut selection = complete();
        selection.target_number = " ".into();
        selection.session_name.clear();
        let err = selection
            .validate(&AuditKind::Phone.profile(), Some(&token()))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingTargetNumber);
    }

    #[test]
    fn test_static_request_fields() {
        let request = complete()
            .validate(&AuditKind::Static.profile(), Some(&token()))
            .unwrap();
        assert_eq!(request.field("browsers"), Some(r#"["Chrome","Firefox"]"#));
        assert_eq!(request.field("resolutions"), Some(r#"["1920x1080"]"#));
        assert_eq!(request.field("session_name"), Some("Launch check"));
        assert_eq!(request.field("target_number"), None);
        assert_eq!(request.url_count, 2);
        assert_eq!(request.file.unwrap().name, "urls.txt");
    }

    #[test]
    fn test_dynamic_sends_filtered_browsers_and_manual_file() {
        let selection = SelectionState {
            manual_text: "https://a.com".into(),
            browsers: vec!["Safari".into(), "Edge".into()],
            resolutions: vec!["375x667".into()],
            session_name: "Mobile".into(),
            ..Default::default()
        };
        let request = selection
            .validate(&AuditKind::Dynamic.profile(), Some(&token()))
            .unwrap();
        assert_eq!(request.browsers, vec!["Edge".to_string()]);
        assert_eq!(request.field("browsers"), Some(r#"["Edge"]"#));
        let file = request.file.unwrap();
        assert_eq!(file.name, MANUAL_URLS_FILENAME);
        assert_eq!(file.bytes, b"https://a.com");
    }

    #[test]
    fn test_phone_request_carries_options() {
        let mut selection = complete();
        selection.options = vec!["check_format".into()];
        let request = selection
            .validate(&AuditKind::Phone.profile(), Some(&token()))
            .unwrap();
        assert_eq!(request.field("target_number"), Some("+1 555 0100"));
        assert_eq!(request.field("options"), Some(r#"["check_format"]"#));
        assert_eq!(request.field("browsers"), None);
    }

    #[test]
    fn test_performance_sends_url_text() {
        let selection = SelectionState {
            manual_text: " https://a.com \n\n https://b.com".into(),
            ..Default::default()
        };
        let request = selection
            .validate(&AuditKind::Performance.profile(), Some(&token()))
            .unwrap();
        assert!(request.file.is_none());
        assert_eq!(request.field("urls"), Some("https://a.com\nhttps://b.com"));
        assert_eq!(request.url_count, 2);

        let err = SelectionState::default()
            .validate(&AuditKind::Performance.profile(), Some(&token()))
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingInput { .. }));
    }
}
