//! Client configuration.
//!
//! Resolution order, highest first:
//!
//! 1. command-line flags
//! 2. environment (`SITETESTER_URL`, `SITETESTER_COOKIE`, `SITETESTER_COOKIE_FILE`)
//! 3. a `.env` file in the working directory (loaded with `dotenvy`)
//! 4. defaults
//!
//! Flags and environment are merged by clap; [`ClientConfig::resolve`]
//! validates the result and reads the cookie file.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use sitetester_core::credentials::{CookieStore, ACCESS_TOKEN_COOKIE};
use sitetester_core::notice::Navigation;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const ENV_BASE_URL: &str = "SITETESTER_URL";
pub const ENV_COOKIE: &str = "SITETESTER_COOKIE";
pub const ENV_COOKIE_FILE: &str = "SITETESTER_COOKIE_FILE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Base URL is not an absolute http(s) URL.
    #[error("Invalid base URL '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),

    /// Cookie file could not be read.
    #[error("Failed to read cookie file {path}: {source}")]
    CookieFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where to reach the backend and which credentials to present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without trailing slash.
    pub base_url: String,
    /// Cookie header carrying the access token, if any.
    pub cookie: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie: None,
        }
    }
}

impl ClientConfig {
    /// Validate merged settings. An inline cookie wins over a cookie file.
    pub fn resolve(
        base_url: Option<String>,
        cookie: Option<String>,
        cookie_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let cookie = match (cookie, cookie_file) {
            (Some(cookie), _) => Some(cookie),
            (None, Some(path)) => Some(fs::read_to_string(path).map_err(|source| {
                ConfigError::CookieFile {
                    path: path.to_path_buf(),
                    source,
                }
            })?),
            (None, None) => None,
        };

        Ok(Self {
            base_url,
            cookie: cookie.and_then(|raw| normalize_cookie(&raw)),
        })
    }

    /// Absolute URL of a backend path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Absolute URL of a navigation target.
    pub fn navigation_url(&self, navigation: Navigation) -> String {
        self.url(navigation.path())
    }
}

impl CookieStore for ClientConfig {
    fn cookie_header(&self) -> Option<String> {
        self.cookie.clone()
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(trimmed.to_string())
        }
        _ => Err(ConfigError::InvalidBaseUrl(raw.to_string())),
    }
}

/// Accept a full cookie header or a bare token.
fn normalize_cookie(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.contains('=') {
        Some(trimmed.to_string())
    } else {
        Some(format!("{}={}", ACCESS_TOKEN_COOKIE, trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitetester_core::CredentialAccessor;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::resolve(None, None, None).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.url("/upload/h1"), "http://localhost:8000/upload/h1");
    }

    #[test]
    fn test_base_url_validation() {
        let config = ClientConfig::resolve(Some("https://audit.example.com/".into()), None, None)
            .unwrap();
        assert_eq!(config.base_url, "https://audit.example.com");
        assert_eq!(config.navigation_url(Navigation::Login), "https://audit.example.com/login");

        let err = ClientConfig::resolve(Some("ftp://example.com".into()), None, None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_bare_token_becomes_cookie() {
        let config = ClientConfig::resolve(None, Some("abc.def".into()), None).unwrap();
        let token = CredentialAccessor::new(config).bearer_token().unwrap();
        assert_eq!(token.secret(), "abc.def");
    }

    #[test]
    fn test_cookie_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "theme=dark; access_token=from-file").unwrap();

        let config = ClientConfig::resolve(None, None, Some(file.path())).unwrap();
        assert_eq!(
            CredentialAccessor::new(config).bearer_token().unwrap().secret(),
            "from-file"
        );

        let config =
            ClientConfig::resolve(None, Some("access_token=inline".into()), Some(file.path()))
                .unwrap();
        assert_eq!(config.cookie.as_deref(), Some("access_token=inline"));
    }

    #[test]
    fn test_missing_cookie_file() {
        let err = ClientConfig::resolve(None, None, Some(Path::new("/nonexistent/cookie")))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cookie"));
    }

    #[test]
    fn test_absolute_paths_pass_through() {
        let config = ClientConfig::default();
        assert_eq!(config.url("https://cdn.example.com/v.mp4"), "https://cdn.example.com/v.mp4");
    }
}
