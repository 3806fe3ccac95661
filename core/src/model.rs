//! Wire models of the audit backend.
//!
//! Every payload is decoded into one canonical shape here. Optional or
//! loosely typed fields get their documented default at this boundary
//! (see [`crate::flex`] for list fields), never at render time.
//!
//! # Categories
//!
//! - **Session** - identifier, status, progress snapshot, upload receipt
//! - **Tabular results** - H1 and phone audit rows
//! - **Performance** - streamed score rows
//! - **Media** - session configuration for screenshot / video browsing

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::flex;

// =============================================================================
// Session Types
// =============================================================================

/// Opaque session identifier issued by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-side lifecycle of a session.
///
/// Anything the backend reports besides the four known states (for
/// instance `not_found` or `pending`) is treated as still running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Running,
    Completed,
    Stopped,
    Error,
}

impl SessionStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => SessionStatus::Running,
            "completed" => SessionStatus::Completed,
            "stopped" => SessionStatus::Stopped,
            "error" => SessionStatus::Error,
            other => {
                log::debug!("Unknown session status '{}', treating as running", other);
                SessionStatus::Running
            }
        }
    }

    /// Whether polling ends on this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Stopped => "stopped",
            SessionStatus::Error => "error",
        }
    }
}

impl<'de> Deserialize<'de> for SessionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(SessionStatus::from_wire).unwrap_or_default())
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress record exactly as `/progress/{type}/{session}` sends it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub status: SessionStatus,
}

/// One observation of a session's progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: u64,
    pub total: u64,
    pub status: SessionStatus,
}

impl ProgressSnapshot {
    /// Normalize a wire record; `fallback_total` replaces a missing or zero total.
    pub fn from_record(record: ProgressRecord, fallback_total: u64) -> Self {
        Self {
            completed: record.completed.unwrap_or(0),
            total: record.total.filter(|t| *t > 0).unwrap_or(fallback_total),
            status: record.status,
        }
    }

    /// Completion percentage for the progress bar.
    pub fn percent(&self) -> u8 {
        percent(self.completed, self.total)
    }
}

/// `round(part / whole * 100)`, clamped to `0..=100`; a zero whole gives 0.
pub fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let value = (part as f64 / whole as f64 * 100.0).round();
    value.clamp(0.0, 100.0) as u8
}

/// What the backend returns when a session is created.
///
/// Uploads answer `{"session": ..., "total_expected": ...}`, the
/// performance endpoint answers `{"session_id": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(alias = "session_id")]
    pub session: SessionId,
    #[serde(default)]
    pub total_expected: Option<u64>,
}

// =============================================================================
// Tabular Result Types
// =============================================================================

/// One audited page of an H1 session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct H1Result {
    pub url: String,
    #[serde(default)]
    pub h1_count: u32,
    #[serde(default, deserialize_with = "flex::list")]
    pub h1_texts: Vec<String>,
    #[serde(default, deserialize_with = "flex::list")]
    pub issues: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A phone number found on a page.
///
/// The backend sends either a bare string or `{"number", "location"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhoneNumber {
    pub number: String,
    pub location: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PhoneNumberWire {
    Bare(String),
    Detailed {
        number: String,
        #[serde(default)]
        location: Option<String>,
    },
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PhoneNumberWire::deserialize(deserializer)? {
            PhoneNumberWire::Bare(number) => PhoneNumber { number, location: None },
            PhoneNumberWire::Detailed { number, location } => PhoneNumber {
                number,
                location: location.filter(|l| !l.trim().is_empty()),
            },
        })
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.number, location),
            None => f.write_str(&self.number),
        }
    }
}

/// One audited page of a phone session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhoneResult {
    pub url: String,
    #[serde(default)]
    pub phone_count: u32,
    #[serde(default, deserialize_with = "flex::list")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default, deserialize_with = "flex::list")]
    pub formats_detected: Vec<String>,
    #[serde(default, deserialize_with = "flex::list")]
    pub issues: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// Performance Types
// =============================================================================

/// Scores of one page; timings are milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub ttfb: Option<f64>,
    #[serde(default)]
    pub page_load: Option<f64>,
    #[serde(default)]
    pub fcp: Option<f64>,
}

/// `/api/results/{session}`: rows measured so far plus the session status.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PerformanceReport {
    #[serde(default)]
    pub results: Vec<PerformanceResult>,
    #[serde(default)]
    pub status: SessionStatus,
}

// =============================================================================
// Media Types
// =============================================================================

/// One captured asset of a screenshot or video session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub url: String,
    pub browser: String,
    pub resolution: String,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub screenshot_path: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// `/session-config/{type}/{session}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    #[serde(default, deserialize_with = "flex::list")]
    pub urls: Vec<String>,
    #[serde(default, deserialize_with = "flex::list")]
    pub browsers: Vec<String>,
    #[serde(default, deserialize_with = "flex::list")]
    pub resolutions: Vec<String>,
    #[serde(default)]
    pub results: Vec<MediaRecord>,
    #[serde(default, rename = "type")]
    pub session_type: Option<String>,
}
