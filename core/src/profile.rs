//! Audit profiles.
//!
//! Every audit type runs the same upload → progress → results cycle. What
//! differs (endpoints, cadence, required selections, result shape) is kept
//! here as data so a single generic component can drive all of them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::SessionId;

/// Audit types offered by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditKind {
    /// H1 tag audit.
    H1,
    /// Phone number scan.
    Phone,
    /// Screenshots per browser and resolution.
    Static,
    /// Responsive videos per browser and resolution.
    Dynamic,
    /// Performance scores (TTFB, page load).
    Performance,
}

impl AuditKind {
    pub const ALL: [AuditKind; 5] = [
        AuditKind::H1,
        AuditKind::Phone,
        AuditKind::Static,
        AuditKind::Dynamic,
        AuditKind::Performance,
    ];

    /// Path segment used by the backend for this audit type.
    pub fn slug(&self) -> &'static str {
        match self {
            AuditKind::H1 => "h1",
            AuditKind::Phone => "phone",
            AuditKind::Static => "static",
            AuditKind::Dynamic => "dynamic",
            AuditKind::Performance => "performance",
        }
    }

    pub fn profile(&self) -> AuditProfile {
        AuditProfile::of(*self)
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for AuditKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditKind::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown audit type: {}", s))
    }
}

/// How finished results are presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultShape {
    /// One row per page with aggregate statistics (H1, phone).
    Tabular,
    /// Browser tabs → URL tiles → grid of screenshots.
    Screenshots,
    /// Browser tabs → URL tiles → grid of videos.
    Videos,
    /// Rows streamed while polling (performance).
    Streaming,
}

impl ResultShape {
    pub fn is_media(&self) -> bool {
        matches!(self, ResultShape::Screenshots | ResultShape::Videos)
    }
}

/// Where the denominator comes from when a progress tick omits `total`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TotalFallback {
    /// Assume a single unit of work.
    One,
    /// Use the `total_expected` returned at upload time.
    Expected,
}

/// Browsers able to record responsive videos.
pub const VIDEO_BROWSERS: &[&str] = &["Chrome", "Edge"];

/// Per-type configuration of the audit cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditProfile {
    pub kind: AuditKind,
    /// Human-readable name.
    pub title: &'static str,
    /// Fixed poll cadence.
    pub tick_interval: Duration,
    /// Hard cap on poll ticks, if any.
    pub max_ticks: Option<u32>,
    /// Pause between the `completed` tick and the results view.
    pub completion_delay: Duration,
    /// Pause between the `stopped` tick and the redirect.
    pub stop_redirect_delay: Option<Duration>,
    pub result_shape: ResultShape,
    /// Whether URLs may be typed instead of uploading a file.
    pub accepts_manual_urls: bool,
    pub requires_browsers: bool,
    /// Browsers kept from the selection; `None` keeps all of them.
    pub browser_filter: Option<&'static [&'static str]>,
    pub requires_resolutions: bool,
    pub requires_target_number: bool,
    pub requires_session_name: bool,
    pub total_fallback: TotalFallback,
    /// Message shown while the file is uploading.
    pub uploading_message: &'static str,
    /// Message shown once the session exists.
    pub started_message: &'static str,
    progress_verb: &'static str,
    progress_noun: &'static str,
}

impl AuditProfile {
    /// The profile of an audit type.
    pub fn of(kind: AuditKind) -> Self {
        match kind {
            AuditKind::H1 => Self {
                kind,
                title: "H1 Audit",
                tick_interval: Duration::from_millis(2000),
                max_ticks: None,
                completion_delay: Duration::from_millis(1000),
                stop_redirect_delay: Some(Duration::from_millis(2000)),
                result_shape: ResultShape::Tabular,
                accepts_manual_urls: false,
                requires_browsers: false,
                browser_filter: None,
                requires_resolutions: false,
                requires_target_number: false,
                requires_session_name: true,
                total_fallback: TotalFallback::One,
                uploading_message: "Uploading file and preparing...",
                started_message: "Auditing H1 tags...",
                progress_verb: "Audited",
                progress_noun: "pages",
            },
            AuditKind::Phone => Self {
                kind,
                title: "Phone Number Audit",
                tick_interval: Duration::from_millis(2000),
                max_ticks: None,
                completion_delay: Duration::from_millis(1000),
                stop_redirect_delay: Some(Duration::from_millis(2000)),
                result_shape: ResultShape::Tabular,
                accepts_manual_urls: true,
                requires_browsers: false,
                browser_filter: None,
                requires_resolutions: false,
                requires_target_number: true,
                requires_session_name: true,
                total_fallback: TotalFallback::One,
                uploading_message: "Uploading file and preparing...",
                started_message: "Scanning for phone numbers...",
                progress_verb: "Audited",
                progress_noun: "pages",
            },
            AuditKind::Static => Self {
                kind,
                title: "Static Responsive Audit",
                tick_interval: Duration::from_millis(2500),
                max_ticks: None,
                completion_delay: Duration::from_millis(2000),
                stop_redirect_delay: Some(Duration::from_millis(2000)),
                result_shape: ResultShape::Screenshots,
                accepts_manual_urls: false,
                requires_browsers: true,
                browser_filter: None,
                requires_resolutions: true,
                requires_target_number: false,
                requires_session_name: true,
                total_fallback: TotalFallback::Expected,
                uploading_message: "Uploading file and preparing...",
                started_message: "Launching browsers and capturing screenshots...",
                progress_verb: "Captured",
                progress_noun: "screenshots",
            },
            AuditKind::Dynamic => Self {
                kind,
                title: "Dynamic Responsive Audit",
                tick_interval: Duration::from_millis(3000),
                max_ticks: None,
                completion_delay: Duration::from_millis(2000),
                stop_redirect_delay: Some(Duration::from_millis(2000)),
                result_shape: ResultShape::Videos,
                accepts_manual_urls: true,
                requires_browsers: true,
                browser_filter: Some(VIDEO_BROWSERS),
                requires_resolutions: true,
                requires_target_number: false,
                requires_session_name: true,
                total_fallback: TotalFallback::Expected,
                uploading_message: "Recording responsive videos... Please wait.",
                started_message: "Initializing...",
                progress_verb: "Recorded",
                progress_noun: "videos",
            },
            AuditKind::Performance => Self {
                kind,
                title: "Performance Audit",
                tick_interval: Duration::from_millis(2000),
                max_ticks: Some(60),
                completion_delay: Duration::from_millis(1000),
                stop_redirect_delay: None,
                result_shape: ResultShape::Streaming,
                accepts_manual_urls: true,
                requires_browsers: false,
                browser_filter: None,
                requires_resolutions: false,
                requires_target_number: false,
                requires_session_name: false,
                total_fallback: TotalFallback::Expected,
                uploading_message: "Starting Analysis...",
                started_message: "Analyzing...",
                progress_verb: "Measured",
                progress_noun: "pages",
            },
        }
    }

    /// Override every delay of the cycle with one duration.
    ///
    /// Used by operators who want a faster cadence and by tests.
    pub fn with_timing(mut self, tick: Duration) -> Self {
        self.tick_interval = tick;
        self.completion_delay = tick;
        if self.stop_redirect_delay.is_some() {
            self.stop_redirect_delay = Some(tick);
        }
        self
    }

    pub fn upload_path(&self) -> String {
        match self.kind {
            AuditKind::Performance => "/api/performance-test".to_string(),
            kind => format!("/upload/{}", kind.slug()),
        }
    }

    pub fn progress_path(&self, session: &SessionId) -> String {
        match self.kind {
            AuditKind::Performance => format!("/api/results/{}", session),
            kind => format!("/progress/{}/{}", kind.slug(), session),
        }
    }

    /// Endpoint returning the full result set, for tabular and streaming shapes.
    pub fn results_path(&self, session: &SessionId) -> Option<String> {
        match self.kind {
            AuditKind::H1 | AuditKind::Phone => {
                Some(format!("/{}-results/{}", self.kind.slug(), session))
            }
            AuditKind::Performance => Some(format!("/api/results/{}", session)),
            AuditKind::Static | AuditKind::Dynamic => None,
        }
    }

    /// Endpoint returning URLs and media records, for media shapes.
    pub fn session_config_path(&self, session: &SessionId) -> Option<String> {
        self.result_shape
            .is_media()
            .then(|| format!("/session-config/{}/{}", self.kind.slug(), session))
    }

    /// Keep only the browsers this profile can audit, in selection order.
    pub fn filter_browsers(&self, browsers: &[String]) -> Vec<String> {
        browsers
            .iter()
            .filter(|b| {
                self.browser_filter
                    .map_or(true, |allowed| allowed.iter().any(|a| a == b))
            })
            .cloned()
            .collect()
    }

    /// Status line for a running tick, e.g. "Captured 3 of 12 screenshots...".
    pub fn progress_message(&self, completed: u64, total: u64) -> String {
        format!(
            "{} {} of {} {}...",
            self.progress_verb, completed, total, self.progress_noun
        )
    }
}
