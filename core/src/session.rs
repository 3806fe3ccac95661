//! Session view context and session controller.
//!
//! A [`SessionView`] is created when an upload succeeds (or when an
//! existing session is resumed) and owns everything the progress and
//! results views need: profile, session id, expected total and the
//! selections made at submission time. It is dropped when the session
//! reaches a terminal state or the view goes away.

use std::time::Duration;

use crate::api::AuditApi;
use crate::credentials::BearerToken;
use crate::error::{ApiError, SubmitResult, ValidationError};
use crate::model::{ProgressSnapshot, SessionId};
use crate::notice::{Navigation, Notice};
use crate::poller::{PollOutcome, Poller, ProgressView};
use crate::profile::{AuditKind, AuditProfile, TotalFallback};
use crate::selection::{SelectionState, UploadRequest};

// =============================================================================
// Session View
// =============================================================================

/// Which part of the audit page is visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uploading,
    Polling,
    Results,
    Finished,
}

/// What the page does once polling ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Conclusion {
    /// Inline text for the progress view.
    pub message: Option<&'static str>,
    /// Dialog to raise, if any.
    pub notice: Option<Notice>,
    /// Navigation after the given delay.
    pub redirect: Option<(Navigation, Duration)>,
    /// Whether to fetch and show results.
    pub show_results: bool,
}

/// Explicit per-session context of an audit page.
#[derive(Clone, Debug)]
pub struct SessionView {
    profile: AuditProfile,
    session: SessionId,
    total_expected: u64,
    browsers: Vec<String>,
    resolutions: Vec<String>,
    phase: Phase,
    last: Option<ProgressSnapshot>,
}

impl SessionView {
    /// Validate the selection, then upload it.
    pub async fn submit<A: AuditApi>(
        api: &A,
        profile: AuditProfile,
        selection: SelectionState,
        token: Option<&BearerToken>,
    ) -> SubmitResult<Self> {
        let request = selection.validate(&profile, token)?;
        let token = token.ok_or(ValidationError::MissingCredentials)?;
        Ok(Self::start(api, profile, request, token).await?)
    }

    /// Upload an already validated request.
    ///
    /// Single attempt; any failure is returned to the caller.
    pub async fn start<A: AuditApi>(
        api: &A,
        profile: AuditProfile,
        request: UploadRequest,
        token: &BearerToken,
    ) -> Result<Self, ApiError> {
        log::info!("📤 Uploading {} audit ({} URLs)", profile.kind, request.url_count);
        let receipt = api.submit(&request, token).await?;
        log::info!("✅ Session {} created", receipt.session);

        Ok(Self {
            total_expected: receipt.total_expected.unwrap_or(request.url_count),
            session: receipt.session,
            browsers: request.browsers,
            resolutions: request.resolutions,
            profile,
            phase: Phase::Polling,
            last: None,
        })
    }

    /// Re-attach to an existing session, e.g. from a results link.
    pub fn resume(
        profile: AuditProfile,
        session: SessionId,
        total_expected: Option<u64>,
        phase: Phase,
    ) -> Self {
        Self {
            profile,
            session,
            total_expected: total_expected.unwrap_or(0),
            browsers: Vec::new(),
            resolutions: Vec::new(),
            phase,
            last: None,
        }
    }

    pub fn profile(&self) -> &AuditProfile {
        &self.profile
    }

    pub fn kind(&self) -> AuditKind {
        self.profile.kind
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn total_expected(&self) -> u64 {
        self.total_expected
    }

    /// Browsers chosen at submission, after the profile's filter.
    pub fn browsers(&self) -> &[String] {
        &self.browsers
    }

    pub fn resolutions(&self) -> &[String] {
        &self.resolutions
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_snapshot(&self) -> Option<&ProgressSnapshot> {
        self.last.as_ref()
    }

    /// Denominator used when a progress tick omits its total.
    pub fn fallback_total(&self) -> u64 {
        match self.profile.total_fallback {
            TotalFallback::One => 1,
            TotalFallback::Expected => self.total_expected.max(1),
        }
    }

    /// A fresh poll loop for this session.
    pub fn poller(&self, token: Option<&BearerToken>) -> Poller {
        Poller::new(
            self.profile.clone(),
            self.session.clone(),
            self.fallback_total(),
        )
        .with_token(token)
    }

    /// Remember a running tick.
    pub fn record(&mut self, view: &ProgressView) {
        self.last = Some(view.snapshot);
    }

    /// Move to the phase matching `outcome` and say what the page does next.
    pub fn conclude(&mut self, outcome: &PollOutcome) -> Conclusion {
        let performance = self.profile.kind == AuditKind::Performance;

        let conclusion = match outcome {
            PollOutcome::Completed(snapshot) => {
                self.last = Some(*snapshot);
                Conclusion {
                    message: outcome.message(),
                    notice: None,
                    redirect: None,
                    show_results: true,
                }
            }
            PollOutcome::Stopped => Conclusion {
                message: outcome.message(),
                notice: None,
                redirect: self
                    .profile
                    .stop_redirect_delay
                    .map(|delay| (Navigation::Profile, delay)),
                show_results: performance,
            },
            PollOutcome::Failed => Conclusion {
                message: outcome.message(),
                notice: performance.then(|| {
                    Notice::warning("Audit Issue", "The audit completed with potential errors.")
                }),
                redirect: None,
                show_results: performance,
            },
            PollOutcome::TickLimit => Conclusion {
                message: outcome.message(),
                notice: None,
                redirect: None,
                show_results: performance,
            },
            PollOutcome::Unauthorized => Conclusion {
                message: outcome.message(),
                notice: None,
                redirect: Some((Navigation::Login, Duration::ZERO)),
                show_results: false,
            },
            PollOutcome::Cancelled => Conclusion {
                message: None,
                notice: None,
                redirect: None,
                show_results: false,
            },
        };

        self.phase = if conclusion.show_results {
            Phase::Results
        } else {
            Phase::Finished
        };
        conclusion
    }
}

// =============================================================================
// Session Controller
// =============================================================================

/// Result of a stop request.
#[derive(Clone, Debug, PartialEq)]
pub enum StopOutcome {
    /// The user did not confirm; nothing was sent.
    Declined,
    /// No credentials; the user must log in.
    NeedsLogin(Notice),
    /// The server accepted the stop; the caller ends its poll loop.
    Stopped,
    /// The stop was refused or never arrived; the control is usable again.
    Failed(Notice),
}

/// Stop button state.
#[derive(Clone, Debug)]
pub struct StopControl {
    enabled: bool,
}

impl Default for StopControl {
    fn default() -> Self {
        Self::new()
    }
}

impl StopControl {
    pub const CONFIRM_PROMPT: &'static str = "Are you sure you want to stop this session?";
    /// Progress text once a stop has been accepted.
    pub const STOPPING_MESSAGE: &'static str = "Stopping session...";

    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Label for the button.
    pub fn label(&self) -> &'static str {
        if self.enabled {
            "Stop Session"
        } else {
            "Stopping..."
        }
    }

    /// Ask for confirmation, then send one stop request. Never retried.
    pub async fn request_stop<A, F>(
        &mut self,
        api: &A,
        session: &SessionId,
        token: Option<&BearerToken>,
        confirm: F,
    ) -> StopOutcome
    where
        A: AuditApi,
        F: FnOnce() -> bool,
    {
        if !self.enabled || !confirm() {
            return StopOutcome::Declined;
        }

        let Some(token) = token else {
            return StopOutcome::NeedsLogin(Notice::warning(
                "Authentication Required",
                "Please log in to continue.",
            ));
        };

        self.enabled = false;
        log::info!("🛑 Stopping session {}", session);

        match api.stop_session(session, token).await {
            Ok(()) => StopOutcome::Stopped,
            Err(err) => {
                log::warn!("⚠️ Stop request for {} failed: {}", session, err);
                self.enabled = true;
                StopOutcome::Failed(match err {
                    ApiError::Network(_) | ApiError::Decode(_) => {
                        Notice::error("Error", "An error occurred while stopping the session.")
                    }
                    ApiError::Unauthorized | ApiError::Server { .. } => Notice::error(
                        "Unable to Stop Session",
                        "The session could not be stopped. It may have already completed.",
                    ),
                })
            }
        }
    }
}
