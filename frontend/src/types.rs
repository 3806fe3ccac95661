//! Page-level types shared by the components.
//!
//! # Categories
//!
//! - **Notices** - A dialog with the navigation to follow once dismissed
//! - **Uploads** - Where the page goes after a failed upload
//! - **Results** - What the results area currently shows
//! - **Resume** - Opening an existing session from a link

use sitetester_core::{Navigation, Notice, Phase, ResultSet, SessionId, SubmitError};

// =============================================================================
// Notice Types
// =============================================================================

/// A notice waiting to be dismissed.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingNotice {
    pub notice: Notice,
    /// Where to go when the dialog is closed.
    pub then: Option<Navigation>,
}

impl From<&SubmitError> for PendingNotice {
    fn from(err: &SubmitError) -> Self {
        Self {
            notice: err.notice(),
            then: err.navigation(),
        }
    }
}

// =============================================================================
// Upload Types
// =============================================================================

/// Phase after a failed upload: back to the form, unless the login is gone.
pub fn phase_after_failed_upload(err: &SubmitError) -> Phase {
    if err.reverts_to_upload() {
        Phase::Uploading
    } else {
        Phase::Finished
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Content of the results area.
#[derive(Clone, Debug)]
pub enum ResultsState {
    Loading,
    Loaded(ResultSet),
    /// Inline error text.
    Failed(String),
}

// =============================================================================
// Resume Types
// =============================================================================

/// A finished session opened from `?status=completed&session=...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeParams {
    pub session: SessionId,
}

impl ResumeParams {
    /// Only completed sessions with a non-blank id are resumed.
    pub fn from_query(status: Option<&str>, session: Option<&str>) -> Option<Self> {
        if status != Some("completed") {
            return None;
        }
        let session = session.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            session: SessionId::from(session),
        })
    }
}
