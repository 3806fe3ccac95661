//! Result projections.
//!
//! Finished sessions are fetched once and projected into view models that
//! both the terminal and the browser render:
//!
//! - [`tabular`] - H1 and phone summaries and rows
//! - [`performance`] - streamed, de-duplicated score rows
//! - [`media`] - browser tabs, URL tiles and media grids

pub mod media;
pub mod performance;
pub mod tabular;

use crate::api::AuditApi;
use crate::credentials::BearerToken;
use crate::error::{ApiError, ApiResult};
use crate::model::{H1Result, PerformanceReport, PhoneResult, SessionConfig};
use crate::profile::AuditKind;
use crate::session::SessionView;

pub use media::{media_key, MediaBrowser, MediaItem, MediaTab, MediaTile};
pub use performance::{PerformanceBoard, PerformanceRow, ScoreGrade};
pub use tabular::{H1Row, H1Status, H1Summary, PhoneRow, PhoneStatus, PhoneSummary};

pub const NO_RESULTS: &str = "No results found for this session.";

/// Inline text for a failed results fetch.
pub fn load_error_message(err: &ApiError) -> String {
    format!("Error loading results: {}", err)
}

/// Everything a finished session can show.
#[derive(Clone, Debug)]
pub enum ResultSet {
    H1(Vec<H1Result>),
    Phone(Vec<PhoneResult>),
    Performance(PerformanceReport),
    Media(MediaBrowser),
}

impl ResultSet {
    /// Fetch the results of `view`'s session.
    ///
    /// Tabular results require credentials; a missing token is reported
    /// as [`ApiError::Unauthorized`] without a request.
    pub async fn fetch<A: AuditApi>(
        api: &A,
        view: &SessionView,
        token: Option<&BearerToken>,
    ) -> ApiResult<Self> {
        let session = view.session();
        match view.kind() {
            AuditKind::H1 => {
                let token = token.ok_or(ApiError::Unauthorized)?;
                Ok(ResultSet::H1(api.h1_results(session, token).await?))
            }
            AuditKind::Phone => {
                let token = token.ok_or(ApiError::Unauthorized)?;
                Ok(ResultSet::Phone(api.phone_results(session, token).await?))
            }
            AuditKind::Performance => {
                Ok(ResultSet::Performance(api.performance_report(session, token).await?))
            }
            kind @ (AuditKind::Static | AuditKind::Dynamic) => {
                let config: SessionConfig = api.session_config(kind, session, token).await?;
                let browser = MediaBrowser::new(view.profile().result_shape, session.clone(), config)
                    .with_selection(view.browsers(), view.resolutions());
                Ok(ResultSet::Media(browser))
            }
        }
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        match self {
            ResultSet::H1(rows) => rows.is_empty(),
            ResultSet::Phone(rows) => rows.is_empty(),
            ResultSet::Performance(report) => report.results.is_empty(),
            ResultSet::Media(browser) => browser.urls().is_empty(),
        }
    }
}
