//! Transport seams.
//!
//! The core never performs I/O itself. Clients plug in an [`AuditApi`]
//! (reqwest natively, gloo-net in the browser) and a [`Sleeper`] (tokio or
//! gloo-timers); the poll loop and session controller are written against
//! these traits only.

use std::time::Duration;

use crate::credentials::BearerToken;
use crate::error::ApiResult;
use crate::model::{
    H1Result, PerformanceReport, PerformanceResult, PhoneResult, ProgressRecord,
    ProgressSnapshot, SessionConfig, SessionId, UploadReceipt,
};
use crate::profile::{AuditKind, AuditProfile};
use crate::selection::UploadRequest;

/// Path of the stop endpoint.
pub fn stop_path(session: &SessionId) -> String {
    format!("/api/sessions/{}/stop", session)
}

/// HTTP contract of the audit backend.
///
/// Futures are not required to be `Send`: the browser client runs on a
/// single-threaded executor.
#[allow(async_fn_in_trait)]
pub trait AuditApi {
    /// `POST` the multipart upload to the profile's upload path.
    async fn submit(&self, request: &UploadRequest, token: &BearerToken)
        -> ApiResult<UploadReceipt>;

    /// `GET /progress/{type}/{session}`.
    async fn progress_record(
        &self,
        profile: &AuditProfile,
        session: &SessionId,
    ) -> ApiResult<ProgressRecord>;

    /// `GET /api/results/{session}`. The backend requires the login.
    async fn performance_report(
        &self,
        session: &SessionId,
        token: Option<&BearerToken>,
    ) -> ApiResult<PerformanceReport>;

    /// `GET /h1-results/{session}`.
    async fn h1_results(&self, session: &SessionId, token: &BearerToken)
        -> ApiResult<Vec<H1Result>>;

    /// `GET /phone-results/{session}`.
    async fn phone_results(
        &self,
        session: &SessionId,
        token: &BearerToken,
    ) -> ApiResult<Vec<PhoneResult>>;

    /// `GET /session-config/{type}/{session}`.
    async fn session_config(
        &self,
        kind: AuditKind,
        session: &SessionId,
        token: Option<&BearerToken>,
    ) -> ApiResult<SessionConfig>;

    /// `POST /api/sessions/{session}/stop`.
    async fn stop_session(&self, session: &SessionId, token: &BearerToken) -> ApiResult<()>;

    /// One progress observation, normalized.
    ///
    /// The performance audit has no progress endpoint: its progress is the
    /// number of rows measured so far, and the rows ride along in the tick.
    /// `token` is only sent where the endpoint requires it.
    async fn progress(
        &self,
        profile: &AuditProfile,
        session: &SessionId,
        fallback_total: u64,
        token: Option<&BearerToken>,
    ) -> ApiResult<Tick> {
        match profile.kind {
            AuditKind::Performance => {
                let report = self.performance_report(session, token).await?;
                Ok(Tick::from_report(report, fallback_total))
            }
            _ => {
                let record = self.progress_record(profile, session).await?;
                Ok(Tick {
                    snapshot: ProgressSnapshot::from_record(record, fallback_total),
                    rows: Vec::new(),
                })
            }
        }
    }
}

/// Result of one progress request.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub snapshot: ProgressSnapshot,
    /// Performance rows returned with this tick; empty for other audits.
    pub rows: Vec<PerformanceResult>,
}

impl Tick {
    pub fn from_report(report: PerformanceReport, fallback_total: u64) -> Self {
        let completed = report.results.len() as u64;
        Self {
            snapshot: ProgressSnapshot {
                completed,
                total: fallback_total.max(completed),
                status: report.status,
            },
            rows: report.results,
        }
    }
}

/// Timer provided by the runtime.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SessionStatus;

    #[test]
    fn test_stop_path() {
        assert_eq!(stop_path(&SessionId::from("s1")), "/api/sessions/s1/stop");
    }

    #[test]
    fn test_performance_tick_counts_rows() {
        let report: PerformanceReport = serde_json::from_str(
            r#"{"results": [{"url": "https://a.com", "score": 91}], "status": "running"}"#,
        )
        .unwrap();
        let tick = Tick::from_report(report, 3);
        assert_eq!(tick.snapshot.completed, 1);
        assert_eq!(tick.snapshot.total, 3);
        assert_eq!(tick.snapshot.status, SessionStatus::Running);
        assert_eq!(tick.rows.len(), 1);
    }
}
