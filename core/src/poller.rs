//! Progress polling.
//!
//! ```text
//!            ┌──────────── sleep(tick_interval) ◄──────────┐
//!            ▼                                              │
//!   progress request ──► PollState::observe ──► Continue ───┘
//!                                 │
//!                                 └──► Finished(outcome)
//! ```
//!
//! [`PollState`] is a pure state machine: it is fed one request result per
//! tick and decides whether to keep going. [`Poller`] drives it with any
//! [`AuditApi`] and [`Sleeper`]. Ticks are serialized: the next sleep starts
//! only once the previous response has been observed, so at most one
//! progress request is ever in flight. A caller-supplied cancellation future
//! is raced against every sleep and every request, and wins a tie with a
//! finished sleep, so no request follows a cancellation.

use std::future::Future;
use std::pin::pin;

use futures::future::{select, Either};

use crate::api::{AuditApi, Sleeper, Tick};
use crate::credentials::BearerToken;
use crate::error::{ApiError, ApiResult};
use crate::model::{PerformanceResult, ProgressSnapshot, SessionId, SessionStatus};
use crate::profile::AuditProfile;

// =============================================================================
// Types
// =============================================================================

/// What the progress view shows after a running tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressView {
    /// 1-based tick number.
    pub tick: u32,
    pub snapshot: ProgressSnapshot,
    pub percent: u8,
    pub message: String,
    /// Set when this tick's request failed; the snapshot is then the last good one.
    pub failure: Option<String>,
}

/// How a poll loop ended.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    Completed(ProgressSnapshot),
    Stopped,
    Failed,
    /// The profile's tick cap was reached without a terminal status.
    TickLimit,
    /// The backend rejected the login.
    Unauthorized,
    /// The owner of the loop went away.
    Cancelled,
}

impl PollOutcome {
    /// Inline progress text for the outcome, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            PollOutcome::Completed(_) => Some("Completed!"),
            PollOutcome::Stopped => Some("Session stopped by user."),
            PollOutcome::Failed => Some("Session encountered an error."),
            PollOutcome::TickLimit => Some("Stopped waiting for results."),
            PollOutcome::Unauthorized => Some("Login required."),
            PollOutcome::Cancelled => None,
        }
    }
}

/// Decision after one observation.
#[derive(Clone, Debug, PartialEq)]
pub enum PollStep {
    Continue(ProgressView),
    Finished(PollOutcome),
}

/// Events emitted while polling.
#[derive(Debug)]
pub enum PollEvent<'a> {
    /// Rows measured so far (performance audits).
    Rows(&'a [PerformanceResult]),
    /// A running tick, successful or not.
    Progress(&'a ProgressView),
    /// The tick request failed; polling continues.
    TickFailed(&'a ApiError),
    /// The loop is over.
    Finished(&'a PollOutcome),
}

/// Receives poll events for rendering.
pub trait ProgressSink {
    fn on_event(&mut self, event: PollEvent<'_>);
}

impl<F> ProgressSink for F
where
    F: FnMut(PollEvent<'_>),
{
    fn on_event(&mut self, event: PollEvent<'_>) {
        self(event)
    }
}

// =============================================================================
// State Machine
// =============================================================================

/// Sans-IO poll state of one session.
#[derive(Clone, Debug)]
pub struct PollState {
    profile: AuditProfile,
    fallback_total: u64,
    ticks: u32,
    last: ProgressSnapshot,
    finished: bool,
}

impl PollState {
    pub fn new(profile: AuditProfile, fallback_total: u64) -> Self {
        Self {
            profile,
            fallback_total,
            ticks: 0,
            last: ProgressSnapshot {
                completed: 0,
                total: fallback_total,
                status: SessionStatus::Running,
            },
            finished: false,
        }
    }

    pub fn profile(&self) -> &AuditProfile {
        &self.profile
    }

    pub fn fallback_total(&self) -> u64 {
        self.fallback_total
    }

    /// Observations so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Last successful snapshot.
    pub fn last(&self) -> &ProgressSnapshot {
        &self.last
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one tick's result.
    ///
    /// Terminal statuses win over the tick cap. Failed requests never end
    /// the loop on their own, except a rejected login.
    pub fn observe(&mut self, result: ApiResult<ProgressSnapshot>) -> PollStep {
        self.ticks += 1;

        let failure = match result {
            Ok(snapshot) => {
                self.last = snapshot;
                let outcome = match snapshot.status {
                    SessionStatus::Completed => Some(PollOutcome::Completed(snapshot)),
                    SessionStatus::Stopped => Some(PollOutcome::Stopped),
                    SessionStatus::Error => Some(PollOutcome::Failed),
                    SessionStatus::Running => None,
                };
                if let Some(outcome) = outcome {
                    return self.finish(outcome);
                }
                None
            }
            Err(ApiError::Unauthorized) => return self.finish(PollOutcome::Unauthorized),
            Err(err) => Some(err.to_string()),
        };

        if self.profile.max_ticks.is_some_and(|cap| self.ticks >= cap) {
            return self.finish(PollOutcome::TickLimit);
        }

        PollStep::Continue(ProgressView {
            tick: self.ticks,
            snapshot: self.last,
            percent: self.last.percent(),
            message: self
                .profile
                .progress_message(self.last.completed, self.last.total),
            failure,
        })
    }

    fn finish(&mut self, outcome: PollOutcome) -> PollStep {
        self.finished = true;
        PollStep::Finished(outcome)
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Drives a [`PollState`] against a live backend.
pub struct Poller {
    state: PollState,
    session: SessionId,
    token: Option<BearerToken>,
}

impl Poller {
    pub fn new(profile: AuditProfile, session: SessionId, fallback_total: u64) -> Self {
        Self {
            state: PollState::new(profile, fallback_total),
            session,
            token: None,
        }
    }

    /// Send `token` on ticks whose endpoint requires a login.
    pub fn with_token(mut self, token: Option<&BearerToken>) -> Self {
        self.token = token.cloned();
        self
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Poll until a terminal status, the tick cap, or `cancelled` resolves.
    ///
    /// No request is issued after the outcome is decided. On completion
    /// the profile's hand-off delay elapses before returning unless
    /// `cancelled` fires first.
    pub async fn run<A, S, K, C>(
        mut self,
        api: &A,
        sleeper: &S,
        sink: &mut K,
        cancelled: C,
    ) -> PollOutcome
    where
        A: AuditApi,
        S: Sleeper,
        K: ProgressSink,
        C: Future<Output = ()>,
    {
        let mut cancelled = pin!(cancelled);
        let profile = self.state.profile().clone();
        let session = self.session.clone();
        let fallback_total = self.state.fallback_total();
        let token = self.token.clone();

        log::info!("⏳ Polling {} session {}", profile.kind, session);

        loop {
            let sleep = pin!(sleeper.sleep(profile.tick_interval));
            if let Either::Left(_) = select(cancelled.as_mut(), sleep).await {
                return Self::cancel(sink);
            }

            let request = pin!(api.progress(&profile, &session, fallback_total, token.as_ref()));
            let result = match select(request, cancelled.as_mut()).await {
                Either::Left((result, _)) => result,
                Either::Right(_) => return Self::cancel(sink),
            };

            let result = result.map(|Tick { snapshot, rows }| {
                if !rows.is_empty() {
                    sink.on_event(PollEvent::Rows(&rows));
                }
                snapshot
            });

            if let Err(err) = &result {
                log::warn!("⚠️ Progress check failed for {}: {}", session, err);
                sink.on_event(PollEvent::TickFailed(err));
            }

            match self.state.observe(result) {
                PollStep::Continue(view) => {
                    log::debug!(
                        "📊 {} tick {}: {}/{}",
                        session,
                        view.tick,
                        view.snapshot.completed,
                        view.snapshot.total
                    );
                    sink.on_event(PollEvent::Progress(&view));
                }
                PollStep::Finished(outcome) => {
                    log::info!("🏁 Session {} finished: {:?}", session, outcome);
                    sink.on_event(PollEvent::Finished(&outcome));
                    if matches!(outcome, PollOutcome::Completed(_)) {
                        let pause = pin!(sleeper.sleep(profile.completion_delay));
                        let _ = select(pause, cancelled.as_mut()).await;
                    }
                    return outcome;
                }
            }
        }
    }

    fn cancel<K: ProgressSink>(sink: &mut K) -> PollOutcome {
        log::debug!("Poll loop cancelled");
        let outcome = PollOutcome::Cancelled;
        sink.on_event(PollEvent::Finished(&outcome));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::BearerToken;
    use crate::model::{
        H1Result, PerformanceReport, PhoneResult, ProgressRecord, SessionConfig, UploadReceipt,
    };
    use crate::profile::AuditKind;
    use crate::selection::UploadRequest;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::time::Duration;

    fn snap(completed: u64, total: u64, status: SessionStatus) -> ProgressSnapshot {
        ProgressSnapshot {
            completed,
            total,
            status,
        }
    }

    fn unused<T>() -> ApiResult<T> {
        Err(ApiError::Network("unused".into()))
    }

    /// Replays scripted ticks; an exhausted script keeps reporting "running".
    #[derive(Default)]
    struct ScriptedApi {
        ticks: RefCell<VecDeque<ApiResult<Tick>>>,
        calls: Cell<u32>,
        hang_on_call: Option<u32>,
        on_hang: RefCell<Option<oneshot::Sender<()>>>,
    }

    impl ScriptedApi {
        fn new(ticks: Vec<ApiResult<ProgressSnapshot>>) -> Self {
            Self {
                ticks: RefCell::new(
                    ticks
                        .into_iter()
                        .map(|r| {
                            r.map(|snapshot| Tick {
                                snapshot,
                                rows: Vec::new(),
                            })
                        })
                        .collect(),
                ),
                ..Default::default()
            }
        }
    }

    impl AuditApi for ScriptedApi {
        async fn submit(&self, _: &UploadRequest, _: &BearerToken) -> ApiResult<UploadReceipt> {
            unused()
        }
        async fn progress_record(
            &self,
            _: &AuditProfile,
            _: &SessionId,
        ) -> ApiResult<ProgressRecord> {
            unused()
        }
        async fn performance_report(
            &self,
            _: &SessionId,
            _: Option<&BearerToken>,
        ) -> ApiResult<PerformanceReport> {
            unused()
        }
        async fn h1_results(&self, _: &SessionId, _: &BearerToken) -> ApiResult<Vec<H1Result>> {
            unused()
        }
        async fn phone_results(
            &self,
            _: &SessionId,
            _: &BearerToken,
        ) -> ApiResult<Vec<PhoneResult>> {
            unused()
        }
        async fn session_config(
            &self,
            _: AuditKind,
            _: &SessionId,
            _: Option<&BearerToken>,
        ) -> ApiResult<SessionConfig> {
            unused()
        }
        async fn stop_session(&self, _: &SessionId, _: &BearerToken) -> ApiResult<()> {
            unused()
        }

        async fn progress(
            &self,
            _: &AuditProfile,
            _: &SessionId,
            total: u64,
            _: Option<&BearerToken>,
        ) -> ApiResult<Tick> {
            self.calls.set(self.calls.get() + 1);
            if self.hang_on_call == Some(self.calls.get()) {
                if let Some(tx) = self.on_hang.borrow_mut().take() {
                    let _ = tx.send(());
                }
                futures::future::pending::<()>().await;
            }
            self.ticks.borrow_mut().pop_front().unwrap_or(Ok(Tick {
                snapshot: snap(0, total, SessionStatus::Running),
                rows: Vec::new(),
            }))
        }
    }

    struct InstantSleeper;

    impl Sleeper for InstantSleeper {
        async fn sleep(&self, _: Duration) {}
    }

    fn run(api: &ScriptedApi, kind: AuditKind, events: &mut Vec<String>) -> PollOutcome {
        let poller = Poller::new(kind.profile(), SessionId::from("s1"), 4);
        let mut sink = |event: PollEvent<'_>| {
            events.push(match event {
                PollEvent::Rows(rows) => format!("rows:{}", rows.len()),
                PollEvent::Progress(view) => format!("progress:{}", view.percent),
                PollEvent::TickFailed(_) => "failed".to_string(),
                PollEvent::Finished(outcome) => format!("finished:{:?}", outcome),
            })
        };
        block_on(poller.run(
            api,
            &InstantSleeper,
            &mut sink,
            futures::future::pending::<()>(),
        ))
    }

    #[test]
    fn test_no_request_after_terminal_status() {
        let api = ScriptedApi::new(vec![
            Ok(snap(1, 4, SessionStatus::Running)),
            Ok(snap(4, 4, SessionStatus::Completed)),
            Ok(snap(4, 4, SessionStatus::Completed)),
        ]);
        let mut events = Vec::new();
        let outcome = run(&api, AuditKind::H1, &mut events);

        assert_eq!(outcome, PollOutcome::Completed(snap(4, 4, SessionStatus::Completed)));
        assert_eq!(api.calls.get(), 2);
        assert_eq!(events[0], "progress:25");
        assert!(events[1].starts_with("finished:Completed"));
    }

    #[test]
    fn test_tick_failure_is_not_terminal() {
        let api = ScriptedApi::new(vec![
            Err(ApiError::Network("timeout".into())),
            Ok(snap(2, 4, SessionStatus::Running)),
            Ok(snap(2, 4, SessionStatus::Stopped)),
        ]);
        let mut events = Vec::new();
        let outcome = run(&api, AuditKind::Static, &mut events);

        assert_eq!(outcome, PollOutcome::Stopped);
        assert_eq!(api.calls.get(), 3);
        assert_eq!(events, vec!["failed", "progress:0", "progress:50", "finished:Stopped"]);
    }

    #[test]
    fn test_rejected_login_ends_loop() {
        let api = ScriptedApi::new(vec![
            Ok(snap(1, 4, SessionStatus::Running)),
            Err(ApiError::Unauthorized),
        ]);
        let mut events = Vec::new();
        let outcome = run(&api, AuditKind::Performance, &mut events);

        assert_eq!(outcome, PollOutcome::Unauthorized);
        assert_eq!(api.calls.get(), 2);
        assert_eq!(events, vec!["progress:25", "finished:Unauthorized"]);
    }

    #[test]
    fn test_error_status_ends_loop() {
        let api = ScriptedApi::new(vec![Ok(snap(0, 4, SessionStatus::Error))]);
        let outcome = run(&api, AuditKind::Phone, &mut Vec::new());
        assert_eq!(outcome, PollOutcome::Failed);
        assert_eq!(outcome.message(), Some("Session encountered an error."));
    }

    #[test]
    fn test_performance_caps_at_sixty_ticks() {
        let api = ScriptedApi::new(Vec::new());
        let outcome = run(&api, AuditKind::Performance, &mut Vec::new());
        assert_eq!(outcome, PollOutcome::TickLimit);
        assert_eq!(api.calls.get(), 60);
    }

    #[test]
    fn test_terminal_status_beats_cap_on_last_tick() {
        let mut state = PollState::new(AuditKind::Performance.profile(), 1);
        for _ in 0..59 {
            assert!(matches!(
                state.observe(Ok(snap(0, 1, SessionStatus::Running))),
                PollStep::Continue(_)
            ));
        }
        let step = state.observe(Ok(snap(1, 1, SessionStatus::Completed)));
        assert!(matches!(step, PollStep::Finished(PollOutcome::Completed(_))));
    }

    #[test]
    fn test_failed_tick_keeps_last_snapshot() {
        let mut state = PollState::new(AuditKind::H1.profile(), 1);
        state.observe(Ok(snap(3, 6, SessionStatus::Running)));
        match state.observe(Err(ApiError::Network("reset".into()))) {
            PollStep::Continue(view) => {
                assert_eq!(view.percent, 50);
                assert_eq!(view.tick, 2);
                assert!(view.failure.is_some());
                assert_eq!(view.message, "Audited 3 of 6 pages...");
            }
            other => panic!("unexpected step: {:?}", other),
        }
    }

    #[test]
    fn test_cancellation_stops_in_flight_request() {
        let (tx, rx) = oneshot::channel();
        let api = ScriptedApi {
            hang_on_call: Some(2),
            on_hang: RefCell::new(Some(tx)),
            ..ScriptedApi::new(vec![Ok(snap(1, 4, SessionStatus::Running))])
        };
        let poller = Poller::new(AuditKind::Dynamic.profile(), SessionId::from("s1"), 4);
        let mut finished = Vec::new();
        let mut sink = |event: PollEvent<'_>| {
            if let PollEvent::Finished(outcome) = event {
                finished.push(outcome.clone());
            }
        };
        let outcome = block_on(poller.run(&api, &InstantSleeper, &mut sink, async {
            let _ = rx.await;
        }));

        assert_eq!(outcome, PollOutcome::Cancelled);
        assert_eq!(api.calls.get(), 2);
        assert_eq!(finished, vec![PollOutcome::Cancelled]);
    }
}
