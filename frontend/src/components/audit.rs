//! Generic audit page.
//!
//! One component serves the five audits; everything that differs between
//! them comes from the [`AuditProfile`].
//!
//! ```text
//! Uploading ──submit──► Polling ──completed──► Results
//!     ▲                    │
//!     └── upload failed ───┤ stopped ──► redirect to the session list
//!                          ├ 401     ──► login
//!                          ├ stop    ──► Finished ("Stopping session...")
//!                          └ error   ──► Finished (message only)
//! ```
//!
//! The poll loop lives as long as the page: leaving the route fires the
//! cancellation channel and the loop returns without another request.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{select, Either};
use leptos::*;
use leptos_meta::Title;
use leptos_router::use_query_map;
use sitetester_core::render::{load_error_message, PerformanceBoard, NO_RESULTS};
use sitetester_core::{
    ActivityLog, ApiError, ApiResult, AuditKind, AuditProfile, LogLevel, Navigation, Notifier,
    Phase, PerformanceReport, PerformanceResult, PollEvent, PollOutcome, ProgressSink,
    ProgressView, ResultSet, ResultShape, SelectionState, SessionId, SessionView, Sleeper,
    StopControl, StopOutcome, SubmitError, ValidationError,
};

use crate::components::{
    ActivityPanel, H1Results, Hero, MediaView, NoticeModal, PerformanceTable, PhoneResults,
    ProgressPanel, UploadForm,
};
use crate::config::APP_NAME;
use crate::services::{bearer_token, confirm, navigate, BrowserApi, GlooSleeper, ModalNotifier};
use crate::types::{phase_after_failed_upload, PendingNotice, ResultsState, ResumeParams};

/// One-line description under each audit's title.
pub fn audit_subtitle(kind: AuditKind) -> &'static str {
    match kind {
        AuditKind::H1 => "Check every page of a URL list for missing or duplicated H1 tags.",
        AuditKind::Phone => "Find where a phone number appears and how it is formatted.",
        AuditKind::Static => "Capture full-page screenshots per browser and resolution.",
        AuditKind::Dynamic => "Record scrolling videos of each page in Chrome or Edge.",
        AuditKind::Performance => "Measure score, time to first byte and page load per URL.",
    }
}

// =============================================================================
// Page State
// =============================================================================

/// Reactive state of one audit page.
#[derive(Clone, Copy)]
struct PageState {
    phase: RwSignal<Phase>,
    progress: RwSignal<Option<ProgressView>>,
    status: RwSignal<String>,
    activity: RwSignal<ActivityLog>,
    board: RwSignal<PerformanceBoard>,
    results: RwSignal<Option<ResultsState>>,
    session: RwSignal<Option<SessionId>>,
    stop: RwSignal<StopControl>,
    /// Set while a confirmed stop request is in flight.
    stopping: RwSignal<bool>,
    notifier: ModalNotifier,
    cancel: StoredValue<Option<oneshot::Sender<()>>>,
}

impl PageState {
    fn new(notifier: ModalNotifier) -> Self {
        Self {
            phase: create_rw_signal(Phase::Uploading),
            progress: create_rw_signal(None),
            status: create_rw_signal(String::new()),
            activity: create_rw_signal(ActivityLog::new()),
            board: create_rw_signal(PerformanceBoard::new()),
            results: create_rw_signal(None),
            session: create_rw_signal(None),
            stop: create_rw_signal(StopControl::new()),
            stopping: create_rw_signal(false),
            notifier,
            cancel: store_value(None),
        }
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        log::info!("{} {}", level.emoji(), message);
        self.activity.update(|log| log.push(level, message));
    }

    fn raise(&self, err: &SubmitError) {
        let pending = PendingNotice::from(err);
        self.notifier.notify_then(pending.notice, pending.then);
    }

    /// End the running poll loop, if any.
    fn cancel_polling(&self) {
        if let Some(sender) = self.cancel.try_update_value(Option::take).flatten() {
            let _ = sender.send(());
        }
    }

    /// A future that resolves when the page cancels the current loop.
    ///
    /// Dropping the page drops the sender, which resolves it as well.
    fn cancellation(&self) -> impl Future<Output = ()> {
        self.cancel_polling();
        let (sender, receiver) = oneshot::channel();
        self.cancel.set_value(Some(sender));
        async move {
            let _ = receiver.await;
        }
    }

    fn show(&self, results: ApiResult<ResultSet>) {
        match results {
            Ok(set) => {
                if let ResultSet::Performance(report) = &set {
                    self.board.update(|board| {
                        board.merge(&report.results);
                    });
                }
                self.results.set(Some(ResultsState::Loaded(set)));
            }
            Err(ApiError::Unauthorized) => {
                log::warn!("🔒 Results need a new login");
                navigate(Navigation::Login);
            }
            Err(err) => {
                let message = load_error_message(&err);
                self.log(LogLevel::Error, message.clone());
                self.results.set(Some(ResultsState::Failed(message)));
            }
        }
    }
}

// =============================================================================
// Progress Sink
// =============================================================================

struct PageSink {
    state: PageState,
    streamed: Vec<PerformanceResult>,
    last: Option<ProgressView>,
}

impl ProgressSink for PageSink {
    fn on_event(&mut self, event: PollEvent<'_>) {
        match event {
            PollEvent::Rows(rows) => {
                self.streamed = rows.to_vec();
                self.state.board.update(|board| {
                    board.merge(rows);
                });
            }
            PollEvent::Progress(view) => {
                self.state.status.set(view.message.clone());
                self.state.progress.set(Some(view.clone()));
                self.last = Some(view.clone());
            }
            PollEvent::TickFailed(err) => {
                self.state
                    .log(LogLevel::Warning, format!("Progress check failed: {}", err));
            }
            PollEvent::Finished(_) => {}
        }
    }
}

fn outcome_level(outcome: &PollOutcome) -> LogLevel {
    match outcome {
        PollOutcome::Completed(_) => LogLevel::Success,
        PollOutcome::Failed => LogLevel::Error,
        _ => LogLevel::Warning,
    }
}

// =============================================================================
// Session Lifecycle
// =============================================================================

/// Sleep unless the page cancels first; `false` when cancelled.
async fn pause(state: PageState, delay: Duration) -> bool {
    let cancelled = pin!(state.cancellation());
    let sleep = pin!(GlooSleeper.sleep(delay));
    matches!(select(sleep, cancelled).await, Either::Left(_))
}

async fn submit(state: PageState, profile: AuditProfile, selection: SelectionState) {
    let token = bearer_token();
    let request = match selection.validate(&profile, token.as_ref()) {
        Ok(request) => request,
        Err(err) => return state.raise(&err.into()),
    };
    let Some(token) = token else {
        return state.raise(&ValidationError::MissingCredentials.into());
    };

    state.phase.set(Phase::Polling);
    state.status.set(profile.uploading_message.to_string());
    state.log(LogLevel::Info, profile.uploading_message);

    match SessionView::start(&BrowserApi, profile, request, &token).await {
        Ok(view) => {
            state.log(LogLevel::Success, format!("Session {} started", view.session()));
            state.status.set(view.profile().started_message.to_string());
            follow(state, view).await;
        }
        Err(err) => {
            state.log(LogLevel::Error, err.to_string());
            let err = SubmitError::from(err);
            state.phase.set(phase_after_failed_upload(&err));
            state.raise(&err);
        }
    }
}

async fn follow(state: PageState, mut view: SessionView) {
    state.session.set(Some(view.session().clone()));
    state.phase.set(Phase::Polling);

    let token = bearer_token();
    let cancelled = state.cancellation();
    let mut sink = PageSink {
        state,
        streamed: Vec::new(),
        last: None,
    };
    let outcome = view
        .poller(token.as_ref())
        .run(&BrowserApi, &GlooSleeper, &mut sink, cancelled)
        .await;

    if outcome == PollOutcome::Cancelled {
        log::debug!("Polling of {} cancelled", view.session());
        return;
    }
    state.cancel.set_value(None);

    if let Some(last) = &sink.last {
        view.record(last);
    }
    let conclusion = view.conclude(&outcome);

    if let Some(message) = conclusion.message {
        state.status.set(message.to_string());
        state.log(outcome_level(&outcome), message);
    }
    if let Some(notice) = conclusion.notice {
        state.notifier.notify(notice);
    }
    if let Some((navigation, delay)) = conclusion.redirect {
        if pause(state, delay).await {
            navigate(navigation);
        }
        return;
    }

    if conclusion.show_results {
        let results = if view.profile().result_shape == ResultShape::Streaming {
            Ok(ResultSet::Performance(PerformanceReport {
                results: sink.streamed,
                status: view
                    .last_snapshot()
                    .map(|snapshot| snapshot.status)
                    .unwrap_or_default(),
            }))
        } else {
            state.results.set(Some(ResultsState::Loading));
            ResultSet::fetch(&BrowserApi, &view, token.as_ref()).await
        };
        state.show(results);
    }
    state.phase.set(view.phase());
}

async fn load(state: PageState, view: SessionView) {
    state.phase.set(Phase::Results);
    state.results.set(Some(ResultsState::Loading));
    state.log(LogLevel::Info, format!("Loading results of session {}", view.session()));
    state.show(ResultSet::fetch(&BrowserApi, &view, bearer_token().as_ref()).await);
}

async fn stop(state: PageState, session: SessionId) {
    let token = bearer_token();
    let has_token = token.is_some();
    let mut control = state.stop.get_untracked();

    let outcome = control
        .request_stop(&BrowserApi, &session, token.as_ref(), || {
            let confirmed = confirm(StopControl::CONFIRM_PROMPT);
            state.stopping.set(confirmed && has_token);
            confirmed
        })
        .await;

    match outcome {
        StopOutcome::Declined => {}
        StopOutcome::NeedsLogin(notice) => {
            state.notifier.notify_then(notice, Some(Navigation::Login));
        }
        StopOutcome::Stopped => {
            state.cancel_polling();
            state.phase.set(Phase::Finished);
            state.status.set(StopControl::STOPPING_MESSAGE.to_string());
            state.log(LogLevel::Info, StopControl::STOPPING_MESSAGE);
        }
        StopOutcome::Failed(notice) => {
            state.log(LogLevel::Error, notice.text.clone());
            state.notifier.notify(notice);
        }
    }

    state.stop.set(control);
    state.stopping.set(false);
}

// =============================================================================
// Rendering
// =============================================================================

fn results_view(results: ResultsState, board: RwSignal<PerformanceBoard>) -> View {
    match results {
        ResultsState::Loading => view! { <div class="loading">"Loading results..."</div> }.into_view(),
        ResultsState::Failed(message) => {
            view! { <div class="error-message">{message}</div> }.into_view()
        }
        ResultsState::Loaded(ResultSet::H1(rows)) if rows.is_empty() => {
            view! { <div class="empty-state">{NO_RESULTS}</div> }.into_view()
        }
        ResultsState::Loaded(ResultSet::Phone(rows)) if rows.is_empty() => {
            view! { <div class="empty-state">{NO_RESULTS}</div> }.into_view()
        }
        ResultsState::Loaded(ResultSet::H1(rows)) => view! { <H1Results results=rows/> }.into_view(),
        ResultsState::Loaded(ResultSet::Phone(rows)) => {
            view! { <PhoneResults results=rows/> }.into_view()
        }
        ResultsState::Loaded(ResultSet::Performance(_)) => {
            view! { <PerformanceTable board=board/> }.into_view()
        }
        ResultsState::Loaded(ResultSet::Media(browser)) => {
            view! { <MediaView browser=browser/> }.into_view()
        }
    }
}

#[component]
pub fn AuditPage(kind: AuditKind) -> impl IntoView {
    let profile = kind.profile();
    let (notice, set_notice) = create_signal(None::<PendingNotice>);
    let state = PageState::new(ModalNotifier::new(set_notice));

    on_cleanup(move || state.cancel_polling());

    let query = use_query_map();
    let resume = query.with_untracked(|q| {
        ResumeParams::from_query(
            q.get("status").map(String::as_str),
            q.get("session").map(String::as_str),
        )
    });
    if let Some(params) = resume {
        let view = SessionView::resume(profile.clone(), params.session, None, Phase::Results);
        spawn_local(load(state, view));
    }

    let submit_profile = profile.clone();
    let on_submit = Callback::new(move |selection: SelectionState| {
        spawn_local(submit(state, submit_profile.clone(), selection));
    });

    let on_stop = Callback::new(move |_: ()| {
        if let Some(session) = state.session.get_untracked() {
            spawn_local(stop(state, session));
        }
    });

    let streaming = profile.result_shape == ResultShape::Streaming;
    let form_profile = profile.clone();
    let phase = state.phase;

    view! {
        <Title text=format!("{} - {}", profile.title, APP_NAME)/>
        <div class="container">
            <Hero title=profile.title subtitle=audit_subtitle(kind)/>

            <Show when=move || phase.get() == Phase::Uploading fallback=|| view! {}>
                <UploadForm profile=form_profile.clone() on_submit=on_submit/>
            </Show>

            <Show
                when=move || matches!(phase.get(), Phase::Polling | Phase::Finished)
                fallback=|| view! {}
            >
                <ProgressPanel
                    progress=state.progress
                    status=state.status
                    can_stop=Signal::derive(move || {
                        phase.get() == Phase::Polling && state.session.with(Option::is_some)
                    })
                    stop_label=Signal::derive(move || {
                        if state.stopping.get() { "Stopping..." } else { state.stop.with(StopControl::label) }
                    })
                    stop_enabled=Signal::derive(move || {
                        !state.stopping.get() && state.stop.with(StopControl::is_enabled)
                    })
                    on_stop=on_stop
                />
            </Show>

            <Show when=move || streaming && phase.get() == Phase::Polling fallback=|| view! {}>
                <PerformanceTable board=state.board/>
            </Show>

            <div class="results-section">
                {move || state.results.get().map(|results| results_view(results, state.board))}
            </div>

            <Show when=move || phase.get() != Phase::Uploading fallback=|| view! {}>
                <ActivityPanel log=state.activity/>
            </Show>

            <NoticeModal notice=notice set_notice=set_notice/>
        </div>
    }
}
