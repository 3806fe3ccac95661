//! End-to-end audits against an in-process mock of the audit backend.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use sitetester::audit::{self, SessionReport};
use sitetester::{ClientConfig, HttpApi, TerminalSink};
use sitetester_core::{
    ApiError, AuditKind, BearerToken, CredentialAccessor, Navigation, Phase, PollOutcome, ResultSet,
    SelectionState, SessionId, SessionView, StopControl, StopOutcome, SubmitError, UrlSource,
    ValidationError,
};

const TICK: Duration = Duration::from_millis(10);

// =============================================================================
// Mock backend
// =============================================================================

type Reply = (StatusCode, Value);

#[derive(Debug, Default)]
struct Upload {
    path: String,
    file_name: Option<String>,
    file: Option<String>,
    fields: HashMap<String, String>,
    authorization: Option<String>,
    cookie: Option<String>,
}

#[derive(Default)]
struct Mock {
    upload_reply: Mutex<Option<Reply>>,
    uploads: Mutex<Vec<Upload>>,
    /// Progress replies in order; the last one repeats.
    progress: Mutex<VecDeque<Reply>>,
    progress_hits: AtomicUsize,
    h1_results: Mutex<Value>,
    session_config: Mutex<Value>,
    stop_reply: Mutex<Option<Reply>>,
    stops: AtomicUsize,
}

impl Mock {
    fn with_progress(replies: Vec<Reply>) -> Arc<Self> {
        let mock = Self::default();
        *mock.progress.lock().unwrap() = replies.into();
        Arc::new(mock)
    }

    fn next_progress(&self) -> Reply {
        self.progress_hits.fetch_add(1, Ordering::SeqCst);
        let mut progress = self.progress.lock().unwrap();
        if progress.len() > 1 {
            progress.pop_front().unwrap()
        } else {
            progress
                .front()
                .cloned()
                .unwrap_or((StatusCode::OK, json!({"status": "running"})))
        }
    }

    fn hits(&self) -> usize {
        self.progress_hits.load(Ordering::SeqCst)
    }
}

fn running(completed: u64, total: u64) -> Reply {
    (
        StatusCode::OK,
        json!({"completed": completed, "total": total, "status": "running"}),
    )
}

fn finished(completed: u64, total: u64, status: &str) -> Reply {
    (
        StatusCode::OK,
        json!({"completed": completed, "total": total, "status": status}),
    )
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record_upload(
    mock: &Mock,
    path: String,
    headers: &HeaderMap,
    mut multipart: Multipart,
) -> Result<(), (StatusCode, Json<Value>)> {
    let mut upload = Upload {
        path,
        authorization: header_value(headers, header::AUTHORIZATION),
        cookie: header_value(headers, header::COOKIE),
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (StatusCode::BAD_REQUEST, Json(json!({"error": format!("Multipart error: {}", e)})))
    })? {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(|s| s.to_string());
        let text = field.text().await.map_err(|e| {
            (StatusCode::BAD_REQUEST, Json(json!({"error": format!("Read error: {}", e)})))
        })?;

        if name == "file" {
            upload.file_name = file_name;
            upload.file = Some(text);
        } else {
            upload.fields.insert(name, text);
        }
    }

    mock.uploads.lock().unwrap().push(upload);
    Ok(())
}

async fn upload(
    State(mock): State<Arc<Mock>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    if let Err(err) = record_upload(&mock, format!("/upload/{}", kind), &headers, multipart).await {
        return err;
    }
    if let Some((status, body)) = mock.upload_reply.lock().unwrap().clone() {
        return (status, Json(body));
    }
    (
        StatusCode::OK,
        Json(json!({"session": Uuid::new_v4().to_string(), "total_expected": 2})),
    )
}

async fn performance_start(
    State(mock): State<Arc<Mock>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    if let Err(err) =
        record_upload(&mock, "/api/performance-test".to_string(), &headers, multipart).await
    {
        return err;
    }
    (
        StatusCode::OK,
        Json(json!({
            "status": "started",
            "session_id": format!("perf_{}", Uuid::new_v4().simple()),
            "message": "Performance test started",
        })),
    )
}

async fn progress(State(mock): State<Arc<Mock>>) -> (StatusCode, Json<Value>) {
    let (status, body) = mock.next_progress();
    (status, Json(body))
}

fn not_authenticated(headers: &HeaderMap) -> Option<(StatusCode, Json<Value>)> {
    let authenticated = header_value(headers, header::COOKIE)
        .is_some_and(|cookie| cookie.contains("access_token="));
    (!authenticated)
        .then(|| (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"}))))
}

async fn performance_results(
    State(mock): State<Arc<Mock>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Some(rejected) = not_authenticated(&headers) {
        mock.progress_hits.fetch_add(1, Ordering::SeqCst);
        return rejected;
    }
    let (status, body) = mock.next_progress();
    (status, Json(body))
}

async fn h1_results(State(mock): State<Arc<Mock>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if let Some(rejected) = not_authenticated(&headers) {
        return rejected;
    }
    (StatusCode::OK, Json(mock.h1_results.lock().unwrap().clone()))
}

async fn session_config(State(mock): State<Arc<Mock>>) -> Json<Value> {
    Json(mock.session_config.lock().unwrap().clone())
}

async fn stop(State(mock): State<Arc<Mock>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    mock.stops.fetch_add(1, Ordering::SeqCst);
    if header_value(&headers, header::AUTHORIZATION).is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})));
    }
    let (status, body) = mock
        .stop_reply
        .lock()
        .unwrap()
        .clone()
        .unwrap_or((StatusCode::OK, json!({"message": "Session stopped"})));
    (status, Json(body))
}

async fn spawn(mock: Arc<Mock>) -> String {
    let app = Router::new()
        .route("/upload/{kind}", post(upload))
        .route("/api/performance-test", post(performance_start))
        .route("/progress/{kind}/{session}", get(progress))
        .route("/api/results/{session}", get(performance_results))
        .route("/h1-results/{session}", get(h1_results))
        .route("/session-config/{kind}/{session}", get(session_config))
        .route("/api/sessions/{session}/stop", post(stop))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn api(base_url: String, cookie: Option<&str>) -> HttpApi {
    HttpApi::new(ClientConfig {
        base_url,
        cookie: cookie.map(str::to_string),
    })
}

fn token_of(api: &HttpApi) -> Option<BearerToken> {
    CredentialAccessor::new(api.config().clone()).bearer_token()
}

fn url_file(urls: &str) -> SelectionState {
    SelectionState {
        file: Some(UrlSource::File {
            name: "urls.txt".into(),
            bytes: urls.as_bytes().to_vec(),
        }),
        session_name: "Homepage".into(),
        ..Default::default()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_h1_audit_full_cycle() {
    let mock = Mock::with_progress(vec![running(1, 2), finished(2, 2, "completed")]);
    *mock.h1_results.lock().unwrap() = json!([
        {"url": "https://a.com", "h1_count": 1, "h1_texts": ["Welcome"], "issues": []},
        {"url": "https://b.com", "h1_count": 0, "h1_texts": "[]", "issues": "[\"Missing H1 tag\"]"},
    ]);
    let api = api(spawn(mock.clone()).await, Some("theme=dark; access_token=tok-1"));
    let token = token_of(&api);

    let profile = AuditKind::H1.profile().with_timing(TICK);
    let mut view = SessionView::submit(
        &api,
        profile,
        url_file("https://a.com\nhttps://b.com\n"),
        token.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(view.total_expected(), 2);

    {
        let uploads = mock.uploads.lock().unwrap();
        let upload = &uploads[0];
        assert_eq!(upload.path, "/upload/h1");
        assert_eq!(upload.file_name.as_deref(), Some("urls.txt"));
        assert_eq!(upload.fields.get("session_name").map(String::as_str), Some("Homepage"));
        assert_eq!(upload.authorization.as_deref(), Some("Bearer tok-1"));
        assert_eq!(upload.cookie.as_deref(), Some("access_token=tok-1"));
    }

    let cancel = CancellationToken::new();
    let mut progress = Vec::new();
    let mut sink = TerminalSink::new(&mut progress);
    let SessionReport {
        outcome,
        conclusion,
        results,
    } = audit::follow(&api, &mut view, token.as_ref(), &mut sink, &cancel).await;

    assert!(matches!(outcome, PollOutcome::Completed(_)));
    assert!(conclusion.show_results);
    assert_eq!(view.phase(), Phase::Results);
    assert_eq!(mock.hits(), 2);

    let results = results.unwrap().unwrap();
    match &results {
        ResultSet::H1(rows) => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[1].issues, vec!["Missing H1 tag".to_string()]);
        }
        other => panic!("unexpected results: {:?}", other),
    }

    let progress = String::from_utf8(progress).unwrap();
    assert!(progress.contains("Audited 1 of 2 pages..."));
    assert!(progress.contains("Completed!"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h1.csv");
    assert_eq!(audit::export_csv(&path, &results).unwrap(), Some(2));
    assert!(std::fs::read_to_string(&path).unwrap().contains("Missing H1 tag"));

    // No progress request after the terminal tick.
    tokio::time::sleep(TICK * 5).await;
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn test_unauthorized_upload_goes_to_login() {
    let mock = Arc::new(Mock::default());
    *mock.upload_reply.lock().unwrap() = Some((
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Could not validate credentials"}),
    ));
    let api = api(spawn(mock.clone()).await, Some("access_token=expired"));

    let err = SessionView::submit(
        &api,
        AuditKind::H1.profile().with_timing(TICK),
        url_file("https://a.com"),
        token_of(&api).as_ref(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.navigation(), Some(Navigation::Login));
    assert_eq!(err.notice().title, "Session Expired");
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let mock = Arc::new(Mock::default());
    let api = api(spawn(mock.clone()).await, None);

    let err = SessionView::submit(
        &api,
        AuditKind::H1.profile(),
        url_file("https://a.com"),
        token_of(&api).as_ref(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Invalid(ValidationError::MissingCredentials)
    ));
    assert!(mock.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_reverts_to_upload() {
    let mock = Arc::new(Mock::default());
    *mock.upload_reply.lock().unwrap() =
        Some((StatusCode::BAD_REQUEST, json!({"error": "Invalid file format"})));
    let api = api(spawn(mock.clone()).await, Some("access_token=tok"));

    let err = SessionView::submit(
        &api,
        AuditKind::H1.profile(),
        url_file("https://a.com"),
        token_of(&api).as_ref(),
    )
    .await
    .unwrap_err();

    assert!(err.reverts_to_upload());
    assert_eq!(err.notice().text, "Invalid file format");
}

#[tokio::test]
async fn test_failed_ticks_keep_polling() {
    let mock = Mock::with_progress(vec![
        (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "busy"})),
        running(1, 2),
        finished(1, 2, "completed"),
    ]);
    let api = api(spawn(mock.clone()).await, Some("access_token=tok"));
    let mut view = SessionView::resume(
        AuditKind::Static.profile().with_timing(TICK),
        SessionId::from("s-1"),
        Some(2),
        Phase::Polling,
    );

    let cancel = CancellationToken::new();
    let mut sink = TerminalSink::new(Vec::new());
    let report = audit::follow(&api, &mut view, None, &mut sink, &cancel).await;

    // Completed is terminal even when fewer items than expected finished.
    assert!(matches!(report.outcome, PollOutcome::Completed(_)));
    assert_eq!(mock.hits(), 3);
    assert_eq!(sink.log().len(), 2);
}

#[tokio::test]
async fn test_cancel_stops_polling() {
    let mock = Mock::with_progress(vec![running(0, 5)]);
    let api = api(spawn(mock.clone()).await, Some("access_token=tok"));
    let mut view = SessionView::resume(
        AuditKind::Phone.profile().with_timing(TICK),
        SessionId::from("s-2"),
        None,
        Phase::Polling,
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(TICK * 5).await;
        trigger.cancel();
    });

    let mut sink = TerminalSink::new(Vec::new());
    let report = audit::follow(&api, &mut view, None, &mut sink, &cancel).await;
    assert_eq!(report.outcome, PollOutcome::Cancelled);
    assert!(report.results.is_none());
    assert_eq!(view.phase(), Phase::Finished);

    // Let a request dropped mid-flight settle before counting.
    tokio::time::sleep(TICK * 2).await;
    let hits = mock.hits();
    assert!(hits >= 1);
    tokio::time::sleep(TICK * 5).await;
    assert_eq!(mock.hits(), hits);
}

#[tokio::test]
async fn test_stopped_session_redirects_to_profile() {
    let mock = Mock::with_progress(vec![running(1, 3), finished(1, 3, "stopped")]);
    let api = api(spawn(mock.clone()).await, Some("access_token=tok"));
    let mut view = SessionView::resume(
        AuditKind::Dynamic.profile().with_timing(TICK),
        SessionId::from("s-3"),
        Some(3),
        Phase::Polling,
    );

    let cancel = CancellationToken::new();
    let mut sink = TerminalSink::new(Vec::new());
    let report = audit::follow(&api, &mut view, None, &mut sink, &cancel).await;

    assert_eq!(report.outcome, PollOutcome::Stopped);
    assert_eq!(
        report.conclusion.redirect,
        Some((Navigation::Profile, TICK))
    );
    assert!(report.results.is_none());
}

#[tokio::test]
async fn test_performance_streams_rows() {
    let mock = Mock::with_progress(vec![
        (
            StatusCode::OK,
            json!({"results": [{"url": "https://a.com", "score": 92, "ttfb": 120.4, "page_load": 1800}], "status": "running"}),
        ),
        (
            StatusCode::OK,
            json!({"results": [
                {"url": "https://a.com", "score": 92, "ttfb": 120.4, "page_load": 1800},
                {"url": "https://b.com", "score": 55, "ttfb": 640, "page_load": 5200}
            ], "status": "completed"}),
        ),
    ]);
    let api = api(spawn(mock.clone()).await, Some("access_token=tok"));
    let token = token_of(&api);

    let selection = SelectionState {
        manual_text: "https://a.com\n\nhttps://b.com".into(),
        ..Default::default()
    };
    let mut view = SessionView::submit(
        &api,
        AuditKind::Performance.profile().with_timing(TICK),
        selection,
        token.as_ref(),
    )
    .await
    .unwrap();
    assert!(view.session().as_str().starts_with("perf_"));
    assert_eq!(view.total_expected(), 2);

    {
        let uploads = mock.uploads.lock().unwrap();
        assert_eq!(uploads[0].path, "/api/performance-test");
        assert!(uploads[0].file.is_none());
        assert_eq!(
            uploads[0].fields.get("urls").map(String::as_str),
            Some("https://a.com\nhttps://b.com")
        );
    }

    let cancel = CancellationToken::new();
    let mut sink = TerminalSink::new(Vec::new());
    let report = audit::follow(&api, &mut view, token.as_ref(), &mut sink, &cancel).await;

    assert!(matches!(report.outcome, PollOutcome::Completed(_)));
    assert_eq!(sink.streamed().len(), 2);
    match report.results.unwrap().unwrap() {
        ResultSet::Performance(report) => {
            let board = audit::performance_board(&report);
            assert_eq!(board.rows()[0].url, "https://b.com");
            assert_eq!(board.rows()[1].ttfb, "120ms");
        }
        other => panic!("unexpected results: {:?}", other),
    }
}

#[tokio::test]
async fn test_performance_without_login_goes_to_login() {
    let mock = Mock::with_progress(vec![(
        StatusCode::OK,
        json!({"results": [], "status": "running"}),
    )]);
    let api = api(spawn(mock.clone()).await, None);
    let mut view = SessionView::resume(
        AuditKind::Performance.profile().with_timing(TICK),
        SessionId::from("perf_2"),
        Some(2),
        Phase::Polling,
    );

    let cancel = CancellationToken::new();
    let mut sink = TerminalSink::new(Vec::new());
    let report = audit::follow(&api, &mut view, None, &mut sink, &cancel).await;

    assert_eq!(report.outcome, PollOutcome::Unauthorized);
    assert_eq!(mock.hits(), 1);
    assert_eq!(
        report.conclusion.redirect,
        Some((Navigation::Login, Duration::ZERO))
    );
    assert!(report.results.is_none());

    let err = ResultSet::fetch(&api, &view, None).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn test_static_results_are_media() {
    let mock = Arc::new(Mock::default());
    *mock.session_config.lock().unwrap() = json!({
        "urls": "[\"https://www.example.com/blog/my-post.html\"]",
        "browsers": ["Chrome"],
        "resolutions": ["1920x1080"],
        "type": "static",
    });
    let api = api(spawn(mock.clone()).await, Some("access_token=tok"));
    let view = SessionView::resume(
        AuditKind::Static.profile(),
        SessionId::from("s-4"),
        None,
        Phase::Results,
    );

    let results = ResultSet::fetch(&api, &view, token_of(&api).as_ref())
        .await
        .unwrap();
    match results {
        ResultSet::Media(browser) => {
            let tiles = browser.tiles("Chrome");
            assert_eq!(tiles[0].key, "my-post__example.com");
            assert_eq!(
                browser.grid("Chrome", &tiles[0].url)[0].src,
                "/screenshots/s-4/Chrome/my-post__example.com__1920x1080.png"
            );
        }
        other => panic!("unexpected results: {:?}", other),
    }
}

#[tokio::test]
async fn test_h1_results_need_the_cookie() {
    let mock = Arc::new(Mock::default());
    *mock.h1_results.lock().unwrap() = json!([]);
    let base_url = spawn(mock.clone()).await;
    let view = SessionView::resume(
        AuditKind::H1.profile(),
        SessionId::from("s-5"),
        None,
        Phase::Results,
    );

    let anonymous = api(base_url.clone(), None);
    let err = ResultSet::fetch(&anonymous, &view, None).await.unwrap_err();
    assert!(err.is_unauthorized());

    let signed_in = api(base_url, Some("access_token=tok"));
    let results = ResultSet::fetch(&signed_in, &view, token_of(&signed_in).as_ref())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_stop_success_and_failure() {
    let mock = Arc::new(Mock::default());
    let api = api(spawn(mock.clone()).await, Some("access_token=tok"));
    let token = token_of(&api);
    let session = SessionId::from("s-6");

    let mut control = StopControl::new();
    let outcome = control
        .request_stop(&api, &session, token.as_ref(), || true)
        .await;
    assert_eq!(outcome, StopOutcome::Stopped);
    assert!(!control.is_enabled());

    *mock.stop_reply.lock().unwrap() =
        Some((StatusCode::NOT_FOUND, json!({"detail": "Session not found"})));
    let mut control = StopControl::new();
    match control
        .request_stop(&api, &session, token.as_ref(), || true)
        .await
    {
        StopOutcome::Failed(notice) => assert_eq!(notice.title, "Unable to Stop Session"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(control.is_enabled());
    assert_eq!(mock.stops.load(Ordering::SeqCst), 2);

    let mut control = StopControl::new();
    let outcome = control.request_stop(&api, &session, token.as_ref(), || false).await;
    assert_eq!(outcome, StopOutcome::Declined);
    assert_eq!(mock.stops.load(Ordering::SeqCst), 2);
}
