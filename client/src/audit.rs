//! Audit cycle as run from the terminal.
//!
//! ```text
//! selection ──► SessionView::submit ──► follow (poll) ──► results ──► render / CSV
//! ```
//!
//! Every step takes the API as a generic [`AuditApi`] so the integration
//! tests can point it at a local mock backend.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use sitetester_core::render::{H1Row, PerformanceBoard, PhoneRow};
use sitetester_core::{
    ApiResult, AuditApi, BearerToken, Conclusion, PerformanceReport, PollOutcome, ResultSet,
    ResultShape, SessionView,
};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::export::{self, ExportResult};
use crate::runtime::TokioSleeper;
use crate::terminal::{self, TerminalSink};

/// What came out of following a session.
#[derive(Debug)]
pub struct SessionReport {
    pub outcome: PollOutcome,
    pub conclusion: Conclusion,
    /// Present when the outcome shows results.
    pub results: Option<ApiResult<ResultSet>>,
}

/// Poll `view` until it ends or `cancel` fires, then load its results.
///
/// Performance rows are not fetched again: the rows streamed during
/// polling are the result set.
pub async fn follow<A, W>(
    api: &A,
    view: &mut SessionView,
    token: Option<&BearerToken>,
    sink: &mut TerminalSink<W>,
    cancel: &CancellationToken,
) -> SessionReport
where
    A: AuditApi,
    W: Write,
{
    let outcome = view
        .poller(token)
        .run(api, &TokioSleeper, sink, cancel.cancelled())
        .await;

    if let Some(last) = sink.last_progress() {
        view.record(last);
    }
    let conclusion = view.conclude(&outcome);

    let results = if !conclusion.show_results {
        None
    } else if view.profile().result_shape == ResultShape::Streaming {
        Some(Ok(ResultSet::Performance(PerformanceReport {
            results: sink.streamed().to_vec(),
            status: view
                .last_snapshot()
                .map(|snapshot| snapshot.status)
                .unwrap_or_default(),
        })))
    } else {
        Some(ResultSet::fetch(api, view, token).await)
    };

    SessionReport {
        outcome,
        conclusion,
        results,
    }
}

/// Newest-first performance rows of a report.
pub fn performance_board(report: &PerformanceReport) -> PerformanceBoard {
    let mut board = PerformanceBoard::new();
    board.merge(&report.results);
    board
}

/// Write a result set in human-readable form.
pub fn render<W: Write>(out: &mut W, results: &ResultSet, config: &ClientConfig) -> io::Result<()> {
    match results {
        ResultSet::H1(rows) => terminal::render_h1(out, rows),
        ResultSet::Phone(rows) => terminal::render_phone(out, rows),
        ResultSet::Performance(report) => {
            terminal::render_performance(out, &performance_board(report))
        }
        ResultSet::Media(browser) => terminal::render_media(out, browser, config, None, None),
    }
}

/// Write tabular results as CSV; media sessions have nothing to export.
///
/// Returns the number of rows written.
pub fn export_csv(path: &Path, results: &ResultSet) -> ExportResult<Option<usize>> {
    let written = match results {
        ResultSet::H1(rows) => {
            let rows: Vec<H1Row> = rows.iter().map(H1Row::from).collect();
            export::write_h1(File::create(path)?, &rows)?;
            rows.len()
        }
        ResultSet::Phone(rows) => {
            let rows: Vec<PhoneRow> = rows.iter().map(PhoneRow::from).collect();
            export::write_phone(File::create(path)?, &rows)?;
            rows.len()
        }
        ResultSet::Performance(report) => {
            let board = performance_board(report);
            export::write_performance(File::create(path)?, board.rows())?;
            board.len()
        }
        ResultSet::Media(_) => return Ok(None),
    };
    Ok(Some(written))
}
