//! Terminal presentation.
//!
//! Progress and notices go to stderr so that stdout carries only results
//! and can be piped.

use std::io::{self, Write};

use sitetester_core::render::media::resolution_label;
use sitetester_core::render::{
    H1Row, H1Summary, MediaBrowser, PerformanceBoard, PhoneRow, PhoneSummary, NO_RESULTS,
};
use sitetester_core::render::{performance, tabular};
use sitetester_core::{
    ActivityLog, H1Result, LogLevel, Notice, Notifier, PerformanceResult, PhoneResult, PollEvent,
    PollOutcome, ProgressSink, ProgressView,
};

use crate::config::ClientConfig;

const BAR_WIDTH: usize = 30;

// =============================================================================
// Notices
// =============================================================================

/// Prints notices to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", notice);
    }
}

// =============================================================================
// Progress
// =============================================================================

/// `[#######-------]  50%`
pub fn progress_bar(percent: u8) -> String {
    let filled = BAR_WIDTH * usize::from(percent.min(100)) / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// Renders poll events and keeps what the results step needs.
pub struct TerminalSink<W: Write> {
    out: W,
    board: PerformanceBoard,
    streamed: Vec<PerformanceResult>,
    log: ActivityLog,
    last: Option<ProgressView>,
}

impl TerminalSink<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            board: PerformanceBoard::new(),
            streamed: Vec::new(),
            log: ActivityLog::new(),
            last: None,
        }
    }

    /// Latest full row list reported by the backend.
    pub fn streamed(&self) -> &[PerformanceResult] {
        &self.streamed
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Last running tick.
    pub fn last_progress(&self) -> Option<&ProgressView> {
        self.last.as_ref()
    }

    fn line(&mut self, text: &str) {
        // Progress output is best effort.
        let _ = writeln!(self.out, "{}", text);
    }
}

impl<W: Write> ProgressSink for TerminalSink<W> {
    fn on_event(&mut self, event: PollEvent<'_>) {
        match event {
            PollEvent::Rows(rows) => {
                // New rows sit at the front of the board, newest first.
                let added = self.board.merge(rows);
                self.streamed = rows.to_vec();
                let fresh: Vec<String> = self.board.rows()[..added]
                    .iter()
                    .rev()
                    .map(|row| {
                        format!(
                            "   📈 {}  score {}  ttfb {}  load {}",
                            row.url,
                            row.score_label(),
                            row.ttfb,
                            row.page_load
                        )
                    })
                    .collect();
                for text in fresh {
                    self.line(&text);
                }
            }
            PollEvent::Progress(view) => {
                let text = format!("{}  {}", progress_bar(view.percent), view.message);
                self.line(&text);
                self.last = Some(view.clone());
            }
            PollEvent::TickFailed(err) => {
                let text = format!("Progress check failed: {}", err);
                self.log.push(LogLevel::Warning, text.clone());
                self.line(&format!("   ⚠️ {}", text));
            }
            PollEvent::Finished(outcome) => {
                let level = match outcome {
                    PollOutcome::Completed(_) => LogLevel::Success,
                    PollOutcome::Failed => LogLevel::Error,
                    _ => LogLevel::Warning,
                };
                match outcome.message() {
                    Some(message) => {
                        self.log.push(level, message);
                        self.line(&format!("{} {}", level.emoji(), message));
                    }
                    None => self.log.push(LogLevel::Info, "Polling cancelled."),
                }
            }
        }
    }
}

// =============================================================================
// Results
// =============================================================================

fn or_placeholder(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        placeholder.to_string()
    } else {
        items.join(" | ")
    }
}

pub fn render_h1<W: Write>(out: &mut W, results: &[H1Result]) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "{}", NO_RESULTS);
    }

    let summary = H1Summary::from_results(results);
    writeln!(out, "📊 H1 Audit Summary")?;
    writeln!(out, "   Pages audited:   {}", summary.total)?;
    writeln!(
        out,
        "   With H1:         {} ({}%)",
        summary.with_h1,
        summary.with_h1_percent()
    )?;
    writeln!(
        out,
        "   Without H1:      {} ({}%)",
        summary.without_h1,
        summary.without_h1_percent()
    )?;
    writeln!(
        out,
        "   Multiple H1:     {} ({}%)",
        summary.multiple_h1,
        summary.multiple_h1_percent()
    )?;
    writeln!(out, "   Average H1/page: {}", summary.average_label())?;
    writeln!(out)?;

    for row in results.iter().map(H1Row::from) {
        writeln!(out, "{}  [{}]  {} H1", row.url, row.status.label(), row.count)?;
        writeln!(out, "   H1: {}", or_placeholder(&row.texts, tabular::NO_H1_TEXTS))?;
        writeln!(out, "   Issues: {}", or_placeholder(&row.issues, tabular::NO_ISSUES))?;
    }
    Ok(())
}

pub fn render_phone<W: Write>(out: &mut W, results: &[PhoneResult]) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "{}", NO_RESULTS);
    }

    let summary = PhoneSummary::from_results(results);
    writeln!(out, "📊 Phone Number Audit Summary")?;
    writeln!(out, "   Pages audited:     {}", summary.total)?;
    writeln!(
        out,
        "   With numbers:      {} ({}%)",
        summary.with_phones,
        summary.with_phones_percent()
    )?;
    writeln!(out, "   Without numbers:   {}", summary.without_phones)?;
    writeln!(
        out,
        "   Numbers found:     {} ({} per page)",
        summary.total_numbers,
        summary.average_label()
    )?;
    writeln!(
        out,
        "   Issues:            {} ({} per page)",
        summary.total_issues,
        summary.issues_per_page_label()
    )?;
    writeln!(out)?;

    for row in results.iter().map(PhoneRow::from) {
        writeln!(out, "{}  [{}]  {} found", row.url, row.status.label(), row.count)?;
        if row.numbers.is_empty() {
            writeln!(out, "   {}", tabular::NO_PHONE_NUMBERS)?;
        }
        for number in &row.numbers {
            match &number.location {
                Some(location) => writeln!(out, "   📞 {} ({})", number.number, location)?,
                None => writeln!(out, "   📞 {}", number.number)?,
            }
        }
        if !row.formats.is_empty() {
            writeln!(out, "   Formats: {}", row.formats)?;
        }
        writeln!(out, "   Issues: {}", or_placeholder(&row.issues, tabular::NO_ISSUES))?;
    }
    Ok(())
}

pub fn render_performance<W: Write>(out: &mut W, board: &PerformanceBoard) -> io::Result<()> {
    if board.is_empty() {
        return writeln!(out, "{}", performance::NO_AUDITS);
    }

    writeln!(out, "{:<50} {:>6} {:>9} {:>9}", "URL", "SCORE", "TTFB", "LOAD")?;
    for row in board.rows() {
        writeln!(
            out,
            "{:<50} {:>6} {:>9} {:>9}",
            row.url,
            row.score_label(),
            row.ttfb,
            row.page_load
        )?;
    }
    Ok(())
}

/// Media links per (browser, url) pair, optionally narrowed to one browser or URL.
pub fn render_media<W: Write>(
    out: &mut W,
    browser: &MediaBrowser,
    config: &ClientConfig,
    only_browser: Option<&str>,
    only_url: Option<&str>,
) -> io::Result<()> {
    if browser.urls().is_empty() {
        return writeln!(out, "{}", sitetester_core::render::media::NO_URLS);
    }

    let tabs = browser
        .tabs()
        .into_iter()
        .filter(|tab| only_browser.map_or(true, |b| tab.browser.eq_ignore_ascii_case(b)));
    for tab in tabs {
        writeln!(out, "🌐 {}", tab.browser)?;
        let tiles = browser
            .tiles(&tab.browser)
            .into_iter()
            .filter(|tile| only_url.map_or(true, |u| tile.url == u));
        for tile in tiles {
            writeln!(out, "   {}  ({})", tile.url, tile.key)?;
            let grid = browser.grid(&tile.browser, &tile.url);
            if grid.is_empty() {
                writeln!(out, "      {}", browser.empty_message())?;
            }
            for item in grid {
                writeln!(out, "      {:<14} {}", item.label, config.url(&item.src))?;
            }
        }
    }

    let labels: Vec<String> = browser.resolutions().iter().map(|r| resolution_label(r)).collect();
    if !labels.is_empty() {
        writeln!(out)?;
        writeln!(out, "Resolutions: {}", labels.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitetester_core::{ProgressSnapshot, ResultShape, SessionConfig, SessionId, SessionStatus};

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("[{}]   0%", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(BAR_WIDTH)));
        assert!(progress_bar(50).starts_with(&format!("[{}-", "#".repeat(15))));
    }

    #[test]
    fn test_sink_tracks_progress_and_rows() {
        let mut sink = TerminalSink::new(Vec::new());
        let view = ProgressView {
            tick: 1,
            snapshot: ProgressSnapshot {
                completed: 1,
                total: 2,
                status: SessionStatus::Running,
            },
            percent: 50,
            message: "Measured 1 of 2 pages...".into(),
            failure: None,
        };
        let rows = vec![PerformanceResult {
            url: "https://a.com".into(),
            score: Some(91.0),
            ..Default::default()
        }];

        sink.on_event(PollEvent::Rows(&rows));
        sink.on_event(PollEvent::Rows(&rows));
        sink.on_event(PollEvent::Progress(&view));
        sink.on_event(PollEvent::Finished(&PollOutcome::Stopped));

        assert_eq!(sink.board.len(), 1);
        assert_eq!(sink.last_progress().map(|v| v.tick), Some(1));
        assert_eq!(sink.log().len(), 1);

        let text = String::from_utf8(sink.out).unwrap();
        assert_eq!(text.matches("https://a.com").count(), 1);
        assert!(text.contains("Measured 1 of 2 pages..."));
        assert!(text.contains("Session stopped by user."));
    }

    #[test]
    fn test_render_h1() {
        let results = vec![
            H1Result {
                url: "https://a.com".into(),
                h1_count: 0,
                h1_texts: vec![],
                issues: vec!["Missing H1 tag".into()],
                created_at: None,
            },
            H1Result {
                url: "https://b.com".into(),
                h1_count: 1,
                h1_texts: vec!["Welcome".into()],
                issues: vec![],
                created_at: None,
            },
        ];

        let mut out = Vec::new();
        render_h1(&mut out, &results).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("With H1:         1 (50%)"));
        assert!(text.contains("Average H1/page: 0.5"));
        assert!(text.contains(tabular::NO_H1_TEXTS));
        assert!(text.contains(tabular::NO_ISSUES));
    }

    #[test]
    fn test_render_empty_results() {
        let mut out = Vec::new();
        render_phone(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), NO_RESULTS);
    }

    #[test]
    fn test_render_media_links_are_absolute() {
        let config = SessionConfig {
            urls: vec!["https://example.com/".into()],
            browsers: vec!["Chrome".into()],
            resolutions: vec!["1920x1080".into()],
            ..Default::default()
        };
        let browser = MediaBrowser::new(ResultShape::Screenshots, SessionId::from("s1"), config);

        let mut out = Vec::new();
        render_media(&mut out, &browser, &ClientConfig::default(), None, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(
            "http://localhost:8000/screenshots/s1/Chrome/home__example.com__1920x1080.png"
        ));
        assert!(text.contains("1920 × 1080"));

        let mut out = Vec::new();
        render_media(&mut out, &browser, &ClientConfig::default(), Some("Firefox"), None).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("🌐"));
    }
}
