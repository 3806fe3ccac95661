//! Streaming performance table.

use std::collections::HashSet;

use crate::model::PerformanceResult;

pub const NO_AUDITS: &str = "No audits yet";
pub const RUNNING_PLACEHOLDER: &str = "Running performance audit...";

/// Score band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreGrade {
    Good,
    Fair,
    Poor,
}

impl ScoreGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreGrade::Good
        } else if score >= 60.0 {
            ScoreGrade::Fair
        } else {
            ScoreGrade::Poor
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ScoreGrade::Good => "score-good",
            ScoreGrade::Fair => "score-fair",
            ScoreGrade::Poor => "score-poor",
        }
    }
}

/// Time to first byte, e.g. `245ms`; `-` when missing.
pub fn format_ttfb(ttfb: Option<f64>) -> String {
    match ttfb.filter(|v| *v > 0.0) {
        Some(ms) => format!("{}ms", ms.round()),
        None => "-".to_string(),
    }
}

/// Page load in seconds, e.g. `1.23s`; `-` when missing.
pub fn format_page_load(page_load: Option<f64>) -> String {
    match page_load.filter(|v| *v > 0.0) {
        Some(ms) => format!("{:.2}s", ms / 1000.0),
        None => "-".to_string(),
    }
}

/// One rendered row.
#[derive(Clone, Debug, PartialEq)]
pub struct PerformanceRow {
    pub url: String,
    pub score: f64,
    pub grade: ScoreGrade,
    pub ttfb: String,
    pub page_load: String,
}

impl PerformanceRow {
    pub fn score_label(&self) -> String {
        format!("{}", self.score)
    }
}

impl From<&PerformanceResult> for PerformanceRow {
    fn from(result: &PerformanceResult) -> Self {
        let score = result.score.unwrap_or(0.0);
        Self {
            url: result.url.clone(),
            score,
            grade: ScoreGrade::from_score(score),
            ttfb: format_ttfb(result.ttfb),
            page_load: format_page_load(result.page_load),
        }
    }
}

/// Rows accumulated across ticks, newest first, one per URL.
#[derive(Clone, Debug, Default)]
pub struct PerformanceBoard {
    rows: Vec<PerformanceRow>,
    seen: HashSet<String>,
}

impl PerformanceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rows not seen before; returns how many were added.
    pub fn merge(&mut self, results: &[PerformanceResult]) -> usize {
        let mut added = 0;
        for result in results {
            if self.seen.insert(result.url.clone()) {
                self.rows.insert(0, PerformanceRow::from(result));
                added += 1;
            }
        }
        added
    }

    pub fn rows(&self) -> &[PerformanceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
