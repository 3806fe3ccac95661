//! Summary statistics and rows for the H1 and phone audits.

use crate::model::{percent, H1Result, PhoneNumber, PhoneResult};

/// H1 texts longer than this are cut and suffixed with `...`.
pub const H1_TEXT_LIMIT: usize = 60;

pub const NO_H1_TEXTS: &str = "No H1 tags found";
pub const NO_ISSUES: &str = "No issues";
pub const NO_PHONE_NUMBERS: &str = "No phone numbers found";

fn average(sum: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let cut: String = text.chars().take(limit).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

// =============================================================================
// H1 Audit
// =============================================================================

/// Aggregate figures of an H1 session.
#[derive(Clone, Debug, PartialEq)]
pub struct H1Summary {
    pub total: usize,
    pub with_h1: usize,
    pub without_h1: usize,
    pub multiple_h1: usize,
    pub average: f64,
}

impl H1Summary {
    pub fn from_results(results: &[H1Result]) -> Self {
        let with_h1 = results.iter().filter(|r| r.h1_count > 0).count();
        Self {
            total: results.len(),
            with_h1,
            without_h1: results.len() - with_h1,
            multiple_h1: results.iter().filter(|r| r.h1_count > 1).count(),
            average: average(
                results.iter().map(|r| u64::from(r.h1_count)).sum(),
                results.len(),
            ),
        }
    }

    pub fn with_h1_percent(&self) -> u8 {
        percent(self.with_h1 as u64, self.total as u64)
    }

    pub fn without_h1_percent(&self) -> u8 {
        percent(self.without_h1 as u64, self.total as u64)
    }

    pub fn multiple_h1_percent(&self) -> u8 {
        percent(self.multiple_h1 as u64, self.total as u64)
    }

    /// Average H1 count with one decimal.
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average)
    }
}

/// Status badge of an H1 row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum H1Status {
    NoH1,
    Good,
    Multiple,
}

impl H1Status {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => H1Status::NoH1,
            1 => H1Status::Good,
            _ => H1Status::Multiple,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            H1Status::NoH1 => "No H1",
            H1Status::Good => "Good",
            H1Status::Multiple => "Multiple H1",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            H1Status::NoH1 => "status-bad",
            H1Status::Good => "status-good",
            H1Status::Multiple => "status-warn",
        }
    }
}

/// One table row of an H1 session.
#[derive(Clone, Debug, PartialEq)]
pub struct H1Row {
    pub url: String,
    pub count: u32,
    pub status: H1Status,
    /// Truncated H1 texts.
    pub texts: Vec<String>,
    pub issues: Vec<String>,
}

impl From<&H1Result> for H1Row {
    fn from(result: &H1Result) -> Self {
        Self {
            url: result.url.clone(),
            count: result.h1_count,
            status: H1Status::from_count(result.h1_count),
            texts: result
                .h1_texts
                .iter()
                .map(|text| truncate(text, H1_TEXT_LIMIT))
                .collect(),
            issues: result.issues.clone(),
        }
    }
}

// =============================================================================
// Phone Audit
// =============================================================================

/// Aggregate figures of a phone session.
#[derive(Clone, Debug, PartialEq)]
pub struct PhoneSummary {
    pub total: usize,
    pub with_phones: usize,
    pub without_phones: usize,
    pub total_numbers: u64,
    pub average_numbers: f64,
    pub total_issues: usize,
    pub issues_per_page: f64,
}

impl PhoneSummary {
    pub fn from_results(results: &[PhoneResult]) -> Self {
        let with_phones = results.iter().filter(|r| r.phone_count > 0).count();
        let total_numbers = results.iter().map(|r| u64::from(r.phone_count)).sum();
        let total_issues: usize = results.iter().map(|r| r.issues.len()).sum();
        Self {
            total: results.len(),
            with_phones,
            without_phones: results.len() - with_phones,
            total_numbers,
            average_numbers: average(total_numbers, results.len()),
            total_issues,
            issues_per_page: average(total_issues as u64, results.len()),
        }
    }

    pub fn with_phones_percent(&self) -> u8 {
        percent(self.with_phones as u64, self.total as u64)
    }

    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average_numbers)
    }

    pub fn issues_per_page_label(&self) -> String {
        format!("{:.1}", self.issues_per_page)
    }
}

/// Status badge of a phone row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhoneStatus {
    NoPhones,
    Good,
    IssuesFound,
}

impl PhoneStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PhoneStatus::NoPhones => "No Phones",
            PhoneStatus::Good => "Good",
            PhoneStatus::IssuesFound => "Issues Found",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            PhoneStatus::NoPhones => "status-bad",
            PhoneStatus::Good => "status-good",
            PhoneStatus::IssuesFound => "status-warn",
        }
    }
}

/// One table row of a phone session.
#[derive(Clone, Debug, PartialEq)]
pub struct PhoneRow {
    pub url: String,
    pub count: u32,
    pub status: PhoneStatus,
    pub numbers: Vec<PhoneNumber>,
    /// Detected formats joined with `, `; empty when none.
    pub formats: String,
    pub issues: Vec<String>,
}

impl From<&PhoneResult> for PhoneRow {
    fn from(result: &PhoneResult) -> Self {
        let status = if result.phone_count == 0 {
            PhoneStatus::NoPhones
        } else if result.issues.is_empty() {
            PhoneStatus::Good
        } else {
            PhoneStatus::IssuesFound
        };

        Self {
            url: result.url.clone(),
            count: result.phone_count,
            status,
            numbers: result.phone_numbers.clone(),
            formats: result.formats_detected.join(", "),
            issues: result.issues.clone(),
        }
    }
}
