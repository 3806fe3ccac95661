//! CSV export of finished results.
//!
//! One flat record per page. List cells are joined with `; ` so the files
//! open cleanly in spreadsheets.

use std::io::Write;

use serde::Serialize;
use sitetester_core::render::{H1Row, PerformanceRow, PhoneRow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

const LIST_SEPARATOR: &str = "; ";

#[derive(Serialize)]
struct H1Record<'a> {
    url: &'a str,
    h1_count: u32,
    status: &'a str,
    h1_texts: String,
    issues: String,
}

#[derive(Serialize)]
struct PhoneRecord<'a> {
    url: &'a str,
    phone_count: u32,
    status: &'a str,
    phone_numbers: String,
    formats: &'a str,
    issues: String,
}

#[derive(Serialize)]
struct PerformanceRecord<'a> {
    url: &'a str,
    score: f64,
    ttfb: &'a str,
    page_load: &'a str,
}

fn write_records<W, T, I>(writer: W, records: I) -> ExportResult<()>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_h1<W: Write>(writer: W, rows: &[H1Row]) -> ExportResult<()> {
    write_records(
        writer,
        rows.iter().map(|row| H1Record {
            url: &row.url,
            h1_count: row.count,
            status: row.status.label(),
            h1_texts: row.texts.join(LIST_SEPARATOR),
            issues: row.issues.join(LIST_SEPARATOR),
        }),
    )
}

pub fn write_phone<W: Write>(writer: W, rows: &[PhoneRow]) -> ExportResult<()> {
    write_records(
        writer,
        rows.iter().map(|row| PhoneRecord {
            url: &row.url,
            phone_count: row.count,
            status: row.status.label(),
            phone_numbers: row
                .numbers
                .iter()
                .map(|n| match &n.location {
                    Some(location) => format!("{} ({})", n.number, location),
                    None => n.number.clone(),
                })
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            formats: &row.formats,
            issues: row.issues.join(LIST_SEPARATOR),
        }),
    )
}

pub fn write_performance<W: Write>(writer: W, rows: &[PerformanceRow]) -> ExportResult<()> {
    write_records(
        writer,
        rows.iter().map(|row| PerformanceRecord {
            url: &row.url,
            score: row.score,
            ttfb: &row.ttfb,
            page_load: &row.page_load,
        }),
    )
}
