//! Row extraction from statement text.
//!
//! A single pattern is applied across the whole text and every
//! non-overlapping match becomes one row. Lines that do not match are
//! dropped without a diagnostic.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Number of fields in a statement row.
pub const COLUMN_COUNT: usize = 5;

/// Date, type code, lazy description, optional amount, optional debit amount.
///
/// Digits are ASCII only, and the description stops at any line terminator
/// (`\n`, `\r`, U+2028, U+2029).
static STATEMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"([0-9]{2}-[A-Za-z]{3}-[0-9]{4})\s+([TC])\s+",
        r"([^\n\r\x{2028}\x{2029}]+?)\s+",
        r"([0-9,]+\.[0-9]{2})?\s+([0-9,]+\.[0-9]{2}Dr)?",
    ))
    .unwrap()
});

/// One matched transaction line.
///
/// Fields are kept as the raw captured strings. A field the match did not
/// capture is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "[Option<String>; COLUMN_COUNT]")]
pub struct StatementRow {
    /// `DD-MMM-YYYY`
    pub date: Option<String>,
    /// `T` or `C`
    pub kind: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
    /// Amount with a literal `Dr` suffix.
    pub dr_amount: Option<String>,
}

impl StatementRow {
    /// Fields in column order.
    pub fn cells(&self) -> [Option<&str>; COLUMN_COUNT] {
        [
            self.date.as_deref(),
            self.kind.as_deref(),
            self.description.as_deref(),
            self.amount.as_deref(),
            self.dr_amount.as_deref(),
        ]
    }
}

impl From<StatementRow> for [Option<String>; COLUMN_COUNT] {
    fn from(row: StatementRow) -> Self {
        [
            row.date,
            row.kind,
            row.description,
            row.amount,
            row.dr_amount,
        ]
    }
}

/// Extract every statement row from `text`, in document order.
pub fn extract_rows(text: &str) -> Vec<StatementRow> {
    let rows: Vec<StatementRow> = STATEMENT_LINE
        .captures_iter(text)
        .map(|caps| {
            let field = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
            StatementRow {
                date: field(1),
                kind: field(2),
                description: field(3),
                amount: field(4),
                dr_amount: field(5),
            }
        })
        .collect();

    tracing::debug!("Statement pattern matched {} rows", rows.len());
    rows
}
