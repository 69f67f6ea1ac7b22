//! CSV bulk import of indicator definitions.
//!
//! Every data row is handled on its own: a row that cannot be parsed or that the
//! service rejects is logged and reported back, and the remaining rows still run.

mod bsc;
mod mpm;

use std::io::Read;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::scorecards::common::ScorecardError;

pub(crate) use bsc::{BscIndicatorRow, BSC_COLUMNS};
pub(crate) use mpm::{MpmIndicatorRow, MPM_COLUMNS};

/// Row skipped during an import, with its 1-based line in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport<T> {
    pub created: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

impl<T> Default for ImportReport<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> ImportReport<T> {
    fn skip(&mut self, line: u64, reason: String) {
        warn!(line, %reason, "skipping import row");
        self.skipped.push(SkippedRow { line, reason });
    }
}

/// Raw view of one data row, for columns a row type does not name.
#[derive(Clone, Copy)]
pub(crate) struct Cells<'a> {
    headers: &'a csv::StringRecord,
    record: &'a csv::StringRecord,
}

impl<'a> Cells<'a> {
    /// Non-empty cells whose header starts with `prefix`, keyed by the rest of the header.
    pub(crate) fn with_prefix(self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .zip(self.record.iter())
            .filter(|(_, value)| !value.is_empty())
            .filter_map(move |(header, value)| {
                header.strip_prefix(prefix).map(|suffix| (suffix, value))
            })
    }
}

/// Errors that abort an import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read import source: {0}")]
    Io(#[source] csv::Error),
    #[error("import header is unreadable: {0}")]
    Header(#[source] csv::Error),
    #[error("import header is missing column '{0}'")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Scorecard(#[from] ScorecardError),
}

/// Read `source` row by row, handing every parsed row to `accept`.
pub(crate) fn import_rows<R, Row, T, F>(
    source: R,
    required: &[&'static str],
    mut accept: F,
) -> Result<ImportReport<T>, ImportError>
where
    R: Read,
    Row: DeserializeOwned,
    F: FnMut(Row, Cells<'_>) -> Result<T, ScorecardError>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let headers = reader.headers().map_err(ImportError::Header)?.clone();

    if let Some(missing) = required
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(ImportError::MissingColumn(*missing));
    }

    let mut report = ImportReport::default();
    for (index, result) in reader.records().enumerate() {
        // Header sits on line 1.
        let fallback_line = index as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(error) if error.is_io_error() => return Err(ImportError::Io(error)),
            Err(error) => {
                let line = error
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line);
                report.skip(line, error.to_string());
                continue;
            }
        };

        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(fallback_line);
        let cells = Cells {
            headers: &headers,
            record: &record,
        };
        let outcome = record
            .deserialize::<Row>(Some(&headers))
            .map_err(|error| ScorecardError::Validation(error.to_string()))
            .and_then(|row| accept(row, cells));

        match outcome {
            Ok(created) => report.created.push(created),
            Err(error) => report.skip(line, error.to_string()),
        }
    }

    Ok(report)
}

pub(crate) fn parse_decimal(field: &str, value: &str) -> Result<Decimal, ScorecardError> {
    value
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse()
        .map_err(|_| ScorecardError::Validation(format!("{field} '{value}' is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        name: String,
        amount: String,
    }

    fn accept(row: Row, _: Cells<'_>) -> Result<(String, Decimal), ScorecardError> {
        let amount = parse_decimal("amount", &row.amount)?;
        Ok((row.name, amount))
    }

    #[test]
    fn malformed_rows_are_skipped_and_the_rest_continue() {
        let source = "name,amount\nalpha,10\nbeta,ten\ngamma,12.5%\n";
        let report = import_rows(source.as_bytes(), &["name", "amount"], accept)
            .expect("import runs");

        let names: Vec<_> = report.created.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "gamma"]);
        assert_eq!(report.created[1].1, Decimal::new(125, 1));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 3);
        assert!(report.skipped[0].reason.contains("ten"));
    }

    #[test]
    fn short_rows_are_reported_with_their_line() {
        let source = "name,amount\nalpha\nbeta,2\n";
        let report =
            import_rows(source.as_bytes(), &["name", "amount"], accept).expect("import runs");
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
    }

    #[test]
    fn prefixed_columns_are_exposed_to_the_row_handler() {
        let source = "name,amount,Target_Jan-25,Target_Feb-25\nalpha,1,10,\n";
        let report = import_rows(
            source.as_bytes(),
            &["name"],
            |row: Row, cells: Cells<'_>| {
                let months: Vec<String> = cells
                    .with_prefix("Target_")
                    .map(|(month, value)| format!("{month}={value}"))
                    .collect();
                Ok((row.name, months))
            },
        )
        .expect("import runs");
        assert_eq!(report.created[0].1, vec!["Jan-25=10".to_string()]);
    }

    #[test]
    fn missing_required_column_aborts() {
        let source = "name,total\nalpha,10\n";
        match import_rows(source.as_bytes(), &["name", "amount"], accept) {
            Err(ImportError::MissingColumn(column)) => assert_eq!(column, "amount"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }
}
