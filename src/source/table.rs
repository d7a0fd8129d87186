//! Table Module
//!
//! Parsed form of a sheet export: a header row plus data rows addressed by
//! column name.

use csv::ReaderBuilder;
use tracing::warn;

use crate::error::{LedgerError, Result};

// == Row ==
/// A data row in sheet order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line in the export (the header is line 1)
    pub line: u64,
    /// Cell values, one per header column
    pub cells: Vec<String>,
}

// == Table ==
/// A rectangular dataset from one sheet.
///
/// Every row has exactly `headers.len()` cells; rows that did not were dropped
/// while parsing and are only reflected in [`Table::malformed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
    malformed: usize,
}

impl Table {
    /// Builds a table from already-split headers and rows, applying the same
    /// column-count rule as [`parse_delimited`].
    pub fn from_rows<H, R>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = Vec<String>>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let mut table = Table {
            headers,
            rows: Vec::new(),
            malformed: 0,
        };
        for (index, cells) in rows.into_iter().enumerate() {
            table.push(index as u64 + 2, cells);
        }
        table
    }

    fn push(&mut self, line: u64, cells: Vec<String>) {
        if cells.len() != self.headers.len() {
            let err = LedgerError::MalformedRow {
                line,
                expected: self.headers.len(),
                found: cells.len(),
            };
            warn!("Skipping row: {}", err);
            self.malformed += 1;
            return;
        }
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            return;
        }
        self.rows.push(Row { line, cells });
    }

    /// Column names from the header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Position of a column, compared case-insensitively after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|header| header.trim().to_lowercase() == wanted)
    }

    /// Like [`Table::column_index`] but reports a missing column as an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| LedgerError::MissingColumn(name.to_string()))
    }

    /// Data rows in sheet order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Value of `column` in `row`, if the column exists.
    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Option<&'a str> {
        self.column_index(column)
            .and_then(|index| row.cells.get(index))
            .map(String::as_str)
    }

    /// Number of rows dropped for having the wrong column count.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// == Parse Delimited ==
/// Parses a comma-delimited export whose first record is the header.
///
/// A leading UTF-8 BOM is ignored and the trailing newline is optional.
/// Rows with the wrong number of cells are logged and skipped; fully blank
/// rows are ignored. An export without a header row is a `Fetch` error.
pub fn parse_delimited(table_id: &str, text: &str) -> Result<Table> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LedgerError::fetch(table_id, format!("unreadable header: {}", e)))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    if headers.iter().all(|header| header.is_empty()) {
        return Err(LedgerError::fetch(table_id, "export has no header row"));
    }

    let mut table = Table {
        headers,
        rows: Vec::new(),
        malformed: 0,
    };

    for (index, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| LedgerError::fetch(table_id, format!("unreadable row: {}", e)))?;
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(index as u64 + 2);
        table.push(line, record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNTS: &str = "Имя,Username,Баланс\nAlice,alice123,120\nBob,@Bob_T,75.50\n";

    #[test]
    fn test_parse_headers_and_rows() {
        let table = parse_delimited("0", ACCOUNTS).unwrap();

        assert_eq!(table.headers(), &["Имя", "Username", "Баланс"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(&table.rows()[0], "Username"), Some("alice123"));
        assert_eq!(table.value(&table.rows()[1], "баланс"), Some("75.50"));
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let table = parse_delimited("0", "Name,Username\nAlice,alice123").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].cells, vec!["Alice", "alice123"]);
    }

    #[test]
    fn test_parse_strips_bom() {
        let table = parse_delimited("0", "\u{feff}Username,Balance\nalice,1\n").unwrap();
        assert_eq!(table.column_index("Username"), Some(0));
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let text = "Name,Username,Balance\nAlice,alice123,120\nBroken,row\nCarol,carol,5,extra\nDan,dan,1\n";
        let table = parse_delimited("0", text).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.malformed(), 2);
        let names: Vec<_> = table
            .rows()
            .iter()
            .map(|row| table.value(row, "Name").unwrap())
            .collect();
        assert_eq!(names, vec!["Alice", "Dan"]);
    }

    #[test]
    fn test_blank_rows_are_ignored() {
        let table = parse_delimited("0", "Name,Username\n,\nAlice,alice\n , \n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.malformed(), 0);
    }

    #[test]
    fn test_row_lines_follow_export() {
        let table = parse_delimited("0", "Name,Username\nAlice,alice\nBob,bob\n").unwrap();
        assert_eq!(table.rows()[0].line, 2);
        assert_eq!(table.rows()[1].line, 3);
    }

    #[test]
    fn test_quoted_cells() {
        let table = parse_delimited("0", "Item,Price\n\"Tea, green\",\"1 200,50\"\n").unwrap();
        assert_eq!(table.value(&table.rows()[0], "Item"), Some("Tea, green"));
        assert_eq!(table.value(&table.rows()[0], "Price"), Some("1 200,50"));
    }

    #[test]
    fn test_empty_export_is_fetch_error() {
        let result = parse_delimited("42", "");
        assert!(matches!(result, Err(LedgerError::Fetch { ref table_id, .. }) if table_id == "42"));
    }

    #[test]
    fn test_missing_column() {
        let table = parse_delimited("0", "Name\nAlice\n").unwrap();
        assert!(matches!(
            table.require_column("Username"),
            Err(LedgerError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_from_rows_applies_column_rule() {
        let table = Table::from_rows(
            ["Name", "Username"],
            vec![
                vec!["Alice".to_string(), "alice".to_string()],
                vec!["Solo".to_string()],
            ],
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.malformed(), 1);
    }
}
