//! Roster parser for delimited text and spreadsheet workbooks.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{DataTable, SourceMetadata};
use crate::error::{MarksheetError, Result, ValidationError};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Extensions read as workbooks rather than delimited text.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use for text files (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character for text files.
    pub quote: u8,
    /// Worksheet to read from workbooks (None = first sheet).
    pub sheet: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            sheet: None,
        }
    }
}

/// Reads roster files into a [`DataTable`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    ///
    /// Workbooks are recognised by extension; everything else is treated as
    /// delimited text.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let contents = fs::read(path).map_err(|e| MarksheetError::io(path, e))?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let (table, format) = if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            (self.parse_workbook(path)?, extension)
        } else {
            let delimiter = match self.config.delimiter {
                Some(d) => d,
                None => detect_delimiter(&contents)?,
            };
            let format = match delimiter {
                b'\t' => "tsv",
                b',' => "csv",
                b';' => "csv-semicolon",
                b'|' => "psv",
                _ => "delimited",
            };
            (self.parse_bytes(&contents, delimiter)?, format.to_string())
        };

        debug!(
            file = %path.display(),
            format = %format,
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed roster file"
        );

        let source_metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, source_metadata))
    }

    /// Parse delimited text.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        build_table(headers, rows)
    }

    /// Parse the configured worksheet of a workbook.
    fn parse_workbook(&self, path: &Path) -> Result<DataTable> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            MarksheetError::Spreadsheet(format!(
                "Failed to open workbook '{}': {}",
                path.display(),
                e
            ))
        })?;

        let range = match &self.config.sheet {
            Some(name) => workbook.worksheet_range(name).map_err(|e| {
                MarksheetError::Spreadsheet(format!("Failed to read sheet '{}': {}", name, e))
            })?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| MarksheetError::Spreadsheet("No worksheet found".to_string()))?
                .map_err(|e| {
                    MarksheetError::Spreadsheet(format!("Failed to read worksheet: {}", e))
                })?,
        };

        let mut cells = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());

        let headers: Vec<String> = match cells.next() {
            Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
            None => return Err(MarksheetError::EmptyData("Worksheet is empty".to_string())),
        };

        build_table(headers, cells.collect())
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop blank rows and empty unnamed columns, then build the table.
///
/// A column with no header but with data in it is an error. Spreadsheets
/// often carry empty formatted columns past the last header, and those are
/// dropped.
fn build_table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<DataTable> {
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(headers.len());
    let mut named = Vec::with_capacity(headers.len());
    for index in 0..width {
        if headers.get(index).is_some_and(|h| !h.is_empty()) {
            named.push(index);
        } else if rows
            .iter()
            .any(|row| row.get(index).is_some_and(|cell| !cell.trim().is_empty()))
        {
            return Err(ValidationError::UnnamedColumn { column: index + 1 }.into());
        }
    }

    if named.is_empty() {
        return Err(MarksheetError::EmptyData("No columns found".to_string()));
    }

    if named.len() == headers.len() {
        return Ok(DataTable::new(headers, rows));
    }

    let pick = |row: &[String]| -> Vec<String> {
        named
            .iter()
            .map(|&i| row.get(i).cloned().unwrap_or_default())
            .collect()
    };
    Ok(DataTable::new(
        pick(&headers),
        rows.iter().map(|row| pick(row)).collect(),
    ))
}

/// Render a workbook cell the way it reads in the sheet.
///
/// Whole-number floats print without a fractional part, so a mark stored
/// as `95.0` reads back as `95`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(MarksheetError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines beat a higher but ragged count.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let data = b"name;city\n\"Rao, A\";Pune\n\"Das, B\";Agra";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_parse_csv_keeps_column_order() {
        let parser = Parser::new();
        let data = b"Roll No.,Name of the student,Maths,English\n1,Asha,95,60\n2,Ravi,45,39";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(
            table.headers,
            vec!["Roll No.", "Name of the student", "Maths", "English"]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 1), Some("Asha"));
        assert_eq!(table.get(1, 3), Some("39"));
    }

    #[test]
    fn test_parse_skips_blank_rows_and_pads_short_ones() {
        let parser = Parser::new();
        let data = b"a,b,c\n1,2\n,,\n4,5,6\n";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 2), Some(""));
        assert_eq!(table.get(1, 0), Some("4"));
    }

    #[test]
    fn test_empty_unnamed_columns_are_dropped() {
        let parser = Parser::new();
        let data = b"Roll No.,,Maths,,\n1,,95,,\n2,,45,,\n";
        let table = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(table.headers, vec!["Roll No.", "Maths"]);
        assert_eq!(table.get(0, 1), Some("95"));
        assert_eq!(table.get(1, 1), Some("45"));
    }

    #[test]
    fn test_unnamed_column_with_data_is_rejected() {
        let parser = Parser::new();

        // Between named columns.
        let data = b"Roll No.,,Maths\n1,x,95\n";
        let err = parser.parse_bytes(data, b',').unwrap_err();
        assert!(matches!(
            err,
            MarksheetError::Validation(ValidationError::UnnamedColumn { column: 2 })
        ));

        // Past the last header.
        let data = b"Roll No.,Maths,\n1,95,\n2,45,88\n";
        let err = parser.parse_bytes(data, b',').unwrap_err();
        assert!(matches!(
            err,
            MarksheetError::Validation(ValidationError::UnnamedColumn { column: 3 })
        ));

        // Wider than the header row.
        let data = b"Roll No.,Maths\n1,95,88\n";
        let err = parser.parse_bytes(data, b',').unwrap_err();
        assert!(matches!(
            err,
            MarksheetError::Validation(ValidationError::UnnamedColumn { column: 3 })
        ));
    }

    #[test]
    fn test_cell_text_whole_floats() {
        assert_eq!(cell_text(&Data::Float(95.0)), "95");
        assert_eq!(cell_text(&Data::Float(95.5)), "95.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_is_null_value() {
        assert!(DataTable::is_null_value(""));
        assert!(DataTable::is_null_value("  "));
        assert!(DataTable::is_null_value("NA"));
        assert!(DataTable::is_null_value("N/A"));
        assert!(DataTable::is_null_value("NaN"));
        assert!(DataTable::is_null_value("null"));
        assert!(DataTable::is_null_value("-"));
        assert!(!DataTable::is_null_value("0"));
        assert!(!DataTable::is_null_value("Asha"));
    }
}
