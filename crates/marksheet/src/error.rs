//! Error types for the Marksheet library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Marksheet operations.
#[derive(Debug, Error)]
pub enum MarksheetError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading a spreadsheet workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// The roster or school profile failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A marksheet could not be rendered.
    #[error("Render error: {0}")]
    Render(String),

    /// Error from the PDF library.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Rendered documents could not be combined.
    #[error("Assembly error: {0}")]
    Assembly(String),

    /// Error reading or writing the credential store.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Password hashing failed.
    #[error("Hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarksheetError {
    /// Wrap an IO error with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MarksheetError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reasons a roster or school profile is rejected before rendering begins.
///
/// Row numbers are 1-based and count data rows only (the header is not a row).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required identity column is absent from the header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A column holds data but has no header (1-based position).
    #[error("Column {column} has data but no header")]
    UnnamedColumn { column: usize },

    /// The same column name appears more than once in the header.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// A required identity field is empty.
    #[error("Empty required field '{column}' in row {row}")]
    EmptyField { row: usize, column: String },

    /// Every column is an identity column.
    #[error("No subjects found in the roster")]
    NoSubjects,

    /// The table has a header but no data rows.
    #[error("Roster has no student rows")]
    EmptyRoster,

    /// A subject mark cell is empty.
    #[error("Missing mark for '{column}' in row {row}")]
    MissingMark { row: usize, column: String },

    /// A subject mark is not a non-negative whole number.
    #[error("Invalid mark '{value}' for '{column}' in row {row}")]
    InvalidMark {
        row: usize,
        column: String,
        value: String,
    },

    /// Two rows share a roll identifier.
    #[error("Duplicate roll '{roll}' in rows {first_row} and {row}")]
    DuplicateRoll {
        roll: String,
        first_row: usize,
        row: usize,
    },

    /// A required school profile field is empty.
    #[error("School profile field '{field}' is required")]
    IncompleteProfile { field: &'static str },
}

/// Result type alias for Marksheet operations.
pub type Result<T> = std::result::Result<T, MarksheetError>;
