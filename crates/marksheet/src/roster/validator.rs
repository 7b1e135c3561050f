//! Roster validation: identity columns, subject discovery, mark coercion.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::record::{Roster, StudentRecord, SubjectScore};
use crate::error::ValidationError;
use crate::grade::classify;
use crate::input::DataTable;

/// Names of the identity columns a roster must carry.
///
/// Every other column is a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterColumns {
    pub roll: String,
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            roll: "Roll No.".to_string(),
            name: "Name of the student".to_string(),
            father_name: "Father's Name".to_string(),
            mother_name: "Mother's Name".to_string(),
        }
    }
}

impl RosterColumns {
    /// Identity column names in their canonical order.
    pub fn identity(&self) -> [&str; 4] {
        [
            self.roll.as_str(),
            self.name.as_str(),
            self.father_name.as_str(),
            self.mother_name.as_str(),
        ]
    }

    /// Whether a header names an identity column.
    pub fn is_identity(&self, header: &str) -> bool {
        self.identity().contains(&header.trim())
    }
}

/// Turns a parsed table into a graded [`Roster`], or explains why it can't.
#[derive(Debug, Clone, Default)]
pub struct RosterValidator {
    columns: RosterColumns,
}

impl RosterValidator {
    /// Validator for the standard column names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator for custom identity column names.
    pub fn with_columns(columns: RosterColumns) -> Self {
        Self { columns }
    }

    /// The identity columns this validator requires.
    pub fn columns(&self) -> &RosterColumns {
        &self.columns
    }

    /// Subject columns: every header not in the identity set, in header order.
    pub fn subject_columns(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|h| h.trim())
            .filter(|h| !self.columns.is_identity(h))
            .map(str::to_string)
            .collect()
    }

    /// Validate a table and derive grades for every subject.
    ///
    /// Fails on the first problem found; nothing is defaulted or skipped.
    pub fn validate(&self, table: &DataTable) -> Result<Roster, ValidationError> {
        let result = self.validate_inner(table);
        match &result {
            Ok(roster) => debug!(
                students = roster.len(),
                subjects = roster.subjects.len(),
                "roster validated"
            ),
            Err(e) => warn!(error = %e, "roster rejected"),
        }
        result
    }

    fn validate_inner(&self, table: &DataTable) -> Result<Roster, ValidationError> {
        let mut seen = HashSet::new();
        for header in &table.headers {
            let header = header.trim();
            if !seen.insert(header) {
                return Err(ValidationError::DuplicateColumn(header.to_string()));
            }
        }

        let identity = self.columns.identity();
        let mut identity_idx = [0usize; 4];
        for (slot, column) in identity_idx.iter_mut().zip(identity) {
            *slot = table
                .column_index(column)
                .ok_or_else(|| ValidationError::MissingColumn(column.to_string()))?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (&col_idx, column) in identity_idx.iter().zip(identity) {
                if DataTable::is_null_value(&row[col_idx]) {
                    return Err(ValidationError::EmptyField {
                        row: row_idx + 1,
                        column: column.to_string(),
                    });
                }
            }
        }

        let subjects = self.subject_columns(&table.headers);
        if subjects.is_empty() {
            return Err(ValidationError::NoSubjects);
        }
        if table.rows.is_empty() {
            return Err(ValidationError::EmptyRoster);
        }

        let subject_idx: Vec<(usize, &str)> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !self.columns.is_identity(h))
            .map(|(i, h)| (i, h.trim()))
            .collect();

        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut records = Vec::with_capacity(table.row_count());

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_number = row_idx + 1;
            let [roll, name, father, mother] = identity_idx.map(|i| row[i].trim().to_string());

            if let Some(&first_row) = first_seen.get(&roll) {
                return Err(ValidationError::DuplicateRoll {
                    roll,
                    first_row,
                    row: row_number,
                });
            }
            first_seen.insert(roll.clone(), row_number);

            let mut scores = IndexMap::with_capacity(subject_idx.len());
            for &(col_idx, subject) in &subject_idx {
                let cell = row[col_idx].as_str();
                if DataTable::is_null_value(cell) {
                    return Err(ValidationError::MissingMark {
                        row: row_number,
                        column: subject.to_string(),
                    });
                }
                let mark = parse_mark(cell).ok_or_else(|| ValidationError::InvalidMark {
                    row: row_number,
                    column: subject.to_string(),
                    value: cell.trim().to_string(),
                })?;
                scores.insert(
                    subject.to_string(),
                    SubjectScore {
                        mark,
                        grade: classify(i64::from(mark)),
                    },
                );
            }

            records.push(StudentRecord {
                roll,
                name,
                father_name: father,
                mother_name: mother,
                subjects: scores,
            });
        }

        Ok(Roster { subjects, records })
    }
}

/// Coerce a mark cell to a whole, non-negative number.
///
/// Accepts integer text and floats without a fractional part (`"95.0"`),
/// which is how spreadsheets hand back whole numbers.
pub fn parse_mark(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(mark) = value.parse::<u32>() {
        return Some(mark);
    }

    let float = value.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 && float >= 0.0 && float <= f64::from(u32::MAX) {
        Some(float as u32)
    } else {
        None
    }
}
