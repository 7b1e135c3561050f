//! Student rosters: validated records with derived grades.

mod record;
mod validator;

pub use record::{Roster, StudentRecord, SubjectScore};
pub use validator::{RosterColumns, RosterValidator, parse_mark};
