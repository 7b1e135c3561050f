//! Marksheet: batch report-card generation from student rosters.
//!
//! A roster (CSV, TSV or spreadsheet) lists students with their parents'
//! names and one column of integer marks per subject. Each row becomes a
//! one-student PDF marksheet with letter grades and a total, and every
//! marksheet of the run is merged into a single preview document.
//!
//! # Pipeline
//!
//! - **Input**: parse the roster into a [`DataTable`]
//! - **Validation**: check columns and marks, derive grades ([`RosterValidator`])
//! - **Rendering**: lay out and write each marksheet ([`DocumentRenderer`])
//! - **Assembly**: merge the marksheets in roster order ([`merge`])
//!
//! Account credentials for gating access live in [`CredentialStore`].
//!
//! # Example
//!
//! ```no_run
//! use marksheet::{Generator, SchoolProfile};
//!
//! let profile = SchoolProfile::new("10th", "Springfield High", "R. Sharma", "2024-2025");
//! let result = Generator::new(profile).generate_file("roster.xlsx").unwrap();
//!
//! println!("Students: {}", result.summary.students);
//! println!("Pages: {}", result.summary.pages);
//! result.save("marksheets").unwrap();
//! ```

pub mod assemble;
pub mod auth;
pub mod error;
pub mod grade;
pub mod input;
pub mod profile;
pub mod render;
pub mod roster;

mod generator;

pub use crate::generator::{
    GenerationResult, GenerationSummary, Generator, GeneratorConfig, MERGED_FILE_NAME,
};
pub use assemble::{merge, MergedDocument};
pub use auth::{Credential, CredentialStore, Registration, Verification};
pub use error::{MarksheetError, Result, ValidationError};
pub use grade::{classify, Grade};
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata};
pub use profile::SchoolProfile;
pub use render::{artifact_name, render, DocumentRenderer, RenderOptions, RenderedDocument};
pub use roster::{Roster, RosterColumns, RosterValidator, StudentRecord, SubjectScore};
