//! School profile: the run-wide description of the issuing institution.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MarksheetError, Result, ValidationError};

/// Institution details printed on every marksheet.
///
/// Optional members are omitted from the layout when `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolProfile {
    /// Class or grade label, e.g. "10th".
    pub class_name: String,
    pub school_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_address: Option<String>,
    pub principal_name: String,
    /// Academic session label, e.g. "2024-2025".
    pub session_year: String,
    /// Logo image (PNG or JPEG) drawn in the header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<PathBuf>,
}

impl SchoolProfile {
    /// Create a profile from the required fields.
    pub fn new(
        class_name: impl Into<String>,
        school_name: impl Into<String>,
        principal_name: impl Into<String>,
        session_year: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            school_name: school_name.into(),
            school_address: None,
            principal_name: principal_name.into(),
            session_year: session_year.into(),
            logo_path: None,
        }
    }

    /// Set the school address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.school_address = Some(address.into());
        self
    }

    /// Set the logo image path.
    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = Some(path.into());
        self
    }

    /// Load a profile from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MarksheetError::io(path, e))?;
        let profile: SchoolProfile = serde_json::from_reader(BufReader::new(file))?;
        Ok(profile.normalized())
    }

    /// Save the profile as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| MarksheetError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Trim text fields and turn blank optional fields into `None`.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.class_name,
            &mut self.school_name,
            &mut self.principal_name,
            &mut self.session_year,
        ] {
            *field = field.trim().to_string();
        }
        self.school_address = self
            .school_address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        self.logo_path = self.logo_path.filter(|p| !p.as_os_str().is_empty());
        self
    }

    /// Check that every required field is filled in.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let required = [
            ("class_name", &self.class_name),
            ("school_name", &self.school_name),
            ("principal_name", &self.principal_name),
            ("session_year", &self.session_year),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(ValidationError::IncompleteProfile { field: *field }),
            None => Ok(()),
        }
    }
}
