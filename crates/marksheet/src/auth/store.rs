//! Append-only credential file with bcrypt password hashes.
//!
//! The file is a two-column CSV:
//!
//! ```text
//! username,password
//! principal,$2b$12$...
//! ```
//!
//! Plaintext passwords are never written or logged.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MarksheetError, Result};

/// Well-formed bcrypt hash (cost 12) that no password is expected to match.
///
/// Checked against when a username is unknown. Only its cost field is
/// rewritten per store, so verify never has to hash anything up front.
const ABSENT_USER_HASH: &str =
    "$2b$12$N.8L69kV7xR6uQ3lhdCSQerqoqCL60nP3Q7MUoRhFxhBilzihG0hm";

/// A stored username and salted password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    /// bcrypt hash; the salt and cost are embedded in it.
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    /// The username already exists; nothing was written.
    UsernameTaken,
    /// The password and its confirmation differ; nothing was written.
    PasswordMismatch,
}

/// Outcome of a login attempt.
///
/// An unknown username and a wrong password are deliberately the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Authenticated,
    InvalidCredentials,
}

/// Credential store backed by a CSV file.
///
/// Registrations from one process are serialized by an internal lock; the
/// file itself assumes a single writing process.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    cost: u32,
    write_lock: Mutex<()>,
    /// [`ABSENT_USER_HASH`] at this store's cost.
    absent_user_hash: String,
}

impl CredentialStore {
    /// Open a store at `path` with the default bcrypt cost.
    ///
    /// The file is created on first registration.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_cost(path, bcrypt::DEFAULT_COST)
    }

    /// Open a store with a custom bcrypt cost (4..=31).
    pub fn with_cost(path: impl Into<PathBuf>, cost: u32) -> Self {
        Self {
            path: path.into(),
            cost,
            write_lock: Mutex::new(()),
            absent_user_hash: absent_user_hash(cost),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every credential. A missing file is an empty store.
    ///
    /// If a username appears more than once, the first row wins.
    pub fn load(&self) -> Result<IndexMap<String, Credential>> {
        let mut credentials = IndexMap::new();
        if !self.path.exists() {
            return Ok(credentials);
        }

        let file = File::open(&self.path).map_err(|e| MarksheetError::io(&self.path, e))?;
        let mut reader = csv::Reader::from_reader(file);
        for row in reader.deserialize() {
            let credential: Credential = row.map_err(|e| {
                MarksheetError::Persistence(format!(
                    "Failed to read credential store '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;
            credentials
                .entry(credential.username.clone())
                .or_insert(credential);
        }
        Ok(credentials)
    }

    /// Whether a username is registered.
    pub fn contains(&self, username: &str) -> Result<bool> {
        Ok(self.load()?.contains_key(username))
    }

    /// Register a new account.
    ///
    /// Usernames are compared exactly (case-sensitive). A fresh salt is
    /// generated for every call.
    pub fn register(&self, username: &str, password: &str) -> Result<Registration> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| MarksheetError::Persistence("credential store lock poisoned".to_string()))?;

        if self.load()?.contains_key(username) {
            info!(username, "registration rejected: username taken");
            return Ok(Registration::UsernameTaken);
        }

        let credential = Credential {
            username: username.to_string(),
            password_hash: bcrypt::hash(password, self.cost)?,
        };
        self.append(&credential)?;

        info!(username, "account registered");
        Ok(Registration::Created)
    }

    /// Register after checking the password was typed the same twice.
    pub fn register_confirmed(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Registration> {
        if password != confirmation {
            debug!(username, "registration rejected: passwords differ");
            return Ok(Registration::PasswordMismatch);
        }
        self.register(username, password)
    }

    /// Check a login attempt.
    pub fn verify(&self, username: &str, password: &str) -> Result<Verification> {
        let credentials = self.load()?;

        let matched = match credentials.get(username) {
            Some(credential) => bcrypt::verify(password, &credential.password_hash).unwrap_or(false),
            None => {
                // Spend the same work as a real check so timing does not
                // reveal whether the account exists.
                let _ = bcrypt::verify(password, &self.absent_user_hash);
                false
            }
        };

        debug!(username, authenticated = matched, "login attempt");
        Ok(if matched {
            Verification::Authenticated
        } else {
            Verification::InvalidCredentials
        })
    }

    /// Append one row, writing the header if the file is new or empty.
    fn append(&self, credential: &Credential) -> Result<()> {
        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| MarksheetError::io(parent, e))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MarksheetError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(credential)?;
        writer.flush().map_err(|e| MarksheetError::io(&self.path, e))?;
        Ok(())
    }
}

/// [`ABSENT_USER_HASH`] with its cost field set to `cost`.
///
/// bcrypt reads the work factor from the hash string, so verifying against
/// the result costs the same as verifying a real hash made at `cost`.
fn absent_user_hash(cost: u32) -> String {
    format!("$2b${:02}${}", cost, &ABSENT_USER_HASH[7..])
}
