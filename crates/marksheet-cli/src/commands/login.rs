//! Login command - check credentials.

use std::path::PathBuf;

use colored::Colorize;
use marksheet::{CredentialStore, Verification};

pub fn run(
    store: PathBuf,
    username: String,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    match CredentialStore::open(store).verify(&username, &password)? {
        Verification::Authenticated => {
            println!("{} Logged in as {}", "✓".green(), username.white().bold());
            Ok(())
        }
        Verification::InvalidCredentials => Err("Invalid username or password".into()),
    }
}
