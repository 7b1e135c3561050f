//! Register command - add an account to a credential store.

use std::path::PathBuf;

use colored::Colorize;
use marksheet::{CredentialStore, Registration};

pub fn run(
    store: PathBuf,
    username: String,
    password: String,
    confirm: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = CredentialStore::open(store);
    let outcome = match confirm {
        Some(confirmation) => store.register_confirmed(&username, &password, &confirmation)?,
        None => store.register(&username, &password)?,
    };

    match outcome {
        Registration::Created => {
            println!(
                "{} Registered {} in {}",
                "✓".green(),
                username.white().bold(),
                store.path().display()
            );
            Ok(())
        }
        Registration::UsernameTaken => Err(format!("Username '{}' already exists", username).into()),
        Registration::PasswordMismatch => Err("Passwords do not match".into()),
    }
}
