//! Account credentials for gating access to marksheet generation.

mod store;

pub use store::{Credential, CredentialStore, Registration, Verification};
