//! CLI command implementations.

pub mod generate;
pub mod login;
pub mod register;
pub mod validate;
