//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Marksheet: generate student report cards from a roster
#[derive(Parser)]
#[command(name = "marksheet")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one marksheet per student plus a merged preview
    Generate {
        /// Path to the roster (CSV/TSV/XLSX/XLS/ODS)
        #[arg(value_name = "ROSTER")]
        roster: PathBuf,

        /// School profile JSON file
        #[arg(short, long)]
        profile: Option<PathBuf>,

        #[command(flatten)]
        overrides: ProfileOverrides,

        /// Output directory
        #[arg(short, long, default_value = "marksheets")]
        output: PathBuf,

        /// File name of the merged PDF inside the output directory
        #[arg(long, default_value = marksheet::MERGED_FILE_NAME)]
        merged_name: String,

        /// Only write the merged PDF
        #[arg(long)]
        no_individual: bool,

        /// Render marksheets on multiple threads
        #[arg(long)]
        parallel: bool,
    },

    /// Check a roster and print derived grades without rendering
    Validate {
        /// Path to the roster
        #[arg(value_name = "ROSTER")]
        roster: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account in a credential store
    Register {
        /// Credential store CSV file
        #[arg(long, default_value = "users.csv")]
        store: PathBuf,

        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// Password again; registration fails if it differs
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Check a username and password against a credential store
    Login {
        /// Credential store CSV file
        #[arg(long, default_value = "users.csv")]
        store: PathBuf,

        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
}

/// School details given on the command line; each one replaces the
/// matching profile field.
#[derive(Args, Debug, Default)]
pub struct ProfileOverrides {
    /// Class name, e.g. "10th"
    #[arg(long = "class")]
    pub class_name: Option<String>,

    /// School name
    #[arg(long = "school")]
    pub school_name: Option<String>,

    /// School address
    #[arg(long = "address")]
    pub school_address: Option<String>,

    /// Principal's name
    #[arg(long = "principal")]
    pub principal_name: Option<String>,

    /// Academic session, e.g. "2024-2025"
    #[arg(long = "session")]
    pub session_year: Option<String>,

    /// School logo image
    #[arg(long = "logo")]
    pub logo_path: Option<PathBuf>,
}
