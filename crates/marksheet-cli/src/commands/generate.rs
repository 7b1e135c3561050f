//! Generate command - render marksheets and the merged preview.

use std::path::PathBuf;

use colored::Colorize;
use marksheet::{Generator, GeneratorConfig, SchoolProfile};

use crate::cli::ProfileOverrides;

#[allow(clippy::too_many_arguments)]
pub fn run(
    roster: PathBuf,
    profile_path: Option<PathBuf>,
    overrides: ProfileOverrides,
    output: PathBuf,
    merged_name: String,
    no_individual: bool,
    parallel: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = build_profile(profile_path.as_ref(), overrides)?;

    println!(
        "{} {}",
        "Generating marksheets from".cyan().bold(),
        roster.display().to_string().white()
    );
    if verbose {
        println!("  School:  {}", profile.school_name);
        println!("  Class:   {}", profile.class_name);
        println!("  Session: {}", profile.session_year);
    }

    let config = GeneratorConfig {
        parallel,
        ..Default::default()
    };
    let result = Generator::with_config(profile, config).generate_file(&roster)?;

    let mut written = Vec::new();
    if !no_individual {
        written.extend(result.save_individual(&output)?);
    }
    let merged_path = result.save_merged(output.join(&merged_name))?;

    println!();
    println!("{}", "Summary:".yellow().bold());
    println!("  Students: {}", result.summary.students.to_string().white().bold());
    println!("  Subjects: {}", result.summary.subjects.to_string().white());
    println!("  Pages:    {}", result.summary.pages.to_string().white());
    println!();

    if verbose {
        for path in &written {
            println!("  {} {}", "wrote".dimmed(), path.display());
        }
    } else if !written.is_empty() {
        println!(
            "{} {} marksheets to {}",
            "✓".green(),
            written.len(),
            output.display()
        );
    }
    println!(
        "{} Merged preview: {}",
        "✓".green(),
        merged_path.display().to_string().green()
    );

    Ok(())
}

/// Load the profile file, if any, and apply command-line fields on top.
fn build_profile(
    path: Option<&PathBuf>,
    overrides: ProfileOverrides,
) -> Result<SchoolProfile, Box<dyn std::error::Error>> {
    let mut profile = match path {
        Some(path) => SchoolProfile::load(path)?,
        None => SchoolProfile::default(),
    };

    if let Some(class_name) = overrides.class_name {
        profile.class_name = class_name;
    }
    if let Some(school_name) = overrides.school_name {
        profile.school_name = school_name;
    }
    if let Some(address) = overrides.school_address {
        profile.school_address = Some(address);
    }
    if let Some(principal) = overrides.principal_name {
        profile.principal_name = principal;
    }
    if let Some(session) = overrides.session_year {
        profile.session_year = session;
    }
    if let Some(logo) = overrides.logo_path {
        profile.logo_path = Some(logo);
    }

    let profile = profile.normalized();
    profile.validate().map_err(|e| {
        format!(
            "{}\nPass it with --profile <JSON> or the matching flag (e.g. --school).",
            e
        )
    })?;
    Ok(profile)
}
