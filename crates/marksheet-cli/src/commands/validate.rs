//! Validate command - check a roster and show derived grades.

use std::path::PathBuf;

use colored::Colorize;
use marksheet::{Generator, Grade, SchoolProfile, SourceMetadata};

pub fn run(
    roster: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validation does not look at the school profile.
    let generator = Generator::new(SchoolProfile::default());
    let (roster, source) = generator.validate_file(&roster)?;

    if json_output {
        let mut status = serde_json::json!({
            "file": source.file,
            "format": source.format,
            "hash": source.hash,
            "students": roster.len(),
            "subjects": roster.subjects,
            "records": roster.records.iter().map(|r| serde_json::json!({
                "roll": r.roll,
                "name": r.name,
                "total": r.total(),
                "grades": r.subjects,
            })).collect::<Vec<_>>(),
        });
        if verbose {
            status["source"] = serde_json::to_value(&source)?;
        }
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Roster".cyan().bold(),
        source.file.white()
    );
    if verbose {
        for line in source_details(&source) {
            println!("  {}", line.dimmed());
        }
    }
    println!(
        "  {} students, {} subjects: {}",
        roster.len().to_string().white().bold(),
        roster.subjects.len(),
        roster.subjects.join(", ")
    );
    println!();

    for record in &roster {
        let grades: Vec<String> = record
            .subjects
            .iter()
            .map(|(subject, score)| {
                let text = format!("{} {} ({})", subject, score.mark, score.grade);
                match score.grade {
                    Grade::F => text.red().to_string(),
                    Grade::APlus | Grade::A => text.green().to_string(),
                    _ => text,
                }
            })
            .collect();
        println!(
            "  {:>6}  {:<24} total {:>4}",
            record.roll.white().bold(),
            record.name,
            record.total()
        );
        println!("          {}", grades.join("  "));
    }

    println!();
    println!("{} Roster is valid", "✓".green());
    Ok(())
}

/// Where the roster came from, one `label: value` per line.
fn source_details(source: &SourceMetadata) -> Vec<String> {
    vec![
        format!("path: {}", source.path.display()),
        format!("format: {}", source.format),
        format!("size: {} bytes", source.size_bytes),
        format!("hash: {}", source.hash),
        format!("table: {} rows x {} columns", source.row_count, source.column_count),
        format!("read at: {}", source.read_at.to_rfc3339()),
    ]
}
