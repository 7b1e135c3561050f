//! Pipeline driver: roster in, marksheets and a merged preview out.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::assemble::{merge, MergedDocument};
use crate::error::{MarksheetError, Result};
use crate::input::{DataTable, Parser, ParserConfig, SourceMetadata};
use crate::profile::SchoolProfile;
use crate::render::{DocumentRenderer, RenderOptions, RenderedDocument};
use crate::roster::{Roster, RosterColumns, RosterValidator, StudentRecord};

/// File name of the merged PDF written by [`GenerationResult::save`].
pub const MERGED_FILE_NAME: &str = "merged_preview.pdf";

/// Configuration for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Roster file parsing.
    pub parser: ParserConfig,
    /// Identity column headers.
    pub columns: RosterColumns,
    /// PDF output options.
    pub render: RenderOptions,
    /// Render records on worker threads. Output order is unaffected.
    pub parallel: bool,
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Roster file metadata, when the roster came from a file.
    pub source: Option<SourceMetadata>,
    pub roster: Roster,
    /// One document per record, in roster order.
    pub documents: Vec<RenderedDocument>,
    pub merged: MergedDocument,
    pub summary: GenerationSummary,
}

/// Counts describing a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub students: usize,
    pub subjects: usize,
    /// Pages in the merged document.
    pub pages: usize,
}

impl GenerationResult {
    /// Write each marksheet and the merged preview into `output_dir`.
    ///
    /// The directory is created if needed. Returns the written paths, the
    /// merged file last.
    pub fn save(&self, output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let mut written = self.save_individual(&output_dir)?;
        written.push(self.save_merged(output_dir.as_ref().join(MERGED_FILE_NAME))?);
        Ok(written)
    }

    /// Write only the per-student PDFs.
    pub fn save_individual(&self, output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = output_dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| MarksheetError::io(dir, e))?;

        let mut written = Vec::with_capacity(self.documents.len());
        for document in &self.documents {
            let path = dir.join(format!("{}.pdf", document.name));
            fs::write(&path, &document.bytes).map_err(|e| MarksheetError::io(&path, e))?;
            written.push(path);
        }
        Ok(written)
    }

    /// Write only the merged PDF to an explicit path.
    pub fn save_merged(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| MarksheetError::io(parent, e))?;
            }
        }
        self.merged.save(path)?;
        Ok(path.to_path_buf())
    }
}

/// Turns rosters into marksheets for one school profile.
pub struct Generator {
    profile: SchoolProfile,
    config: GeneratorConfig,
    parser: Parser,
    validator: RosterValidator,
}

impl Generator {
    /// Create a generator with default configuration.
    pub fn new(profile: SchoolProfile) -> Self {
        Self::with_config(profile, GeneratorConfig::default())
    }

    pub fn with_config(profile: SchoolProfile, config: GeneratorConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        let validator = RosterValidator::with_columns(config.columns.clone());
        Self {
            profile: profile.normalized(),
            config,
            parser,
            validator,
        }
    }

    pub fn profile(&self) -> &SchoolProfile {
        &self.profile
    }

    /// Validate a roster file without rendering anything.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<(Roster, SourceMetadata)> {
        let (table, source) = self.parser.parse_file(path)?;
        Ok((self.validator.validate(&table)?, source))
    }

    /// Run the pipeline on a roster file.
    pub fn generate_file(&self, path: impl AsRef<Path>) -> Result<GenerationResult> {
        let path = path.as_ref();
        let (table, source) = self.parser.parse_file(path)?;
        let mut result = self.generate_table(&table)?;
        result.source = Some(source);
        Ok(result)
    }

    /// Run the pipeline on an already parsed table.
    ///
    /// The profile is checked before the roster, and any failure aborts the
    /// whole run.
    pub fn generate_table(&self, table: &DataTable) -> Result<GenerationResult> {
        let span = info_span!("generate", school = %self.profile.school_name);
        let _enter = span.enter();

        self.profile.validate()?;
        let roster = self.validator.validate(table)?;
        let renderer = DocumentRenderer::new(&self.profile, self.config.render.clone())?;

        info!(
            students = roster.len(),
            subjects = roster.subjects.len(),
            parallel = self.config.parallel,
            "rendering marksheets"
        );
        let documents = if self.config.parallel {
            render_parallel(&renderer, &roster.records)?
        } else {
            roster
                .iter()
                .map(|record| renderer.render(record))
                .collect::<Result<Vec<_>>>()?
        };

        let merged = merge(&documents)?;
        let summary = GenerationSummary {
            students: roster.len(),
            subjects: roster.subjects.len(),
            pages: merged.page_count,
        };
        info!(pages = summary.pages, "generation finished");

        Ok(GenerationResult {
            source: None,
            roster,
            documents,
            merged,
            summary,
        })
    }
}

/// Render records on scoped threads, keeping roster order.
fn render_parallel(
    renderer: &DocumentRenderer,
    records: &[StudentRecord],
) -> Result<Vec<RenderedDocument>> {
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(records.len().max(1));
    let chunk_size = records.len().div_ceil(workers).max(1);
    debug!(workers, chunk_size, "parallel render");

    let chunks: Vec<Result<Vec<RenderedDocument>>> = thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|record| renderer.render(record))
                        .collect::<Result<Vec<_>>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(MarksheetError::Render("render worker panicked".to_string())))
            })
            .collect()
    });

    let mut documents = Vec::with_capacity(records.len());
    for chunk in chunks {
        documents.extend(chunk?);
    }
    Ok(documents)
}
