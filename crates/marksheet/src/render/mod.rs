//! Marksheet rendering.
//!
//! Rendering happens in two steps: [`layout::layout_pages`] positions every
//! header, identity, table and footer element on A4 pages, then
//! [`pdf::write_document`] turns those pages into PDF bytes using the
//! standard Helvetica fonts.

pub mod fonts;
pub mod layout;
mod logo;
mod pdf;

use tracing::debug;

use crate::error::Result;
use crate::profile::SchoolProfile;
use crate::roster::StudentRecord;

pub use layout::PageLayout;
pub use logo::Logo;

pub(crate) use pdf::{media_box, page_ids};

/// Rendering options.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Deflate content and image streams.
    pub compress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// One student's marksheet as a standalone PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Artifact name without extension, e.g. `12_Asha_Rao`.
    pub name: String,
    /// PDF bytes.
    pub bytes: Vec<u8>,
    /// Number of pages (at least one).
    pub page_count: usize,
}

/// Renders marksheets for one school profile.
///
/// The logo, if any, is decoded once when the renderer is built and reused
/// for every record.
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    profile: SchoolProfile,
    logo: Option<Logo>,
    options: RenderOptions,
}

impl DocumentRenderer {
    /// Build a renderer, loading the profile's logo.
    ///
    /// Fails if a logo path is set but the file cannot be read or decoded.
    pub fn new(profile: &SchoolProfile, options: RenderOptions) -> Result<Self> {
        let logo = match &profile.logo_path {
            Some(path) => Some(Logo::load(path)?),
            None => None,
        };
        Ok(Self {
            profile: profile.clone(),
            logo,
            options,
        })
    }

    /// Build a renderer with an already decoded logo.
    pub fn with_logo(profile: &SchoolProfile, logo: Option<Logo>, options: RenderOptions) -> Self {
        Self {
            profile: profile.clone(),
            logo,
            options,
        }
    }

    pub fn profile(&self) -> &SchoolProfile {
        &self.profile
    }

    /// Lay out a record without producing PDF bytes.
    pub fn layout(&self, record: &StudentRecord) -> Vec<PageLayout> {
        layout::layout_pages(record, &self.profile, self.logo.as_ref().map(Logo::aspect))
    }

    /// Render one record.
    pub fn render(&self, record: &StudentRecord) -> Result<RenderedDocument> {
        let pages = self.layout(record);
        let bytes = pdf::write_document(&pages, self.logo.as_ref(), self.options.compress)?;
        debug!(roll = %record.roll, pages = pages.len(), bytes = bytes.len(), "rendered marksheet");

        Ok(RenderedDocument {
            name: artifact_name(record),
            bytes,
            page_count: pages.len(),
        })
    }
}

/// Render a single record with default options.
pub fn render(record: &StudentRecord, profile: &SchoolProfile) -> Result<RenderedDocument> {
    DocumentRenderer::new(profile, RenderOptions::default())?.render(record)
}

/// Deterministic artifact name: `{roll}_{name}` with spaces as underscores.
///
/// Path separators and other characters that are unsafe in file names are
/// replaced too, so the name can always be used as a file stem.
pub fn artifact_name(record: &StudentRecord) -> String {
    let raw = format!("{}_{}", record.roll, record.name.replace(' ', "_"));
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
