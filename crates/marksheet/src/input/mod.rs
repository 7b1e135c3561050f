//! Roster file ingestion.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig};
pub use source::{DataTable, SourceMetadata};
