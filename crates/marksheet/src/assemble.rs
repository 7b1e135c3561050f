//! Combine rendered marksheets into one PDF.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use crate::error::{MarksheetError, Result};
use crate::render::{media_box, page_ids, RenderedDocument};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page tree depth after which a parent chain is assumed to be cyclic.
const MAX_TREE_DEPTH: usize = 64;

/// All marksheets of a run as a single PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl MergedDocument {
    /// Write the merged PDF to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, &self.bytes).map_err(|e| MarksheetError::io(path, e))
    }
}

/// Concatenate documents, in order, into one PDF.
///
/// Every page of every source is kept as-is; the result has
/// `sum(page_count)` pages in input order. An empty input is an error.
pub fn merge(documents: &[RenderedDocument]) -> Result<MergedDocument> {
    if documents.is_empty() {
        return Err(MarksheetError::Assembly("no documents to merge".to_string()));
    }

    let mut next_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for (index, source) in documents.iter().enumerate() {
        let mut doc = Document::load_mem(&source.bytes).map_err(|e| {
            MarksheetError::Assembly(format!(
                "document {} ('{}') is not a readable PDF: {}",
                index + 1,
                source.name,
                e
            ))
        })?;
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        let source_pages = page_ids(&doc);
        if source_pages.is_empty() {
            return Err(MarksheetError::Assembly(format!(
                "document {} ('{}') has no pages",
                index + 1,
                source.name
            )));
        }

        for page_id in source_pages {
            let mut page = doc
                .get_object(page_id)
                .and_then(Object::as_dict)
                .map_err(|e| {
                    MarksheetError::Assembly(format!(
                        "document {} ('{}') has a broken page: {}",
                        index + 1,
                        source.name,
                        e
                    ))
                })?
                .clone();
            inherit_attributes(&doc, &mut page);
            pages.push((page_id, page));
        }

        for (id, object) in doc.objects {
            if !is_tree_node(&object) {
                objects.insert(id, object);
            }
        }
        debug!(index, name = %source.name, "appended document");
    }

    let mut merged = Document::with_version("1.4");
    merged.max_id = next_id;
    let pages_id = (next_id, 0);

    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        if !page.has(b"MediaBox") {
            page.set("MediaBox", media_box());
        }
        objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }
    let page_count = kids.len();

    merged.objects = objects;
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    merged
        .save_to(&mut bytes)
        .map_err(|e| MarksheetError::Assembly(format!("failed to write merged PDF: {}", e)))?;

    info!(documents = documents.len(), pages = page_count, "merged marksheets");
    Ok(MergedDocument { bytes, page_count })
}

/// Number of pages in a PDF.
pub fn page_count(bytes: &[u8]) -> Result<usize> {
    Ok(Document::load_mem(bytes)?.get_pages().len())
}

/// Catalogs, page tree nodes and outlines are rebuilt, not copied.
fn is_tree_node(object: &Object) -> bool {
    let kind = object
        .as_dict()
        .ok()
        .and_then(|d| d.get(b"Type").ok())
        .and_then(|t| t.as_name().ok());
    matches!(
        kind,
        Some(b"Catalog") | Some(b"Pages") | Some(b"Outlines") | Some(b"Outline")
    )
}

/// Copy inheritable attributes from the page's ancestors onto the page.
fn inherit_attributes(doc: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_object(id).and_then(Object::as_dict) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}
