//! Serialize laid-out pages into a PDF document.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::fonts::{encode_win_ansi, Font, PT_PER_MM};
use super::layout::{Element, ImagePlacement, PageLayout, Rect, TextRun, PAGE_HEIGHT, PAGE_WIDTH};
use super::logo::Logo;
use crate::error::{MarksheetError, Result};

/// Resource name of the logo image XObject.
const LOGO_RESOURCE: &str = "Im1";
/// Stroke width for cell borders, in millimetres.
const LINE_WIDTH: f32 = 0.2;

fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Convert a top-origin millimetre y to a bottom-origin point y.
fn pdf_y(mm: f32) -> f32 {
    pt(PAGE_HEIGHT - mm)
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

/// Write `pages` as a standalone PDF and return its bytes.
pub fn write_document(pages: &[PageLayout], logo: Option<&Logo>, compress: bool) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }

    let mut resources = dictionary! {
        "Font" => fonts,
    };
    if let Some(logo) = logo {
        let image_id = doc.add_object(image_stream(logo));
        resources.set(
            "XObject",
            dictionary! {
                LOGO_RESOURCE => image_id,
            },
        );
    }
    let resources_id = doc.add_object(resources);

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box(),
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| MarksheetError::Render(format!("Failed to write PDF: {}", e)))?;
    Ok(bytes)
}

/// A4 media box in points.
pub(crate) fn media_box() -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        real(pt(PAGE_WIDTH)),
        real(pt(PAGE_HEIGHT)),
    ]
}

fn image_stream(logo: &Logo) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(logo.width),
            "Height" => i64::from(logo.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        logo.rgb.clone(),
    )
}

fn page_operations(page: &PageLayout) -> Vec<Operation> {
    let mut ops = vec![Operation::new("w", vec![real(pt(LINE_WIDTH))])];
    for element in &page.elements {
        match element {
            Element::Rect(rect) => push_rect(&mut ops, rect),
            Element::Text(text) => push_text(&mut ops, text),
            Element::Logo(placement) => push_logo(&mut ops, placement),
        }
    }
    ops
}

fn push_rect(ops: &mut Vec<Operation>, rect: &Rect) {
    if let Some(fill) = rect.fill {
        let channel = |c: u8| real(f32::from(c) / 255.0);
        ops.push(Operation::new(
            "rg",
            vec![channel(fill.0), channel(fill.1), channel(fill.2)],
        ));
    }
    ops.push(Operation::new(
        "re",
        vec![
            real(pt(rect.x)),
            real(pdf_y(rect.y + rect.height)),
            real(pt(rect.width)),
            real(pt(rect.height)),
        ],
    ));
    let paint = match (rect.fill.is_some(), rect.border) {
        (true, true) => "B",
        (true, false) => "f",
        _ => "S",
    };
    ops.push(Operation::new(paint, vec![]));
    if rect.fill.is_some() {
        // Text after a filled cell is drawn in black again.
        ops.push(Operation::new("g", vec![Object::Integer(0)]));
    }
}

fn push_text(ops: &mut Vec<Operation>, text: &TextRun) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![text.font.resource_name().into(), real(text.size)],
    ));
    ops.push(Operation::new(
        "Td",
        vec![real(pt(text.x)), real(pdf_y(text.y))],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(encode_win_ansi(&text.text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn push_logo(ops: &mut Vec<Operation>, placement: &ImagePlacement) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![
            real(pt(placement.width)),
            Object::Integer(0),
            Object::Integer(0),
            real(pt(placement.height)),
            real(pt(placement.x)),
            real(pdf_y(placement.y + placement.height)),
        ],
    ));
    ops.push(Operation::new("Do", vec![LOGO_RESOURCE.into()]));
    ops.push(Operation::new("Q", vec![]));
}

/// Page ids of a PDF in page order.
pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::TABLE_FILL;

    fn text(s: &str) -> Element {
        Element::Text(TextRun {
            x: 10.0,
            y: 20.0,
            font: Font::Bold,
            size: 12.0,
            text: s.to_string(),
        })
    }

    #[test]
    fn test_writes_one_page_per_layout() {
        let pages = vec![
            PageLayout {
                elements: vec![text("first")],
            },
            PageLayout {
                elements: vec![text("second")],
            },
        ];
        let bytes = write_document(&pages, None, false).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));

        let doc = Document::load_mem(&bytes).unwrap();
        let ids = page_ids(&doc);
        assert_eq!(ids.len(), 2);
        let content = doc.get_page_content(ids[1]).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("(second)"));
    }

    #[test]
    fn test_filled_rect_ops() {
        let mut ops = Vec::new();
        push_rect(
            &mut ops,
            &Rect {
                x: 10.0,
                y: 10.0,
                width: 80.0,
                height: 10.0,
                fill: Some(TABLE_FILL),
                border: true,
            },
        );
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["rg", "re", "B", "g"]);

        let mut ops = Vec::new();
        push_rect(
            &mut ops,
            &Rect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                fill: None,
                border: true,
            },
        );
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["re", "S"]);
    }

    #[test]
    fn test_logo_becomes_xobject() {
        let logo = Logo {
            width: 2,
            height: 1,
            rgb: vec![0, 0, 0, 255, 255, 255],
        };
        let pages = vec![PageLayout {
            elements: vec![Element::Logo(ImagePlacement {
                x: 10.0,
                y: 8.0,
                width: 25.0,
                height: 12.5,
            })],
        }];
        let bytes = write_document(&pages, Some(&logo), false).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let ids = page_ids(&doc);
        let content = doc.get_page_content(ids[0]).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("/Im1 Do"));
    }
}
