//! Page layout for a single marksheet.
//!
//! Produces positioned elements in millimetres with the origin at the top-left
//! corner of an A4 page. Nothing here touches PDF objects; [`super::pdf`]
//! serializes the result.

use crate::profile::SchoolProfile;
use crate::roster::StudentRecord;

use super::fonts::{Font, PT_PER_MM};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 10.0;
/// Horizontal padding between a cell edge and its text.
pub const CELL_PADDING: f32 = 1.0;
/// Distance of the footer from the bottom edge. Body content stops above it.
pub const FOOTER_OFFSET: f32 = 35.0;

const LOGO_X: f32 = 10.0;
const LOGO_Y: f32 = 8.0;
pub const LOGO_WIDTH: f32 = 25.0;
/// Tallest a logo is drawn. Taller images are scaled down, keeping aspect.
pub const LOGO_MAX_HEIGHT: f32 = 40.0;

pub const TABLE_FILL: Rgb = Rgb(200, 220, 255);
const SUBJECT_WIDTH: f32 = 80.0;
const MARKS_WIDTH: f32 = 40.0;
const GRADE_WIDTH: f32 = 40.0;
const IDENTITY_LEFT_WIDTH: f32 = 90.0;

pub const SIGNATURE_LINE: &str = "Signature of Principal: ____________________";

/// An RGB fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A line of text. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub font: Font,
    pub size: f32,
    pub text: String,
}

/// A rectangle, optionally filled and/or stroked.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Option<Rgb>,
    pub border: bool,
}

/// Where the logo is drawn. `y` is the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextRun),
    Rect(Rect),
    Logo(ImagePlacement),
}

/// Everything drawn on one page, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub elements: Vec<Element>,
}

impl PageLayout {
    /// Text runs on this page, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            _ => None,
        })
    }

    /// Whether any text run on the page equals `text`.
    pub fn contains_text(&self, text: &str) -> bool {
        self.texts().any(|t| t.text == text)
    }

    /// The first text run equal to `text`.
    pub fn find_text(&self, text: &str) -> Option<&TextRun> {
        self.texts().find(|t| t.text == text)
    }
}

/// Border and fill of a cell.
#[derive(Debug, Clone, Copy, Default)]
struct CellStyle {
    border: bool,
    fill: Option<Rgb>,
}

const PLAIN: CellStyle = CellStyle {
    border: false,
    fill: None,
};
const BORDERED: CellStyle = CellStyle {
    border: true,
    fill: None,
};
const HEADER_CELL: CellStyle = CellStyle {
    border: true,
    fill: Some(TABLE_FILL),
};

/// Flowing cursor over a sequence of pages.
struct Canvas<'a> {
    profile: &'a SchoolProfile,
    /// Logo height in millimetres when a logo is drawn.
    /// Logo width and height in millimetres.
    logo: Option<(f32, f32)>,
    pages: Vec<PageLayout>,
    /// Where body content starts below the header.
    body_top: f32,
    x: f32,
    y: f32,
    font: Font,
    size: f32,
}

impl<'a> Canvas<'a> {
    fn new(profile: &'a SchoolProfile, logo: Option<(f32, f32)>) -> Self {
        Self {
            profile,
            logo,
            pages: Vec::new(),
            body_top: MARGIN,
            x: MARGIN,
            y: MARGIN,
            font: Font::Regular,
            size: 12.0,
        }
    }

    fn page(&mut self) -> &mut PageLayout {
        if self.pages.is_empty() {
            self.pages.push(PageLayout::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn set_font(&mut self, font: Font, size: f32) {
        self.font = font;
        self.size = size;
    }

    /// Start a page and draw its header and footer.
    fn add_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.x = MARGIN;
        self.y = MARGIN;
        self.header();
        self.footer();
        self.x = MARGIN;
        self.y = self.body_top;
    }

    fn header(&mut self) {
        let profile = self.profile;

        if let Some((width, height)) = self.logo {
            self.page().elements.push(Element::Logo(ImagePlacement {
                x: LOGO_X,
                y: LOGO_Y,
                width,
                height,
            }));
        }

        self.set_font(Font::Bold, 16.0);
        if !profile.school_name.is_empty() {
            self.cell(0.0, 10.0, &profile.school_name, Align::Center, PLAIN, true);
        }

        self.set_font(Font::Oblique, 12.0);
        if let Some(address) = profile.school_address.as_deref().filter(|a| !a.is_empty()) {
            self.cell(0.0, 8.0, address, Align::Center, PLAIN, true);
        }
        if !profile.session_year.is_empty() {
            let session = format!("Academic Session: {}", profile.session_year);
            self.cell(0.0, 10.0, &session, Align::Center, PLAIN, true);
        }
        self.ln(10.0);

        // Body never starts under the logo.
        if let Some((_, height)) = self.logo {
            self.y = self.y.max(LOGO_Y + height + 2.0);
        }
        self.body_top = self.y;
    }

    fn footer(&mut self) {
        self.y = PAGE_HEIGHT - FOOTER_OFFSET;
        self.x = MARGIN;
        self.set_font(Font::Regular, 10.0);
        self.cell(0.0, 10.0, SIGNATURE_LINE, Align::Right, PLAIN, true);
        self.ln(5.0);
        let principal = format!("( {} )", self.profile.principal_name);
        self.cell(0.0, 10.0, &principal, Align::Right, PLAIN, true);
    }

    /// Lowest y a body row may reach before it collides with the footer.
    fn body_bottom(&self) -> f32 {
        PAGE_HEIGHT - FOOTER_OFFSET
    }

    /// Move to a fresh page if a row of `height` would not fit.
    fn ensure_room(&mut self, height: f32) {
        if self.y + height > self.body_bottom() {
            self.add_page();
        }
    }

    fn ln(&mut self, height: f32) {
        self.x = MARGIN;
        self.y += height;
    }

    /// Draw a cell at the cursor. A width of zero extends to the right margin.
    fn cell(&mut self, width: f32, height: f32, text: &str, align: Align, style: CellStyle, ln: bool) {
        let width = if width == 0.0 {
            PAGE_WIDTH - MARGIN - self.x
        } else {
            width
        };
        let (x, y, font, size) = (self.x, self.y, self.font, self.size);

        if style.border || style.fill.is_some() {
            self.page().elements.push(Element::Rect(Rect {
                x,
                y,
                width,
                height,
                fill: style.fill,
                border: style.border,
            }));
        }

        if !text.is_empty() {
            let text_width = font.text_width(text, size);
            let text_x = match align {
                Align::Left => x + CELL_PADDING,
                Align::Center => x + (width - text_width) / 2.0,
                Align::Right => x + width - CELL_PADDING - text_width,
            };
            // Vertically centred: half the cell plus 0.3 em (in mm) below the midline.
            let baseline = y + height / 2.0 + 0.3 * size / PT_PER_MM;
            self.page().elements.push(Element::Text(TextRun {
                x: text_x,
                y: baseline,
                font,
                size,
                text: text.to_string(),
            }));
        }

        if ln {
            self.ln(height);
        } else {
            self.x += width;
        }
    }

    fn student_info(&mut self, record: &StudentRecord) {
        self.set_font(Font::Regular, 12.0);
        let name = format!("Name of Student: {}", record.name);
        let roll = format!("Roll No.: {}", record.roll);
        let father = format!("Father's Name: {}", record.father_name);
        let mother = format!("Mother's Name: {}", record.mother_name);
        let class = format!("Class: {}", self.profile.class_name);

        self.cell(IDENTITY_LEFT_WIDTH, 8.0, &name, Align::Left, PLAIN, false);
        self.cell(0.0, 8.0, &roll, Align::Left, PLAIN, true);
        self.cell(IDENTITY_LEFT_WIDTH, 8.0, &father, Align::Left, PLAIN, false);
        self.cell(0.0, 8.0, &mother, Align::Left, PLAIN, true);
        self.cell(0.0, 8.0, &class, Align::Left, PLAIN, true);
        self.ln(5.0);
    }

    fn table_row(&mut self, height: f32, cells: [&str; 3], style: CellStyle, first: Align) {
        self.ensure_room(height);
        self.cell(SUBJECT_WIDTH, height, cells[0], first, style, false);
        self.cell(MARKS_WIDTH, height, cells[1], Align::Center, style, false);
        self.cell(GRADE_WIDTH, height, cells[2], Align::Center, style, true);
    }

    fn marks_table(&mut self, record: &StudentRecord) {
        self.set_font(Font::Bold, 12.0);
        self.table_row(
            10.0,
            ["Subject", "Marks Obtained", "Grade"],
            HEADER_CELL,
            Align::Left,
        );

        for (subject, score) in &record.subjects {
            self.set_font(Font::Regular, 11.0);
            let mark = score.mark.to_string();
            self.table_row(
                8.0,
                [subject.as_str(), mark.as_str(), score.grade.label()],
                BORDERED,
                Align::Left,
            );
        }

        self.set_font(Font::Bold, 12.0);
        let total = record.total().to_string();
        self.table_row(10.0, ["Total", total.as_str(), ""], BORDERED, Align::Left);
    }
}

/// Drawn logo size for a height/width ratio: [`LOGO_WIDTH`] wide unless that
/// would exceed [`LOGO_MAX_HEIGHT`].
fn logo_size(aspect: f32) -> (f32, f32) {
    let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
    let height = LOGO_WIDTH * aspect;
    if height > LOGO_MAX_HEIGHT {
        (LOGO_MAX_HEIGHT / aspect, LOGO_MAX_HEIGHT)
    } else {
        (LOGO_WIDTH, height)
    }
}

/// Lay out one student's marksheet.
///
/// `logo_aspect` is the logo's height divided by its width, when the profile
/// carries a logo.
pub fn layout_pages(
    record: &StudentRecord,
    profile: &SchoolProfile,
    logo_aspect: Option<f32>,
) -> Vec<PageLayout> {
    let mut canvas = Canvas::new(profile, logo_aspect.map(logo_size));
    canvas.add_page();
    canvas.student_info(record);
    canvas.marks_table(record);
    canvas.pages
}
