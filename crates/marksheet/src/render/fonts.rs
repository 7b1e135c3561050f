//! Standard Type 1 fonts used on marksheets and their metrics.

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// The three faces of the Helvetica family a marksheet uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    /// PostScript name of the standard font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }

    /// Name under which the font is registered in page resources.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    /// Advance width of one WinAnsi byte, in 1/1000 em.
    fn glyph_width(&self, byte: u8) -> u16 {
        let table = match self {
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
            Font::Regular | Font::Oblique => &HELVETICA_WIDTHS,
        };
        match byte {
            32.. => table[usize::from(byte - 32)],
            _ => DEFAULT_WIDTH,
        }
    }

    /// Width of `text` set at `size` points, in millimetres.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|b| u32::from(self.glyph_width(b)))
            .sum();
        units as f32 * size / 1000.0 / PT_PER_MM
    }
}

/// Width used for control bytes.
const DEFAULT_WIDTH: u16 = 556;

/// Helvetica (and Helvetica-Oblique) widths for WinAnsi bytes 32..=255.
///
/// Slots WinAnsi leaves undefined (127, 129, 141, 143, 144, 157) hold 350.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 350,
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Helvetica-Bold widths for WinAnsi bytes 32..=255.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 350,
    556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// Encode text for a WinAnsiEncoding simple font.
///
/// Latin-1 maps straight through, a handful of typographic characters map to
/// their cp1252 slots, and anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Roll No.: 7"), b"Roll No.: 7".to_vec());
        assert_eq!(encode_win_ansi("Zoë"), vec![b'Z', b'o', 0xEB]);
        assert_eq!(encode_win_ansi("O’Neil"), vec![b'O', 0x92, b'N', b'e', b'i', b'l']);
        assert_eq!(encode_win_ansi("क"), b"?".to_vec());
    }

    #[test]
    fn test_text_width() {
        // "Total" in Helvetica-Bold: T611 o611 t333 a556 l278 = 2389 units.
        let width = Font::Bold.text_width("Total", 12.0);
        let expected = 2389.0 * 12.0 / 1000.0 / PT_PER_MM;
        assert!((width - expected).abs() < 1e-4);
        assert!(Font::Bold.text_width("Total", 12.0) > Font::Regular.text_width("Total", 12.0));
        assert_eq!(Font::Oblique.text_width("abc", 10.0), Font::Regular.text_width("abc", 10.0));
    }

    #[test]
    fn test_accented_widths_follow_base_letters() {
        // Back to 1/1000 em.
        let units = |font: Font, text: &str| (font.text_width(text, 10.0) * PT_PER_MM * 100.0).round();

        assert_eq!(units(Font::Regular, "Ä"), 667.0);
        assert_eq!(units(Font::Regular, "Ä"), units(Font::Regular, "A"));
        assert_eq!(units(Font::Regular, "ß"), 611.0);
        assert_eq!(units(Font::Regular, "æ"), 889.0);
        assert_eq!(units(Font::Regular, "ç"), 500.0);
        assert_eq!(units(Font::Regular, "ï"), units(Font::Regular, "i"));
        assert_eq!(units(Font::Bold, "Ö"), units(Font::Bold, "O"));
        assert_eq!(units(Font::Bold, "ü"), 611.0);
        assert_eq!(units(Font::Bold, "Ç"), 722.0);
        // Typographic punctuation in the cp1252 range.
        assert_eq!(units(Font::Regular, "—"), 1000.0);
        assert_eq!(units(Font::Regular, "’"), 222.0);
    }
}
