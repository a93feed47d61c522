//! Advance widths of the builtin Helvetica faces (Adobe AFM, 1/1000 em).

use super::Font;

/// Widths for the printable ASCII range, starting at U+0020
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

const DEFAULT_WIDTH: u16 = 556;

/// Ascender height relative to the font size
pub const ASCENT: f64 = 0.718;

fn ascii_equivalent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        other => other,
    }
}

fn char_width(font: Font, c: char) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    match ascii_equivalent(c) {
        '°' => 400,
        'º' => 365,
        c if (' '..='~').contains(&c) => table[c as usize - 0x20],
        _ => DEFAULT_WIDTH,
    }
}

/// Width of a single line of `text` at `size` points
pub fn text_width(font: Font, size: f64, text: &str) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(font, c))).sum();
    f64::from(units) * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(char_width(Font::Regular, 'A'), 667);
        assert_eq!(char_width(Font::Bold, 'A'), 722);
        assert_eq!(char_width(Font::Regular, '~'), 584);
        assert_eq!(char_width(Font::Regular, 'ó'), char_width(Font::Regular, 'o'));
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w10 = text_width(Font::Regular, 10.0, "1,234.56");
        let w20 = text_width(Font::Regular, 20.0, "1,234.56");
        assert!((w20 - 2.0 * w10).abs() < 1e-9);
        assert!((w10 - 38.92).abs() < 1e-9);
    }

    #[test]
    fn test_bold_is_wider() {
        assert!(text_width(Font::Bold, 10.0, "Gran total") > text_width(Font::Regular, 10.0, "Gran total"));
        assert_eq!(text_width(Font::Bold, 10.0, ""), 0.0);
    }
}
