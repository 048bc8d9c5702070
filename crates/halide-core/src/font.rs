//! Built-in 5x7 dot-matrix face.
//!
//! Used for the date stamp, where the look of a camera's LED imprint is
//! the point, and as the last-resort face for annotation text when no
//! font can be found at all. Lowercase sits on rows 2..=6, which leaves
//! the top row free for accents.

use crate::blur::Plane;

pub const GLYPH_COLS: u32 = 5;
pub const GLYPH_ROWS: u32 = 7;
/// Horizontal advance per character, in dots (one dot of spacing).
pub const ADVANCE: u32 = 6;

/// Drawn for characters the face has no glyph for.
pub const MISSING_GLYPH: [u8; 7] = [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F];

const ACUTE: u8 = 0x02;
const GRAVE: u8 = 0x08;
const CIRCUMFLEX: u8 = 0x04;
const DIAERESIS: u8 = 0x0A;
const TILDE: u8 = 0x0D;

/// Splits a Latin-1 accented letter into its base letter and accent row.
fn decompose(ch: char) -> Option<(char, u8)> {
    let (base, mark) = match ch {
        'á' | 'Á' => ('a', ACUTE),
        'à' | 'À' => ('a', GRAVE),
        'â' | 'Â' => ('a', CIRCUMFLEX),
        'ä' | 'Ä' => ('a', DIAERESIS),
        'ã' | 'Ã' => ('a', TILDE),
        'é' | 'É' => ('e', ACUTE),
        'è' | 'È' => ('e', GRAVE),
        'ê' | 'Ê' => ('e', CIRCUMFLEX),
        'ë' | 'Ë' => ('e', DIAERESIS),
        'í' | 'Í' => ('i', ACUTE),
        'ì' | 'Ì' => ('i', GRAVE),
        'î' | 'Î' => ('i', CIRCUMFLEX),
        'ï' | 'Ï' => ('i', DIAERESIS),
        'ó' | 'Ó' => ('o', ACUTE),
        'ò' | 'Ò' => ('o', GRAVE),
        'ô' | 'Ô' => ('o', CIRCUMFLEX),
        'ö' | 'Ö' => ('o', DIAERESIS),
        'õ' | 'Õ' => ('o', TILDE),
        'ú' | 'Ú' => ('u', ACUTE),
        'ù' | 'Ù' => ('u', GRAVE),
        'û' | 'Û' => ('u', CIRCUMFLEX),
        'ü' | 'Ü' => ('u', DIAERESIS),
        'ñ' | 'Ñ' => ('n', TILDE),
        _ => return None,
    };
    // capitals fill the top row, so accented capitals use the lowercase form
    Some((base, mark))
}

/// Row bitmaps, bit 4 is the leftmost column.
pub fn glyph(ch: char) -> [u8; 7] {
    if let Some((base, mark)) = decompose(ch) {
        let mut rows = glyph(base);
        rows[0] = mark;
        rows[1] = 0;
        return rows;
    }
    match ch {
        ' ' => [0; 7],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x00, 0x00, 0x04],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '*' => [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'b' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E],
        'c' => [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        'd' => [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'f' => [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08],
        'g' => [0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        'h' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'j' => [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C],
        'k' => [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12],
        'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'm' => [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11],
        'n' => [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11],
        'o' => [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E],
        'p' => [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10],
        'q' => [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01],
        'r' => [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10],
        's' => [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E],
        't' => [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        'u' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D],
        'v' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'w' => [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A],
        'x' => [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11],
        'y' => [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        'z' => [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F],
        _ => MISSING_GLYPH,
    }
}

/// Width of `text` in dots.
pub fn columns(text: &str) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 { 0 } else { n * ADVANCE - 1 }
}

/// Dot size in pixels for a cap height of `px`.
pub fn dot_size(px: f32) -> u32 {
    ((px / GLYPH_ROWS as f32).floor() as u32).max(1)
}

/// Calls `f(col, row)` for every lit dot, in dot units from the top-left.
pub fn for_each_dot(text: &str, mut f: impl FnMut(u32, u32)) {
    for (i, ch) in text.chars().enumerate() {
        let origin = i as u32 * ADVANCE;
        for (row, bits) in glyph(ch).into_iter().enumerate() {
            for col in 0..GLYPH_COLS {
                if bits & (0x10 >> col) != 0 {
                    f(origin + col, row as u32);
                }
            }
        }
    }
}

/// Coverage mask of `text` at `dot` pixels per dot, with `pad` empty
/// pixels on every side.
pub fn rasterize(text: &str, dot: u32, pad: u32) -> Plane {
    let width = (columns(text) * dot + 2 * pad) as usize;
    let height = (GLYPH_ROWS * dot + 2 * pad) as usize;
    let mut plane = Plane::new(width, height);
    for_each_dot(text, |col, row| {
        let x0 = (pad + col * dot) as usize;
        let y0 = (pad + row * dot) as usize;
        for y in y0..y0 + dot as usize {
            plane.data[y * width + x0..y * width + x0 + dot as usize].fill(1.0);
        }
    });
    plane
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_include_spacing() {
        assert_eq!(columns(""), 0);
        assert_eq!(columns("1"), 5);
        assert_eq!(columns("'24 03 07"), 9 * 6 - 1);
    }

    #[test]
    fn lowercase_has_its_own_glyphs() {
        for (lower, upper) in ('a'..='z').zip('A'..='Z') {
            assert_ne!(glyph(lower), glyph(upper), "{lower}");
            assert_ne!(glyph(lower), MISSING_GLYPH, "{lower}");
        }
    }

    #[test]
    fn accents_keep_base_letter() {
        let e = glyph('e');
        let e_acute = glyph('é');
        assert_eq!(e_acute[2..], e[2..]);
        assert_ne!(e_acute, e);
        assert_ne!(glyph('é'), glyph('è'));
        assert_eq!(glyph('É'), e_acute);
        assert_ne!(glyph('ñ'), glyph('n'));
    }

    #[test]
    fn unknown_is_distinct_from_question_mark() {
        assert_eq!(glyph('€'), MISSING_GLYPH);
        assert_eq!(glyph('~'), MISSING_GLYPH);
        assert_ne!(glyph('?'), MISSING_GLYPH);
        assert_ne!(glyph('é'), glyph('?'));
    }

    #[test]
    fn space_has_no_dots() {
        let mut n = 0;
        for_each_dot("   ", |_, _| n += 1);
        assert_eq!(n, 0);
    }

    #[test]
    fn dot_positions_advance_per_char() {
        let mut cols = Vec::new();
        for_each_dot("11", |c, r| {
            if r == 6 {
                cols.push(c);
            }
        });
        // '1' bottom row is 0x0E: columns 1..=3
        assert_eq!(cols, vec![1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn rasterized_mask_dimensions() {
        let mask = rasterize("07", 3, 2);
        assert_eq!(mask.width, (11 * 3 + 4) as usize);
        assert_eq!(mask.height, (7 * 3 + 4) as usize);
        assert_eq!(mask.get(0, 0), 0.0);
        // top row of '0' lights columns 1..=3
        assert_eq!(mask.get(2 + 3, 2), 1.0);
        assert_eq!(mask.get(2, 2), 0.0);
    }

    #[test]
    fn dot_size_never_zero() {
        assert_eq!(dot_size(3.0), 1);
        assert_eq!(dot_size(115.2), 16);
    }
}
