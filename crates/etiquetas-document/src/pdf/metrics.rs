// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph widths of the PDF built-in Helvetica faces (Adobe AFM, 1/1000 em),
// used to measure and wrap text exactly as it will be drawn.
//
// printpdf exposes no metrics for its built-in fonts. These tables must match
// the `BuiltinFont::Helvetica` and `BuiltinFont::HelveticaBold` faces the
// writer selects in `pdf::writer`.

use crate::layout::{Font, FontWeight, TextMeasure};
use crate::layout::primitives::MM_PER_PT;

/// Widths for ' ' (0x20) through '~' (0x7E).
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for characters with no entry and no ASCII base letter.
const FALLBACK_WIDTH: u16 = 556;

/// Text metrics of the built-in PDF fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMetrics;

impl BuiltinMetrics {
    /// Advance width of `ch` in 1/1000 em.
    pub fn glyph_width(ch: char, weight: FontWeight) -> u16 {
        let table = match weight {
            FontWeight::Regular => &HELVETICA,
            FontWeight::Bold => &HELVETICA_BOLD,
        };
        let ascii = if ch.is_ascii() { ch } else { base_letter(ch) };
        match ascii {
            ' '..='~' => table[ascii as usize - 0x20],
            _ => FALLBACK_WIDTH,
        }
    }
}

impl TextMeasure for BuiltinMetrics {
    fn text_width(&self, text: &str, font: Font) -> f32 {
        let units: u32 = text
            .chars()
            .map(|ch| u32::from(Self::glyph_width(ch, font.weight)))
            .sum();
        units as f32 / 1000.0 * font.size_pt * MM_PER_PT
    }
}

/// Accented Latin-1 letters share the advance width of their base letter.
fn base_letter(ch: char) -> char {
    match ch {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Ç' => 'C',
        'ç' => 'c',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ñ' => 'N',
        'ñ' => 'n',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ý' => 'Y',
        'ý' | 'ÿ' => 'y',
        'º' => 'o',
        'ª' => 'a',
        _ => '\u{0}',
    }
}
