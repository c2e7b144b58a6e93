// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text measurement, wrapping, truncation and vertical centering.

use super::primitives::Font;

/// Width measurement supplied by the document engine.
///
/// Layout wraps with the same metrics the writer uses to align text, so a
/// line that fits during layout also fits on the page.
pub trait TextMeasure: Send + Sync {
    /// Width of `text` in millimetres.
    fn text_width(&self, text: &str, font: Font) -> f32;

    /// Greedy word wrap to `max_width` millimetres.
    ///
    /// Splits on existing newlines first, then wraps words within each
    /// paragraph. Words wider than `max_width` are broken between
    /// characters. Always returns at least one line.
    fn split_to_width(&self, text: &str, font: Font, max_width: f32) -> Vec<String> {
        let fits = |candidate: &str| self.text_width(candidate, font) <= max_width;
        let mut result = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = String::new();

            for word in paragraph.split_whitespace() {
                if !fits(word) {
                    if !current.is_empty() {
                        result.push(std::mem::take(&mut current));
                    }
                    // Force-break the oversized word.
                    for ch in word.chars() {
                        current.push(ch);
                        if current.chars().count() > 1 && !fits(&current) {
                            current.pop();
                            result.push(std::mem::take(&mut current));
                            current.push(ch);
                        }
                    }
                } else if current.is_empty() {
                    current.push_str(word);
                } else {
                    let candidate = format!("{current} {word}");
                    if fits(&candidate) {
                        current = candidate;
                    } else {
                        result.push(std::mem::replace(&mut current, word.to_string()));
                    }
                }
            }

            result.push(current);
        }

        if result.is_empty() {
            result.push(String::new());
        }
        result
    }
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Middle of the first of `line_count` lines so the block is centred on
/// `center_y`.
pub fn centered_start_y(center_y: f32, line_count: usize, line_height: f32) -> f32 {
    let extra_lines = line_count.saturating_sub(1) as f32;
    center_y - (extra_lines * line_height) / 2.0
}

/// Line pitch in millimetres for `font`.
pub fn line_height(font: Font, factor: f32) -> f32 {
    font.size_mm() * factor
}
