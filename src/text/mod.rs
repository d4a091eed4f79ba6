//! # Line Breaking
//!
//! Greedy line wrapping over UAX#14 break opportunities. Narrative fields in
//! inspection reports are plain paragraphs, so first-fit is all that's needed:
//! every line is filled with as many segments as fit, mandatory breaks
//! (newlines) always start a new line, and a single word wider than the
//! available width is split at character boundaries.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::FontContext;
use crate::style::TextStyle;

/// Wrapped text ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub line_height: f64,
}

impl WrappedText {
    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub struct TextLayout {
    fonts: FontContext,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self {
            fonts: FontContext::new(),
        }
    }

    pub fn measure(&self, text: &str, style: &TextStyle) -> f64 {
        self.fonts
            .measure_string(text, style.font_family, style.bold, style.font_size)
    }

    /// Wrap `text` into lines no wider than `max_width`.
    ///
    /// Empty or whitespace-only input yields no lines. Blank lines inside the
    /// text (paragraph separators) are kept as empty strings.
    pub fn wrap(&self, text: &str, style: &TextStyle, max_width: f64) -> WrappedText {
        let line_height = style.line_height();
        let text = text.trim_end();
        if text.trim().is_empty() {
            return WrappedText {
                lines: Vec::new(),
                line_height,
            };
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut start = 0;

        for (offset, opportunity) in linebreaks(text) {
            let segment = &text[start..offset];
            start = offset;

            let mandatory = opportunity == BreakOpportunity::Mandatory;
            let segment = if mandatory {
                segment.trim_end_matches(['\n', '\r'])
            } else {
                segment
            };

            let candidate_width = self.measure(current.trim_end(), style)
                + self.measure(segment.trim_end(), style)
                + if current.is_empty() {
                    0.0
                } else {
                    self.trailing_space_width(&current, style)
                };

            if candidate_width > max_width && !current.is_empty() {
                lines.push(current.trim_end().to_string());
                current.clear();
            }

            if current.is_empty() && self.measure(segment.trim_end(), style) > max_width {
                let mut pieces = self.split_long_word(segment, style, max_width);
                if let Some(last) = pieces.pop() {
                    lines.extend(pieces);
                    current = last;
                }
            } else {
                current.push_str(segment);
            }

            if mandatory {
                lines.push(current.trim_end().to_string());
                current.clear();
            }
        }

        if !current.trim().is_empty() {
            lines.push(current.trim_end().to_string());
        }

        WrappedText { lines, line_height }
    }

    fn trailing_space_width(&self, current: &str, style: &TextStyle) -> f64 {
        let trimmed = current.trim_end();
        self.measure(&current[trimmed.len()..], style)
    }

    fn split_long_word(&self, word: &str, style: &TextStyle, max_width: f64) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut width = 0.0;
        for ch in word.chars() {
            let w = self
                .fonts
                .char_width(ch, style.font_family, style.bold, style.font_size);
            if width + w > max_width && !piece.is_empty() {
                pieces.push(std::mem::take(&mut piece));
                width = 0.0;
            }
            piece.push(ch);
            width += w;
        }
        pieces.push(piece);
        pieces
    }

    /// Shorten `text` with an ellipsis so it fits `max_width` on one line.
    pub fn truncate(&self, text: &str, style: &TextStyle, max_width: f64) -> String {
        if self.measure(text, style) <= max_width {
            return text.to_string();
        }
        let ellipsis = "...";
        let budget = max_width - self.measure(ellipsis, style);
        let mut out = String::new();
        let mut width = 0.0;
        for ch in text.chars() {
            let w = self
                .fonts
                .char_width(ch, style.font_family, style.bold, style.font_size);
            if width + w > budget {
                break;
            }
            out.push(ch);
            width += w;
        }
        out.truncate(out.trim_end().len());
        out.push_str(ellipsis);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle::default()
    }

    #[test]
    fn test_short_text_single_line() {
        let wrapped = TextLayout::new().wrap("Revize elektroinstalace", &style(), 500.0);
        assert_eq!(wrapped.lines, vec!["Revize elektroinstalace"]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let layout = TextLayout::new();
        let text = "Kontrola stavu rozvaděčů a měření izolačních odporů všech okruhů";
        let wrapped = layout.wrap(text, &style(), 120.0);
        assert!(wrapped.lines.len() > 1);
        for line in &wrapped.lines {
            assert!(layout.measure(line, &style()) <= 120.0, "line too wide: {line}");
            assert!(!line.ends_with(' '));
        }
        assert_eq!(wrapped.lines.join(" "), text);
    }

    #[test]
    fn test_newlines_are_mandatory_breaks() {
        let wrapped = TextLayout::new().wrap("první\n\ntřetí", &style(), 500.0);
        assert_eq!(wrapped.lines, vec!["první", "", "třetí"]);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        let wrapped = TextLayout::new().wrap("   \n ", &style(), 100.0);
        assert!(wrapped.is_empty());
        assert_eq!(wrapped.height(), 0.0);
    }

    #[test]
    fn test_long_word_is_split() {
        let layout = TextLayout::new();
        let wrapped = layout.wrap(&"X".repeat(60), &style(), 50.0);
        assert!(wrapped.lines.len() > 1);
        for line in &wrapped.lines {
            assert!(layout.measure(line, &style()) <= 50.0);
        }
    }

    #[test]
    fn test_truncate() {
        let layout = TextLayout::new();
        let out = layout.truncate("Velmi dlouhý název rozvaděče", &style(), 60.0);
        assert!(out.ends_with("..."));
        assert!(layout.measure(&out, &style()) <= 60.0);
        assert_eq!(layout.truncate("RH", &style(), 60.0), "RH");
    }
}
