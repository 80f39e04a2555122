use crate::ir::Node;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display columns of `text`; wide (e.g. CJK) glyphs count as two.
pub fn columns(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Cut `text` to at most `max` display columns, ending in `…` when cut.
pub fn truncate_columns(text: &str, max: usize) -> String {
    if columns(text) <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Fixed-advance text metrics for card layout.
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub header_height: f64,
    pub footer_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 28.0,
            padding_x: 16.0,
            padding_y: 16.0,
            header_height: 48.0,
            footer_height: 24.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        columns(text) as f64 * self.char_width
    }

    /// Rendered card size. Never narrower or shorter than `min`, but may
    /// grow past it, so it can differ from the logical anchor geometry.
    pub fn card_size(&self, node: &Node, min: (f64, f64)) -> (f64, f64) {
        // "DB" badge plus gap precedes the name
        let header_width = self.text_width(&node.label) + self.char_width * 4.0;

        let max_row_width = node
            .rows
            .iter()
            .map(|r| {
                let type_tag = format!("({})", r.typ.as_str());
                self.text_width(&r.name)
                    + self.text_width(&type_tag)
                    + self.text_width(&r.sample).min(96.0)
                    + self.char_width * 4.0
            })
            .fold(0.0, f64::max);

        let width = header_width.max(max_row_width) + self.padding_x * 2.0;

        let footer = if node.rows.is_empty() || node.hidden_rows > 0 {
            self.footer_height
        } else {
            0.0
        };
        let height = self.header_height
            + self.padding_y * 2.0
            + node.rows.len() as f64 * self.line_height
            + footer;

        (width.max(min.0), height.max(min.1))
    }
}
