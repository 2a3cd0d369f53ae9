//! Read-only text buffer with line and position queries.
//!
//! Offsets are byte offsets into the UTF-8 text; positions use UTF-16
//! character counts like the language server does.

use crate::models::lsp::{Position, Range};

#[derive(Debug, Clone)]
pub struct TextDocument {
    text: String,
    line_starts: Vec<usize>,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Line text without its terminator (`\n` or `\r\n`).
    pub fn line_text(&self, line: u32) -> &str {
        let Some(&start) = self.line_starts.get(line as usize) else {
            return "";
        };
        let end = self.line_content_end(line as usize);
        &self.text[start..end]
    }

    /// Range of a line excluding its terminator.
    pub fn line_range(&self, line: u32) -> Range {
        let line = line.min(self.line_count() - 1);
        let start = self.line_starts[line as usize];
        let end = self.line_content_end(line as usize);
        Range::new(self.position_at(start), self.position_at(end))
    }

    pub fn is_line_blank(&self, line: u32) -> bool {
        self.line_text(line).trim().is_empty()
    }

    fn line_content_end(&self, line: usize) -> usize {
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let start = self.line_starts[line];
        if end > start && self.text.as_bytes()[end - 1] == b'\r' {
            end - 1
        } else {
            end
        }
    }

    /// Byte offset of a position, clamped to the document.
    pub fn offset_at(&self, pos: Position) -> usize {
        let Some(&start) = self.line_starts.get(pos.line as usize) else {
            return self.text.len();
        };
        let end = self.line_content_end(pos.line as usize);
        let mut units = 0u32;
        for (i, ch) in self.text[start..end].char_indices() {
            if units >= pos.character {
                return start + i;
            }
            units += ch.len_utf16() as u32;
        }
        end
    }

    /// Position of a byte offset. Offsets inside a multi-byte character snap
    /// back to the character start.
    pub fn position_at(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let character: usize = self.text[start..offset]
            .chars()
            .map(char::len_utf16)
            .sum();
        Position::new(line as u32, character as u32)
    }

    pub fn text_in(&self, range: Range) -> &str {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end).max(start);
        &self.text[start..end]
    }

    pub fn end_position(&self) -> Position {
        self.position_at(self.text.len())
    }
}
