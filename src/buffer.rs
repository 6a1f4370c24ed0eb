//! Host text buffer abstraction.
//!
//! Positions are byte offsets. Editor integrations implement [`TextBuffer`];
//! [`MemoryBuffer`] backs the CLI and the tests.

use crate::model::Edit;
use std::ops::Range;

/// The capabilities the pipeline needs from the host editor.
pub trait TextBuffer {
    /// Total length in bytes.
    fn size(&self) -> usize;

    /// Region of the line containing `point`, without its line break.
    fn line_region(&self, point: usize) -> Range<usize>;

    fn substr(&self, range: Range<usize>) -> String;

    /// Lexical scope name at `point`, e.g. `source.js meta.function.js`.
    fn scope_name(&self, point: usize) -> String;

    fn insert(&mut self, point: usize, text: &str);

    fn erase(&mut self, range: Range<usize>);

    /// Apply an edit as one change: erase first, then insert.
    fn apply(&mut self, edit: &Edit) {
        if let Some(range) = &edit.erase {
            self.erase(range.clone());
        }
        self.insert(edit.insert_at, &edit.text);
    }

    /// Whether `point` falls between two characters.
    fn is_char_boundary(&self, point: usize) -> bool {
        self.substr(0..self.size()).is_char_boundary(point)
    }

    /// Text of the line containing `point`, or `None` past the end.
    fn read_line(&self, point: usize) -> Option<String> {
        if point >= self.size() {
            return None;
        }
        Some(self.substr(self.line_region(point)))
    }
}

/// In-memory buffer with a fixed scope name.
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    text: String,
    scope: String,
}

impl MemoryBuffer {
    pub fn new(text: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            scope: scope.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Offset of the start of 1-based line `line`, clamped to the end.
    pub fn line_start(&self, line: usize) -> usize {
        if line <= 1 {
            return 0;
        }
        self.text
            .match_indices('\n')
            .nth(line - 2)
            .map(|(idx, _)| idx + 1)
            .unwrap_or(self.text.len())
    }

    /// Offset for a 1-based line and an optional 0-based character column.
    /// Without a column the point is the end of the line.
    pub fn point_at(&self, line: usize, column: Option<usize>) -> usize {
        let start = self.line_start(line);
        let region = self.line_region(start);
        match column {
            Some(col) => self.text[region.clone()]
                .char_indices()
                .nth(col)
                .map(|(idx, _)| region.start + idx)
                .unwrap_or(region.end),
            None => region.end,
        }
    }
}

impl TextBuffer for MemoryBuffer {
    fn size(&self) -> usize {
        self.text.len()
    }

    fn line_region(&self, point: usize) -> Range<usize> {
        let point = point.min(self.text.len());
        let start = self.text[..point].rfind('\n').map_or(0, |idx| idx + 1);
        let end = self.text[point..]
            .find('\n')
            .map_or(self.text.len(), |idx| point + idx);
        start..end
    }

    fn substr(&self, range: Range<usize>) -> String {
        self.text[range].to_string()
    }

    fn is_char_boundary(&self, point: usize) -> bool {
        self.text.is_char_boundary(point)
    }

    fn scope_name(&self, _point: usize) -> String {
        self.scope.clone()
    }

    fn insert(&mut self, point: usize, text: &str) {
        self.text.insert_str(point, text);
    }

    fn erase(&mut self, range: Range<usize>) {
        self.text.replace_range(range, "");
    }
}

/// Scope name for a file, derived from its extension.
pub fn scope_for_path(path: &str) -> String {
    match path.rsplit('.').next() {
        Some("coffee") => "source.coffee".to_string(),
        _ => "source.js".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_region_excludes_newline() {
        let buf = MemoryBuffer::new("ab\ncd\n", "source.js");
        assert_eq!(buf.line_region(0), 0..2);
        assert_eq!(buf.line_region(4), 3..5);
        assert_eq!(buf.line_region(2), 0..2);
    }

    #[test]
    fn read_line_past_end_is_none() {
        let buf = MemoryBuffer::new("ab\ncd", "source.js");
        assert_eq!(buf.read_line(3).as_deref(), Some("cd"));
        assert_eq!(buf.read_line(5), None);
    }

    #[test]
    fn char_boundaries_in_multibyte_text() {
        let buf = MemoryBuffer::new("/** é", "source.js");
        assert!(buf.is_char_boundary(4));
        assert!(!buf.is_char_boundary(5));
        assert!(buf.is_char_boundary(6));
        assert!(!buf.is_char_boundary(7));
    }

    #[test]
    fn points_from_line_and_column() {
        let buf = MemoryBuffer::new("/**\nfunction foo() {", "source.js");
        assert_eq!(buf.point_at(1, None), 3);
        assert_eq!(buf.point_at(2, Some(0)), 4);
        assert_eq!(buf.point_at(2, None), buf.size());
        assert_eq!(buf.point_at(9, None), buf.size());
    }

    #[test]
    fn apply_erases_then_inserts() {
        let mut buf = MemoryBuffer::new("/** trailing\nx", "source.js");
        buf.apply(&Edit {
            erase: Some(3..12),
            insert_at: 3,
            text: "\n * trailing\n */".to_string(),
        });
        assert_eq!(buf.text(), "/**\n * trailing\n */\nx");
    }

    #[test]
    fn scope_from_extension() {
        assert_eq!(scope_for_path("a/b.coffee"), "source.coffee");
        assert_eq!(scope_for_path("a/b.js"), "source.js");
        assert_eq!(scope_for_path("-"), "source.js");
    }
}
