//! Source locations.
//!
//! Every token and diagnostic carries a [`Span`]: a byte range plus the
//! 1-based line/column of its start, computed once up front so stages never
//! need to re-scan the source to report an error.

/// A byte range in a source buffer, with the 1-based line/column of its
/// start precomputed for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    /// A zero-length span at the start of input. Used for errors raised
    /// before any token has been produced (e.g. empty input).
    pub fn start_of_file() -> Self {
        Self { start: 0, end: 0, line: 1, column: 1 }
    }
}

/// A loaded source buffer plus its line start offsets, so a byte offset
/// can be turned back into a displayable source line.
///
/// The compiler concatenates library headers, user sources and library
/// bodies into a single translation unit with no separate compilation;
/// `SourceMap` holds that single concatenated buffer.
pub struct SourceMap {
    content: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(content: String) -> Self {
        let line_starts = Self::compute_line_starts(&content);
        Self { content, line_starts }
    }

    fn compute_line_starts(content: &str) -> Vec<usize> {
        let mut starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                starts.push(i + 1);
            }
        }
        starts
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the text of the 1-based line `line`, with tabs replaced by
    /// single spaces so the caret line below it lines up (matches the
    /// original compiler's `line.replace("\t", " ")`).
    pub fn line_text(&self, line: u32) -> &str {
        let idx = (line as usize).saturating_sub(1);
        let start = *self.line_starts.get(idx).unwrap_or(&self.content.len());
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&e| e.saturating_sub(1))
            .unwrap_or(self.content.len());
        self.content.get(start..end.max(start)).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_text_extracts_requested_line() {
        let map = SourceMap::new("main() {\n  return(0);\n}\n".to_string());
        assert_eq!(map.line_text(1), "main() {");
        assert_eq!(map.line_text(2), "  return(0);");
        assert_eq!(map.line_text(3), "}");
    }
}
