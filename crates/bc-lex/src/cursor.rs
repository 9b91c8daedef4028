//! Character cursor for traversing B source.
//!
//! Tracks byte position plus 1-based line/column so the lexer can stamp
//! every token with a [`bc_util::Span`] as it's produced.

pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, position: 0, line: 1, column: 1 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Current character, or `'\0'` past the end of input.
    pub fn current_char(&self) -> char {
        self.peek_char(0)
    }

    /// Character `offset` positions ahead of the cursor (0 = current).
    pub fn peek_char(&self, offset: usize) -> char {
        self.source[self.position..].chars().nth(offset).unwrap_or('\0')
    }

    /// True if the upcoming characters match `s` exactly.
    pub fn starts_with(&self, s: &str) -> bool {
        self.source[self.position..].starts_with(s)
    }

    /// Consumes one character, updating line/column bookkeeping. `\n`
    /// advances the line counter and resets the column.
    pub fn advance(&mut self) -> char {
        let c = self.current_char();
        if c != '\0' {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    /// Consumes `n` characters.
    pub fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.is_at_end() {
                break;
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_resets_column_and_bumps_line() {
        let mut c = Cursor::new("a\nb");
        assert_eq!(c.advance(), 'a');
        assert_eq!((c.line(), c.column()), (1, 2));
        assert_eq!(c.advance(), '\n');
        assert_eq!((c.line(), c.column()), (2, 1));
        assert_eq!(c.advance(), 'b');
        assert_eq!((c.line(), c.column()), (2, 2));
    }

    #[test]
    fn peek_past_end_is_nul() {
        let c = Cursor::new("ab");
        assert_eq!(c.peek_char(5), '\0');
    }
}
