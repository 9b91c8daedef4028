//! Scanner stage: B source text to a token stream.

mod cursor;
mod error;
mod lexer;
mod token;

pub use cursor::Cursor;
pub use error::LexError;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_take_priority_over_names() {
        assert_eq!(kinds("if"), vec![TokenKind::If]);
        assert_eq!(kinds("default"), vec![TokenKind::Default]);
        assert_eq!(kinds("stdcall"), vec![TokenKind::Stdcall]);
    }

    #[test]
    fn keyword_prefix_does_not_clip_longer_names() {
        assert_eq!(kinds("forever"), vec![TokenKind::Name("forever".to_string())]);
        assert_eq!(kinds("ifdef"), vec![TokenKind::Name("ifdef".to_string())]);
    }

    #[test]
    fn name_allows_at_digit_suffix() {
        assert_eq!(kinds("foo@1"), vec![TokenKind::Name("foo@1".to_string())]);
    }

    #[test]
    fn hex_number_normalizes_to_decimal() {
        assert_eq!(kinds("0x1F"), vec![TokenKind::Number(31)]);
    }

    #[test]
    fn longest_operator_match_wins() {
        assert_eq!(kinds("<<="), vec![TokenKind::Op("<<=".to_string())]);
        assert_eq!(kinds("<<"), vec![TokenKind::Op("<<".to_string())]);
        assert_eq!(kinds("<"), vec![TokenKind::Op("<".to_string())]);
    }

    #[test]
    fn char_literal_packs_right_justified() {
        // 'a' == *0*0*0a -> only the low byte set.
        assert_eq!(kinds("'a'"), vec![TokenKind::Number('a' as i64)]);
    }

    #[test]
    fn empty_string_is_single_zero_word() {
        assert_eq!(kinds("\"\""), vec![TokenKind::Str(vec![0])]);
    }

    #[test]
    fn string_packs_four_chars_per_word_with_terminator() {
        // "abcd" is exactly one full word, so mstring appends a second
        // all-zero terminator word.
        let packed = match &kinds("\"abcd\"")[0] {
            TokenKind::Str(words) => words.clone(),
            _ => panic!("expected string token"),
        };
        let expected_word =
            (b'a' as i64) | ((b'b' as i64) << 8) | ((b'c' as i64) << 16) | ((b'd' as i64) << 24);
        assert_eq!(packed, vec![expected_word, 0]);
    }

    #[test]
    fn inline_asm_stops_before_terminator() {
        let toks = Lexer::new("@mov ax, bx;").tokenize().unwrap();
        assert_eq!(toks[0].kind, TokenKind::Asm("mov ax, bx".to_string()));
        assert_eq!(toks[1].kind, TokenKind::Semicolon);
    }

    #[test]
    fn unterminated_comment_errors() {
        assert!(Lexer::new("/* never closes").tokenize().is_err());
    }

    #[test]
    fn escape_sequences_resolve() {
        let toks = Lexer::new("'*n'").tokenize().unwrap();
        assert_eq!(toks[0].kind, TokenKind::Number('\n' as i64));
    }
}
