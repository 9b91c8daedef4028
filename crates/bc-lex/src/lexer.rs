//! The scanner: turns a B source string into a token stream.
//!
//! Dispatch order mirrors the original scanner's longest-match-first
//! design: comments and whitespace, then keywords bucketed by length
//! (longest first so `"do"` doesn't swallow the front of `"double"`-like
//! extensions), then operators (3-char, 2-char, 1-char), then
//! delimiters, then the literal/name/assembly producers.

use bc_util::Span;

use crate::error::LexError;
use crate::token::{Token, TokenKind};
use crate::Cursor;

/// Keyword buckets, longest lexeme first. The original scanner's
/// length-6 check for `"default"` compares against a 7-character
/// lexeme and can never match — here the bucket length is corrected to
/// 7 so `default` actually lexes as a keyword rather than falling
/// through to [`Lexer::scan_name`]. `stdcall`/`cdecl` are folded into
/// the same length-keyed tables (they are absent from the original
/// scanner's keyword list entirely).
const KEYWORDS_7: &[(&str, TokenKind)] =
    &[("default", TokenKind::Default), ("stdcall", TokenKind::Stdcall)];
const KEYWORDS_6: &[(&str, TokenKind)] =
    &[("repeat", TokenKind::Repeat), ("switch", TokenKind::Switch), ("return", TokenKind::Return)];
const KEYWORDS_5: &[(&str, TokenKind)] =
    &[("extrn", TokenKind::Extrn), ("while", TokenKind::While), ("break", TokenKind::Break), ("cdecl", TokenKind::Cdecl)];
const KEYWORDS_4: &[(&str, TokenKind)] = &[
    ("auto", TokenKind::Auto),
    ("else", TokenKind::Else),
    ("goto", TokenKind::Goto),
    ("next", TokenKind::Next),
    ("case", TokenKind::Case),
];
const KEYWORDS_3: &[(&str, TokenKind)] = &[("for", TokenKind::For)];
const KEYWORDS_2: &[(&str, TokenKind)] = &[("if", TokenKind::If), ("do", TokenKind::Do)];

const OPS_3: &[&str] = &["<<=", ">>="];
const OPS_2: &[&str] = &[
    "++", "--", "<<", ">>", "<=", ">=", "==", "^=", "|=", "&=", "+=", "-=", "%=", "*=", "/=",
];
const OPS_1: &[char] =
    &['&', '!', '~', '*', '/', '%', '+', '-', '<', '>', '^', '|', '=', '?', ':'];

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source) }
    }

    /// Scans the entire source, returning every token or the first
    /// error encountered.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while !self.cursor.is_at_end() {
            if self.cursor.starts_with("/*") {
                self.skip_comment()?;
                continue;
            }
            let c = self.cursor.current_char();
            if c == ' ' || c == '\t' {
                self.cursor.advance();
                continue;
            }
            if c == '\n' {
                self.cursor.advance();
                continue;
            }

            if let Some(tok) = self.try_keyword() {
                tokens.push(tok);
                continue;
            }
            if let Some(tok) = self.try_operator() {
                tokens.push(tok);
                continue;
            }
            if let Some(tok) = self.try_delimiter() {
                tokens.push(tok);
                continue;
            }

            match c {
                '@' => tokens.push(self.scan_asm()?),
                '\'' => tokens.push(self.scan_char()?),
                '"' => tokens.push(self.scan_string()?),
                _ if c.is_ascii_digit() => tokens.push(self.scan_number()),
                _ if c.is_ascii_alphabetic() || c == '_' => tokens.push(self.scan_name()),
                _ => {
                    let span = self.point_span();
                    self.cursor.advance();
                    return Err(LexError::InvalidCharacter(c, span));
                }
            }
        }
        Ok(tokens)
    }

    fn point_span(&self) -> Span {
        Span::new(self.cursor.position(), self.cursor.position() + 1, self.cursor.line(), self.cursor.column())
    }

    fn skip_comment(&mut self) -> Result<(), LexError> {
        let start = self.point_span();
        self.cursor.advance_n(2);
        while !self.cursor.is_at_end() {
            if self.cursor.starts_with("*/") {
                self.cursor.advance_n(2);
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(LexError::UnterminatedComment { span: start })
    }

    fn try_keyword(&mut self) -> Option<Token> {
        for (buckets, len) in [
            (KEYWORDS_7, 7),
            (KEYWORDS_6, 6),
            (KEYWORDS_5, 5),
            (KEYWORDS_4, 4),
            (KEYWORDS_3, 3),
            (KEYWORDS_2, 2),
        ] {
            for (lexeme, kind) in buckets {
                if self.matches_keyword(lexeme, len) {
                    let start = self.point_span();
                    self.cursor.advance_n(len);
                    return Some(Token::new(kind.clone(), start));
                }
            }
        }
        None
    }

    /// A keyword must match the lexeme exactly AND not be followed by a
    /// further identifier character, or `"forever"` would lex as `for`
    /// plus a dangling `"ever"` name.
    fn matches_keyword(&self, lexeme: &str, len: usize) -> bool {
        if !self.cursor.starts_with(lexeme) {
            return false;
        }
        let next = self.cursor.peek_char(len);
        !(next.is_ascii_alphanumeric() || next == '_' || next == '@')
    }

    fn try_operator(&mut self) -> Option<Token> {
        for op in OPS_3 {
            if self.cursor.starts_with(op) {
                let start = self.point_span();
                self.cursor.advance_n(3);
                return Some(Token::new(TokenKind::Op((*op).to_string()), start));
            }
        }
        for op in OPS_2 {
            if self.cursor.starts_with(op) {
                let start = self.point_span();
                self.cursor.advance_n(2);
                return Some(Token::new(TokenKind::Op((*op).to_string()), start));
            }
        }
        let c = self.cursor.current_char();
        if OPS_1.contains(&c) {
            let start = self.point_span();
            self.cursor.advance();
            return Some(Token::new(TokenKind::Op(c.to_string()), start));
        }
        None
    }

    fn try_delimiter(&mut self) -> Option<Token> {
        let kind = match self.cursor.current_char() {
            '(' => TokenKind::SP,
            ')' => TokenKind::EP,
            '[' => TokenKind::SB,
            ']' => TokenKind::EB,
            '{' => TokenKind::SC,
            '}' => TokenKind::EC,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '\\' => TokenKind::BSlash,
            _ => return None,
        };
        let start = self.point_span();
        self.cursor.advance();
        Some(Token::new(kind, start))
    }

    fn scan_name(&mut self) -> Token {
        let start = self.point_span();
        let mut name = String::new();
        let mut digits_only = false;
        loop {
            let c = self.cursor.current_char();
            if digits_only {
                if !c.is_ascii_digit() {
                    break;
                }
            } else if c == '@' {
                digits_only = true;
            } else if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            name.push(c);
            self.cursor.advance();
        }
        Token::new(TokenKind::Name(name), start)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.point_span();
        let mut digits = String::new();
        let radix = if self.cursor.starts_with("0x") || self.cursor.starts_with("0X") {
            self.cursor.advance_n(2);
            16
        } else {
            10
        };
        while self.cursor.current_char().is_digit(radix) {
            digits.push(self.cursor.current_char());
            self.cursor.advance();
        }
        let value = i64::from_str_radix(&digits, radix).unwrap_or(0);
        Token::new(TokenKind::Number(value), start)
    }

    /// Resolves a `*x` escape to its character value, matching
    /// `lexer.py`'s `esc_char` table exactly.
    fn escape_char(&mut self, start: Span) -> Result<char, LexError> {
        self.cursor.advance(); // consume '*'
        let c = self.cursor.current_char();
        let resolved = match c {
            '0' => '\0',
            'e' => '\u{04}',
            '(' => '{',
            ')' => '}',
            't' => '\t',
            '*' => '*',
            '\'' => '\'',
            '"' => '"',
            'n' => '\n',
            _ => return Err(LexError::UnknownEscape(c, start)),
        };
        self.cursor.advance();
        Ok(resolved)
    }

    fn scan_asm(&mut self) -> Result<Token, LexError> {
        let start = self.point_span();
        self.cursor.advance(); // consume '@'
        let mut body = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedAsm { span: start });
            }
            let c = self.cursor.current_char();
            if c == ';' || c == '}' {
                // Terminator is left for the parser/codegen to consume.
                return Ok(Token::new(TokenKind::Asm(body.trim().to_string()), start));
            } else if c == '\n' {
                self.cursor.advance();
                body.push('\n');
            } else if c == '*' {
                let esc_start = self.point_span();
                body.push(self.escape_char(esc_start)?);
            } else {
                body.push(c);
                self.cursor.advance();
            }
        }
    }

    fn scan_char(&mut self) -> Result<Token, LexError> {
        let start = self.point_span();
        self.cursor.advance(); // consume opening quote
        let mut value: i64 = 0;
        let mut shift = 0u32;
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedChar { span: start });
            }
            let c = self.cursor.current_char();
            if c == '\'' {
                self.cursor.advance();
                return Ok(Token::new(TokenKind::Number(value), start));
            } else if c == '\n' {
                self.cursor.advance();
            } else if c == '*' {
                let esc_start = self.point_span();
                let resolved = self.escape_char(esc_start)?;
                value += (resolved as i64) << shift;
                shift += 8;
            } else {
                value += (c as i64) << shift;
                shift += 8;
                self.cursor.advance();
            }
        }
    }

    /// Packs a string literal into machine words, 4 characters per
    /// word, little-endian, always terminated by a zero word — matching
    /// `lexer.py`'s `mstring` exactly, packing granularity included.
    fn scan_string(&mut self) -> Result<Token, LexError> {
        let start = self.point_span();
        self.cursor.advance(); // consume opening quote
        let mut words = Vec::new();
        let mut current: i64 = 0;
        let mut i: u32 = 0;
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString { span: start });
            }
            let c = self.cursor.current_char();
            if c == '"' {
                self.cursor.advance();
                if i % 4 == 0 {
                    words.push(current);
                    current = 0;
                }
                words.push(current);
                return Ok(Token::new(TokenKind::Str(words), start));
            } else if c == '\n' {
                self.cursor.advance();
            } else if c == '*' {
                let esc_start = self.point_span();
                let resolved = self.escape_char(esc_start)?;
                current += (resolved as i64) << ((i % 4) * 8);
                i += 1;
            } else {
                current += (c as i64) << ((i % 4) * 8);
                i += 1;
                self.cursor.advance();
            }
            if i % 4 == 0 {
                words.push(current);
                current = 0;
            }
        }
    }
}
