//! Token kinds produced by the scanner.

use bc_util::Span;

/// One lexical token. `kind` carries the payload inline (a `String` for
/// names/operators/assembly, an `i64` for numbers, a packed word vector
/// for strings); `span` is the token's source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The operator/punctuation lexeme this token's kind carries, if any
    /// — used by the RPN reorderer's precedence lookups.
    pub fn op_lexeme(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Op(s) => Some(s.as_str()),
            TokenKind::SP => Some("("),
            TokenKind::EP => Some(")"),
            TokenKind::SB => Some("["),
            TokenKind::EB => Some("]"),
            TokenKind::Comma => Some(","),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Name(String),
    Number(i64),
    /// Packed string constant: one machine word per element, already
    /// including the terminator word(s).
    Str(Vec<i64>),
    /// Inline-assembly payload, whitespace-trimmed.
    Asm(String),
    /// An operator lexeme (`+`, `==`, `<<=`, ...). Delimiters get their
    /// own kinds below rather than living in here.
    Op(String),
    SP,
    EP,
    SB,
    EB,
    SC,
    EC,
    Comma,
    Semicolon,
    BSlash,
    Auto,
    Extrn,
    If,
    Else,
    While,
    Repeat,
    Do,
    For,
    Switch,
    Case,
    Default,
    Goto,
    Return,
    Break,
    Next,
    Stdcall,
    Cdecl,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Auto
                | TokenKind::Extrn
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Repeat
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Goto
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Next
                | TokenKind::Stdcall
                | TokenKind::Cdecl
        )
    }
}
