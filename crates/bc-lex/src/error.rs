//! Lexical error taxonomy.
//!
//! Codes match the reference B compiler's lexer exactly, including its
//! reuse of code `0` for two distinct conditions (unterminated comment,
//! unknown escape) — preserved here rather than split apart.

use bc_util::{Span, Stage, StageDiagnostic};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unterminated comment")]
    UnterminatedComment { span: Span },

    #[error("unterminated character constant")]
    UnterminatedChar { span: Span },

    #[error("unterminated string constant")]
    UnterminatedString { span: Span },

    #[error("unterminated inline assembly")]
    UnterminatedAsm { span: Span },

    #[error("unknown escape sequence '*{0}'")]
    UnknownEscape(char, Span),

    #[error("unexpected character '{0}'")]
    InvalidCharacter(char, Span),
}

impl LexError {
    fn raw_code(&self) -> i32 {
        match self {
            LexError::UnterminatedComment { .. } => 0,
            LexError::UnterminatedChar { .. } => 1,
            LexError::UnterminatedString { .. } => 1,
            LexError::UnterminatedAsm { .. } => 111,
            LexError::UnknownEscape(..) => 0,
            LexError::InvalidCharacter(..) => 88,
        }
    }
}

impl StageDiagnostic for LexError {
    fn stage(&self) -> Stage {
        Stage::Lexer
    }

    fn code(&self) -> i32 {
        self.raw_code()
    }

    fn span(&self) -> Span {
        match self {
            LexError::UnterminatedComment { span }
            | LexError::UnterminatedChar { span }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedAsm { span }
            | LexError::UnknownEscape(_, span)
            | LexError::InvalidCharacter(_, span) => *span,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
