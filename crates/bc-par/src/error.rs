//! Reorderer and parser/codegen error taxonomies.
//!
//! Codes reuse the originals' numbering (`rpn.py`'s ad-hoc codes,
//! `error.py`'s `Error` enum, and `parse.py`'s scattered `self.error(N)`
//! call sites) so a generated diagnostic's code is stable across the
//! port.

use bc_util::{Span, Stage, StageDiagnostic};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RpnError {
    #[error("mismatched parenthesis")]
    MismatchedParen { span: Span },

    #[error("mismatched bracket")]
    MismatchedBracket { span: Span },

    #[error("unexpected token in expression")]
    UnexpectedToken { span: Span },
}

impl StageDiagnostic for RpnError {
    fn stage(&self) -> Stage {
        Stage::Rpn
    }

    fn code(&self) -> i32 {
        match self {
            RpnError::MismatchedParen { .. } => 23,
            RpnError::MismatchedBracket { .. } => 28,
            RpnError::UnexpectedToken { .. } => 300,
        }
    }

    fn span(&self) -> Span {
        match self {
            RpnError::MismatchedParen { span }
            | RpnError::MismatchedBracket { span }
            | RpnError::UnexpectedToken { span } => *span,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// An expression's reordering failed. Kept as a distinct variant
    /// (rather than flattened into [`ParseError::UnhandledOperator`])
    /// so [`StageDiagnostic::stage`] still reports `Stage::Rpn` for it
    /// — the stage tag follows which stage actually raised the error,
    /// not which stage's `Result` it surfaces through.
    #[error(transparent)]
    Rpn(#[from] RpnError),

    #[error("redefined existing variable '{0}'")]
    RedefinedVar(String, Span),

    #[error("redefined existing function '{0}'")]
    RedefinedFunc(String, Span),

    /// A function name already has a `funcs` entry (from an earlier
    /// prototype or definition) and this declaration isn't the one
    /// allowed exception: a non-prototype definition completing an
    /// earlier prototype-only declaration. Distinct from
    /// [`ParseError::RedefinedFunc`], which guards the separate
    /// `names` check a few lines earlier in `do_func` — prototypes
    /// never enter `names`, so two prototypes of the same function
    /// only trip this check.
    #[error("function '{0}' already declared")]
    DuplicateFunctionDeclaration(String, Span),

    #[error("cannot return outside of a function")]
    ReturnOutsideFunc(Span),

    #[error("cannot break outside of a loop")]
    BreakOutsideLoop(Span),

    #[error("cannot next outside of a loop")]
    NextOutsideLoop(Span),

    #[error("expected a semicolon")]
    ExpectSemicolon(Span),

    #[error("expected a comma")]
    ExpectComma(Span),

    #[error("expected '('")]
    ExpectSP(Span),

    #[error("expected ')'")]
    ExpectEP(Span),

    #[error("expected '{{'")]
    ExpectSC(Span),

    #[error("use of undeclared name '{0}'")]
    UndeclaredName(String, Span),

    #[error("goto is not supported")]
    GotoUnsupported(Span),

    /// Matches `parse.py`'s `math()` falling through to its generic
    /// `self.error(4)` ("I don't know what to do with this operator")
    /// branch for the six compound assignments listed in the
    /// precedence table but never given a dedicated handler.
    #[error("operator '{0}' has no code generator")]
    UnhandledOperator(String, Span),

    #[error("unexpected end of input while parsing a statement")]
    UnexpectedEof(Span),

    #[error("call to undeclared function '{0}'")]
    UnknownFunction(String, Span),

    /// An operand of the wrong shape (kind / resolution) reached an
    /// operator case that can't use it — e.g. a bare string literal as
    /// the left-hand side of `+`. The original scanner raised dozens
    /// of distinct ad-hoc numeric codes for these (one per `math()`
    /// branch); `code` carries that original number directly rather
    /// than naming 20-odd near-identical variants.
    #[error("operand has an unexpected shape for this operator")]
    InvalidOperand(i32, Span),
}

impl StageDiagnostic for ParseError {
    fn stage(&self) -> Stage {
        match self {
            ParseError::Rpn(e) => e.stage(),
            _ => Stage::Parser,
        }
    }

    fn code(&self) -> i32 {
        match self {
            ParseError::Rpn(e) => e.code(),
            ParseError::RedefinedVar(..) => 301,
            ParseError::RedefinedFunc(..) => 302,
            ParseError::DuplicateFunctionDeclaration(..) => 554,
            ParseError::ReturnOutsideFunc(..) => 303,
            ParseError::BreakOutsideLoop(..) => 304,
            ParseError::NextOutsideLoop(..) => 305,
            ParseError::ExpectSemicolon(..) => 306,
            ParseError::ExpectComma(..) => 307,
            ParseError::ExpectSP(..) => 308,
            ParseError::ExpectEP(..) => 309,
            ParseError::ExpectSC(..) => 332,
            ParseError::UndeclaredName(..) => 400,
            ParseError::GotoUnsupported(..) => 500,
            ParseError::UnhandledOperator(..) => 4,
            ParseError::UnexpectedEof(..) => 600,
            ParseError::UnknownFunction(..) => 701,
            ParseError::InvalidOperand(code, _) => *code,
        }
    }

    fn span(&self) -> Span {
        match self {
            ParseError::Rpn(e) => e.span(),
            ParseError::RedefinedVar(_, s)
            | ParseError::RedefinedFunc(_, s)
            | ParseError::DuplicateFunctionDeclaration(_, s)
            | ParseError::ReturnOutsideFunc(s)
            | ParseError::BreakOutsideLoop(s)
            | ParseError::NextOutsideLoop(s)
            | ParseError::ExpectSemicolon(s)
            | ParseError::ExpectComma(s)
            | ParseError::ExpectSP(s)
            | ParseError::ExpectEP(s)
            | ParseError::ExpectSC(s)
            | ParseError::UndeclaredName(_, s)
            | ParseError::GotoUnsupported(s)
            | ParseError::UnhandledOperator(_, s)
            | ParseError::UnexpectedEof(s)
            | ParseError::UnknownFunction(_, s)
            | ParseError::InvalidOperand(_, s) => *s,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
