//! Diagnostic rendering shared by all three fallible stages.
//!
//! Each stage needs a routine that prints the offending line, a caret
//! under the current column, and a stage tag with the error code. That
//! routine lives here, threaded through a shared `SourceMap` rather than
//! duplicated per stage or reached through stage-owned state; stages
//! return `Result`, and `bc-drv` is the only place that prints a
//! diagnostic and exits the process.

use crate::span::{SourceMap, Span};

/// Which pipeline stage raised a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Rpn,
    Parser,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Lexer => "Lexer",
            Stage::Rpn => "RPN",
            Stage::Parser => "Parser",
        };
        f.write_str(name)
    }
}

/// Anything that can be reported as a terminal compiler diagnostic.
///
/// All three stage error types (`bc_lex::LexError`, `bc_par::RpnError`,
/// `bc_par::ParseError`) implement this so [`report`] can render them
/// uniformly.
pub trait StageDiagnostic {
    fn stage(&self) -> Stage;
    fn code(&self) -> i32;
    fn span(&self) -> Span;
    fn message(&self) -> String;
}

/// Renders a diagnostic in the shape every stage shares:
///
/// ```text
/// <offending source line, tabs collapsed to spaces>
/// <caret aligned under the error column>
/// <Stage> Error #<code> at <line>:<column>
/// <message>
/// ```
pub fn report(sources: &SourceMap, err: &dyn StageDiagnostic) -> String {
    let span = err.span();
    let line_text = sources.line_text(span.line).replace('\t', " ");
    let caret_indent = (span.column as usize).saturating_sub(1);
    format!(
        "{line}\n{caret:>width$}\n{stage} Error #{code} at {l}:{c}\n{msg}\n",
        line = line_text,
        caret = "^",
        width = caret_indent + 1,
        stage = err.stage(),
        code = err.code(),
        l = span.line,
        c = span.column,
        msg = err.message(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;
    impl StageDiagnostic for Dummy {
        fn stage(&self) -> Stage {
            Stage::Lexer
        }
        fn code(&self) -> i32 {
            88
        }
        fn span(&self) -> Span {
            Span::new(3, 4, 1, 4)
        }
        fn message(&self) -> String {
            "invalid character '$'".to_string()
        }
    }

    #[test]
    fn renders_caret_under_column() {
        let sources = SourceMap::new("a $b;\n".to_string());
        let rendered = report(&sources, &Dummy);
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("a $b;"));
        assert_eq!(lines.next(), Some("   ^"));
        assert_eq!(lines.next(), Some("Lexer Error #88 at 1:4"));
    }
}
