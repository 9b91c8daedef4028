//! Infix-to-postfix expression reordering (shunting-yard).
//!
//! Grounded on `rpn.py`: an explicit operator stack, unary-operator
//! retagging (`"u"` prefix) driven by a single `expect_operand` flag,
//! and function-call markers synthesized at `(`/`)` boundaries. Several
//! of the original's behaviors are quirky rather than textbook
//! shunting-yard and are preserved deliberately (see module docs on
//! [`PostfixItem`] and [`RpnError`] — decisions recorded in the
//! project's design notes):
//!
//! - A comma inside a call's argument list is pushed onto the operator
//!   stack like a bracket, not popped by precedence; it only reaches
//!   the output when a later `)` unwinds the stack. This reorders
//!   argument operators relative to naive shunting-yard.
//! - `[` is both pushed onto the operator stack *and* emitted to the
//!   output immediately, so the codegen stage sees an explicit
//!   bracket-pair marker rather than inferring indexing from operand
//!   shape.
//! - Associativity at an equal-precedence tie is decided by the
//!   *incoming* operator, not the one sitting on the stack.

use bc_util::Span;

use crate::error::RpnError;

/// One input item feeding the reorderer — the slice of tokens that
/// make up a single expression, already stripped of surrounding
/// statement syntax by the parser.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprToken {
    Name(String, Span),
    Number(i64, Span),
    Str(Vec<i64>, Span),
    Op(String, Span),
    SP(Span),
    EP(Span),
    SB(Span),
    EB(Span),
    Comma(Span),
}

impl ExprToken {
    fn span(&self) -> Span {
        match self {
            ExprToken::Name(_, s)
            | ExprToken::Number(_, s)
            | ExprToken::Str(_, s)
            | ExprToken::Op(_, s)
            | ExprToken::SP(s)
            | ExprToken::EP(s)
            | ExprToken::SB(s)
            | ExprToken::EB(s)
            | ExprToken::Comma(s) => *s,
        }
    }
}

/// Postfix (RPN) output item. `Func` and the `SB`/`EB` bracket markers
/// are synthetic — they don't correspond 1:1 to input tokens, but to
/// points the codegen walker needs to recognize a call or an index
/// operation.
#[derive(Clone, Debug, PartialEq)]
pub enum PostfixItem {
    Name(String, Span),
    Number(i64, Span),
    Str(Vec<i64>, Span),
    /// Operator lexeme, already unary-tagged (`"u-"`, `"u++"`, ...)
    /// where applicable.
    Op(String, Span),
    Comma(Span),
    SB(Span),
    EB(Span),
    /// A call to `name`; its argument count is recovered by the
    /// codegen walker counting `Comma` markers back to the matching
    /// call boundary.
    Func(String, Span),
}

#[derive(Clone, Debug)]
enum StackItem {
    Op(String, Span),
    SP(Span),
    SB(Span),
    Comma(Span),
    Func(String, Span),
}

const UNARY_OPS: &[&str] = &["+", "-", "!", "*", "&", "++", "--"];

/// `(precedence, left_associative)` for every binary/unary operator
/// lexeme, matching `rpn.py`'s `self.ops` table exactly.
fn precedence(op: &str) -> (u8, bool) {
    match op {
        "++" | "--" => (13, true),
        "u++" | "u--" | "u+" | "u-" | "u!" | "u*" | "u&" => (12, false),
        "*" | "/" | "%" => (11, true),
        "+" | "-" => (10, true),
        "<<" | ">>" => (9, true),
        "<" | "<=" | ">" | ">=" => (8, true),
        "==" | "!=" => (7, true),
        "&" => (6, true),
        "^" => (5, true),
        "|" => (4, true),
        "?" | ":" => (3, false),
        "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "<<=" | ">>=" | "&=" | "^=" | "|=" => (2, false),
        "," => (1, true),
        _ => (0, false),
    }
}

pub struct Rpn {
    input: Vec<ExprToken>,
    pos: usize,
    output: Vec<PostfixItem>,
    stack: Vec<StackItem>,
    /// True when the next operator encountered should be read as unary
    /// (start of expression, right after another operator, or right
    /// after an opening bracket/comma).
    expect_operand: bool,
}

impl Rpn {
    pub fn new(input: Vec<ExprToken>) -> Self {
        Self { input, pos: 0, output: Vec::new(), stack: Vec::new(), expect_operand: true }
    }

    fn peek(&self, offset: usize) -> Option<&ExprToken> {
        self.input.get(self.pos + offset)
    }

    fn discard(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn reorder(mut self) -> Result<Vec<PostfixItem>, RpnError> {
        while self.pos < self.input.len() {
            self.step()?;
        }
        while let Some(item) = self.stack.pop() {
            self.output.push(Self::stack_item_to_output(item));
        }
        Ok(self.output)
    }

    fn step(&mut self) -> Result<(), RpnError> {
        // Retag a leading unary operator in place before inspecting it.
        if self.expect_operand {
            if let Some(ExprToken::Op(lexeme, span)) = self.peek(0) {
                if UNARY_OPS.contains(&lexeme.as_str()) {
                    let tagged = format!("u{lexeme}");
                    self.input[self.pos] = ExprToken::Op(tagged, *span);
                }
            }
        }

        let is_empty_call = matches!(self.peek(0), Some(ExprToken::Name(..)))
            && matches!(self.peek(1), Some(ExprToken::SP(_)))
            && matches!(self.peek(2), Some(ExprToken::EP(_)));
        if is_empty_call {
            if let Some(ExprToken::Name(name, span)) = self.peek(0).cloned() {
                self.output.push(PostfixItem::Func(name, span));
                self.discard(3);
                self.expect_operand = false;
                return Ok(());
            }
        }

        let is_call_with_args = matches!(self.peek(0), Some(ExprToken::Name(..)))
            && matches!(self.peek(1), Some(ExprToken::SP(_)));
        if is_call_with_args {
            if let Some(ExprToken::Name(name, span)) = self.peek(0).cloned() {
                self.stack.push(StackItem::Func(name, span));
                self.discard(1);
                self.expect_operand = false;
                return Ok(());
            }
        }

        match self.peek(0).cloned() {
            Some(ExprToken::Name(name, span)) => {
                self.output.push(PostfixItem::Name(name, span));
                self.discard(1);
                self.expect_operand = false;
            }
            Some(ExprToken::Number(n, span)) => {
                self.output.push(PostfixItem::Number(n, span));
                self.discard(1);
                self.expect_operand = false;
            }
            Some(ExprToken::Str(words, span)) => {
                self.output.push(PostfixItem::Str(words, span));
                self.discard(1);
                self.expect_operand = false;
            }
            Some(ExprToken::SP(span)) => {
                self.stack.push(StackItem::SP(span));
                self.discard(1);
                self.expect_operand = true;
            }
            Some(ExprToken::EP(_)) => {
                self.close_paren()?;
                self.expect_operand = false;
            }
            Some(ExprToken::SB(span)) => {
                self.stack.push(StackItem::SB(span));
                self.output.push(PostfixItem::SB(span));
                self.discard(1);
                self.expect_operand = true;
            }
            Some(ExprToken::EB(_)) => {
                self.close_bracket()?;
                self.expect_operand = false;
            }
            Some(ExprToken::Comma(span)) => {
                self.stack.push(StackItem::Comma(span));
                self.discard(1);
                self.expect_operand = true;
            }
            Some(ExprToken::Op(lexeme, span)) => {
                self.push_operator(&lexeme, span)?;
                self.expect_operand = true;
            }
            None => unreachable!("step called past end of input"),
        }
        Ok(())
    }

    fn push_operator(&mut self, lexeme: &str, span: Span) -> Result<(), RpnError> {
        let (incoming_prec, incoming_left_assoc) = precedence(lexeme);
        loop {
            let should_pop = match self.stack.last() {
                Some(StackItem::Op(top_lexeme, _)) => {
                    let (top_prec, _) = precedence(top_lexeme);
                    top_prec > incoming_prec || (top_prec == incoming_prec && incoming_left_assoc)
                }
                _ => false,
            };
            if !should_pop {
                break;
            }
            let top = self.stack.pop().unwrap();
            self.output.push(Self::stack_item_to_output(top));
        }
        self.stack.push(StackItem::Op(lexeme.to_string(), span));
        self.discard(1);
        Ok(())
    }

    fn close_paren(&mut self) -> Result<(), RpnError> {
        let span = self.peek(0).unwrap().span();
        self.discard(1);
        while !matches!(self.stack.last(), Some(StackItem::SP(_)) | None) {
            let top = self.stack.pop().unwrap();
            self.output.push(Self::stack_item_to_output(top));
        }
        match self.stack.pop() {
            Some(StackItem::SP(_)) => {}
            _ => return Err(RpnError::MismatchedParen { span }),
        }
        if let Some(StackItem::Func(..)) = self.stack.last() {
            self.output.push(PostfixItem::Comma(span));
            let func = self.stack.pop().unwrap();
            self.output.push(Self::stack_item_to_output(func));
        }
        Ok(())
    }

    fn close_bracket(&mut self) -> Result<(), RpnError> {
        let (span, closing) = match self.peek(0) {
            Some(ExprToken::EB(s)) => (*s, PostfixItem::EB(*s)),
            _ => unreachable!(),
        };
        self.discard(1);
        while !matches!(self.stack.last(), Some(StackItem::SB(_)) | None) {
            let top = self.stack.pop().unwrap();
            self.output.push(Self::stack_item_to_output(top));
        }
        match self.stack.pop() {
            Some(StackItem::SB(_)) => {}
            _ => return Err(RpnError::MismatchedBracket { span }),
        }
        self.output.push(closing);
        Ok(())
    }

    fn stack_item_to_output(item: StackItem) -> PostfixItem {
        match item {
            StackItem::Op(lexeme, span) => PostfixItem::Op(lexeme, span),
            StackItem::Comma(span) => PostfixItem::Comma(span),
            StackItem::Func(name, span) => PostfixItem::Func(name, span),
            // `(`/`[` are always popped explicitly by `close_paren`/
            // `close_bracket` on a well-formed expression; the parser
            // only ever hands `reorder` a token span that already
            // balances, so these never survive to end-of-input.
            StackItem::SP(_) | StackItem::SB(_) => {
                unreachable!("unbalanced bracket escaped expression scoping")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(s: &str) -> ExprToken {
        ExprToken::Op(s.to_string(), Span::default())
    }
    fn name(s: &str) -> ExprToken {
        ExprToken::Name(s.to_string(), Span::default())
    }
    fn num(n: i64) -> ExprToken {
        ExprToken::Number(n, Span::default())
    }

    #[test]
    fn simple_infix_to_postfix() {
        // a + b * c -> a b c * +
        let input = vec![name("a"), op("+"), name("b"), op("*"), name("c")];
        let out = Rpn::new(input).reorder().unwrap();
        assert_eq!(
            out,
            vec![
                PostfixItem::Name("a".into(), Span::default()),
                PostfixItem::Name("b".into(), Span::default()),
                PostfixItem::Name("c".into(), Span::default()),
                PostfixItem::Op("*".into(), Span::default()),
                PostfixItem::Op("+".into(), Span::default()),
            ]
        );
    }

    #[test]
    fn leading_minus_is_tagged_unary() {
        let input = vec![op("-"), name("a")];
        let out = Rpn::new(input).reorder().unwrap();
        assert_eq!(
            out,
            vec![
                PostfixItem::Name("a".into(), Span::default()),
                PostfixItem::Op("u-".into(), Span::default()),
            ]
        );
    }

    #[test]
    fn empty_call_emits_func_directly() {
        let input = vec![name("f"), ExprToken::SP(Span::default()), ExprToken::EP(Span::default())];
        let out = Rpn::new(input).reorder().unwrap();
        assert_eq!(out, vec![PostfixItem::Func("f".into(), Span::default())]);
    }

    #[test]
    fn call_with_one_arg() {
        // f(a) -> a FUNC(f) preceded by a synthetic comma
        let input =
            vec![name("f"), ExprToken::SP(Span::default()), name("a"), ExprToken::EP(Span::default())];
        let out = Rpn::new(input).reorder().unwrap();
        assert_eq!(
            out,
            vec![
                PostfixItem::Name("a".into(), Span::default()),
                PostfixItem::Comma(Span::default()),
                PostfixItem::Func("f".into(), Span::default()),
            ]
        );
    }

    #[test]
    fn mismatched_paren_errors() {
        let input = vec![name("a"), ExprToken::EP(Span::default())];
        assert!(Rpn::new(input).reorder().is_err());
    }

    #[test]
    fn indexing_emits_bracket_markers() {
        // a[b] -> a SB b EB
        let input =
            vec![name("a"), ExprToken::SB(Span::default()), name("b"), ExprToken::EB(Span::default())];
        let out = Rpn::new(input).reorder().unwrap();
        assert_eq!(
            out,
            vec![
                PostfixItem::Name("a".into(), Span::default()),
                PostfixItem::SB(Span::default()),
                PostfixItem::Name("b".into(), Span::default()),
                PostfixItem::EB(Span::default()),
            ]
        );
    }
}
