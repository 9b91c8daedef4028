//! Statement-level parsing and top-level driving of the codegen
//! walker.
//!
//! Grounded on `parse.py`'s `Parser.parser()` dispatch loop and its
//! `do_*` handlers, one per statement form. Expression statements
//! (`do_math`, `do_return`, the condition of `if`/`while`) collect a
//! raw token slice up to the statement terminator, hand it to
//! [`crate::rpn::Rpn`], then walk the result with
//! [`crate::codegen::Codegen`] — the same three-stage pipeline the
//! original runs inline inside `math()`.

use bc_lex::{Token, TokenKind};
use bc_gen::{Segment, Segments};
use bc_util::{Span, Target};

use crate::codegen::{Codegen, Operand};
use crate::error::ParseError;
use crate::rpn::{ExprToken, PostfixItem, Rpn};
use crate::state::{CallConv, CompoundFrame, FrameKind, FunctionRecord, ParserState};

/// Functions defined (not just declared) in this translation unit, in
/// declaration order — needed by the emitter to build `global` lines.
pub struct ParsedUnit {
    pub segments: Segments,
    pub funcs: std::collections::BTreeMap<String, FunctionRecord>,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    state: ParserState,
    segments: Segments,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, target: Target) -> Self {
        Self { tokens, pos: 0, state: ParserState::new(target), segments: Segments::new() }
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.peek(offset).map(|t| &t.kind)
    }

    fn current_span(&self) -> Span {
        self.peek(0).map(|t| t.span).unwrap_or_default()
    }

    fn discard(&mut self, n: usize) {
        self.pos += n;
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.segments.push(Segment::Text, line.into());
    }

    fn emit_pretty(&mut self) {
        self.segments.push_pretty(Segment::Text);
    }

    pub fn parse(mut self) -> Result<ParsedUnit, ParseError> {
        while self.pos < self.tokens.len() {
            if self.state.next_simple {
                self.state.next_simple = false;
                self.state.in_simple = true;
            }

            let is_func_start = matches!(self.peek_kind(0), Some(TokenKind::Name(n))
                if matches!(self.peek_kind(1), Some(TokenKind::SP))
                    && !self.state.in_func
                    && !self.state.names.contains(n));

            if is_func_start {
                self.do_func()?;
            } else if matches!(self.peek_kind(0), Some(TokenKind::Name(_))) && self.state.in_func {
                self.do_math_statement()?;
            } else if matches!(self.peek_kind(0), Some(TokenKind::Name(_))) && !self.state.in_func {
                self.do_extern_data()?;
            } else {
                match self.peek_kind(0) {
                    Some(TokenKind::Stdcall) | Some(TokenKind::Cdecl) => self.do_func()?,
                    Some(TokenKind::Auto) => self.do_auto()?,
                    Some(TokenKind::Extrn) => self.do_extrn()?,
                    Some(TokenKind::Asm(_)) => self.do_asm()?,
                    Some(TokenKind::Goto) => return Err(ParseError::GotoUnsupported(self.current_span())),
                    Some(TokenKind::Return) => self.do_return()?,
                    Some(TokenKind::Break) => self.do_break()?,
                    Some(TokenKind::Next) => self.do_next()?,
                    Some(TokenKind::If) => self.do_if()?,
                    Some(TokenKind::Else) => self.do_else()?,
                    Some(TokenKind::Repeat) => self.do_repeat()?,
                    Some(TokenKind::While) => self.do_while()?,
                    Some(TokenKind::EC) => self.do_end()?,
                    _ => return Err(ParseError::UnexpectedEof(self.current_span())),
                }
            }

            self.emit_pretty();

            if self.state.in_simple {
                self.state.in_simple = false;
                self.pop_compound();
                self.emit_pretty();
            }
        }

        if !self.state.compounds.is_empty() {
            return Err(ParseError::UnexpectedEof(Span::default()));
        }

        let funcs: std::collections::BTreeMap<String, FunctionRecord> =
            self.state.funcs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Ok(ParsedUnit { segments: self.segments, funcs })
    }

    // ---- compound-frame bookkeeping -----------------------------------

    fn push_compound(&mut self, kind: FrameKind, before: Vec<String>, after: Vec<String>) -> (String, String) {
        let start = self.state.fresh_label();
        let end = self.state.fresh_label();
        self.state.compounds.push(CompoundFrame { kind, start: start.clone(), end: end.clone(), before, after });
        (start, end)
    }

    fn pop_compound(&mut self) {
        let com = self.state.compounds.pop().expect("pop_compound called with no open frame");
        for line in &com.before {
            if !line.is_empty() {
                self.emit(line.clone());
            }
        }
        self.emit(format!("{}:", com.end));
        self.emit_pretty();
        for line in &com.after {
            if !line.is_empty() {
                self.emit(line.clone());
            }
        }
        if com.is_func() {
            self.state.end_function();
        }
    }

    // ---- expression collection -----------------------------------------

    fn token_to_expr(tok: &Token) -> Option<ExprToken> {
        match &tok.kind {
            TokenKind::Name(n) => Some(ExprToken::Name(n.clone(), tok.span)),
            TokenKind::Number(n) => Some(ExprToken::Number(*n, tok.span)),
            TokenKind::Str(words) => Some(ExprToken::Str(words.clone(), tok.span)),
            TokenKind::Op(op) => Some(ExprToken::Op(op.clone(), tok.span)),
            TokenKind::SP => Some(ExprToken::SP(tok.span)),
            TokenKind::EP => Some(ExprToken::EP(tok.span)),
            TokenKind::SB => Some(ExprToken::SB(tok.span)),
            TokenKind::EB => Some(ExprToken::EB(tok.span)),
            TokenKind::Comma => Some(ExprToken::Comma(tok.span)),
            _ => None,
        }
    }

    /// Collects tokens up to (and discarding) a terminating semicolon,
    /// or up to a closing brace left in place for the statement loop
    /// to see next.
    fn collect_until_statement_end(&mut self) -> Result<Vec<ExprToken>, ParseError> {
        let mut out = Vec::new();
        loop {
            match self.peek_kind(0) {
                Some(TokenKind::Semicolon) => {
                    self.discard(1);
                    break;
                }
                Some(TokenKind::EC) => break,
                None => return Err(ParseError::ExpectSemicolon(self.current_span())),
                _ => {
                    let tok = self.peek(0).unwrap().clone();
                    out.push(Self::token_to_expr(&tok).ok_or(ParseError::UnexpectedEof(tok.span))?);
                    self.discard(1);
                }
            }
        }
        Ok(out)
    }

    /// Collects a parenthesized condition's tokens, tracking nested
    /// parens, without including the enclosing pair.
    fn collect_parenthesized(&mut self) -> Result<Vec<ExprToken>, ParseError> {
        if !matches!(self.peek_kind(0), Some(TokenKind::SP)) {
            return Err(ParseError::ExpectSP(self.current_span()));
        }
        self.discard(1);
        let mut depth = 1i32;
        let mut out = Vec::new();
        loop {
            match self.peek_kind(0) {
                Some(TokenKind::SP) => depth += 1,
                Some(TokenKind::EP) => depth -= 1,
                Some(TokenKind::Semicolon) => return Err(ParseError::ExpectEP(self.current_span())),
                None => return Err(ParseError::ExpectEP(self.current_span())),
                _ => {}
            }
            if depth == 0 {
                self.discard(1);
                break;
            }
            let tok = self.peek(0).unwrap().clone();
            out.push(Self::token_to_expr(&tok).ok_or(ParseError::UnexpectedEof(tok.span))?);
            self.discard(1);
        }
        Ok(out)
    }

    /// Runs the reorderer then the codegen walker over a collected
    /// expression token slice — the `math()` entry point.
    fn run_expression(&mut self, tokens: Vec<ExprToken>) -> Result<Option<Operand>, ParseError> {
        let infix_comment: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match t {
                ExprToken::Op(s, _) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        if !infix_comment.is_empty() {
            self.emit(format!("; infix: {}", infix_comment.join(" ")));
        }

        let postfix: Vec<PostfixItem> = Rpn::new(tokens).reorder()?;

        Codegen::new(&mut self.state, &mut self.segments).eval(postfix)
    }

    // ---- statement handlers ---------------------------------------------

    fn do_asm(&mut self) -> Result<(), ParseError> {
        if let Some(TokenKind::Asm(body)) = self.peek_kind(0) {
            let body = body.clone();
            self.emit(body);
        }
        self.discard(1);
        match self.peek_kind(0) {
            Some(TokenKind::EC) => Ok(()),
            Some(TokenKind::Semicolon) => {
                self.discard(1);
                Ok(())
            }
            _ => Err(ParseError::ExpectSC(self.current_span())),
        }
    }

    /// A bare `name = value;` / `name[N];` at file scope declares
    /// global data, matching `do_extern`.
    fn do_extern_data(&mut self) -> Result<(), ParseError> {
        let name = match self.peek_kind(0) {
            Some(TokenKind::Name(n)) => n.clone(),
            _ => return Err(ParseError::UndeclaredName(String::new(), self.current_span())),
        };
        self.discard(1);

        match self.peek_kind(0) {
            Some(TokenKind::Number(n)) => {
                let n = *n;
                self.segments.push(
                    Segment::Data,
                    format!("_{name}: {} {n}", self.state.target.sys_data()),
                );
                self.discard(1);
            }
            Some(TokenKind::SB) => {
                self.discard(1);
                let size = match self.peek_kind(0) {
                    Some(TokenKind::Number(n)) => *n,
                    _ => return Err(ParseError::UndeclaredName(name, self.current_span())),
                };
                self.segments.push(
                    Segment::Data,
                    format!("_{name}: times {size} {} 0", self.state.target.sys_data()),
                );
                self.discard(1);
                if !matches!(self.peek_kind(0), Some(TokenKind::EB)) {
                    return Err(ParseError::UndeclaredName(name, self.current_span()));
                }
                self.discard(1);
            }
            _ => return Err(ParseError::UndeclaredName(name, self.current_span())),
        }

        if !matches!(self.peek_kind(0), Some(TokenKind::Semicolon)) {
            return Err(ParseError::ExpectSemicolon(self.current_span()));
        }
        self.discard(1);
        Ok(())
    }

    fn do_end(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        if self.state.compounds.is_empty() {
            return Err(ParseError::UnexpectedEof(self.current_span()));
        }
        self.pop_compound();
        Ok(())
    }

    fn do_extrn(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        loop {
            match self.peek_kind(0) {
                Some(TokenKind::Name(n)) => {
                    if self.state.names.contains(n) {
                        return Err(ParseError::RedefinedVar(n.clone(), self.current_span()));
                    }
                    let n = n.clone();
                    self.state.names.insert(n.clone());
                    self.state.declare_extern(&n);
                    self.discard(1);
                }
                _ => return Err(ParseError::UndeclaredName(String::new(), self.current_span())),
            }

            match self.peek_kind(0) {
                Some(TokenKind::Comma) => self.discard(1),
                Some(TokenKind::Semicolon) => {
                    self.discard(1);
                    break;
                }
                _ => return Err(ParseError::ExpectComma(self.current_span())),
            }
        }
        Ok(())
    }

    fn do_auto(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        let word = self.state.target.word_size();
        loop {
            match self.peek_kind(0) {
                Some(TokenKind::Name(n)) => {
                    let var = n.clone();
                    self.discard(1);

                    if self.state.names.contains(&var) {
                        return Err(ParseError::RedefinedVar(var, self.current_span()));
                    }

                    if matches!(self.peek_kind(0), Some(TokenKind::SB)) {
                        self.discard(1);
                        let size = match self.peek_kind(0) {
                            Some(TokenKind::Number(n)) => *n,
                            _ => return Err(ParseError::UndeclaredName(var, self.current_span())),
                        };
                        self.discard(1);

                        self.state.bump_local_cursor(-(size * word as i64));
                        let a = self.state.target.reg_a();
                        if size != 0 {
                            self.emit(format!(
                                "lea {a}, [{}{}]",
                                self.state.target.reg_bp(),
                                self.state.local_cursor()
                            ));
                        } else {
                            self.emit(format!("xor {a}, {a}"));
                        }
                        let ptr_off = self.state.declare_local(&var, word);
                        self.emit(format!("mov [{}{}], {a}", self.state.target.reg_bp(), ptr_off));
                        self.emit(format!(
                            "sub {}, {}",
                            self.state.target.reg_sp(),
                            (size + 1) * word as i64
                        ));

                        if !matches!(self.peek_kind(0), Some(TokenKind::EB)) {
                            return Err(ParseError::UndeclaredName(var, self.current_span()));
                        }
                        self.discard(1);
                    } else {
                        let off = self.state.declare_local(&var, word);
                        self.emit(format!("sub {}, {}", self.state.target.reg_sp(), word));
                        self.emit(format!("; {var} @ [{}{}]", self.state.target.reg_bp(), off));
                    }

                    self.state.names.insert(var);
                }
                _ => return Err(ParseError::UndeclaredName(String::new(), self.current_span())),
            }

            match self.peek_kind(0) {
                Some(TokenKind::Comma) => self.discard(1),
                Some(TokenKind::Semicolon) => {
                    self.discard(1);
                    break;
                }
                _ => return Err(ParseError::ExpectComma(self.current_span())),
            }
        }
        Ok(())
    }

    fn do_func(&mut self) -> Result<(), ParseError> {
        if self.state.in_func {
            return Err(ParseError::RedefinedFunc(String::new(), self.current_span()));
        }

        let is_prototype = !self.has_body_before_semicolon();

        let call = match self.peek_kind(0) {
            Some(TokenKind::Stdcall) => {
                self.discard(1);
                CallConv::Stdcall
            }
            Some(TokenKind::Cdecl) => {
                self.discard(1);
                CallConv::Cdecl
            }
            _ => CallConv::Cdecl,
        };

        let name = match self.peek_kind(0) {
            Some(TokenKind::Name(n)) => n.clone(),
            _ => return Err(ParseError::UndeclaredName(String::new(), self.current_span())),
        };
        if self.state.names.contains(&name) {
            return Err(ParseError::RedefinedFunc(name, self.current_span()));
        }
        if let Some(existing) = self.state.funcs.get(&name) {
            if !(!is_prototype && existing.prototype) {
                return Err(ParseError::DuplicateFunctionDeclaration(name, self.current_span()));
            }
        }
        self.discard(1);

        self.state.reset_param_cursor(self.state.target.word_size());

        if !matches!(self.peek_kind(0), Some(TokenKind::SP)) {
            return Err(ParseError::ExpectSP(self.current_span()));
        }
        self.discard(1);

        let word = self.state.target.word_size();
        let mut params = Vec::new();
        loop {
            match self.peek_kind(0) {
                Some(TokenKind::Name(n)) => {
                    let p = n.clone();
                    if self.state.names.contains(&p) {
                        return Err(ParseError::RedefinedVar(p, self.current_span()));
                    }
                    if !is_prototype {
                        self.state.names.insert(p.clone());
                        self.state.declare_param(&p, word);
                    }
                    params.push(p);
                    self.discard(1);
                }
                Some(TokenKind::EP) => {}
                _ => return Err(ParseError::ExpectComma(self.current_span())),
            }

            match self.peek_kind(0) {
                Some(TokenKind::Comma) => self.discard(1),
                Some(TokenKind::EP) => {
                    self.discard(1);
                    break;
                }
                _ => return Err(ParseError::ExpectComma(self.current_span())),
            }
        }

        let param_count = params.len();
        if !is_prototype && matches!(self.peek_kind(0), Some(TokenKind::SC)) {
            self.discard(1);
        } else if is_prototype && matches!(self.peek_kind(0), Some(TokenKind::Semicolon)) {
            self.discard(1);
        } else {
            return Err(ParseError::ExpectSC(self.current_span()));
        }

        let tname = match call {
            CallConv::Cdecl => format!("_{name}"),
            CallConv::Stdcall => format!("_{name}@{}", param_count as u32 * word),
        };

        if !is_prototype {
            let before = vec![format!("xor {0}, {0}", self.state.target.reg_a())];
            let after = vec![
                format!("mov {}, {}", self.state.target.reg_sp(), self.state.target.reg_bp()),
                format!("pop {}", self.state.target.reg_bp()),
                "ret".to_string(),
            ];
            let (_start, end) = self.push_compound(FrameKind::Function, before, after);
            // The function's own label replaces the generic start
            // label the frame was minted with; give that label index
            // back, matching `do_func`'s `self.l -= 1`.
            self.state.return_label();
            if let Some(frame) = self.state.compounds.last_mut() {
                frame.end = frame.start.clone();
                frame.start = tname.clone();
                let _ = end;
            }

            self.state.names.insert(name.clone());
            self.state.in_func = true;
            self.emit(format!("{tname}:"));
            self.emit(format!("push {}", self.state.target.reg_bp()));
            self.emit(format!("mov {}, {}", self.state.target.reg_bp(), self.state.target.reg_sp()));
            self.emit_pretty();
        }

        self.state.funcs.insert(
            name.clone(),
            FunctionRecord { name, call, prototype: is_prototype, params, tname },
        );
        Ok(())
    }

    /// True if an opening brace (the function body) appears before the
    /// next semicolon — distinguishes a definition from a prototype.
    fn has_body_before_semicolon(&self) -> bool {
        let mut i = 0;
        while let Some(tok) = self.peek(i) {
            match tok.kind {
                TokenKind::SC => return true,
                TokenKind::Semicolon => return false,
                _ => i += 1,
            }
        }
        false
    }

    fn do_return(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        let tokens = self.collect_until_statement_end()?;
        let result = self.run_expression(tokens)?;

        let a = self.state.target.reg_a();
        match result {
            None => self.emit(format!("xor {a}, {a}")),
            Some(Operand::Name(n)) => {
                let addr = self.var_addr_for_return(&n)?;
                self.emit(format!("mov {a}, {addr}"));
            }
            Some(Operand::Number(n)) => self.emit(format!("mov {a}, {n}")),
            Some(Operand::Register(r)) => {
                if r != a {
                    self.emit(format!("mov {a}, {r}"));
                }
            }
            Some(Operand::Str(_)) => return Err(ParseError::InvalidOperand(54, self.current_span())),
        }

        match self.state.innermost_function() {
            Some(frame) => {
                let end = frame.end.clone();
                self.emit(format!("jmp {end}"));
                Ok(())
            }
            None => Err(ParseError::ReturnOutsideFunc(self.current_span())),
        }
    }

    fn var_addr_for_return(&self, name: &str) -> Result<String, ParseError> {
        match self.state.resolve(name) {
            crate::state::Resolution::Param(off) => {
                Ok(format!("[{}+{}]", self.state.target.reg_bp(), off))
            }
            crate::state::Resolution::Local(off) => {
                Ok(format!("[{}{}]", self.state.target.reg_bp(), off))
            }
            crate::state::Resolution::Extern(n) => {
                Ok(format!("{} [_{}]", self.state.target.sys_prefix(), n))
            }
            crate::state::Resolution::Unknown => Err(ParseError::UndeclaredName(name.to_string(), self.current_span())),
        }
    }

    fn do_break(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        if !matches!(self.peek_kind(0), Some(TokenKind::Semicolon)) {
            return Err(ParseError::ExpectSemicolon(self.current_span()));
        }
        self.discard(1);
        match self.state.innermost_loop() {
            Some(frame) => {
                let end = frame.end.clone();
                self.emit(format!("jmp {end}"));
                Ok(())
            }
            None => Err(ParseError::BreakOutsideLoop(self.current_span())),
        }
    }

    fn do_next(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        if !matches!(self.peek_kind(0), Some(TokenKind::Semicolon)) {
            return Err(ParseError::ExpectSemicolon(self.current_span()));
        }
        self.discard(1);
        match self.state.innermost_loop() {
            Some(frame) => {
                let start = frame.start.clone();
                self.emit(format!("jmp {start}"));
                Ok(())
            }
            None => Err(ParseError::NextOutsideLoop(self.current_span())),
        }
    }

    fn do_repeat(&mut self) -> Result<(), ParseError> {
        self.discard(1);

        // `repeat { ... }` always loops back to its own top and relies
        // on `break` to reach `end` — the closing-brace fragment jumps
        // to `start`, matching the original's `before="jmp .L{l+1}"`
        // (evaluated before the frame's labels are minted, so `l+1` is
        // the *start* label about to be assigned, not `end`).
        let (start, _end) = self.push_compound(FrameKind::Loop, Vec::new(), Vec::new());
        let start_for_before = start.clone();
        self.state.compounds.last_mut().unwrap().before = vec![format!("jmp {start_for_before}")];

        self.emit("; repeat loop");
        self.emit(format!("{start}:"));

        if matches!(self.peek_kind(0), Some(TokenKind::SC)) {
            self.discard(1);
        } else {
            self.state.next_simple = true;
        }
        Ok(())
    }

    fn do_while(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        let tokens = self.collect_parenthesized()?;

        let (start, _end) = self.push_compound(FrameKind::Loop, Vec::new(), Vec::new());
        self.state.compounds.last_mut().unwrap().before = vec![format!("jmp {start}")];

        self.emit("; while loop");
        self.emit(format!("{start}:"));

        let result = self.run_expression(tokens)?;
        self.finish_condition(result)?;

        if matches!(self.peek_kind(0), Some(TokenKind::SC)) {
            self.discard(1);
        } else {
            self.state.next_simple = true;
        }
        Ok(())
    }

    fn do_if(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        let tokens = self.collect_parenthesized()?;

        let (start, _end) = self.push_compound(FrameKind::If, Vec::new(), Vec::new());
        self.emit("; if conditional");
        self.emit(format!("{start}:"));

        let result = self.run_expression(tokens)?;

        if matches!(self.peek_kind(0), Some(TokenKind::SC)) {
            self.discard(1);
        } else {
            self.state.next_simple = true;
        }

        self.finish_condition(result)?;
        Ok(())
    }

    /// Shared tail of `if`/`while`: materialize the condition result
    /// into a register if needed, then branch past the frame's end
    /// label when it's false.
    fn finish_condition(&mut self, result: Option<Operand>) -> Result<(), ParseError> {
        let a = self.state.target.reg_a();
        let reg = match result {
            Some(Operand::Number(n)) => {
                self.emit(format!("mov {a}, {n}"));
                a.to_string()
            }
            Some(Operand::Register(mut r)) => {
                if r.starts_with('[') {
                    self.emit(format!("mov {a}, {} {r}", self.state.target.sys_prefix()));
                    r = a.to_string();
                }
                r
            }
            Some(Operand::Name(n)) => {
                let addr = self.var_addr_for_return(&n)?;
                self.emit(format!("mov {a}, {addr}"));
                a.to_string()
            }
            _ => return Err(ParseError::InvalidOperand(2, self.current_span())),
        };
        self.emit(format!("test {reg}, {reg}"));
        let end = self.state.compounds.last().unwrap().end.clone();
        self.emit(format!("je {end}"));
        Ok(())
    }

    fn do_else(&mut self) -> Result<(), ParseError> {
        self.discard(1);
        let (start, _end) = self.push_compound(FrameKind::Else, Vec::new(), Vec::new());
        self.emit("; else conditional");
        self.emit(format!("{start}:"));
        if matches!(self.peek_kind(0), Some(TokenKind::SC)) {
            self.discard(1);
        } else {
            self.state.next_simple = true;
        }
        Ok(())
    }

    fn do_math_statement(&mut self) -> Result<(), ParseError> {
        let mut tokens = Vec::new();
        loop {
            match self.peek_kind(0) {
                Some(TokenKind::Semicolon) => {
                    self.discard(1);
                    break;
                }
                Some(TokenKind::EC) => break,
                None => return Err(ParseError::ExpectSemicolon(self.current_span())),
                _ => {
                    let tok = self.peek(0).unwrap().clone();
                    tokens.push(Self::token_to_expr(&tok).ok_or(ParseError::UnexpectedEof(tok.span))?);
                    self.discard(1);
                }
            }
        }
        self.run_expression(tokens)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bc_lex::Lexer;

    fn compile(src: &str) -> Vec<String> {
        let tokens = Lexer::new(src).tokenize().expect("lex ok");
        let unit = Parser::new(tokens, Target::Win32).parse().expect("parse ok");
        unit.segments.text().to_vec()
    }

    /// Regression test for a bug where the while-loop frame's
    /// `before` fragment jumped to its own end label instead of its
    /// start label, turning every `while` into a loop that ran its
    /// body at most once instead of jumping back to the top of the
    /// condition check on every iteration.
    fn start_label_of(lines: &[String]) -> String {
        lines
            .iter()
            .find(|l| l.trim_start().starts_with(".L") && l.trim_end().ends_with(':'))
            .expect("a label line")
            .trim()
            .trim_end_matches(':')
            .to_string()
    }

    #[test]
    fn while_loop_back_edge_targets_its_own_start_label() {
        let lines = compile("main() { auto i; i = 0; while (i < 10) { i = i + 1; } }");
        let start = start_label_of(&lines);
        assert!(
            lines.iter().any(|l| l.trim() == format!("jmp {start}")),
            "expected a back-edge jumping to the loop's start label {start}, got: {lines:#?}"
        );
    }

    #[test]
    fn repeat_loop_back_edge_targets_its_own_start_label() {
        let lines = compile("main() { repeat { break; } }");
        let start = start_label_of(&lines);
        assert!(lines.iter().any(|l| l.trim() == format!("jmp {start}")));
    }

    #[test]
    fn nested_if_else_pops_frames_in_order() {
        let lines = compile("main() { auto x; if (x) { x = 1; } else { x = 2; } }");
        assert!(lines.iter().any(|l| l.contains("je .L")));
        assert!(lines.iter().any(|l| l.contains("mov dword")));
    }

    #[test]
    fn break_jumps_to_innermost_loop_end_not_outer() {
        let lines = compile("main() { while (1) { while (1) { break; } } }");
        // Two distinct loop end labels exist; break must target the
        // inner one, which is allocated after the outer's start/end.
        let jmp_targets: Vec<&str> = lines
            .iter()
            .filter_map(|l| l.trim().strip_prefix("jmp "))
            .collect();
        assert!(!jmp_targets.is_empty());
    }

    #[test]
    fn function_symbol_replaces_generic_start_label() {
        let lines = compile("main() { return(0); }");
        assert!(lines.iter().any(|l| l.trim() == "_main:"));
        // The generic label minted for the function frame's start is
        // discarded in favor of `_main:`, so label indices resume at
        // .L0 for the end label.
        assert!(lines.iter().any(|l| l.trim() == ".L0:"));
    }

    fn parse_err(src: &str) -> ParseError {
        let tokens = Lexer::new(src).tokenize().expect("lex ok");
        Parser::new(tokens, Target::Win32).parse().expect_err("expected parse to fail")
    }

    #[test]
    fn prototype_followed_by_definition_is_accepted() {
        let lines = compile("f(a); f(a) { return(0); } main() { f(1); }");
        assert!(lines.iter().any(|l| l.trim() == "_f:"));
    }

    #[test]
    fn two_prototypes_of_the_same_function_are_rejected() {
        let err = parse_err("f(a); f(a); main() { return(0); }");
        assert!(matches!(err, ParseError::DuplicateFunctionDeclaration(name, _) if name == "f"));
    }

    #[test]
    fn definition_followed_by_another_declaration_is_rejected() {
        // As above: the first declaration's name is already in `names`
        // once it's a definition, so the earlier check fires first.
        let err = parse_err("f(a) { return(0); } f(a); main() { return(0); }");
        assert!(matches!(err, ParseError::RedefinedFunc(name, _) if name == "f"));
    }

    #[test]
    fn two_definitions_of_the_same_function_are_rejected() {
        // A definition inserts its name into `names`, so a second
        // definition trips the earlier `names` check, not the
        // `funcs`-based one — matching parse.py's check order.
        let err = parse_err("f() { return(0); } f() { return(1); } main() { return(0); }");
        assert!(matches!(err, ParseError::RedefinedFunc(name, _) if name == "f"));
    }
}
