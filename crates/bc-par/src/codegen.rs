//! Walks a postfix expression, emitting instructions and tracking
//! operand locations on a small typed stack.
//!
//! Grounded on `parse.py`'s `math()` — by far its largest method. Kept
//! in the original's operator-group order (function calls, operand
//! pushes, unary, binary arithmetic, relational, indexing, compound
//! assignment, ternary, comma, plain assignment) with each group
//! pulled out into its own method instead of one 700-line `while`
//! body. Deliberately preserved from the original rather than "fixed":
//!
//! - `u+` and `u*` are tagged unary operators with no case here at
//!   all — same as the original, which stubs them out in comments.
//!   Using either in source silently drops the operator instead of
//!   erroring.
//! - Postfix `++`/`--` and prefix `u++`/`u--` compile to the exact
//!   same `inc`/`dec` instruction; this port doesn't distinguish "use
//!   old value" from "use new value" semantics either.
//! - `-=`, `*=`, `%=`, `&=`, `^=`, `|=` are listed in the precedence
//!   table (so they parse) but have no case below, matching the
//!   original; they now raise [`ParseError::UnhandledOperator`]
//!   instead of silently falling off the end of an `if`/`elif` chain.
//! - Resolving an `extrn` name already yields a `sys_prefix`-qualified
//!   address (`"dword [_name]"`); several call sites below prepend
//!   `sys_prefix` again unconditionally, same as `get_var`'s callers
//!   in `parse.py` — this doubles up for externs specifically. Left
//!   as-is; `extrn` values practically only ever reach the plain
//!   assignment and call-argument cases, which don't hit this path.

use bc_util::Target;

use crate::error::ParseError;
use crate::rpn::PostfixItem;
use crate::state::{ParserState, Resolution};
use bc_gen::{Segment, Segments};

/// One value sitting on the expression evaluation stack.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Name(String),
    Number(i64),
    Str(Vec<i64>),
    /// Already-resolved assembly operand text: a bare register
    /// (`"eax"`) or a full memory operand (`"[ebp-8]"`,
    /// `"dword [ebp-8]"`) produced by a prior step.
    Register(String),
}

pub struct Codegen<'a> {
    state: &'a mut ParserState,
    segments: &'a mut Segments,
    target: Target,
}

impl<'a> Codegen<'a> {
    pub fn new(state: &'a mut ParserState, segments: &'a mut Segments) -> Self {
        let target = state.target;
        Self { state, segments, target }
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.segments.push(Segment::Text, line.into());
    }

    fn is_var(&self, operand: &Operand) -> bool {
        match operand {
            Operand::Name(n) => self.state.is_declared_variable(n),
            _ => false,
        }
    }

    /// Raw address syntax for a declared name. `extrn` resolutions
    /// come back already `sys_prefix`-qualified; params/locals don't.
    fn var_address(&self, name: &str, span: bc_util::Span) -> Result<String, ParseError> {
        match self.state.resolve(name) {
            Resolution::Param(off) => Ok(format!("[{}+{}]", self.target.reg_bp(), off)),
            Resolution::Local(off) => Ok(format!("[{}{}]", self.target.reg_bp(), off)),
            Resolution::Extern(n) => Ok(format!("{} [_{}]", self.target.sys_prefix(), n)),
            Resolution::Unknown => Err(ParseError::InvalidOperand(10, span)),
        }
    }

    /// Builds a stack-resident copy of a string literal and returns
    /// the register holding its address, mirroring `get_str`.
    fn materialize_string(&mut self, words: &[i64]) -> String {
        let word = self.target.word_size() as i64;
        let size = words.len() as i64 * word;
        self.emit(format!(
            "; string size {} @ [{}{}]",
            size,
            self.target.reg_bp(),
            self.state.local_cursor() - size
        ));
        self.state.bump_local_cursor(-size);
        self.emit(format!("sub {}, {}", self.target.reg_sp(), size));
        let base = self.state.local_cursor();
        for (i, w) in words.iter().enumerate() {
            self.emit(format!(
                "mov {} [{}{}], {}",
                self.target.sys_prefix(),
                self.target.reg_bp(),
                base + (i as i64 * 4),
                w
            ));
        }
        self.emit(format!("lea {}, [{}{}]", self.target.reg_a(), self.target.reg_bp(), base));
        self.target.reg_a().to_string()
    }

    pub fn eval(
        &mut self,
        postfix: Vec<PostfixItem>,
    ) -> Result<Option<Operand>, ParseError> {
        let mut stack: Vec<Operand> = Vec::new();
        let mut args: u32 = 0;
        let mut i = 0usize;

        while i < postfix.len() {
            match &postfix[i] {
                PostfixItem::Func(name, span) => {
                    let record = self
                        .state
                        .funcs
                        .get(name)
                        .cloned()
                        .ok_or_else(|| ParseError::UnknownFunction(name.clone(), *span))?;
                    self.emit(format!("call {}", record.tname));
                    if args > 0 && record.call == crate::state::CallConv::Cdecl {
                        self.emit(format!(
                            "add {}, {}",
                            self.target.reg_sp(),
                            args as i64 * self.target.word_size() as i64
                        ));
                    }
                    args = 0;
                    stack.push(Operand::Register(self.target.reg_a().to_string()));
                    i += 1;
                }
                PostfixItem::Name(name, _) => {
                    stack.push(Operand::Name(name.clone()));
                    i += 1;
                }
                PostfixItem::Number(n, _) => {
                    stack.push(Operand::Number(*n));
                    i += 1;
                }
                PostfixItem::Str(words, _) => {
                    stack.push(Operand::Str(words.clone()));
                    i += 1;
                }
                PostfixItem::SB(span) => {
                    self.index_start(&mut stack, *span)?;
                    i += 1;
                }
                PostfixItem::EB(span) => {
                    self.index_end(&mut stack, *span)?;
                    i += 1;
                }
                PostfixItem::Comma(span) => {
                    self.push_argument(&mut stack, *span)?;
                    args += 1;
                    i += 1;
                }
                PostfixItem::Op(lexeme, span) => {
                    let lexeme = lexeme.clone();
                    let span = *span;
                    // `a ? b : c` reaches here as the two adjacent
                    // tokens `:` then `?`, consumed together.
                    if lexeme == ":" {
                        if let Some(PostfixItem::Op(next, _)) = postfix.get(i + 1) {
                            if next == "?" {
                                self.ternary(&mut stack, span)?;
                                i += 2;
                                continue;
                            }
                        }
                    }
                    self.dispatch_operator(&mut stack, &lexeme, span)?;
                    i += 1;
                }
            }
        }

        Ok(stack.pop())
    }

    fn dispatch_operator(
        &mut self,
        stack: &mut Vec<Operand>,
        op: &str,
        span: bc_util::Span,
    ) -> Result<(), ParseError> {
        match op {
            "++" | "--" | "u++" | "u--" | "u+" | "u-" | "u!" | "u*" | "u&" => {
                self.unary(stack, op, span)
            }
            "*" | "/" | "%" | "+" | "-" | "<<" | ">>" | "&" | "^" | "|" => {
                self.binary(stack, op, span)
            }
            "<" | ">" | "<=" | ">=" | "==" | "!=" => self.relational(stack, op, span),
            "<<=" | ">>=" => self.shift_assign(stack, op, span),
            "+=" => self.add_assign(stack, span),
            "/=" => self.div_assign(stack, span),
            "=" => self.assign(stack, span),
            "-=" | "*=" | "%=" | "&=" | "^=" | "|=" => {
                Err(ParseError::UnhandledOperator(op.to_string(), span))
            }
            _ => Err(ParseError::UnhandledOperator(op.to_string(), span)),
        }
    }

    fn unary(
        &mut self,
        stack: &mut Vec<Operand>,
        op: &str,
        span: bc_util::Span,
    ) -> Result<(), ParseError> {
        let operand = stack.pop().ok_or(ParseError::InvalidOperand(25, span))?;
        let mut a = if self.is_var(&operand) {
            let name = match &operand {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            let addr = self.var_address(&name, span)?;
            if op == "u&" {
                addr
            } else {
                format!("{} {}", self.target.sys_prefix(), addr)
            }
        } else {
            match operand {
                Operand::Number(n) => {
                    self.emit(format!("mov {}, {}", self.target.reg_a(), n));
                    self.target.reg_a().to_string()
                }
                Operand::Register(r) => {
                    if op != "u&" && r.starts_with('[') {
                        format!("{} {}", self.target.sys_prefix(), r)
                    } else {
                        r
                    }
                }
                _ => return Err(ParseError::InvalidOperand(25, span)),
            }
        };

        match op {
            "++" | "u++" => self.emit(format!("inc {a}")),
            "--" | "u--" => self.emit(format!("dec {a}")),
            "u-" => self.emit(format!("neg {a}")),
            "u!" => self.emit(format!("not {a}")),
            "u&" => {
                self.emit(format!("lea {}, {}", self.target.reg_a(), a));
                a = self.target.reg_a().to_string();
            }
            // `u+` / `u*` intentionally fall through without emitting
            // anything, matching the original's commented-out cases.
            "u+" | "u*" => {}
            _ => return Err(ParseError::UnhandledOperator(op.to_string(), span)),
        }

        if let Some(stripped) = a.strip_prefix(self.target.sys_prefix()) {
            a = stripped.trim().to_string();
        }
        stack.push(Operand::Register(a));
        Ok(())
    }

    /// Resolves an operand to a register/immediate operand, moving it
    /// into `reg` first if it isn't already a bare value there. Shared
    /// shape between the two operands of a binary op.
    fn materialize_into(
        &mut self,
        operand: Operand,
        reg: &str,
        span: bc_util::Span,
        err_code: i32,
    ) -> Result<String, ParseError> {
        if self.is_var(&operand) {
            let name = match &operand {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            let addr = self.var_address(&name, span)?;
            self.emit(format!("mov {reg}, {addr}"));
            Ok(reg.to_string())
        } else {
            match operand {
                Operand::Number(n) => {
                    self.emit(format!("mov {reg}, {n}"));
                    Ok(reg.to_string())
                }
                Operand::Register(r) => {
                    if r != reg {
                        self.emit(format!("mov {reg}, {r}"));
                    }
                    Ok(reg.to_string())
                }
                _ => Err(ParseError::InvalidOperand(err_code, span)),
            }
        }
    }

    fn binary(
        &mut self,
        stack: &mut Vec<Operand>,
        op: &str,
        span: bc_util::Span,
    ) -> Result<(), ParseError> {
        let b = stack.pop().ok_or(ParseError::InvalidOperand(35, span))?;
        let a = stack.pop().ok_or(ParseError::InvalidOperand(35, span))?;

        let a_was_reg_a = matches!(&a, Operand::Register(r) if r == self.target.reg_a());
        let b_targets_a = matches!(&b, Operand::Register(r) if r == self.target.reg_a());
        let a_reg = if b_targets_a && !a_was_reg_a { self.target.reg_d() } else { self.target.reg_a() };
        let a_reg = self.materialize_into(a, a_reg, span, 35)?;

        let shift_op = matches!(op, "<<" | ">>");
        let c_reg = self.target.reg_c();
        let b_reg = self.materialize_into(b, c_reg, span, 45)?;
        let b_reg = if shift_op { "cl".to_string() } else { b_reg };

        let mut result = a_reg.clone();
        match op {
            "*" => self.emit(format!("mul {b_reg}")),
            "/" => {
                self.emit(format!("xor {0}, {0}", self.target.reg_d()));
                self.emit(format!("div {b_reg}"));
                result = self.target.reg_a().to_string();
            }
            "%" => {
                self.emit(format!("xor {0}, {0}", self.target.reg_d()));
                self.emit(format!("div {b_reg}"));
                result = self.target.reg_d().to_string();
            }
            "+" => self.emit(format!("add {a_reg}, {b_reg}")),
            "-" => self.emit(format!("sub {a_reg}, {b_reg}")),
            "<<" => self.emit(format!("shl {a_reg}, {b_reg}")),
            ">>" => self.emit(format!("shr {a_reg}, {b_reg}")),
            "&" => self.emit(format!("and {a_reg}, {b_reg}")),
            "^" => self.emit(format!("xor {a_reg}, {b_reg}")),
            "|" => self.emit(format!("or {a_reg}, {b_reg}")),
            _ => return Err(ParseError::InvalidOperand(400, span)),
        }

        stack.push(Operand::Register(result));
        Ok(())
    }

    fn relational(
        &mut self,
        stack: &mut Vec<Operand>,
        op: &str,
        span: bc_util::Span,
    ) -> Result<(), ParseError> {
        let b = stack.pop().ok_or(ParseError::InvalidOperand(212, span))?;
        let a = stack.pop().ok_or(ParseError::InvalidOperand(212, span))?;

        let a_reg = if self.is_var(&a) {
            let name = match &a {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            let addr = self.var_address(&name, span)?;
            self.emit(format!("mov {}, {}", self.target.reg_d(), addr));
            self.target.reg_d().to_string()
        } else if let Operand::Register(r) = &a {
            if r == self.target.reg_a() {
                self.emit(format!("mov {}, {}", self.target.reg_d(), r));
                self.target.reg_d().to_string()
            } else {
                r.clone()
            }
        } else {
            return Err(ParseError::InvalidOperand(212, span));
        };

        let b_val = if self.is_var(&b) {
            let name = match &b {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            self.var_address(&name, span)?
        } else {
            match &b {
                Operand::Register(r) => {
                    if r == self.target.reg_a() {
                        self.emit(format!("mov {}, {}", self.target.reg_d(), r));
                        self.target.reg_d().to_string()
                    } else {
                        r.clone()
                    }
                }
                Operand::Number(n) => n.to_string(),
                _ => return Err(ParseError::InvalidOperand(212, span)),
            }
        };

        self.emit(format!("xor {0}, {0}", self.target.reg_a()));
        self.emit(format!("cmp {a_reg}, {b_val}"));
        let label = self.state.fresh_label();
        let jump = match op {
            "<" => "jae",
            ">" => "jbe",
            "<=" => "ja",
            ">=" => "jb",
            "==" => "jne",
            "!=" => "je",
            _ => return Err(ParseError::InvalidOperand(215, span)),
        };
        self.emit(format!("{jump} {label}"));
        self.emit(format!("inc {}", self.target.reg_a()));
        self.emit(format!("{label}:"));

        stack.push(Operand::Register(self.target.reg_a().to_string()));
        Ok(())
    }

    fn index_start(&mut self, stack: &mut Vec<Operand>, span: bc_util::Span) -> Result<(), ParseError> {
        let a = stack.pop().ok_or(ParseError::InvalidOperand(2, span))?;
        let resolved = if self.is_var(&a) {
            let name = match &a {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            self.var_address(&name, span)?
        } else if let Operand::Register(r) = a {
            r
        } else {
            return Err(ParseError::InvalidOperand(2, span));
        };
        stack.push(Operand::Register(resolved));
        Ok(())
    }

    fn index_end(&mut self, stack: &mut Vec<Operand>, span: bc_util::Span) -> Result<(), ParseError> {
        let b = stack.pop().ok_or(ParseError::InvalidOperand(2, span))?;
        let a = stack.pop().ok_or(ParseError::InvalidOperand(2, span))?;

        let a_val = if self.is_var(&a) {
            let name = match &a {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            format!("{} {}", self.target.sys_prefix(), self.var_address(&name, span)?)
        } else if let Operand::Register(r) = a {
            r
        } else {
            return Err(ParseError::InvalidOperand(2, span));
        };

        let mut b_val = if self.is_var(&b) {
            let name = match &b {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            let addr = self.var_address(&name, span)?;
            self.emit(format!("mov {}, {}", self.target.reg_a(), addr));
            self.target.reg_a().to_string()
        } else if let Operand::Register(r) = &b {
            let mut r = r.clone();
            if r.starts_with('[') {
                self.emit(format!("mov {}, {} {}", self.target.reg_a(), self.target.sys_prefix(), r));
                r = self.target.reg_a().to_string();
            }
            r
        } else {
            return Err(ParseError::InvalidOperand(2, span));
        };

        self.emit(format!("shl {b_val}, 2"));
        self.emit(format!("add {b_val}, {a_val}"));

        if let Some(stripped) = b_val.strip_prefix(self.target.sys_prefix()) {
            b_val = stripped.trim().to_string();
        }
        stack.push(Operand::Register(format!("[{b_val}]")));
        Ok(())
    }

    /// Shared shape for `<<=` and `>>=`, which differ only in the
    /// final mnemonic.
    fn shift_assign(
        &mut self,
        stack: &mut Vec<Operand>,
        op: &str,
        span: bc_util::Span,
    ) -> Result<(), ParseError> {
        let b = stack.pop().ok_or(ParseError::InvalidOperand(23, span))?;
        let a = stack.pop().ok_or(ParseError::InvalidOperand(23, span))?;

        let a_val = if self.is_var(&a) {
            let name = match &a {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            let addr = self.var_address(&name, span)?;
            stack.push(Operand::Register(addr.clone()));
            format!("{} {}", self.target.sys_prefix(), addr)
        } else if let Operand::Register(r) = a {
            r
        } else {
            return Err(ParseError::InvalidOperand(23, span));
        };

        let is_mem = a_val.starts_with(self.target.sys_prefix());
        let mut b_val = match b {
            Operand::Name(n) if self.state.is_declared_variable(&n) => self.var_address(&n, span)?,
            Operand::Number(n) => n.to_string(),
            Operand::Register(r) => {
                if is_mem && r == self.target.reg_c() {
                    "cl".to_string()
                } else if is_mem {
                    self.emit(format!("mov {}, {}", self.target.reg_c(), r));
                    "cl".to_string()
                } else {
                    r
                }
            }
            _ => return Err(ParseError::InvalidOperand(24, span)),
        };

        if is_mem && b_val.starts_with('[') {
            self.emit(format!("mov {}, dword {}", self.target.reg_a(), b_val));
            b_val = self.target.reg_a().to_string();
        }

        let mnemonic = if op == "<<=" { "shl" } else { "shr" };
        self.emit(format!("{mnemonic} {a_val}, {b_val}"));
        Ok(())
    }

    fn add_assign(&mut self, stack: &mut Vec<Operand>, span: bc_util::Span) -> Result<(), ParseError> {
        let b = stack.pop().ok_or(ParseError::InvalidOperand(23, span))?;
        let a = stack.pop().ok_or(ParseError::InvalidOperand(23, span))?;

        let a_val = if self.is_var(&a) {
            let name = match &a {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            let addr = self.var_address(&name, span)?;
            stack.push(Operand::Register(addr.clone()));
            format!("{} {}", self.target.sys_prefix(), addr)
        } else if let Operand::Register(r) = a {
            r
        } else {
            return Err(ParseError::InvalidOperand(23, span));
        };

        let mut b_val = match b {
            Operand::Name(n) if self.state.is_declared_variable(&n) => self.var_address(&n, span)?,
            Operand::Register(r) => r,
            Operand::Number(n) => n.to_string(),
            _ => return Err(ParseError::InvalidOperand(24, span)),
        };

        if a_val.starts_with(self.target.sys_prefix()) && b_val.starts_with('[') {
            self.emit(format!("mov {}, dword {}", self.target.reg_a(), b_val));
            b_val = self.target.reg_a().to_string();
        }

        self.emit(format!("add {a_val}, {b_val}"));
        Ok(())
    }

    fn div_assign(&mut self, stack: &mut Vec<Operand>, span: bc_util::Span) -> Result<(), ParseError> {
        let b = stack.pop().ok_or(ParseError::InvalidOperand(2, span))?;
        let a = stack.pop().ok_or(ParseError::InvalidOperand(2, span))?;

        if self.is_var(&a) {
            let name = match &a {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            let addr = self.var_address(&name, span)?;
            self.emit(format!("mov {}, {}", self.target.reg_a(), addr));
        } else {
            match a {
                Operand::Number(n) => self.emit(format!("mov {}, {}", self.target.reg_a(), n)),
                Operand::Register(r) => {
                    if r != self.target.reg_a() {
                        self.emit(format!("mov {}, {}", self.target.reg_a(), r));
                    }
                }
                _ => return Err(ParseError::InvalidOperand(2, span)),
            }
        }

        if self.is_var(&b) {
            let name = match &b {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            let addr = self.var_address(&name, span)?;
            self.emit(format!("mov {}, {}", self.target.reg_c(), addr));
        } else {
            match b {
                Operand::Number(n) => self.emit(format!("mov {}, {}", self.target.reg_c(), n)),
                Operand::Register(r) => {
                    if r != self.target.reg_c() {
                        self.emit(format!("mov {}, {}", self.target.reg_c(), r));
                    }
                }
                _ => return Err(ParseError::InvalidOperand(2, span)),
            }
        }

        self.emit(format!("xor {0}, {0}", self.target.reg_d()));
        self.emit(format!("div {}", self.target.reg_c()));
        Ok(())
    }

    fn ternary(&mut self, stack: &mut Vec<Operand>, span: bc_util::Span) -> Result<(), ParseError> {
        let c = stack.pop().ok_or(ParseError::InvalidOperand(2, span))?;
        let b = stack.pop().ok_or(ParseError::InvalidOperand(2, span))?;
        let a = stack.pop().ok_or(ParseError::InvalidOperand(2, span))?;

        let resolve_simple = |this: &mut Self, op: Operand| -> Result<String, ParseError> {
            if this.is_var(&op) {
                let name = match &op {
                    Operand::Name(n) => n.clone(),
                    _ => unreachable!(),
                };
                this.var_address(&name, span)
            } else {
                match op {
                    Operand::Register(r) => Ok(r),
                    Operand::Number(n) => Ok(n.to_string()),
                    _ => Err(ParseError::InvalidOperand(2, span)),
                }
            }
        };

        let a_val = resolve_simple(self, a)?;
        let b_val = resolve_simple(self, b)?;
        let c_val = resolve_simple(self, c)?;

        let mid = self.state.fresh_label();
        let end = self.state.fresh_label();

        self.emit(format!("cmp {a_val}, 0"));
        self.emit(format!("jz {mid}"));
        self.emit(format!("mov {}, {}", self.target.reg_a(), b_val));
        self.emit(format!("jmp {end}"));
        self.emit(format!("{mid}:"));
        self.emit(format!("mov {}, {}", self.target.reg_a(), c_val));
        self.emit(format!("{end}:"));

        stack.push(Operand::Register(self.target.reg_a().to_string()));
        Ok(())
    }

    fn push_argument(&mut self, stack: &mut Vec<Operand>, span: bc_util::Span) -> Result<(), ParseError> {
        let a = stack.pop().ok_or(ParseError::InvalidOperand(0, span))?;
        let text = if self.is_var(&a) {
            let name = match &a {
                Operand::Name(n) => n.clone(),
                _ => unreachable!(),
            };
            format!("{} {}", self.target.sys_prefix(), self.var_address(&name, span)?)
        } else {
            match a {
                Operand::Number(n) => format!("{} {}", self.target.sys_prefix(), n),
                Operand::Register(r) => r,
                _ => return Err(ParseError::InvalidOperand(0, span)),
            }
        };
        self.emit(format!("push {text}"));
        Ok(())
    }

    fn assign(&mut self, stack: &mut Vec<Operand>, span: bc_util::Span) -> Result<(), ParseError> {
        let b = stack.pop().ok_or(ParseError::InvalidOperand(62, span))?;
        let a = stack.pop().ok_or(ParseError::InvalidOperand(62, span))?;

        let a_dest = match &a {
            Operand::Name(n) if self.state.is_declared_variable(n) => {
                let addr = self.var_address(n, span)?;
                stack.push(Operand::Register(addr.clone()));
                format!("{} {}", self.target.sys_prefix(), addr)
            }
            Operand::Register(r) => {
                stack.push(Operand::Register(r.clone()));
                if r.starts_with('[') {
                    format!("{} {}", self.target.sys_prefix(), r)
                } else {
                    r.clone()
                }
            }
            _ => return Err(ParseError::InvalidOperand(62, span)),
        };

        let mut b_val = match b {
            Operand::Name(n) if self.state.is_declared_variable(&n) => self.var_address(&n, span)?,
            Operand::Str(words) => self.materialize_string(&words),
            Operand::Register(r) => r,
            Operand::Number(n) => n.to_string(),
            _ => return Err(ParseError::InvalidOperand(63, span)),
        };

        if a_dest.starts_with(self.target.sys_prefix()) && b_val.starts_with('[') {
            self.emit(format!("mov {}, dword {}", self.target.reg_c(), b_val));
            b_val = self.target.reg_c().to_string();
        }

        self.emit(format!("mov {a_dest}, {b_val}"));
        Ok(())
    }
}
