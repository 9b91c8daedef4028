//! Expression reordering and statement-level parsing/code generation.
//!
//! Combined into one crate because the spec treats them as one
//! collaborating unit: the parser collects an expression's raw tokens,
//! hands them to [`rpn::Rpn`], then immediately walks the postfix result
//! with [`codegen::Codegen`] (see [`parser::Parser::run_expression`]).

mod codegen;
mod error;
mod parser;
mod rpn;
mod state;

pub use codegen::{Codegen, Operand};
pub use error::{ParseError, RpnError};
pub use parser::{ParsedUnit, Parser};
pub use rpn::{ExprToken, PostfixItem, Rpn};
pub use state::{CallConv, CompoundFrame, FrameKind, FunctionRecord, ParserState, Resolution};
