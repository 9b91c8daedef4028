//! Parser/codegen state: the symbol tables and compound-statement
//! stack threaded through every `do_*` statement handler.
//!
//! Grounded on `parse.py`'s `Parser.__init__` instance fields. The
//! original tracks a name's storage class implicitly by checking
//! membership in three separate dicts/lists (`self.param`, `self.var`,
//! `self.extrn`) every time a name is used; here that's collapsed into
//! one [`Resolution`] returned by [`ParserState::resolve`], per the
//! redesign noted for this port.

use bc_util::{FxHashMap, FxHashSet, Target};

/// Where a name resolves to, and how the codegen walker should address
/// it.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// A function parameter at a positive offset from BP.
    Param(i64),
    /// An `auto` local (or vector) at a negative offset from BP.
    Local(i64),
    /// An `extrn` name, addressed through its decorated data symbol.
    Extern(String),
    Unknown,
}

impl Resolution {
    pub fn is_known(&self) -> bool {
        !matches!(self, Resolution::Unknown)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallConv {
    Cdecl,
    Stdcall,
}

#[derive(Clone, Debug)]
pub struct FunctionRecord {
    pub name: String,
    pub call: CallConv,
    pub prototype: bool,
    pub params: Vec<String>,
    /// Decorated assembly symbol (`_name` for CDECL, `_name@N` for
    /// STDCALL).
    pub tname: String,
}

impl FunctionRecord {
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Discriminates the four kinds of compound statement this compiler
/// tracks. Each carries the raw asm fragments the original stashed as
/// `before`/`after` strings on a generic dict; keeping those fragments
/// out of the enum variants (they're threaded in at push time instead)
/// avoids duplicating the start/end label pair across variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Function,
    If,
    Else,
    Loop,
}

pub struct CompoundFrame {
    pub kind: FrameKind,
    pub start: String,
    pub end: String,
    /// Raw instruction lines emitted immediately before the end label.
    pub before: Vec<String>,
    /// Raw instruction lines emitted immediately after the end label.
    pub after: Vec<String>,
}

impl CompoundFrame {
    pub fn is_loop(&self) -> bool {
        self.kind == FrameKind::Loop
    }
    pub fn is_func(&self) -> bool {
        self.kind == FrameKind::Function
    }
}

pub struct ParserState {
    pub target: Target,

    /// Every name declared so far in the current function (or at file
    /// scope while outside one) — parameters, locals, and function
    /// names all share one namespace, matching the original's flat
    /// `self.names` list.
    pub names: FxHashSet<String>,
    pub funcs: FxHashMap<String, FunctionRecord>,

    pub compounds: Vec<CompoundFrame>,
    label_counter: i64,

    params: FxHashMap<String, i64>,
    param_cursor: i64,

    locals: FxHashMap<String, i64>,
    local_cursor: i64,

    externs: FxHashSet<String>,

    pub in_func: bool,
    pub in_simple: bool,
    pub next_simple: bool,
}

impl ParserState {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            names: FxHashSet::default(),
            funcs: FxHashMap::default(),
            compounds: Vec::new(),
            label_counter: -1,
            params: FxHashMap::default(),
            param_cursor: 0,
            locals: FxHashMap::default(),
            local_cursor: 0,
            externs: FxHashSet::default(),
            in_func: false,
            in_simple: false,
            next_simple: false,
        }
    }

    pub fn fresh_label(&mut self) -> String {
        self.label_counter += 1;
        format!(".L{}", self.label_counter)
    }

    /// Gives back the most recently minted label index, mirroring the
    /// original's `do_func` decrementing `self.l` after discarding the
    /// generic end-label it generated in favor of the function's own
    /// symbol.
    pub fn return_label(&mut self) {
        self.label_counter -= 1;
    }

    pub fn declare_param(&mut self, name: &str, word: u32) {
        self.params.insert(name.to_string(), self.param_cursor);
        self.param_cursor += word as i64;
    }

    pub fn reset_param_cursor(&mut self, word: u32) {
        self.param_cursor = 2 * word as i64;
    }

    /// Reserves `word` bytes of local storage and returns the BP
    /// offset to address it.
    pub fn declare_local(&mut self, name: &str, word: u32) -> i64 {
        self.local_cursor -= word as i64;
        self.locals.insert(name.to_string(), self.local_cursor);
        self.local_cursor
    }

    pub fn local_cursor(&self) -> i64 {
        self.local_cursor
    }

    pub fn bump_local_cursor(&mut self, delta: i64) {
        self.local_cursor += delta;
    }

    pub fn declare_extern(&mut self, name: &str) {
        self.externs.insert(name.to_string());
    }

    pub fn resolve(&self, name: &str) -> Resolution {
        if let Some(&off) = self.params.get(name) {
            Resolution::Param(off)
        } else if let Some(&off) = self.locals.get(name) {
            Resolution::Local(off)
        } else if self.externs.contains(name) {
            Resolution::Extern(name.to_string())
        } else {
            Resolution::Unknown
        }
    }

    pub fn is_declared_variable(&self, name: &str) -> bool {
        self.resolve(name).is_known()
    }

    /// Clears all per-function state. Called after a function's
    /// closing brace pops its compound frame.
    pub fn end_function(&mut self) {
        self.names.clear();
        self.label_counter = -1;
        self.params.clear();
        self.param_cursor = 0;
        self.locals.clear();
        self.local_cursor = 0;
        self.externs.clear();
        self.in_func = false;
        self.in_simple = false;
        self.next_simple = false;
    }

    pub fn innermost_loop(&self) -> Option<&CompoundFrame> {
        self.compounds.iter().rev().find(|c| c.is_loop())
    }

    pub fn innermost_function(&self) -> Option<&CompoundFrame> {
        self.compounds.iter().rev().find(|c| c.is_func())
    }
}
