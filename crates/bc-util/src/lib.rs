//! Foundation types shared by every stage of the B compiler: source
//! locations, diagnostic rendering, and the hash-map aliases the rest of
//! the workspace uses for symbol tables.

pub mod diagnostic;
pub mod span;
pub mod target;

pub use diagnostic::{report, Stage, StageDiagnostic};
pub use span::{SourceMap, Span};
pub use target::Target;

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
