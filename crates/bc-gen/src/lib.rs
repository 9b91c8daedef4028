//! Assembly emission: segment buffers and final NASM text assembly.
//!
//! Target register/word conventions live in `bc_util::target` since
//! both the codegen walker (`bc-par`) and this crate need them.

mod emitter;
mod segments;

pub use emitter::Emitter;
pub use segments::{Segment, Segments};
