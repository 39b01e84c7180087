//! The native runtime library consumed by emitted code.
//!
//! The compiler core (`glint-compiler`) never links against this crate; it
//! only emits calls to the C symbols documented in the runtime ABI table.
//! This crate exists purely to give the JIT host and the `emit-object` /
//! linked-binary path something real to resolve those symbols against, and
//! to let integration tests run emitted programs end to end.

pub mod header;
pub mod string;

pub use header::{
    Object_alloc, Object_get_ref_count, Object_release, Object_retain, ObjectHeader, HEADER_SIZE,
};
pub use string::GlintString;
