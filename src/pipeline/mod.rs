//! Pipeline stages shared by every converter.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ (converter builds argv) ──▶ exec ──▶ output check
//! (upload/URL)                          (child)   (size floor)
//! ```
//!
//! 1. [`input`]: stage uploads in a scoped temp file, pass URLs through
//! 2. [`exec`]: spawn the engine, capture stdout/stderr, enforce the deadline
//!
//! The size check lives in [`crate::output`] because it is part of what a
//! successful result *is*, not a step in producing it.

pub mod exec;
pub mod input;
