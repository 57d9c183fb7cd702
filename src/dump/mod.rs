//! The recursive directory-dump engine
//!
//! A depth-first walker paired with a chunked file copier, operating over
//! one mounted partition at a time. All state the engine needs (the dump
//! buffer, the destination root, the application id) travels in a
//! [`DumpContext`] owned by the orchestrator.

pub mod context;
pub mod copier;
pub mod tree;
pub mod walker;

pub use context::{DumpContext, CHUNK_SIZE};
pub use copier::copy_file;
pub use tree::ensure_directories;
pub use walker::walk;
