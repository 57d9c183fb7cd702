//! cachedump - Cache save-data partition dumper
//!
//! Locates an application's cache save-data partitions, mounts each one
//! read-only, walks its directory tree depth-first and copies every file
//! to a per-title, per-index destination layout.

pub mod dump;
pub mod error;
pub mod locator;
pub mod mount;
pub mod platform;
pub mod ui;

pub use error::{DumpError, DumpResult};
