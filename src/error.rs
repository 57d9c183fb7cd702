//! Error types for cachedump
//!
//! All modules use `DumpResult<T>` as their return type. Variants fall into
//! three fatal classes (precondition, resource exhaustion, no partitions)
//! that abort the whole run, and scoped classes (partition, subtree, file)
//! that the orchestrator reports and skips past.

use crate::platform::{ApplicationId, StorageSpace};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cachedump operations
pub type DumpResult<T> = Result<T, DumpError>;

/// All errors that can occur in cachedump
#[derive(Error, Debug)]
pub enum DumpError {
    // Precondition failures, fatal before any work starts
    #[error("application control data unavailable for {application_id}: {reason}")]
    ControlDataUnavailable {
        application_id: ApplicationId,
        reason: String,
    },

    // Resource exhaustion, fatal for the whole run
    #[error("failed to allocate {size:#x} byte file dump buffer")]
    BufferAlloc {
        size: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    // Discovery
    #[error("no cache save-data records found for application {0}")]
    NoCachePartitions(ApplicationId),

    #[error("storage space \"{space}\" is unavailable")]
    SpaceUnavailable {
        space: StorageSpace,
        #[source]
        source: std::io::Error,
    },

    // Mounting, scoped to one partition
    #[error("failed to open cache storage #{index} in the \"{space}\" space: {reason}")]
    StorageOpen {
        space: StorageSpace,
        index: u16,
        reason: String,
    },

    #[error("mount name \"{0}\" is already bound")]
    MountSlotBusy(&'static str),

    #[error("path \"{path}\" does not belong to mount \"{mount}\"")]
    ForeignMount { path: String, mount: &'static str },

    // Traversal, scoped to one subtree
    #[error("failed to open directory \"{path}\"")]
    DirectoryOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // File copy, scoped to one file
    #[error("path \"{0}\" has no partition scheme separator")]
    MissingScheme(String),

    #[error("failed to open \"{path}\" in read mode")]
    SourceOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open \"{path}\" in write mode")]
    DestinationOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read {got:#x} of {expected:#x} byte(s) chunk at offset {offset:#x} from \"{path}\"")]
    ShortRead {
        path: String,
        expected: usize,
        got: usize,
        offset: u64,
    },

    #[error("wrote {got:#x} of {expected:#x} byte(s) chunk to offset {offset:#x} in \"{path}\"")]
    ShortWrite {
        path: PathBuf,
        expected: usize,
        got: usize,
        offset: u64,
    },

    // General IO with context
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl DumpError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for fatal errors.
    ///
    /// 2 = precondition unmet, 3 = buffer allocation failure,
    /// 4 = no cache partitions discoverable, 1 = anything else that
    /// escapes to the process boundary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ControlDataUnavailable { .. } => 2,
            Self::BufferAlloc { .. } => 3,
            Self::NoCachePartitions(_) => 4,
            _ => 1,
        }
    }
}
