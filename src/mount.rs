//! Single-slot partition mounting
//!
//! At most one cache partition is ever bound at a time, under the fixed
//! logical name `save`. Mounting is a two-step open + bind; when the bind
//! step fails the opened storage handle is dropped before returning, so
//! nothing leaks. Unmounting with nothing bound is an explicit no-op.

use crate::error::{DumpError, DumpResult};
use crate::platform::{ApplicationId, CacheStorageInfo, CacheStorageProvider};
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::{debug, trace};

/// Logical name cache partitions are bound under
pub const MOUNT_NAME: &str = "save";

/// Kind tag for one enumerated directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    RegularFile,
    Directory,
    Other,
}

/// One transient directory entry produced during enumeration
#[derive(Debug, Clone)]
pub struct PartitionEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// The single mount slot.
///
/// The orchestrator owns one adapter for the whole run and must unmount
/// between partitions; mounting over a live bind is refused rather than
/// silently replacing it.
pub struct MountAdapter<'p, P: CacheStorageProvider> {
    provider: &'p P,
    application_id: ApplicationId,
    slot: Option<MountedPartition>,
}

impl<'p, P: CacheStorageProvider> MountAdapter<'p, P> {
    pub fn new(provider: &'p P, application_id: ApplicationId) -> Self {
        Self {
            provider,
            application_id,
            slot: None,
        }
    }

    /// Open the cache storage named by `info` and bind it under [`MOUNT_NAME`]
    pub fn mount(&mut self, info: &CacheStorageInfo) -> DumpResult<&MountedPartition> {
        let storage = self
            .provider
            .open_cache_storage(self.application_id, info.space, info.index)?;
        if self.slot.is_some() {
            // Bind refused; `storage` drops here, releasing the open.
            return Err(DumpError::MountSlotBusy(MOUNT_NAME));
        }
        debug!(index = info.index, space = %info.space, "mounted cache storage");
        Ok(self.slot.insert(MountedPartition {
            mount_name: MOUNT_NAME,
            backing: storage.into_backing(),
            index: info.index,
        }))
    }

    /// Release the current bind; callable with nothing mounted
    pub fn unmount(&mut self) {
        match self.slot.take() {
            Some(partition) => debug!(index = partition.index, "unmounted cache storage"),
            None => trace!("unmount with empty slot"),
        }
    }
}

/// A cache partition bound under a logical mount name.
///
/// Paths into the partition use the `save:/...` scheme form; [`Self::resolve`]
/// maps them onto the backing directory.
#[derive(Debug)]
pub struct MountedPartition {
    mount_name: &'static str,
    backing: PathBuf,
    index: u16,
}

impl MountedPartition {
    /// Index of the partition this mount exposes
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Logical root path, e.g. `save:/`
    pub fn root(&self) -> String {
        format!("{}:/", self.mount_name)
    }

    /// Map a logical `save:/...` path onto the backing filesystem
    pub fn resolve(&self, logical: &str) -> DumpResult<PathBuf> {
        let (scheme, rest) = logical
            .split_once(':')
            .ok_or_else(|| DumpError::MissingScheme(logical.to_string()))?;
        if scheme != self.mount_name {
            return Err(DumpError::ForeignMount {
                path: logical.to_string(),
                mount: self.mount_name,
            });
        }
        let relative = rest.trim_start_matches('/');
        Ok(if relative.is_empty() {
            self.backing.clone()
        } else {
            self.backing.join(relative)
        })
    }

    /// Enumerate one directory of the partition.
    ///
    /// Entries come back name-sorted so traversal order is reproducible
    /// regardless of the backing filesystem.
    pub fn read_dir(&self, logical: &str) -> DumpResult<Vec<PartitionEntry>> {
        let host = self.resolve(logical)?;
        let reader = fs::read_dir(&host).map_err(|source| DumpError::DirectoryOpen {
            path: logical.to_string(),
            source,
        })?;

        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|source| DumpError::DirectoryOpen {
                path: logical.to_string(),
                source,
            })?;
            let kind = match entry.file_type() {
                Ok(t) if t.is_file() => EntryKind::RegularFile,
                Ok(t) if t.is_dir() => EntryKind::Directory,
                _ => EntryKind::Other,
            };
            entries.push(PartitionEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Open one regular file of the partition for reading
    pub fn open_file(&self, logical: &str) -> DumpResult<File> {
        let host = self.resolve(logical)?;
        File::open(&host).map_err(|source| DumpError::SourceOpen {
            path: logical.to_string(),
            source,
        })
    }
}
