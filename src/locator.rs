//! Cache partition discovery
//!
//! Two interchangeable strategies behind one trait: a fixed index range
//! derived from the application's control data, and a filtered query
//! against the save-data registry. The walker and copier never know which
//! one produced a descriptor.

use crate::error::{DumpError, DumpResult};
use crate::platform::{
    ApplicationId, CacheStorageInfo, ControlProperties, SaveDataKind, SaveDataRegistry,
    StorageSpace,
};
use tracing::{debug, warn};

/// Produces the ordered sequence of cache partitions to dump
pub trait PartitionLocator {
    fn list(&self, application_id: ApplicationId) -> DumpResult<Vec<CacheStorageInfo>>;
}

/// Every index from 0 through the declared maximum, in one storage space.
///
/// Candidates are not validated here; a nonexistent index simply fails to
/// mount later and is skipped.
#[derive(Debug, Clone, Copy)]
pub struct FixedRangeLocator {
    space: StorageSpace,
    index_max: u16,
}

impl FixedRangeLocator {
    pub fn new(space: StorageSpace, index_max: u16) -> Self {
        Self { space, index_max }
    }

    /// Range bounds taken from the application's control data
    pub fn from_control(space: StorageSpace, properties: &ControlProperties) -> Self {
        Self::new(space, properties.cache_storage_index_max)
    }
}

impl PartitionLocator for FixedRangeLocator {
    fn list(&self, application_id: ApplicationId) -> DumpResult<Vec<CacheStorageInfo>> {
        debug!(%application_id, index_max = self.index_max, "listing fixed index range");
        Ok((0..=self.index_max)
            .map(|index| CacheStorageInfo {
                space: self.space,
                index,
            })
            .collect())
    }
}

/// Registry query filtered by application id and cache kind.
///
/// Walks the user space first, then removable user storage; within a
/// space the registry's own order is preserved. An unavailable space is
/// logged and skipped so a missing SD card never hides internal storage.
#[derive(Debug)]
pub struct RegistryLocator<'r, R: SaveDataRegistry> {
    registry: &'r R,
}

impl<'r, R: SaveDataRegistry> RegistryLocator<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Self { registry }
    }
}

impl<R: SaveDataRegistry> PartitionLocator for RegistryLocator<'_, R> {
    fn list(&self, application_id: ApplicationId) -> DumpResult<Vec<CacheStorageInfo>> {
        let mut found = Vec::new();
        for space in StorageSpace::ALL {
            let records = match self.registry.enumerate(space) {
                Ok(records) => records,
                Err(err) => {
                    warn!(%space, %err, "storage space unavailable, skipping");
                    continue;
                }
            };
            let before = found.len();
            found.extend(
                records
                    .iter()
                    .filter(|r| r.application_id == application_id && r.kind == SaveDataKind::Cache)
                    .map(|r| CacheStorageInfo {
                        space: r.space,
                        index: r.index,
                    }),
            );
            debug!(%space, matches = found.len() - before, "queried registry");
        }

        if found.is_empty() {
            return Err(DumpError::NoCachePartitions(application_id));
        }
        Ok(found)
    }
}
