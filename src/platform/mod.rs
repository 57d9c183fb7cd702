//! Platform service seams
//!
//! The save-data registry, the application control-data source and the
//! cache-storage opener are system services on a real console. They are
//! modelled as traits here so the dump engine stays platform-agnostic;
//! [`host::HostPlatform`] implements all three over a plain directory tree.

pub mod host;
mod types;

pub use host::HostPlatform;
pub use types::{
    ApplicationId, CacheStorageInfo, ControlProperties, SaveDataKind, SaveDataRecord, StorageSpace,
};

use crate::error::DumpResult;
use std::path::{Path, PathBuf};

/// Application metadata lookup (the `ns` interface on a real console)
pub trait ControlDataSource {
    /// Retrieve the cache-storage properties declared by an application
    fn control_properties(&self, application_id: ApplicationId) -> DumpResult<ControlProperties>;
}

/// Filtered save-data record enumeration (the `fs` save-data info reader)
pub trait SaveDataRegistry {
    /// Every save-data record held by one storage space, in registry order
    fn enumerate(&self, space: StorageSpace) -> DumpResult<Vec<SaveDataRecord>>;
}

/// Open-by-{id, kind, index, space} access to cache storages
pub trait CacheStorageProvider {
    /// Open one cache storage; the returned handle is released on drop
    fn open_cache_storage(
        &self,
        application_id: ApplicationId,
        space: StorageSpace,
        index: u16,
    ) -> DumpResult<OpenedStorage>;
}

/// An opened but not yet mounted cache storage.
///
/// Holds the backing directory for the storage contents. Dropping the
/// handle without binding it releases the storage, so a failed bind can
/// never leak the open.
#[derive(Debug)]
pub struct OpenedStorage {
    backing: PathBuf,
}

impl OpenedStorage {
    pub(crate) fn new(backing: PathBuf) -> Self {
        Self { backing }
    }

    pub(crate) fn backing(&self) -> &Path {
        &self.backing
    }

    pub(crate) fn into_backing(self) -> PathBuf {
        self.backing
    }
}
