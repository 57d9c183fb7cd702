//! Core save-data types shared across the crate

use std::fmt;

/// A 64-bit application (title) identifier.
///
/// Renders as 16 uppercase hex digits everywhere, which is also the first
/// path segment of the dump destination layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// A storage domain that can independently hold save-data records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageSpace {
    /// Internal user storage
    User,
    /// Removable external user storage
    RemovableUser,
}

impl StorageSpace {
    /// Both spaces, in the order discovery walks them
    pub const ALL: [StorageSpace; 2] = [StorageSpace::User, StorageSpace::RemovableUser];

    /// Directory name used by the host platform backing layout
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::RemovableUser => "removable",
        }
    }
}

impl fmt::Display for StorageSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::RemovableUser => write!(f, "removable user"),
        }
    }
}

/// Save-data flavor carried by a registry record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDataKind {
    Account,
    Bcat,
    Device,
    Temporary,
    Cache,
}

/// One record from the save-data registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveDataRecord {
    pub application_id: ApplicationId,
    pub kind: SaveDataKind,
    pub space: StorageSpace,
    pub index: u16,
}

/// Descriptor for one discoverable cache partition.
///
/// Produced by a partition locator, consumed (never mutated) by the mount
/// adapter. The position in the locator's output drives nothing except the
/// order partitions are dumped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStorageInfo {
    pub space: StorageSpace,
    pub index: u16,
}

/// Cache-storage properties declared in an application's control data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlProperties {
    pub cache_storage_size: u64,
    pub cache_storage_journal_size: u64,
    pub cache_storage_data_and_journal_size_max: u64,
    pub cache_storage_index_max: u16,
}
