//! Host-filesystem platform backend
//!
//! Emulates the console's save-data services over a plain directory tree:
//!
//! ```text
//! <storage_root>/<space>/<application id, 16 hex digits>/<index, 4 digits>/...
//! ```
//!
//! Control properties are derived by scanning the application's `user`
//! space entries (highest index found, file sizes summed). Registry
//! records are derived from the entry names alone; whether a record is
//! actually mountable is validated by the open, so a stale or bogus entry
//! surfaces as a per-partition open failure, not a discovery failure.

use super::{
    ApplicationId, CacheStorageProvider, ControlDataSource, ControlProperties, OpenedStorage,
    SaveDataKind, SaveDataRecord, SaveDataRegistry, StorageSpace,
};
use crate::error::{DumpError, DumpResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory-tree-backed implementation of all three platform seams
#[derive(Debug, Clone)]
pub struct HostPlatform {
    storage_root: PathBuf,
}

impl HostPlatform {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    fn space_dir(&self, space: StorageSpace) -> PathBuf {
        self.storage_root.join(space.dir_name())
    }

    fn storage_dir(&self, application_id: ApplicationId, space: StorageSpace, index: u16) -> PathBuf {
        self.space_dir(space)
            .join(application_id.to_string())
            .join(format!("{index:04}"))
    }
}

impl ControlDataSource for HostPlatform {
    fn control_properties(&self, application_id: ApplicationId) -> DumpResult<ControlProperties> {
        let app_dir = self.space_dir(StorageSpace::User).join(application_id.to_string());
        if !app_dir.is_dir() {
            return Err(DumpError::ControlDataUnavailable {
                application_id,
                reason: format!("no record under \"{}\"", app_dir.display()),
            });
        }

        let mut index_max = 0u16;
        let entries = fs::read_dir(&app_dir).map_err(|source| DumpError::ControlDataUnavailable {
            application_id,
            reason: format!("cannot read \"{}\": {source}", app_dir.display()),
        })?;
        for entry in entries.flatten() {
            if let Some(index) = parse_index(&entry.file_name().to_string_lossy()) {
                index_max = index_max.max(index);
            }
        }

        let size = tree_size(&app_dir)
            .map_err(|source| DumpError::io(format!("sizing \"{}\"", app_dir.display()), source))?;

        debug!(%application_id, index_max, size, "derived control properties");
        Ok(ControlProperties {
            cache_storage_size: size,
            cache_storage_journal_size: 0,
            cache_storage_data_and_journal_size_max: size,
            cache_storage_index_max: index_max,
        })
    }
}

impl SaveDataRegistry for HostPlatform {
    fn enumerate(&self, space: StorageSpace) -> DumpResult<Vec<SaveDataRecord>> {
        let space_dir = self.space_dir(space);
        let entries = fs::read_dir(&space_dir)
            .map_err(|source| DumpError::SpaceUnavailable { space, source })?;

        let mut records = Vec::new();
        for app_entry in entries.flatten() {
            let name = app_entry.file_name().to_string_lossy().into_owned();
            let Some(application_id) = parse_application_id(&name) else {
                continue;
            };
            let indices = match fs::read_dir(app_entry.path()) {
                Ok(indices) => indices,
                Err(_) => continue,
            };
            for index_entry in indices.flatten() {
                // Record any parseable index, even when the entry is not a
                // directory; the open validates mountability later.
                if let Some(index) = parse_index(&index_entry.file_name().to_string_lossy()) {
                    records.push(SaveDataRecord {
                        application_id,
                        kind: SaveDataKind::Cache,
                        space,
                        index,
                    });
                }
            }
        }

        // The host registry defines its order as (application id, index)
        // ascending so runs are reproducible across filesystems.
        records.sort_by_key(|r| (r.application_id.0, r.index));
        debug!(%space, count = records.len(), "enumerated save-data records");
        Ok(records)
    }
}

impl CacheStorageProvider for HostPlatform {
    fn open_cache_storage(
        &self,
        application_id: ApplicationId,
        space: StorageSpace,
        index: u16,
    ) -> DumpResult<OpenedStorage> {
        let dir = self.storage_dir(application_id, space, index);
        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => Ok(OpenedStorage::new(dir)),
            Ok(_) => Err(DumpError::StorageOpen {
                space,
                index,
                reason: format!("\"{}\" is not a directory", dir.display()),
            }),
            Err(source) => Err(DumpError::StorageOpen {
                space,
                index,
                reason: format!("\"{}\": {source}", dir.display()),
            }),
        }
    }
}

fn parse_application_id(name: &str) -> Option<ApplicationId> {
    if name.len() != 16 {
        return None;
    }
    u64::from_str_radix(name, 16).ok().map(ApplicationId)
}

fn parse_index(name: &str) -> Option<u16> {
    if name.len() != 4 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Total size in bytes of every regular file under `dir`
fn tree_size(dir: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let kind = entry.file_type()?;
        if kind.is_dir() {
            total += tree_size(&entry.path())?;
        } else if kind.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    const APP: ApplicationId = ApplicationId(0x0100C090153B4000);

    fn seed_storage(root: &Path, space: &str, app: &str, index: &str, files: &[(&str, &[u8])]) {
        let dir = root.join(space).join(app).join(index);
        fs::create_dir_all(&dir).unwrap();
        for (name, contents) in files {
            let path = dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            File::create(path).unwrap().write_all(contents).unwrap();
        }
    }

    #[test]
    fn control_properties_from_layout() {
        let tmp = TempDir::new().unwrap();
        seed_storage(tmp.path(), "user", "0100C090153B4000", "0000", &[("a.bin", b"12345")]);
        seed_storage(tmp.path(), "user", "0100C090153B4000", "0002", &[("b/c.bin", b"123")]);

        let platform = HostPlatform::new(tmp.path());
        let props = platform.control_properties(APP).unwrap();
        assert_eq!(props.cache_storage_index_max, 2);
        assert_eq!(props.cache_storage_size, 8);
    }

    #[test]
    fn control_properties_missing_application() {
        let tmp = TempDir::new().unwrap();
        let platform = HostPlatform::new(tmp.path());
        let err = platform.control_properties(APP).unwrap_err();
        assert!(matches!(err, DumpError::ControlDataUnavailable { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn enumerate_sorts_and_filters() {
        let tmp = TempDir::new().unwrap();
        seed_storage(tmp.path(), "user", "0100C090153B4000", "0001", &[]);
        seed_storage(tmp.path(), "user", "0100C090153B4000", "0000", &[]);
        seed_storage(tmp.path(), "user", "0000000000000001", "0000", &[]);
        // Unparseable names are not records.
        fs::create_dir_all(tmp.path().join("user/not-a-title/0000")).unwrap();

        let platform = HostPlatform::new(tmp.path());
        let records = platform.enumerate(StorageSpace::User).unwrap();
        let keys: Vec<_> = records.iter().map(|r| (r.application_id.0, r.index)).collect();
        assert_eq!(
            keys,
            vec![(1, 0), (0x0100C090153B4000, 0), (0x0100C090153B4000, 1)]
        );
        assert!(records.iter().all(|r| r.kind == SaveDataKind::Cache));
    }

    #[test]
    fn enumerate_unavailable_space() {
        let tmp = TempDir::new().unwrap();
        let platform = HostPlatform::new(tmp.path());
        let err = platform.enumerate(StorageSpace::RemovableUser).unwrap_err();
        assert!(matches!(err, DumpError::SpaceUnavailable { .. }));
    }

    #[test]
    fn enumerate_records_non_directory_entries() {
        let tmp = TempDir::new().unwrap();
        seed_storage(tmp.path(), "user", "0100C090153B4000", "0000", &[]);
        let bogus = tmp.path().join("user/0100C090153B4000/0001");
        File::create(&bogus).unwrap();

        let platform = HostPlatform::new(tmp.path());
        let records = platform.enumerate(StorageSpace::User).unwrap();
        assert_eq!(records.len(), 2);

        // The stale record fails at open time instead.
        let err = platform
            .open_cache_storage(APP, StorageSpace::User, 1)
            .unwrap_err();
        assert!(matches!(err, DumpError::StorageOpen { index: 1, .. }));
    }

    #[test]
    fn open_cache_storage_success() {
        let tmp = TempDir::new().unwrap();
        seed_storage(tmp.path(), "removable", "0100C090153B4000", "0003", &[]);

        let platform = HostPlatform::new(tmp.path());
        let storage = platform
            .open_cache_storage(APP, StorageSpace::RemovableUser, 3)
            .unwrap();
        assert!(storage.backing().ends_with("removable/0100C090153B4000/0003"));
    }
}
