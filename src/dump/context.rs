//! Shared dump state threaded through the walker and copier

use crate::error::{DumpError, DumpResult};
use crate::platform::ApplicationId;
use std::path::PathBuf;

/// Copy chunk size, 8 MiB. The dump buffer is exactly one chunk.
pub const CHUNK_SIZE: usize = 0x800000;

/// Process-lifetime dump state.
///
/// Owns the single file-dump buffer, which is allocated once up front and
/// reused for every file copied; a failed allocation aborts the run before
/// any partition is touched.
pub struct DumpContext {
    buffer: Vec<u8>,
    dump_root: PathBuf,
    application_id: ApplicationId,
}

impl DumpContext {
    pub fn new(dump_root: impl Into<PathBuf>, application_id: ApplicationId) -> DumpResult<Self> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(CHUNK_SIZE)
            .map_err(|source| DumpError::BufferAlloc {
                size: CHUNK_SIZE,
                source,
            })?;
        buffer.resize(CHUNK_SIZE, 0);
        Ok(Self {
            buffer,
            dump_root: dump_root.into(),
            application_id,
        })
    }

    /// Destination path for one source file.
    ///
    /// A pure function of (application id, partition index, source path):
    /// `<dump_root>/<application id, 16 hex digits>/<index, 4 digits>/<suffix>`
    /// where the suffix is everything after the first `:` in the source
    /// path. A source path without a scheme separator is an error.
    pub fn destination_path(&self, index: u16, source_path: &str) -> DumpResult<PathBuf> {
        let (_, suffix) = source_path
            .split_once(':')
            .ok_or_else(|| DumpError::MissingScheme(source_path.to_string()))?;
        Ok(self
            .dump_root
            .join(self.application_id.to_string())
            .join(format!("{index:04}"))
            .join(suffix.trim_start_matches('/')))
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const APP: ApplicationId = ApplicationId(0x0100C090153B4000);

    #[test]
    fn buffer_is_one_chunk() {
        let mut ctx = DumpContext::new("cache_dumps", APP).unwrap();
        assert_eq!(ctx.buffer_mut().len(), CHUNK_SIZE);
    }

    #[test]
    fn destination_path_layout() {
        let ctx = DumpContext::new("cache_dumps", APP).unwrap();
        let dest = ctx.destination_path(3, "save:/a/b/c.txt").unwrap();
        assert_eq!(
            dest,
            Path::new("cache_dumps/0100C090153B4000/0003/a/b/c.txt")
        );
    }

    #[test]
    fn destination_path_is_deterministic() {
        let ctx = DumpContext::new("cache_dumps", APP).unwrap();
        let first = ctx.destination_path(0, "save:/x").unwrap();
        let second = ctx.destination_path(0, "save:/x").unwrap();
        assert_eq!(first, second);

        // Index is zero-padded to four digits.
        let wide = ctx.destination_path(42, "save:/x").unwrap();
        assert!(wide.to_string_lossy().contains("/0042/"));
    }

    #[test]
    fn destination_path_requires_scheme() {
        let ctx = DumpContext::new("cache_dumps", APP).unwrap();
        let err = ctx.destination_path(0, "/no/scheme").unwrap_err();
        assert!(matches!(err, DumpError::MissingScheme(_)));
    }
}
