//! Chunked single-file copy with partial-output cleanup
//!
//! One source file is streamed to its destination in fixed-size chunks
//! through the shared dump buffer. Any failure after the destination was
//! created removes the partial file, so no corrupt output is ever left on
//! disk.

use crate::dump::context::DumpContext;
use crate::dump::tree::ensure_directories;
use crate::error::{DumpError, DumpResult};
use crate::mount::MountedPartition;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copy one partition file to its destination path.
///
/// `source` is a logical `save:/...` path. Failure is returned for the
/// caller to report; the caller continues with the next sibling either
/// way. On success the destination file is byte-identical to the source.
pub fn copy_file(
    ctx: &mut DumpContext,
    partition: &MountedPartition,
    source: &str,
) -> DumpResult<()> {
    let dest = ctx.destination_path(partition.index(), source)?;
    ensure_directories(&dest, false);

    let mut src = partition.open_file(source)?;
    let size = src
        .seek(SeekFrom::End(0))
        .map_err(|e| DumpError::io(format!("sizing \"{source}\""), e))?;
    src.rewind()
        .map_err(|e| DumpError::io(format!("rewinding \"{source}\""), e))?;

    // Declared before the destination handle so the handle is closed by
    // the time a partial file gets removed; armed only once the create
    // succeeds so a failed open never deletes a pre-existing entry.
    let mut guard = PartialFileGuard::disarmed(&dest);
    let mut dst = File::create(&dest).map_err(|e| DumpError::DestinationOpen {
        path: dest.clone(),
        source: e,
    })?;
    guard.arm();

    let buffer = ctx.buffer_mut();
    let progress = (size > buffer.len() as u64).then(|| chunk_progress(size));
    let copied = copy_stream(&mut src, &mut dst, buffer, size, source, &dest, progress.as_ref());
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }
    copied?;

    dst.flush()
        .map_err(|e| DumpError::io(format!("flushing \"{}\"", dest.display()), e))?;
    guard.disarm();
    debug!(source, size, dest = %dest.display(), "copied file");
    Ok(())
}

/// Stream `size` bytes from `src` to `dst` in `buffer`-sized chunks.
///
/// The final chunk is shrunk to the remaining byte count before any IO,
/// and the short-transfer checks compare against that adjusted length,
/// never the nominal chunk size.
fn copy_stream<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
    buffer: &mut [u8],
    size: u64,
    source_path: &str,
    dest_path: &Path,
    progress: Option<&ProgressBar>,
) -> DumpResult<()> {
    let nominal = buffer.len() as u64;
    let mut offset = 0u64;
    while offset < size {
        let chunk = u64::min(nominal, size - offset) as usize;

        let got = fill_chunk(src, &mut buffer[..chunk])
            .map_err(|e| DumpError::io(format!("reading \"{source_path}\""), e))?;
        if got != chunk {
            return Err(DumpError::ShortRead {
                path: source_path.to_string(),
                expected: chunk,
                got,
                offset,
            });
        }

        let put = drain_chunk(dst, &buffer[..chunk])
            .map_err(|e| DumpError::io(format!("writing \"{}\"", dest_path.display()), e))?;
        if put != chunk {
            return Err(DumpError::ShortWrite {
                path: dest_path.to_path_buf(),
                expected: chunk,
                got: put,
                offset,
            });
        }

        offset += chunk as u64;
        if let Some(bar) = progress {
            bar.set_position(offset);
        }
    }
    Ok(())
}

/// Read until `buf` is full or the source is exhausted
fn fill_chunk<R: Read>(src: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Write until `buf` is drained or the sink stops accepting bytes
fn drain_chunk<W: Write>(dst: &mut W, buf: &[u8]) -> std::io::Result<usize> {
    let mut drained = 0;
    while drained < buf.len() {
        match dst.write(&buf[drained..]) {
            Ok(0) => break,
            Ok(n) => drained += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(drained)
}

/// Removes the destination file on drop while armed.
///
/// Starts disarmed; armed by the copier once it has actually created the
/// destination, so only output this run produced can ever be removed.
struct PartialFileGuard {
    path: PathBuf,
    armed: bool,
}

impl PartialFileGuard {
    fn disarmed(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: false,
        }
    }

    fn arm(&mut self) {
        self.armed = true;
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

fn chunk_progress(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:20.cyan/dim} {bytes}/{total_bytes} {elapsed:.dim}")
            .unwrap()
            .progress_chars("━╸─"),
    );
    bar
}
