//! Depth-first partition traversal

use crate::dump::context::DumpContext;
use crate::dump::copier::copy_file;
use crate::mount::{EntryKind, MountedPartition};
use crate::ui::Console;
use std::io::Write;

/// Recursively dump one directory of the mounted partition.
///
/// Every failure is reported to the console and scoped to the smallest
/// unit of work: an unreadable directory skips that subtree, a failed copy
/// skips that file, and siblings continue either way. `depth` is the
/// distance from the partition root and only drives display indentation.
pub fn walk<W: Write>(
    ctx: &mut DumpContext,
    partition: &MountedPartition,
    console: &mut Console<W>,
    path: &str,
    depth: usize,
) {
    let entries = match partition.read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            console.report_error(&err);
            return;
        }
    };

    for entry in entries {
        // Skipped by name regardless of the reported kind.
        if entry.name == "." || entry.name == ".." {
            continue;
        }

        let indent = " ".repeat((depth + 1) * 3);
        let child = format!("{}/{}", path.trim_end_matches('/'), entry.name);

        match entry.kind {
            EntryKind::RegularFile => {
                console.line(&format!("{indent}- [F] {}", entry.name));
                if let Err(err) = copy_file(ctx, partition, &child) {
                    console.report_error(&err);
                }
            }
            EntryKind::Directory => {
                console.line(&format!("{indent}- [D] {}:", entry.name));
                walk(ctx, partition, console, &child, depth + 1);
            }
            EntryKind::Other => {
                console.line(&format!("{indent}- [?] {}", entry.name));
            }
        }
    }
}
