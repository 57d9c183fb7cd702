//! Best-effort destination directory creation

use std::fs;
use std::path::Path;

/// Create every missing ancestor of `path`, root to leaf.
///
/// Individual creation failures (typically "already exists") are ignored;
/// a genuinely uncreatable ancestor surfaces later when the destination
/// file fails to open. When `create_last_segment` is set, `path` itself is
/// created as a directory too; the file copier always passes `false`
/// because its last segment is a file.
pub fn ensure_directories(path: &Path, create_last_segment: bool) {
    let mut ancestors: Vec<&Path> = path.ancestors().collect();
    ancestors.reverse();
    // Skip the empty root prefix and `path` itself.
    for dir in &ancestors[..ancestors.len().saturating_sub(1)] {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let _ = fs::create_dir(dir);
    }
    if create_last_segment {
        let _ = fs::create_dir(path);
    }
}
