//! Mtime-based freshness detection for generated files.
//!
//! A destination file is considered fresh iff it exists and its modification
//! time is >= every input file's modification time. The destination file
//! itself is the cache record; there is no separate index.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check if file A is newer than file B
///
/// Returns `true` if A exists and is newer than B
/// Returns `false` if either file doesn't exist or times can't be compared
pub fn is_newer_than(a: &Path, b: &Path) -> bool {
    let (Some(a_time), Some(b_time)) = (get_mtime(a), get_mtime(b)) else {
        return false;
    };
    a_time > b_time
}

/// Check if a destination file is fresh relative to a set of inputs.
///
/// Returns `true` when the destination exists and no input is newer than it.
/// Missing inputs are ignored here; input validation happens upstream.
pub fn is_destination_fresh<'a, I>(destination: &Path, inputs: I) -> bool
where
    I: IntoIterator<Item = &'a Path>,
{
    let Some(dest_time) = get_mtime(destination) else {
        return false;
    };
    inputs
        .into_iter()
        .all(|input| get_mtime(input).is_none_or(|t| t <= dest_time))
}
