//! Path and web-path utilities.
//!
//! Pure functions, no side effects:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `web_join` - join web path segments with single slashes
//! - `is_absolute_url` - detect URL forms that bypass asset resolution

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Join web path segments with exactly one `/` between them.
///
/// Empty segments are skipped; the result keeps the leading slash of the
/// first non-empty segment.
///
/// # Examples
/// ```ignore
/// assert_eq!(web_join(&["/assets", "vendor/", "pkg"]), "/assets/vendor/pkg");
/// ```
pub fn web_join(segments: &[&str]) -> String {
    let mut leading = false;
    let mut parts: Vec<&str> = Vec::with_capacity(segments.len());
    for segment in segments {
        if parts.is_empty() && !leading && segment.starts_with('/') {
            leading = true;
        }
        let trimmed = segment.trim_matches('/');
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    let joined = parts.join("/");
    if leading {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Check if a reference is an absolute URL form that needs no resolution.
///
/// Covers scheme URLs (`https:`, `http:`, any `scheme:`), protocol-relative
/// (`//cdn...`) and root-relative (`/assets/...`) forms.
pub fn is_absolute_url(reference: &str) -> bool {
    if reference.starts_with('/') {
        return true;
    }
    reference.find(':').is_some_and(|pos| {
        pos > 0
            && reference[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
