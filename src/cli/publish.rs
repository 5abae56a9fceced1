//! Publishing: copy package asset directories into the document root.
//!
//! Incremental by default: a destination file is skipped when it is no
//! older than its source (mtime comparison). `--clean` copies everything.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jwalk::WalkDir;

use crate::freshness::is_newer_than;
use crate::registry::Registry;
use crate::{debug, log};

/// Publish all packages (or a single one) into the document root.
pub fn publish(registry: &Registry, package: Option<&str>, clean: bool) -> Result<()> {
    let names = match package {
        Some(name) => vec![name.to_string()],
        None => registry.package_names(),
    };

    let mut copied = 0usize;
    for name in names {
        let pkg = registry.package(&name)?;
        if !pkg.assets_path.is_dir() {
            log!("warning"; "package `{}` has no asset dir at {}", name, pkg.assets_path.display());
            continue;
        }
        let dest = pkg.publish_dir(registry.paths());
        let count = copy_tree(&pkg.assets_path, &dest, clean)?;
        debug!("publish"; "{}: {} file(s) -> {}", name, count, dest.display());
        copied += count;
    }

    log!("publish"; "published {} file(s)", copied);
    Ok(())
}

/// Recursively copy a directory tree, skipping fresh destinations.
///
/// Returns the number of files copied.
fn copy_tree(src: &Path, dest: &Path, clean: bool) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(src).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(src)?;
        let target = dest.join(rel);

        if !clean && target.exists() && !is_newer_than(&path, &target) {
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&path, &target)
            .with_context(|| format!("copying {} to {}", path.display(), target.display()))?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::registry::ConflictMode;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup(dir: &Path) -> Registry {
        let db_path = dir.join("assetpack.json");
        fs::write(
            &db_path,
            r#"{
                "document-root": "web",
                "packages": {
                    "acme/ui": {
                        "version": "1.0.0",
                        "path": "vendor/acme/ui/assets"
                    }
                }
            }"#,
        )
        .unwrap();

        let src = dir.join("vendor/acme/ui/assets");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("nav.css"), ".n{}").unwrap();
        fs::write(src.join("sub/app.js"), "var a;").unwrap();

        let db = Database::load(&db_path).unwrap();
        Registry::new(db, dir, ConflictMode::Fail)
    }

    #[test]
    fn test_publish_copies_tree() {
        let dir = TempDir::new().unwrap();
        let reg = setup(dir.path());
        publish(&reg, None, true).unwrap();

        let published = dir.path().join("web/assets/vendor/acme/ui");
        assert!(published.join("nav.css").is_file());
        assert!(published.join("sub/app.js").is_file());
    }

    #[test]
    fn test_publish_incremental() {
        let dir = TempDir::new().unwrap();
        let reg = setup(dir.path());

        let src = dir.path().join("vendor/acme/ui/assets");
        let dest = dir.path().join("web/assets/vendor/acme/ui");

        assert_eq!(copy_tree(&src, &dest, true).unwrap(), 2);
        // Nothing changed: nothing copied.
        assert_eq!(copy_tree(&src, &dest, false).unwrap(), 0);

        // Touch one source: exactly that file is re-copied.
        thread::sleep(Duration::from_millis(10));
        fs::write(src.join("nav.css"), ".n{color:red}").unwrap();
        assert_eq!(copy_tree(&src, &dest, false).unwrap(), 1);
        let text = fs::read_to_string(dest.join("nav.css")).unwrap();
        assert!(text.contains("red"));
    }

    #[test]
    fn test_publish_unknown_package() {
        let dir = TempDir::new().unwrap();
        let reg = setup(dir.path());
        assert!(publish(&reg, Some("missing/pkg"), false).is_err());
    }
}
