//! Prune: drop packages whose asset sources no longer exist on disk and
//! rewrite the database wholesale.

use std::path::Path;

use anyhow::Result;

use crate::database::Database;
use crate::log;

/// Remove stale packages. Returns how many were dropped.
pub fn prune(db: &mut Database, db_path: &Path, dry_run: bool) -> Result<usize> {
    let base = db_path.parent().unwrap_or_else(|| Path::new("."));

    let stale: Vec<String> = db
        .packages
        .iter()
        .filter(|(_, record)| {
            let path = if record.assets_path.is_absolute() {
                record.assets_path.clone()
            } else {
                base.join(&record.assets_path)
            };
            !path.is_dir()
        })
        .map(|(name, _)| name.clone())
        .collect();

    for name in &stale {
        log!("prune"; "{}`{}`: asset sources missing",
            if dry_run { "would remove " } else { "removing " }, name);
        if !dry_run {
            db.remove_package(name);
        }
    }

    if !dry_run && !stale.is_empty() {
        db.save(db_path)?;
    }
    log!("prune"; "{} stale package(s)", stale.len());
    Ok(stale.len())
}
