//! Database validation: parse every package's presets and check preset
//! name uniqueness across the registry.

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use crate::log;
use crate::registry::Registry;

/// Validate the whole database. Collects all package-level errors before
/// failing, so one bad package does not hide the others.
pub fn validate(registry: &Registry) -> Result<()> {
    let names = registry.package_names();
    let mut errors = Vec::new();

    for name in &names {
        match registry.package(name) {
            Ok(package) => {
                if !package.assets_path.is_dir() {
                    log!("warning"; "package `{}` has no asset dir at {}",
                        name, package.assets_path.display());
                }
            }
            Err(e) => errors.push(format!("package `{name}`: {e}")),
        }
    }

    if errors.is_empty() {
        match registry.validate_presets() {
            Ok(index) => {
                log!("validate"; "{} package(s), {} preset(s), no conflicts",
                    names.len(), index.len());
            }
            Err(e) => errors.push(e.to_string()),
        }
    }

    if errors.is_empty() {
        log!("validate"; "database is valid");
        Ok(())
    } else {
        for error in &errors {
            eprintln!("{} {}", "→".red(), error);
        }
        bail!("{} validation error(s)", errors.len());
    }
}
