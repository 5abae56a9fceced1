//! The asset registry: package lookup, asset path resolution and the
//! aggregated preset index.
//!
//! The registry is an explicitly constructed object passed by reference to
//! every consumer; there is no global instance. Package and preset-index
//! construction is memoized behind `RefCell` (everything here is
//! single-threaded).

mod package;

pub use package::Package;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::database::{Database, Paths};
use crate::debug;
use crate::error::{AssetError, ResolutionKind, Result};
use crate::preset::Preset;
use crate::utils::path::web_join;

/// How duplicate preset names across packages are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictMode {
    /// A duplicate preset name is a fatal configuration error.
    #[default]
    Fail,
    /// Keep the first definition, drop later ones.
    KeepFirst,
}

/// A resolved asset: filesystem path plus public web path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    pub path: PathBuf,
    pub web_path: String,
}

/// Flat preset-name index built by [`Registry::validate_presets`].
pub type PresetIndex = FxHashMap<String, Rc<Preset>>;

pub struct Registry {
    db: Database,
    paths: Paths,
    base: PathBuf,
    conflict_mode: ConflictMode,
    packages: RefCell<FxHashMap<String, Rc<Package>>>,
    preset_index: RefCell<Option<Rc<PresetIndex>>>,
}

impl Registry {
    /// Build a registry over a loaded database. `base` is the directory
    /// the database file lives in; relative paths resolve against it.
    pub fn new(db: Database, base: impl Into<PathBuf>, conflict_mode: ConflictMode) -> Self {
        let base = base.into();
        let paths = db.paths(&base);
        Self {
            db,
            paths,
            base,
            conflict_mode,
            packages: RefCell::new(FxHashMap::default()),
            preset_index: RefCell::new(None),
        }
    }

    /// Directory layout in effect.
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// The underlying database (read-only).
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Names of all registered packages, in database order.
    pub fn package_names(&self) -> Vec<String> {
        self.db.packages.keys().cloned().collect()
    }

    /// Memoizing package factory: first lookup parses the record, later
    /// lookups reuse the instance. Unknown names fail with not-found.
    pub fn package(&self, name: &str) -> Result<Rc<Package>> {
        if let Some(package) = self.packages.borrow().get(name) {
            return Ok(Rc::clone(package));
        }
        let record = self
            .db
            .packages
            .get(name)
            .ok_or_else(|| AssetError::not_found(ResolutionKind::Package, name))?;
        let package = Rc::new(Package::from_record(name, record, &self.paths, &self.base)?);
        self.packages
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&package));
        Ok(package)
    }

    /// Resolve a logical filename to a published asset.
    ///
    /// With a package name, searches that package's publish directory;
    /// without one, the default assets root. `Ok(None)` means not found,
    /// which callers treat as common, not exceptional.
    pub fn find(&self, filename: &str, package: Option<&str>) -> Result<Option<AssetLocation>> {
        let (dir, web_dir) = match package {
            Some(name) => {
                let package = self.package(name)?;
                (
                    package.publish_dir(&self.paths),
                    web_join(&["/", &package.relative_path]),
                )
            }
            None => (self.paths.assets_root.clone(), self.paths.assets_web.clone()),
        };

        let path = dir.join(filename);
        if path.is_file() {
            Ok(Some(AssetLocation {
                path,
                web_path: web_join(&[&web_dir, filename]),
            }))
        } else {
            Ok(None)
        }
    }

    /// Build the flat preset index over all packages, checking name
    /// uniqueness. Load-time integrity check, memoized.
    pub fn validate_presets(&self) -> Result<Rc<PresetIndex>> {
        if let Some(index) = self.preset_index.borrow().as_ref() {
            return Ok(Rc::clone(index));
        }

        let mut index = PresetIndex::default();
        for name in self.package_names() {
            let package = self.package(&name)?;
            for preset in &package.presets {
                if let Some(existing) = index.get(&preset.name) {
                    match self.conflict_mode {
                        ConflictMode::Fail => {
                            return Err(AssetError::Configuration(format!(
                                "preset `{}` declared by both `{}` and `{}`",
                                preset.name, existing.package, preset.package
                            )));
                        }
                        ConflictMode::KeepFirst => {
                            debug!("registry"; "preset `{}` from `{}` shadowed by `{}`",
                                preset.name, preset.package, existing.package);
                            continue;
                        }
                    }
                }
                index.insert(preset.name.clone(), Rc::clone(preset));
            }
        }

        let index = Rc::new(index);
        *self.preset_index.borrow_mut() = Some(Rc::clone(&index));
        Ok(index)
    }

    /// Look up a preset by name in the validated index.
    pub fn preset(&self, name: &str) -> Result<Rc<Preset>> {
        self.validate_presets()?
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::not_found(ResolutionKind::Preset, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn db_json(presets_a: &str, presets_b: &str) -> String {
        format!(
            r#"{{
                "document-root": "web",
                "packages": {{
                    "acme/ui": {{
                        "version": "1.0.0",
                        "path": "vendor/acme/ui/assets",
                        "relative_path": "assets/vendor/acme/ui",
                        "assets_presets": {presets_a}
                    }},
                    "zeta/theme": {{
                        "version": "2.0.0",
                        "path": "vendor/zeta/theme/assets",
                        "assets_presets": {presets_b}
                    }}
                }}
            }}"#
        )
    }

    fn registry(dir: &TempDir, json: &str, mode: ConflictMode) -> Registry {
        let path = dir.path().join("assetpack.json");
        fs::write(&path, json).unwrap();
        let db = Database::load(&path).unwrap();
        Registry::new(db, dir.path(), mode)
    }

    #[test]
    fn test_package_factory_memoizes() {
        let dir = TempDir::new().unwrap();
        let reg = registry(&dir, &db_json("{}", "{}"), ConflictMode::Fail);

        let first = reg.package("acme/ui").unwrap();
        let second = reg.package("acme/ui").unwrap();
        assert!(Rc::ptr_eq(&first, &second));

        let err = reg.package("missing/pkg").unwrap_err();
        assert!(err.is_resolution());
    }

    #[test]
    fn test_find_default_and_package_roots() {
        let dir = TempDir::new().unwrap();
        let reg = registry(&dir, &db_json("{}", "{}"), ConflictMode::Fail);

        // Default assets root
        let assets_root = dir.path().join("web/assets");
        fs::create_dir_all(&assets_root).unwrap();
        fs::write(assets_root.join("site.css"), ".s{}").unwrap();

        // Package publish dir
        let pkg_dir = dir.path().join("web/assets/vendor/acme/ui");
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(pkg_dir.join("nav.css"), ".n{}").unwrap();

        let found = reg.find("site.css", None).unwrap().unwrap();
        assert_eq!(found.web_path, "/assets/site.css");
        assert!(found.path.is_file());

        let found = reg.find("nav.css", Some("acme/ui")).unwrap().unwrap();
        assert_eq!(found.web_path, "/assets/vendor/acme/ui/nav.css");

        // Not found is a sentinel, not an error.
        assert!(reg.find("missing.css", None).unwrap().is_none());
        assert!(reg.find("missing.css", Some("acme/ui")).unwrap().is_none());
    }

    #[test]
    fn test_preset_conflict_fails_by_default() {
        let dir = TempDir::new().unwrap();
        let presets = r#"{ "nav": { "css": ["nav.css"] } }"#;
        let reg = registry(&dir, &db_json(presets, presets), ConflictMode::Fail);

        let err = reg.validate_presets().unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("preset `nav`"));
        assert!(msg.contains("acme/ui"));
        assert!(msg.contains("zeta/theme"));
    }

    #[test]
    fn test_preset_conflict_keep_first() {
        let dir = TempDir::new().unwrap();
        let a = r#"{ "nav": { "css": ["a.css"] } }"#;
        let b = r#"{ "nav": { "css": ["b.css"] } }"#;
        let reg = registry(&dir, &db_json(a, b), ConflictMode::KeepFirst);

        // BTreeMap order: acme/ui before zeta/theme, so acme wins.
        let preset = reg.preset("nav").unwrap();
        assert_eq!(preset.package, "acme/ui");
    }

    #[test]
    fn test_preset_lookup_unknown() {
        let dir = TempDir::new().unwrap();
        let reg = registry(&dir, &db_json("{}", "{}"), ConflictMode::Fail);
        let err = reg.preset("nope").unwrap_err();
        assert!(err.is_resolution());
    }

    #[test]
    fn test_default_relative_path_applies() {
        let dir = TempDir::new().unwrap();
        let reg = registry(&dir, &db_json("{}", "{}"), ConflictMode::Fail);
        // zeta/theme has no relative_path: derived from the vendor dir.
        let package = reg.package("zeta/theme").unwrap();
        assert_eq!(package.relative_path, "assets/vendor/zeta/theme");
    }
}
