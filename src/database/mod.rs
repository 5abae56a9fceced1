//! The JSON asset database: directory layout plus installed packages and
//! their declared presets.
//!
//! The database is written by the host package manager at install time and
//! is the only interface between it and this tool. It is loaded once per
//! run, read-only afterwards except for explicit maintenance (`prune`),
//! and always rewritten wholesale by [`Database::save`]. Nothing writes on
//! Drop.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AssetError, Result};
use crate::log;
use crate::utils::path::web_join;

fn default_assets_dir() -> String {
    "assets".into()
}

fn default_vendor_dir() -> String {
    "assets/vendor".into()
}

fn default_document_root() -> PathBuf {
    "web".into()
}

fn default_cache_dir() -> String {
    "cache".into()
}

/// Raw preset block: statement-type key (`css`, `js`, `jsfiles_header`,
/// `jsfiles_footer`, `require`) to ordered raw statement strings.
pub type RawPreset = BTreeMap<String, Vec<String>>;

/// One installed package as recorded in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Logical package name; falls back to the map key when absent.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// Web-relative directory under the document root where the package's
    /// assets are published. Derived from the vendor dir when empty.
    #[serde(default)]
    pub relative_path: String,

    /// Source directory of the package's assets (in the vendor tree).
    #[serde(alias = "path")]
    pub assets_path: PathBuf,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assets_presets: BTreeMap<String, RawPreset>,
}

/// The asset database file.
///
/// Package maps are `BTreeMap`s: scan order, keep-first precedence and
/// rewrite output all follow lexicographic package-name order, regardless
/// of how the file on disk is ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(rename = "assets-dir", default = "default_assets_dir")]
    pub assets_dir: String,

    #[serde(rename = "assets-vendor-dir", default = "default_vendor_dir")]
    pub assets_vendor_dir: String,

    /// Public document root, absolute or relative to the database file.
    #[serde(rename = "document-root", default = "default_document_root")]
    pub document_root: PathBuf,

    /// Bundle cache directory, web-relative under the document root.
    #[serde(rename = "cache-dir", default = "default_cache_dir")]
    pub cache_dir: String,

    #[serde(default)]
    pub packages: BTreeMap<String, PackageRecord>,
}

impl Database {
    /// Load and deserialize the database, warning on unknown fields.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
        let mut deserializer = serde_json::Deserializer::from_str(&text);
        let db: Self = serde_ignored::deserialize(&mut deserializer, |ignored| {
            log!("warning"; "unknown field `{}` in {}", ignored, path.display());
        })
        .map_err(|e| {
            AssetError::Configuration(format!("malformed database {}: {e}", path.display()))
        })?;
        Ok(db)
    }

    /// Write the whole database back. Explicit call, never incremental.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AssetError::Configuration(format!("cannot serialize database: {e}")))?;
        fs::write(path, json + "\n").map_err(|e| AssetError::io(path, e))
    }

    /// Remove a package entry. Returns the removed record, if any.
    pub fn remove_package(&mut self, name: &str) -> Option<PackageRecord> {
        self.packages.remove(name)
    }

    /// Resolve the directory layout, anchoring relative paths at `base`
    /// (the database file's directory).
    pub fn paths(&self, base: &Path) -> Paths {
        let document_root = if self.document_root.is_absolute() {
            self.document_root.clone()
        } else {
            base.join(&self.document_root)
        };
        Paths {
            assets_root: document_root.join(&self.assets_dir),
            cache_dir: document_root.join(&self.cache_dir),
            assets_web: web_join(&["/", &self.assets_dir]),
            cache_web: web_join(&["/", &self.cache_dir]),
            vendor_dir: self.assets_vendor_dir.clone(),
            document_root,
        }
    }
}

/// Filesystem/web layout derived from the database.
#[derive(Debug, Clone)]
pub struct Paths {
    pub document_root: PathBuf,
    /// Default lookup root for unqualified asset names.
    pub assets_root: PathBuf,
    /// Where content-addressed bundles are written.
    pub cache_dir: PathBuf,
    /// Web path of the default assets root.
    pub assets_web: String,
    /// Web path of the bundle cache.
    pub cache_web: String,
    /// Web-relative vendor directory under the document root.
    pub vendor_dir: String,
}

impl Paths {
    /// Default publish location for a package without an explicit
    /// `relative_path`.
    pub fn default_relative_path(&self, package: &str) -> String {
        web_join(&[&self.vendor_dir, package])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "assets-dir": "static",
        "document-root": "public",
        "packages": {
            "acme/ui": {
                "name": "acme/ui",
                "version": "1.2.0",
                "path": "vendor/acme/ui/assets",
                "assets_presets": {
                    "nav": { "css": ["nav.css"], "js": ["nav.js"] }
                }
            }
        }
    }"#;

    fn write_db(dir: &TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("assetpack.json");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_with_defaults_and_alias() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, SAMPLE);
        let db = Database::load(&path).unwrap();

        assert_eq!(db.assets_dir, "static");
        // Omitted fields fall back to defaults.
        assert_eq!(db.assets_vendor_dir, "assets/vendor");
        assert_eq!(db.cache_dir, "cache");

        let pkg = &db.packages["acme/ui"];
        // `path` is accepted as an alias of `assets_path`.
        assert_eq!(pkg.assets_path, PathBuf::from("vendor/acme/ui/assets"));
        assert_eq!(pkg.assets_presets["nav"]["css"], vec!["nav.css"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Database::load(Path::new("/nonexistent/assetpack.json")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_load_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, "{ not json");
        let err = Database::load(&path).unwrap_err();
        assert!(matches!(err, AssetError::Configuration(_)));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, SAMPLE);
        let mut db = Database::load(&path).unwrap();

        assert!(db.remove_package("acme/ui").is_some());
        assert!(db.remove_package("acme/ui").is_none());
        db.save(&path).unwrap();

        let reloaded = Database::load(&path).unwrap();
        assert!(reloaded.packages.is_empty());
        // Layout fields survive the wholesale rewrite.
        assert_eq!(reloaded.assets_dir, "static");
    }

    #[test]
    fn test_paths_layout() {
        let dir = TempDir::new().unwrap();
        let path = write_db(&dir, SAMPLE);
        let db = Database::load(&path).unwrap();
        let paths = db.paths(dir.path());

        assert_eq!(paths.document_root, dir.path().join("public"));
        assert_eq!(paths.assets_root, dir.path().join("public/static"));
        assert_eq!(paths.cache_dir, dir.path().join("public/cache"));
        assert_eq!(paths.assets_web, "/static");
        assert_eq!(paths.cache_web, "/cache");
        assert_eq!(
            paths.default_relative_path("acme/ui"),
            "assets/vendor/acme/ui"
        );
    }
}
