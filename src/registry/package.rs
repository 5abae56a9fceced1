//! Installed package objects, built from database records.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::database::{PackageRecord, Paths};
use crate::error::Result;
use crate::preset::Preset;

/// An installed package with parsed presets.
#[derive(Debug)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Web-relative publish directory under the document root.
    pub relative_path: String,
    /// Source directory of the package's assets.
    pub assets_path: PathBuf,
    pub presets: Vec<Rc<Preset>>,
}

impl Package {
    /// Build from a database record. `key` is the package's map key,
    /// used when the record omits its name; `base` anchors a relative
    /// `assets_path`.
    pub fn from_record(key: &str, record: &PackageRecord, paths: &Paths, base: &Path) -> Result<Self> {
        let name = if record.name.is_empty() {
            key.to_string()
        } else {
            record.name.clone()
        };
        let relative_path = if record.relative_path.is_empty() {
            paths.default_relative_path(&name)
        } else {
            record.relative_path.clone()
        };
        let assets_path = if record.assets_path.is_absolute() {
            record.assets_path.clone()
        } else {
            base.join(&record.assets_path)
        };

        let mut presets = Vec::with_capacity(record.assets_presets.len());
        for (preset_name, raw) in &record.assets_presets {
            presets.push(Rc::new(Preset::parse(preset_name, &name, raw)?));
        }

        Ok(Self {
            name,
            version: record.version.clone(),
            relative_path,
            assets_path,
            presets,
        })
    }

    /// Where this package's assets are published.
    pub fn publish_dir(&self, paths: &Paths) -> PathBuf {
        paths.document_root.join(&self.relative_path)
    }
}
