//! The JS file registry: `<script src>` stacks with single-partition
//! merge/minify.

use super::{FileRef, apply_mask, dedupe};
use crate::compress::{AdapterKind, Compressor};
use crate::error::{AssetError, ResolutionKind, Result};
use crate::registry::Registry;
use crate::utils::path::is_absolute_url;

/// Ordered registry of script-file references for one page/request.
///
/// Unlike CSS there is no media partitioning: one merge/minify run produces
/// a single bundle. Header/footer placement is a concern of the caller,
/// which keeps one instance per document section.
pub struct JsAssets<'r> {
    registry: &'r Registry,
    strict: bool,
    files: Vec<FileRef>,
    merged: Vec<FileRef>,
    minified: Vec<FileRef>,
}

impl<'r> JsAssets<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            strict: false,
            files: Vec::new(),
            merged: Vec::new(),
            minified: Vec::new(),
        }
    }

    /// Strict mode propagates compressor errors instead of degrading.
    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    /// Resolve `reference` (optionally inside `package`) and append it.
    pub fn add(
        &mut self,
        reference: &str,
        package: Option<&str>,
        minified: bool,
    ) -> Result<&mut Self> {
        let entry = match self.registry.find(reference, package)? {
            Some(location) => FileRef::local(location.path, location.web_path),
            None if is_absolute_url(reference) => FileRef::remote(reference),
            None => {
                let name = match package {
                    Some(pkg) => format!("{pkg}:{reference}"),
                    None => reference.to_string(),
                };
                return Err(AssetError::not_found(ResolutionKind::Asset, name));
            }
        };
        self.files.push(entry.with_minified(minified));
        Ok(self)
    }

    /// Like [`Self::add`], but a resolution failure is a no-op.
    pub fn add_if_exists(
        &mut self,
        reference: &str,
        package: Option<&str>,
        minified: bool,
    ) -> Result<&mut Self> {
        match self.add(reference, package, minified) {
            Ok(_) | Err(AssetError::Resolution { .. }) => Ok(self),
            Err(e) => Err(e),
        }
    }

    /// Bulk add of plain references.
    pub fn set<I, S>(&mut self, references: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for reference in references {
            self.add(reference.as_ref(), None, false)?;
        }
        Ok(self)
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    /// Merge the deduplicated stack into one bundle.
    pub fn merge(&mut self) -> Result<&mut Self> {
        self.merged = self.compress(false)?;
        Ok(self)
    }

    /// Minify the stack; pre-minified (or pre-packed) sources bypass the
    /// compressor and pass through untouched.
    pub fn minify(&mut self) -> Result<&mut Self> {
        self.minified = self.compress(true)?;
        Ok(self)
    }

    fn compress(&self, minify: bool) -> Result<Vec<FileRef>> {
        let paths = self.registry.paths();
        let mut output = Vec::new();

        let mut compressor = Compressor::new(&paths.cache_dir, &paths.cache_web);
        compressor.adapter(AdapterKind::Js).silent(!self.strict);

        let mut inputs = 0usize;
        for file in dedupe(&self.files) {
            match &file.path {
                None => output.push(file.clone()),
                Some(_) if minify && file.minified => output.push(file.clone()),
                Some(path) => {
                    compressor.add_file(path.clone());
                    inputs += 1;
                }
            }
        }
        if inputs == 0 {
            return Ok(output);
        }

        let bundle = if minify {
            compressor.minify()?
        } else {
            compressor.merge()?
        };
        if let Some(bundle) = bundle {
            output.push(FileRef::local(bundle.path, bundle.web_path).with_minified(minify));
        }
        Ok(output)
    }

    /// Render the primary stack as `<script src>` tags through `mask`.
    pub fn write(&self, mask: &str) -> String {
        render(&self.files, mask)
    }

    pub fn write_merged(&self, mask: &str) -> String {
        render(&self.merged, mask)
    }

    pub fn write_minified(&self, mask: &str) -> String {
        render(&self.minified, mask)
    }
}

fn render(stack: &[FileRef], mask: &str) -> String {
    dedupe(stack)
        .iter()
        .map(|file| {
            let tag = format!(
                r#"<script type="text/javascript" src="{}"></script>"#,
                file.web_path
            );
            apply_mask(mask, &tag)
        })
        .collect()
}
