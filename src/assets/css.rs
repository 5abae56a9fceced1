//! The CSS asset registry: `<link>` stacks with media-partitioned
//! merge/minify.

use super::{FileRef, apply_mask, dedupe};
use crate::compress::{AdapterKind, Compressor};
use crate::error::{AssetError, ResolutionKind, Result};
use crate::registry::Registry;
use crate::utils::path::is_absolute_url;

/// Media bucket for files without an explicit media attribute.
const REST: &str = "rest";

/// Ordered registry of stylesheet references for one page/request.
pub struct CssAssets<'r> {
    registry: &'r Registry,
    strict: bool,
    files: Vec<FileRef>,
    merged: Vec<FileRef>,
    minified: Vec<FileRef>,
}

impl<'r> CssAssets<'r> {
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
    ///
    /// Unresolved references that are not an absolute-URL form fail with a
    /// resolution error.
    pub fn add(
        &mut self,
        reference: &str,
        package: Option<&str>,
        media: Option<&str>,
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
        self.files.push(
            entry
                .with_media(media.map(str::to_string))
                .with_minified(minified),
        );
        Ok(self)
    }

    /// Like [`Self::add`], but a resolution failure is a no-op.
    pub fn add_if_exists(
        &mut self,
        reference: &str,
        package: Option<&str>,
        media: Option<&str>,
        minified: bool,
    ) -> Result<&mut Self> {
        match self.add(reference, package, media, minified) {
            Ok(_) | Err(AssetError::Resolution { .. }) => Ok(self),
            Err(e) => Err(e),
        }
    }

    /// Bulk add of plain references (no media, not minified).
    pub fn set<I, S>(&mut self, references: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for reference in references {
            self.add(reference.as_ref(), None, None, false)?;
        }
        Ok(self)
    }

    /// The primary stack (raw, may contain duplicates).
    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    /// Merge the stack into one bundle per media partition.
    ///
    /// Files without a media attribute join the `rest` bucket, which is
    /// folded into `screen` on output. Idempotent: the merged stack is
    /// rebuilt from scratch each call, the primary stack is untouched.
    pub fn merge(&mut self) -> Result<&mut Self> {
        self.merged = self.compress(false)?;
        Ok(self)
    }

    /// Minify the stack, one bundle per media partition.
    ///
    /// Sources already flagged minified bypass the compressor and are
    /// carried into the minified stack untouched.
    pub fn minify(&mut self) -> Result<&mut Self> {
        self.minified = self.compress(true)?;
        Ok(self)
    }

    fn compress(&self, minify: bool) -> Result<Vec<FileRef>> {
        let paths = self.registry.paths();
        let mut output = Vec::new();

        for (media_key, group) in partition(dedupe(&self.files)) {
            let out_media = if media_key == REST {
                "screen".to_string()
            } else {
                media_key
            };

            let mut compressor = Compressor::new(&paths.cache_dir, &paths.cache_web);
            compressor.adapter(AdapterKind::Css).silent(!self.strict);

            let mut inputs = 0usize;
            for file in group {
                match &file.path {
                    // Remote references cannot be read; pass them through.
                    None => output.push(file.clone().with_media(Some(out_media.clone()))),
                    // Never re-minify a pre-minified source.
                    Some(_) if minify && file.minified => {
                        output.push(file.clone().with_media(Some(out_media.clone())));
                    }
                    Some(path) => {
                        compressor.add_file(path.clone());
                        inputs += 1;
                    }
                }
            }
            if inputs == 0 {
                continue;
            }

            let bundle = if minify {
                compressor.minify()?
            } else {
                compressor.merge()?
            };
            if let Some(bundle) = bundle {
                output.push(
                    FileRef::local(bundle.path, bundle.web_path)
                        .with_media(Some(out_media))
                        .with_minified(minify),
                );
            }
        }
        Ok(output)
    }

    /// Render the primary stack as `<link>` tags through `mask`.
    pub fn write(&self, mask: &str) -> String {
        render(&self.files, mask)
    }

    /// Render the merged stack.
    pub fn write_merged(&self, mask: &str) -> String {
        render(&self.merged, mask)
    }

    /// Render the minified stack.
    pub fn write_minified(&self, mask: &str) -> String {
        render(&self.minified, mask)
    }
}

/// Group refs by media (first-seen partition order preserved).
fn partition(refs: Vec<&FileRef>) -> Vec<(String, Vec<&FileRef>)> {
    let mut partitions: Vec<(String, Vec<&FileRef>)> = Vec::new();
    for file in refs {
        let key = file
            .media
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(REST)
            .to_string();
        match partitions.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(file),
            None => partitions.push((key, vec![file])),
        }
    }
    partitions
}

fn render(stack: &[FileRef], mask: &str) -> String {
    dedupe(stack)
        .iter()
        .map(|file| {
            let media = file.media.as_deref().unwrap_or("screen");
            let tag = format!(
                r#"<link rel="stylesheet" type="text/css" href="{}" media="{}">"#,
                file.web_path, media
            );
            apply_mask(mask, &tag)
        })
        .collect()
}
