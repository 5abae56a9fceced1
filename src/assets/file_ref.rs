//! A single asset reference, immutable once resolved.

use std::path::PathBuf;

/// One entry of an asset stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Resolved filesystem path; `None` for absolute-URL references.
    pub path: Option<PathBuf>,
    /// Public web path (or full URL).
    pub web_path: String,
    /// Partition key; for CSS this is the media type.
    pub media: Option<String>,
    /// Already minified; never fed back through the minifier.
    pub minified: bool,
}

impl FileRef {
    /// Local reference with a resolved filesystem path.
    pub fn local(path: PathBuf, web_path: impl Into<String>) -> Self {
        Self {
            path: Some(path),
            web_path: web_path.into(),
            media: None,
            minified: false,
        }
    }

    /// Remote or root-relative reference resolved by URL form alone.
    pub fn remote(web_path: impl Into<String>) -> Self {
        Self {
            path: None,
            web_path: web_path.into(),
            media: None,
            minified: false,
        }
    }

    pub fn with_media(mut self, media: Option<String>) -> Self {
        self.media = media;
        self
    }

    pub const fn with_minified(mut self, minified: bool) -> Self {
        self.minified = minified;
        self
    }

    /// Dedupe key: the resolved path when local, the URL otherwise.
    pub fn dedupe_key(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| self.web_path.clone(), |p| p.display().to_string())
    }
}
