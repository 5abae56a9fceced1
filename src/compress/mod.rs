//! Asset compression: merge/minify of CSS and JS file stacks.
//!
//! Adapters ([`css`], [`js`]) are pure string transforms that never fail;
//! malformed input produces best-effort output. The [`Compressor`] runs an
//! ordered file stack through one adapter action and caches the result in a
//! content-addressed destination file.

mod compressor;
pub mod css;
pub mod js;

pub use compressor::{Action, BundleOutput, Compressor};

use std::path::Path;

/// Adapter kind, selected explicitly or guessed from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Css,
    Js,
}

impl AdapterKind {
    /// Guess the adapter from a file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "css" => Some(Self::Css),
            "js" => Some(Self::Js),
            _ => None,
        }
    }

    /// Destination file extension for this adapter.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    /// Run the merge transform (comment stripping, trim).
    pub fn merge(self, input: &str) -> String {
        match self {
            Self::Css => css::merge(input),
            Self::Js => js::merge(input),
        }
    }

    /// Run the minify transform (merge + whitespace removal).
    pub fn minify(self, input: &str) -> String {
        match self {
            Self::Css => css::minify(input),
            Self::Js => js::minify(input),
        }
    }

    /// Apply the given action.
    pub fn apply(self, action: Action, input: &str) -> String {
        match action {
            Action::Merge => self.merge(input),
            Action::Minify => self.minify(input),
        }
    }

    /// Wrap text in the adapter's native comment syntax.
    ///
    /// Both CSS and JS use `/* ... */`.
    pub fn build_comment(self, text: &str) -> String {
        format!("/* {text} */")
    }
}
