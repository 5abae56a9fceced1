//! Error taxonomy for asset resolution, configuration and I/O.
//!
//! Three families, matching how callers are expected to react:
//! - [`AssetError::Resolution`]: a path, package or preset could not be
//!   found. Usually non-fatal; the caller decides.
//! - [`AssetError::Configuration`] / [`AssetError::Statement`]: the database
//!   or a preset statement is malformed. Fatal for the current operation.
//! - [`AssetError::Io`]: source unreadable or destination unwritable. Fatal
//!   unless the component runs in silent mode.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = AssetError> = std::result::Result<T, E>;

/// What kind of thing failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    Asset,
    Package,
    Preset,
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset => write!(f, "asset"),
            Self::Package => write!(f, "package"),
            Self::Preset => write!(f, "preset"),
        }
    }
}

/// Asset pipeline errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Asset path, package or preset not found.
    #[error("{kind} `{name}` not found")]
    Resolution { kind: ResolutionKind, name: String },

    /// Malformed database or conflicting registry state.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A preset statement that does not fit the grammar.
    #[error("invalid statement `{statement}` in preset `{preset}`: {reason}")]
    Statement {
        preset: String,
        statement: String,
        reason: String,
    },

    /// File I/O failure with path context.
    #[error("IO error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    /// Resolution failure for a named thing.
    pub fn not_found(kind: ResolutionKind, name: impl Into<String>) -> Self {
        Self::Resolution {
            kind,
            name: name.into(),
        }
    }

    /// I/O failure with path context.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for resolution errors, which callers commonly tolerate.
    pub const fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}
