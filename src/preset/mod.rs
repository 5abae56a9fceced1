//! Presets: named, declarative bundles of asset-inclusion statements.

pub mod statement;

pub use statement::{Position, Statement, StatementKind};

use rustc_hash::FxHashMap;

use crate::database::RawPreset;
use crate::error::{AssetError, Result};

/// A parsed preset: every statement list sorted by position.
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: String,
    /// Owning package name.
    pub package: String,
    statements: FxHashMap<StatementKind, Vec<Statement>>,
}

impl Preset {
    /// Parse a raw database preset block. Fails on an unknown statement
    /// type or a malformed statement, naming this preset.
    pub fn parse(name: &str, package: &str, raw: &RawPreset) -> Result<Self> {
        let mut statements: FxHashMap<StatementKind, Vec<Statement>> = FxHashMap::default();
        for (key, raw_statements) in raw {
            let kind = StatementKind::from_key(key).ok_or_else(|| {
                AssetError::Configuration(format!(
                    "unknown statement type `{key}` in preset `{name}` of package `{package}`"
                ))
            })?;
            let list = statements.entry(kind).or_default();
            for raw_statement in raw_statements {
                list.push(Statement::parse(kind, raw_statement, name)?);
            }
        }
        // Stable sort: insertion order survives within a position bucket.
        for list in statements.values_mut() {
            list.sort_by_key(|s| s.position);
        }
        Ok(Self {
            name: name.to_string(),
            package: package.to_string(),
            statements,
        })
    }

    /// Statements of one kind, position-sorted. Empty when absent.
    pub fn statements(&self, kind: StatementKind) -> &[Statement] {
        self.statements.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Names of presets this one requires.
    pub fn requires(&self) -> impl Iterator<Item = &str> {
        self.statements(StatementKind::Require)
            .iter()
            .map(|s| s.src.as_str())
    }
}
