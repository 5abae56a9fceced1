//! The preset statement grammar.
//!
//! A statement is a colon-delimited token list, order-independent except
//! that exactly one token must be the source path:
//!
//! ```text
//! position:info:media:src
//! ```
//!
//! - position: integer in `[-1, 100]`, or `first` / `last`
//! - info: `min` (already minified) or, for JS, `pack` (pre-bundled)
//! - media: a CSS media type (CSS statements only)
//! - src: whatever token matches none of the above
//!
//! Token budget: 3 for JS, 4 for CSS. A second token that matches no
//! keyword is ambiguous and fails with an error naming the owning preset.

use crate::error::{AssetError, Result};

/// Recognized CSS media types for token sniffing.
const MEDIA_TYPES: &[&str] = &[
    "all", "aural", "braille", "embossed", "handheld", "print", "projection", "screen", "speech",
    "tty", "tv",
];

/// Which statement list a statement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Stylesheet file, rendered as a `<link>`.
    Css,
    /// Inline script snippet file, rendered as a `<script>` body.
    Js,
    /// Script file included in the document header.
    JsHeader,
    /// Script file included before `</body>`.
    JsFooter,
    /// Reference to another preset, expanded recursively.
    Require,
}

impl StatementKind {
    /// Map a database preset key to a statement kind.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "css" => Some(Self::Css),
            "js" => Some(Self::Js),
            "jsfiles_header" => Some(Self::JsHeader),
            "jsfiles_footer" => Some(Self::JsFooter),
            "require" => Some(Self::Require),
            _ => None,
        }
    }

    /// Database key for this kind.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::JsHeader => "jsfiles_header",
            Self::JsFooter => "jsfiles_footer",
            Self::Require => "require",
        }
    }

    const fn is_css(self) -> bool {
        matches!(self, Self::Css)
    }

    /// CSS statements may carry a media token on top of the JS budget.
    const fn max_tokens(self) -> usize {
        if self.is_css() { 4 } else { 3 }
    }
}

/// Position of a statement inside its list.
///
/// Ordering: `First`, then explicit indexes `0..=100` ascending, then
/// unpositioned statements (`-1`, the default), then `Last`. Sorting is
/// stable, so insertion order is preserved within each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Index(i32),
    Unpositioned,
    Last,
}

impl Position {
    const fn rank(self) -> (u8, i32) {
        match self {
            Self::First => (0, 0),
            Self::Index(n) => (1, n),
            Self::Unpositioned => (2, 0),
            Self::Last => (3, 0),
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// A parsed preset statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub kind: StatementKind,
    pub src: String,
    pub position: Position,
    /// Source is already minified; never re-minify it.
    pub minified: bool,
    /// Source is pre-bundled (JS `pack` token); treated like `minified`.
    pub packed: bool,
    /// CSS media type, when given.
    pub media: Option<String>,
}

impl Statement {
    /// Parse one raw statement. `preset` is only used in error messages.
    pub fn parse(kind: StatementKind, raw: &str, preset: &str) -> Result<Self> {
        let fail = |reason: &str| {
            Err(AssetError::Statement {
                preset: preset.to_string(),
                statement: raw.to_string(),
                reason: reason.to_string(),
            })
        };

        let tokens: Vec<&str> = raw.split(':').collect();
        if tokens.len() > kind.max_tokens() {
            return fail("too many tokens");
        }

        let mut statement = Self {
            kind,
            src: String::new(),
            position: Position::Unpositioned,
            minified: false,
            packed: false,
            media: None,
        };

        for token in tokens {
            if let Ok(n) = token.parse::<i32>() {
                if !(-1..=100).contains(&n) {
                    return fail("position out of range [-1, 100]");
                }
                statement.position = if n == -1 {
                    Position::Unpositioned
                } else {
                    Position::Index(n)
                };
            } else if token.eq_ignore_ascii_case("first") {
                statement.position = Position::First;
            } else if token.eq_ignore_ascii_case("last") {
                statement.position = Position::Last;
            } else if token.eq_ignore_ascii_case("min") {
                statement.minified = true;
            } else if !kind.is_css() && token.eq_ignore_ascii_case("pack") {
                statement.packed = true;
            } else if kind.is_css() && MEDIA_TYPES.contains(&token.to_ascii_lowercase().as_str()) {
                statement.media = Some(token.to_ascii_lowercase());
            } else if statement.src.is_empty() {
                statement.src = token.to_string();
            } else {
                return fail("ambiguous tokens: more than one source path candidate");
            }
        }

        if statement.src.is_empty() {
            return fail("missing source path");
        }
        Ok(statement)
    }
}
