//! CSS adapter: comment stripping and regex-based minification.
//!
//! Deliberately not a CSS parser. The transforms are a fixed set of regex
//! passes; urls containing braces and comment-like markers inside strings
//! are outside the correctness guarantees.

use regex::Regex;
use std::sync::LazyLock;

/// `/* ... */`, non-greedy, spans lines.
static BLOCK_COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

/// Line breaks (minify strips them entirely).
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").expect("valid regex"));

/// Runs of whitespace.
static WS_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Whitespace hugging structural punctuation.
static AROUND_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([{}:;,])\s*").expect("valid regex"));

/// Rule with an empty declaration block, e.g. `.b {}`.
static EMPTY_RULES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^{};]+\{\}").expect("valid regex"));

/// Strip block comments and trim surrounding whitespace.
pub fn merge(input: &str) -> String {
    BLOCK_COMMENTS.replace_all(input, "").trim().to_string()
}

/// Aggressive whitespace/comment removal on top of [`merge`].
///
/// Idempotent: re-minifying minified output yields the same text.
pub fn minify(input: &str) -> String {
    let stripped = merge(input);
    let flat = NEWLINES.replace_all(&stripped, "");
    let collapsed = WS_RUNS.replace_all(&flat, " ");
    let tight = AROUND_PUNCT.replace_all(&collapsed, "$1");
    let mut out = tight.replace(";}", "}");

    // Removing an empty block can empty its parent (e.g. a media query),
    // so iterate until stable.
    loop {
        let next = EMPTY_RULES.replace_all(&out, "").into_owned();
        if next == out {
            break;
        }
        out = next;
    }
    out.trim().to_string()
}
