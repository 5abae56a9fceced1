//! Per-request asset registries: ordered stacks of CSS/JS references that
//! render to markup tags and delegate compression to the [`Compressor`].
//!
//! Each registry moves `Empty -> Populated -> {Rendered | Merged | Minified}`.
//! `merge()`/`minify()` are idempotent and populate secondary stacks without
//! touching the primary one, so `write()` and `write_merged()` coexist.
//! The primary stack may hold duplicates; consumers dedupe by resolved path
//! (first occurrence wins) at merge/render time.

mod css;
mod file_ref;
mod js;
mod tag;

pub use css::CssAssets;
pub use file_ref::FileRef;
pub use js::JsAssets;
pub use tag::JsTags;

/// Dedupe a stack by key, preserving first occurrences in order.
fn dedupe(stack: &[FileRef]) -> Vec<&FileRef> {
    let mut seen = rustc_hash::FxHashSet::default();
    stack
        .iter()
        .filter(|r| seen.insert(r.dedupe_key()))
        .collect()
}

/// Wrap a rendered tag in a caller-supplied `%s` mask.
fn apply_mask(mask: &str, tag: &str) -> String {
    mask.replacen("%s", tag, 1)
}
