//! The inline-script registry: named snippets rendered as `<script>`
//! bodies.
//!
//! No file I/O or caching happens here; snippets are transformed in memory
//! by the JS adapter. Deduplication is by snippet name, first wins.

use super::apply_mask;
use crate::compress::js;
use rustc_hash::FxHashSet;

/// One inline snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snippet {
    name: String,
    body: String,
}

/// Ordered registry of inline script snippets.
#[derive(Debug, Default)]
pub struct JsTags {
    tags: Vec<Snippet>,
    minified: Vec<Snippet>,
}

impl JsTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named snippet.
    pub fn add(&mut self, name: impl Into<String>, body: impl Into<String>) -> &mut Self {
        self.tags.push(Snippet {
            name: name.into(),
            body: body.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Minify every snippet body into the secondary stack. Idempotent.
    pub fn minify(&mut self) -> &mut Self {
        self.minified = self
            .tags
            .iter()
            .map(|s| Snippet {
                name: s.name.clone(),
                body: js::minify(&s.body),
            })
            .collect();
        self
    }

    /// Render the primary snippets as inline `<script>` tags.
    pub fn write(&self, mask: &str) -> String {
        render(&self.tags, mask)
    }

    /// Render the minified snippets.
    pub fn write_minified(&self, mask: &str) -> String {
        render(&self.minified, mask)
    }
}

fn render(snippets: &[Snippet], mask: &str) -> String {
    let mut seen = FxHashSet::default();
    snippets
        .iter()
        .filter(|s| seen.insert(s.name.clone()))
        .map(|s| {
            let tag = format!("<script type=\"text/javascript\">{}</script>", s.body);
            apply_mask(mask, &tag)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_dedupe() {
        let mut tags = JsTags::new();
        tags.add("boot", "var a = 1;");
        tags.add("boot", "var shadowed = true;");
        tags.add("init", "init();");

        let html = tags.write("%s\n");
        assert_eq!(html.matches("<script").count(), 2);
        assert!(html.contains("var a = 1;"));
        assert!(!html.contains("shadowed"));
    }

    #[test]
    fn test_minify_bodies() {
        let mut tags = JsTags::new();
        tags.add("boot", "function f( x ) {\n  return x;\n}");
        tags.minify();

        let html = tags.write_minified("%s");
        assert!(html.contains("function f(x){return x}"));
        // Primary stack untouched.
        assert!(tags.write("%s").contains("function f( x )"));
    }
}
