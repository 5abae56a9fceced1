//! Bundling: build merged/minified outputs for a named preset and render
//! its inclusion tags.
//!
//! `require` statements are expanded depth-first (dependencies first) with
//! a visited set guarding against cycles.

use std::rc::Rc;

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashSet;

use crate::assets::{CssAssets, JsAssets, JsTags};
use crate::log;
use crate::preset::{Preset, StatementKind};
use crate::registry::Registry;

const MASK: &str = "%s\n";

/// Rendered markup for one preset, by document section.
#[derive(Debug)]
pub struct RenderedBundle {
    pub css: String,
    pub js_header: String,
    pub js_footer: String,
    pub inline: String,
}

/// Build and render the bundles for `preset_name`.
pub fn bundle(
    registry: &Registry,
    preset_name: &str,
    minify: bool,
    strict: bool,
) -> Result<RenderedBundle> {
    let mut order = Vec::new();
    expand(registry, preset_name, &mut FxHashSet::default(), &mut order)?;

    let mut css = CssAssets::new(registry);
    let mut header = JsAssets::new(registry);
    let mut footer = JsAssets::new(registry);
    let mut inline = JsTags::new();
    css.strict(strict);
    header.strict(strict);
    footer.strict(strict);

    for preset in &order {
        let package = Some(preset.package.as_str());

        for statement in preset.statements(StatementKind::Css) {
            css.add(
                &statement.src,
                package,
                statement.media.as_deref(),
                statement.minified,
            )?;
        }
        for statement in preset.statements(StatementKind::JsHeader) {
            header.add(
                &statement.src,
                package,
                statement.minified || statement.packed,
            )?;
        }
        for statement in preset.statements(StatementKind::JsFooter) {
            footer.add(
                &statement.src,
                package,
                statement.minified || statement.packed,
            )?;
        }
        for statement in preset.statements(StatementKind::Js) {
            // Inline snippets are read at bundle time and embedded.
            let Some(location) = registry.find(&statement.src, package)? else {
                bail!(
                    "inline script `{}` of preset `{}` not found",
                    statement.src,
                    preset.name
                );
            };
            let body = std::fs::read_to_string(&location.path)
                .with_context(|| format!("reading {}", location.path.display()))?;
            inline.add(location.path.display().to_string(), body);
        }
    }

    if minify {
        css.minify()?;
        header.minify()?;
        footer.minify()?;
        inline.minify();
        Ok(RenderedBundle {
            css: css.write_minified(MASK),
            js_header: header.write_minified(MASK),
            js_footer: footer.write_minified(MASK),
            inline: inline.write_minified(MASK),
        })
    } else {
        css.merge()?;
        header.merge()?;
        footer.merge()?;
        Ok(RenderedBundle {
            css: css.write_merged(MASK),
            js_header: header.write_merged(MASK),
            js_footer: footer.write_merged(MASK),
            inline: inline.write(MASK),
        })
    }
}

/// Depth-first expansion of `require` references, dependencies first.
fn expand(
    registry: &Registry,
    name: &str,
    visited: &mut FxHashSet<String>,
    order: &mut Vec<Rc<Preset>>,
) -> Result<()> {
    if !visited.insert(name.to_string()) {
        return Ok(());
    }
    let preset = registry.preset(name)?;
    let requires: Vec<String> = preset.requires().map(str::to_string).collect();
    for required in requires {
        expand(registry, &required, visited, order)?;
    }
    order.push(preset);
    Ok(())
}

/// CLI entry: bundle and print the tags section by section.
pub fn run(registry: &Registry, preset: &str, minify: bool, strict: bool) -> Result<()> {
    let rendered = bundle(registry, preset, minify, strict)?;
    log!("bundle"; "{} `{}`", if minify { "minify" } else { "merge" }, preset);

    for (label, markup) in [
        ("css", &rendered.css),
        ("js header", &rendered.js_header),
        ("js footer", &rendered.js_footer),
        ("inline", &rendered.inline),
    ] {
        if markup.is_empty() {
            continue;
        }
        println!("<!-- {label} -->");
        print!("{markup}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::registry::ConflictMode;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn setup(dir: &Path) -> Registry {
        let db_path = dir.join("assetpack.json");
        fs::write(
            &db_path,
            r#"{
                "document-root": "web",
                "packages": {
                    "acme/ui": {
                        "version": "1.0.0",
                        "path": "vendor/acme/ui/assets",
                        "relative_path": "assets/vendor/acme/ui",
                        "assets_presets": {
                            "base": {
                                "css": ["reset.css"]
                            },
                            "nav": {
                                "require": ["base"],
                                "css": ["nav.css:print", "nav.css"],
                                "jsfiles_header": ["first:boot.js"],
                                "jsfiles_footer": ["nav.js"],
                                "js": ["inline.js"]
                            },
                            "cyclic": {
                                "require": ["cyclic"],
                                "css": ["reset.css"]
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let assets = dir.join("web/assets/vendor/acme/ui");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("reset.css"), "* { margin: 0; }\n").unwrap();
        fs::write(assets.join("nav.css"), ".nav { color: red; }\n").unwrap();
        fs::write(assets.join("boot.js"), "var boot = 1;\n").unwrap();
        fs::write(assets.join("nav.js"), "function nav() { return 1; }\n").unwrap();
        fs::write(assets.join("inline.js"), "init( true );\n").unwrap();

        let db = Database::load(&db_path).unwrap();
        Registry::new(db, dir, ConflictMode::Fail)
    }

    #[test]
    fn test_bundle_merge_expands_requires() {
        let dir = TempDir::new().unwrap();
        let reg = setup(dir.path());
        let rendered = bundle(&reg, "nav", false, true).unwrap();

        // Two CSS partitions: print (explicit) and screen (rest bucket).
        assert_eq!(rendered.css.matches("<link").count(), 2);
        assert!(rendered.css.contains("/cache/"));
        assert!(rendered.css.contains(r#"media="print""#));
        assert!(rendered.css.contains(r#"media="screen""#));

        assert_eq!(rendered.js_header.matches("<script").count(), 1);
        assert_eq!(rendered.js_footer.matches("<script").count(), 1);
        assert!(rendered.inline.contains("init( true );"));
    }

    #[test]
    fn test_bundle_minify() {
        let dir = TempDir::new().unwrap();
        let reg = setup(dir.path());
        let rendered = bundle(&reg, "nav", true, true).unwrap();

        assert!(rendered.css.contains("_minify.css"));
        assert!(rendered.js_footer.contains("_minify.js"));
        // Inline snippets are minified in place, not cached.
        assert!(rendered.inline.contains("init(true);"));
    }

    #[test]
    fn test_bundle_cycle_terminates() {
        let dir = TempDir::new().unwrap();
        let reg = setup(dir.path());
        let rendered = bundle(&reg, "cyclic", false, true).unwrap();
        assert_eq!(rendered.css.matches("<link").count(), 1);
    }

    #[test]
    fn test_bundle_unknown_preset() {
        let dir = TempDir::new().unwrap();
        let reg = setup(dir.path());
        assert!(bundle(&reg, "nope", false, true).is_err());
    }
}
