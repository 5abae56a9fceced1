//! The compressor: runs an ordered file stack through one adapter action,
//! with content-addressed destination naming and mtime cache freshness.
//!
//! The destination file itself is the cache record: it is valid iff it
//! exists and its mtime is >= every input's mtime. The filename hashes the
//! *sorted* input paths, so the cache key depends on set membership, not
//! stack order; output order still follows stack order.
//!
//! Errors are swallowed into `Ok(None)` in silent mode (the default) or
//! propagated in strict mode. Concurrent writers racing on the same
//! destination are benign: identical inputs produce byte-identical output.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use super::AdapterKind;
use crate::error::{AssetError, ResolutionKind, Result};
use crate::freshness::is_destination_fresh;
use crate::utils::path::{normalize_path, web_join};

/// The adapter operation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Merge,
    Minify,
}

impl Action {
    /// Name used in the destination filename.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Minify => "minify",
        }
    }
}

/// Record of a written bundle.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// Filesystem path of the destination file.
    pub path: PathBuf,
    /// Web path of the destination file.
    pub web_path: String,
    /// Byte length of the output.
    pub len: u64,
}

/// Merges or minifies a stack of source files into one destination file.
pub struct Compressor {
    files: Vec<PathBuf>,
    /// Lazily populated name -> content pairs; may also be fed directly.
    contents: Vec<(String, String)>,
    destination_dir: PathBuf,
    destination_filename: Option<String>,
    filename_explicit: bool,
    web_root: String,
    header: Option<String>,
    silent: bool,
    direct_output: bool,
    adapter: Option<AdapterKind>,
    action: Action,
    cleaned: bool,
}

impl Compressor {
    /// New compressor writing into `destination_dir`, published under the
    /// `web_root` web path. Silent (best-effort) by default.
    pub fn new(destination_dir: impl Into<PathBuf>, web_root: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            contents: Vec::new(),
            destination_dir: destination_dir.into(),
            destination_filename: None,
            filename_explicit: false,
            web_root: web_root.into(),
            header: None,
            silent: true,
            direct_output: false,
            adapter: None,
            action: Action::Merge,
            cleaned: false,
        }
    }

    /// Strict mode propagates errors instead of degrading to `None`.
    pub fn silent(&mut self, silent: bool) -> &mut Self {
        self.silent = silent;
        self
    }

    /// Return the transformed text instead of writing the cache file.
    pub fn direct_output(&mut self, direct: bool) -> &mut Self {
        self.direct_output = direct;
        self
    }

    /// Pin the adapter instead of guessing from the first file extension.
    pub fn adapter(&mut self, adapter: AdapterKind) -> &mut Self {
        self.adapter = Some(adapter);
        self
    }

    /// Raw text prepended to the output, before the generated header.
    pub fn header(&mut self, header: impl Into<String>) -> &mut Self {
        self.header = Some(header.into());
        self
    }

    /// Replace the file stack; invalidates the cleaned state.
    pub fn set_files(&mut self, files: Vec<PathBuf>) -> &mut Self {
        self.files = files;
        self.cleaned = false;
        self
    }

    /// Append one file to the stack.
    pub fn add_file(&mut self, file: impl Into<PathBuf>) -> &mut Self {
        self.files.push(file.into());
        self.cleaned = false;
        self
    }

    /// Feed a named content directly, bypassing the file stack read.
    pub fn add_content(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.contents.push((name.into(), content.into()));
        self
    }

    /// Override the content-addressed destination filename.
    pub fn set_destination_filename(&mut self, filename: impl Into<String>) -> &mut Self {
        self.destination_filename = Some(filename.into());
        self.filename_explicit = true;
        self
    }

    /// Current destination path, if a filename is known.
    pub fn destination_path(&self) -> Option<PathBuf> {
        self.destination_filename
            .as_ref()
            .map(|name| self.destination_dir.join(name))
    }

    /// Dedupe the stack (by normalized path, first occurrence wins) and
    /// validate that every entry exists. Strict mode fails on a missing
    /// entry; silent mode drops it.
    fn clean_stack(&mut self) -> Result<()> {
        if self.cleaned {
            return Ok(());
        }
        let mut seen = FxHashSet::default();
        let mut cleaned = Vec::with_capacity(self.files.len());
        for file in std::mem::take(&mut self.files) {
            let resolved = normalize_path(&file);
            if !seen.insert(resolved.clone()) {
                continue;
            }
            if !resolved.is_file() {
                if self.silent {
                    continue;
                }
                return Err(AssetError::not_found(
                    ResolutionKind::Asset,
                    file.display().to_string(),
                ));
            }
            cleaned.push(resolved);
        }
        self.files = cleaned;
        self.cleaned = true;
        Ok(())
    }

    /// Resolve the adapter, guessing from the first file's extension.
    fn resolve_adapter(&mut self) -> Result<Option<AdapterKind>> {
        if let Some(adapter) = self.adapter {
            return Ok(Some(adapter));
        }
        let guessed = self.files.first().and_then(|f| AdapterKind::from_extension(f));
        match guessed {
            Some(adapter) => {
                self.adapter = Some(adapter);
                Ok(Some(adapter))
            }
            None => self.fail(AssetError::Configuration(
                "cannot guess adapter: file stack is empty or has an unknown extension".into(),
            )),
        }
    }

    /// Compute the content-addressed destination filename:
    /// `hash(sorted input paths)_action.ext`.
    ///
    /// Sorting makes the cache key independent of stack order. Fails on an
    /// empty stack: the name cannot be content-addressed without inputs.
    pub fn guess_destination_filename(&mut self) -> Result<Option<String>> {
        self.clean_stack()?;
        let Some(adapter) = self.resolve_adapter()? else {
            return Ok(None);
        };
        if self.files.is_empty() {
            return self.fail(AssetError::Configuration(
                "cannot content-address an empty file stack".into(),
            ));
        }

        let mut names: Vec<String> = self
            .files
            .iter()
            .map(|f| f.display().to_string())
            .collect();
        names.sort();

        let mut hasher = blake3::Hasher::new();
        for name in &names {
            hasher.update(name.as_bytes());
        }
        let digest = hex::encode(hasher.finalize().as_bytes());
        let filename = format!(
            "{}_{}.{}",
            &digest[..32],
            self.action.as_str(),
            adapter.extension()
        );
        self.destination_filename = Some(filename.clone());
        Ok(Some(filename))
    }

    /// True if the destination is absent or any input is newer than it.
    pub fn must_refresh(&self) -> bool {
        let Some(destination) = self.destination_path() else {
            return true;
        };
        !is_destination_fresh(&destination, self.files.iter().map(PathBuf::as_path))
    }

    /// Run the configured action over the stack.
    ///
    /// Returns the output bytes, reading them from a fresh cache file when
    /// possible (the at-most-one-recompute guarantee). `Ok(None)` means a
    /// silent-mode failure.
    pub fn process(&mut self) -> Result<Option<Vec<u8>>> {
        if let Err(e) = self.clean_stack() {
            return self.fail(e);
        }
        let Some(adapter) = self.resolve_adapter()? else {
            return Ok(None);
        };

        if !self.filename_explicit && self.guess_destination_filename()?.is_none() {
            return Ok(None);
        }
        let destination = match self.destination_path() {
            Some(d) => d,
            None => {
                return self.fail(AssetError::Configuration(
                    "no destination filename".into(),
                ));
            }
        };

        // Cache hit: identical input sets are never reprocessed while a
        // fresh destination exists.
        if !self.direct_output && !self.must_refresh() {
            return match fs::read(&destination) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) => self.fail(AssetError::io(&destination, e)),
            };
        }

        // Lazily pull file contents not already fed directly.
        let known: FxHashSet<&str> = self.contents.iter().map(|(n, _)| n.as_str()).collect();
        let mut loaded = Vec::new();
        for file in &self.files {
            let name = file.display().to_string();
            if known.contains(name.as_str()) {
                continue;
            }
            match fs::read_to_string(file) {
                Ok(text) => loaded.push((name, text)),
                Err(e) => {
                    let err = AssetError::io(file, e);
                    if self.silent {
                        continue;
                    }
                    return Err(err);
                }
            }
        }
        self.contents.extend(loaded);

        if self.contents.is_empty() {
            return self.fail(AssetError::Configuration(
                "nothing to compress: empty content stack".into(),
            ));
        }

        // Transform each input, interleaved with per-file comment markers.
        let mut sections = Vec::with_capacity(self.contents.len());
        for (name, content) in &self.contents {
            let marker = adapter.build_comment(name);
            let transformed = adapter.apply(self.action, content);
            sections.push(format!("{marker}\n{transformed}"));
        }

        let source_list = self
            .contents
            .iter()
            .map(|(n, _)| n.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let generated = adapter.build_comment(&format!(
            "assetpack {}: {}",
            self.action.as_str(),
            source_list
        ));

        let mut output = String::new();
        if let Some(header) = &self.header {
            output.push_str(header);
            output.push('\n');
        }
        output.push_str(&generated);
        output.push_str("\n\n");
        output.push_str(&sections.join("\n\n"));
        output.push('\n');

        let bytes = output.into_bytes();
        if self.direct_output {
            return Ok(Some(bytes));
        }

        if let Err(e) = fs::create_dir_all(&self.destination_dir) {
            return self.fail(AssetError::io(&self.destination_dir, e));
        }
        if let Err(e) = fs::write(&destination, &bytes) {
            return self.fail(AssetError::io(&destination, e));
        }
        Ok(Some(bytes))
    }

    /// Merge the stack and report the written bundle.
    pub fn merge(&mut self) -> Result<Option<BundleOutput>> {
        self.run(Action::Merge)
    }

    /// Minify the stack and report the written bundle.
    pub fn minify(&mut self) -> Result<Option<BundleOutput>> {
        self.run(Action::Minify)
    }

    fn run(&mut self, action: Action) -> Result<Option<BundleOutput>> {
        if self.action != action && !self.filename_explicit {
            // The filename embeds the action; force a re-guess.
            self.destination_filename = None;
        }
        self.action = action;
        let Some(bytes) = self.process()? else {
            return Ok(None);
        };
        let Some(path) = self.destination_path() else {
            return Ok(None);
        };
        let filename = self
            .destination_filename
            .clone()
            .unwrap_or_default();
        Ok(Some(BundleOutput {
            path,
            web_path: web_join(&[&self.web_root, &filename]),
            len: bytes.len() as u64,
        }))
    }

    /// Swallow in silent mode, propagate otherwise.
    fn fail<T>(&self, err: AssetError) -> Result<Option<T>> {
        if self.silent {
            crate::debug!("compress"; "suppressed: {err}");
            Ok(None)
        } else {
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_sources(dir: &Path) -> (PathBuf, PathBuf) {
        let a = dir.join("a.css");
        let b = dir.join("b.css");
        fs::write(&a, ".a { color: red; }\n").unwrap();
        fs::write(&b, "/* b */\n.b { margin: 0; }\n").unwrap();
        (a, b)
    }

    #[test]
    fn test_filename_is_order_independent() {
        let dir = TempDir::new().unwrap();
        let (a, b) = write_sources(dir.path());
        let out = dir.path().join("cache");

        let mut forward = Compressor::new(&out, "/cache");
        forward.set_files(vec![a.clone(), b.clone()]);
        let name_fwd = forward.guess_destination_filename().unwrap().unwrap();

        let mut reverse = Compressor::new(&out, "/cache");
        reverse.set_files(vec![b, a]);
        let name_rev = reverse.guess_destination_filename().unwrap().unwrap();

        assert_eq!(name_fwd, name_rev);
        assert!(name_fwd.ends_with("_merge.css"));
    }

    #[test]
    fn test_filename_differs_by_action_and_set() {
        let dir = TempDir::new().unwrap();
        let (a, b) = write_sources(dir.path());
        let out = dir.path().join("cache");

        let mut merge = Compressor::new(&out, "/cache");
        merge.set_files(vec![a.clone(), b.clone()]);
        let merged = merge.guess_destination_filename().unwrap().unwrap();

        let mut minify = Compressor::new(&out, "/cache");
        minify.set_files(vec![a.clone(), b]);
        minify.action = Action::Minify;
        let minified = minify.guess_destination_filename().unwrap().unwrap();
        assert_ne!(merged, minified);
        assert!(minified.ends_with("_minify.css"));

        let mut single = Compressor::new(&out, "/cache");
        single.set_files(vec![a]);
        let small = single.guess_destination_filename().unwrap().unwrap();
        assert_ne!(merged, small);
    }

    #[test]
    fn test_guess_empty_stack_strict_fails() {
        let dir = TempDir::new().unwrap();
        let mut compressor = Compressor::new(dir.path(), "/cache");
        compressor.silent(false).adapter(AdapterKind::Css);
        assert!(compressor.guess_destination_filename().is_err());
    }

    #[test]
    fn test_guess_empty_stack_silent_none() {
        let dir = TempDir::new().unwrap();
        let mut compressor = Compressor::new(dir.path(), "/cache");
        compressor.adapter(AdapterKind::Css);
        assert!(compressor.guess_destination_filename().unwrap().is_none());
    }

    #[test]
    fn test_merge_writes_and_orders_output() {
        let dir = TempDir::new().unwrap();
        let (a, b) = write_sources(dir.path());
        let out = dir.path().join("cache");

        let mut compressor = Compressor::new(&out, "/cache");
        compressor.silent(false).set_files(vec![a.clone(), b.clone()]);
        let bundle = compressor.merge().unwrap().unwrap();

        assert!(bundle.path.exists());
        assert!(bundle.web_path.starts_with("/cache/"));
        let text = fs::read_to_string(&bundle.path).unwrap();
        // Output order follows stack order, not the sorted hash order.
        let pos_a = text.find(".a {").unwrap();
        let pos_b = text.find(".b {").unwrap();
        assert!(pos_a < pos_b);
        // Comment markers interleaved, source comments stripped.
        assert!(text.contains(&a.canonicalize().unwrap().display().to_string()));
        assert!(!text.contains("/* b */"));
    }

    #[test]
    fn test_cache_hit_skips_recompute() {
        let dir = TempDir::new().unwrap();
        let (a, b) = write_sources(dir.path());
        let out = dir.path().join("cache");

        let mut first = Compressor::new(&out, "/cache");
        first.silent(false).set_files(vec![a.clone(), b.clone()]);
        let bundle = first.merge().unwrap().unwrap();

        // Tamper with the destination: a fresh cache is returned verbatim,
        // proving process() did not recompute.
        thread::sleep(Duration::from_millis(10));
        fs::write(&bundle.path, "tampered").unwrap();

        let mut second = Compressor::new(&out, "/cache");
        second.silent(false).set_files(vec![a.clone(), b.clone()]);
        let bytes = second.process().unwrap().unwrap();
        assert_eq!(bytes, b"tampered");

        // Touch one input: must_refresh flips and the bundle is rebuilt.
        thread::sleep(Duration::from_millis(10));
        fs::write(&a, ".a { color: blue; }\n").unwrap();
        let mut third = Compressor::new(&out, "/cache");
        third.silent(false).set_files(vec![a, b]);
        assert!({
            third.guess_destination_filename().unwrap();
            third.must_refresh()
        });
        let bytes = third.process().unwrap().unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("blue"));
    }

    #[test]
    fn test_missing_input_strict_vs_silent() {
        let dir = TempDir::new().unwrap();
        let (a, _) = write_sources(dir.path());
        let missing = dir.path().join("missing.css");
        let out = dir.path().join("cache");

        let mut strict = Compressor::new(&out, "/cache");
        strict
            .silent(false)
            .set_files(vec![a.clone(), missing.clone()]);
        assert!(strict.merge().is_err());

        // Silent mode drops the bad entry and proceeds.
        let mut silent = Compressor::new(&out, "/cache");
        silent.set_files(vec![a, missing]);
        let bundle = silent.merge().unwrap().unwrap();
        assert!(bundle.path.exists());
    }

    #[test]
    fn test_minify_and_direct_output() {
        let dir = TempDir::new().unwrap();
        let (a, b) = write_sources(dir.path());
        let out = dir.path().join("cache");

        let mut compressor = Compressor::new(&out, "/cache");
        compressor
            .silent(false)
            .direct_output(true)
            .set_files(vec![a, b]);
        let bundle = compressor.minify().unwrap().unwrap();
        // Direct output: nothing written to disk.
        assert!(!bundle.path.exists());

        let mut verify = Compressor::new(&out, "/cache");
        verify.silent(false).direct_output(true);
        verify.set_files(compressor.files.clone());
        let bytes = verify.minify().unwrap();
        assert!(bytes.is_some());
    }

    #[test]
    fn test_dedupe_preserves_first() {
        let dir = TempDir::new().unwrap();
        let (a, b) = write_sources(dir.path());
        let out = dir.path().join("cache");

        let mut compressor = Compressor::new(&out, "/cache");
        compressor
            .silent(false)
            .set_files(vec![a.clone(), b, a.clone()]);
        let bundle = compressor.merge().unwrap().unwrap();
        let text = fs::read_to_string(&bundle.path).unwrap();
        // The duplicate contributes exactly one section marker. The generated
        // header lists it once more.
        let marker = format!("/* {} */", a.canonicalize().unwrap().display());
        assert_eq!(text.matches(&marker).count(), 1);
    }
}
