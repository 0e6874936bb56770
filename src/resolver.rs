//! Path-space conversions between the filesystem and the two logical path
//! forms used inside a Mintlify documentation tree.
//!
//! Every file has three representations:
//!
//! - the absolute filesystem path,
//! - the "internal link path": root-relative, extensionless, leading `/`
//!   (what markdown links use, e.g. `/guide/setup`),
//! - the "import path": root-relative with the extension preserved
//!   (what MDX import statements use, e.g. `/snippets/note.mdx`).

use std::path::{Path, PathBuf};

use itertools::Itertools;
use pathdiff::diff_paths;
use walkdir::WalkDir;

use crate::config::Settings;

/// Extensions that internal links may resolve to.
const LINK_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Extensions that import statements may target. Imports can pull in `.jsx`
/// snippets, links cannot, which is why two predicates exist.
const IMPORT_EXTENSIONS: [&str; 3] = ["md", "mdx", "jsx"];

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    navigation_file: String,
    ignored_dirs: Vec<String>,
}

impl PathResolver {
    pub fn new(settings: &Settings, root_dir: &Path) -> PathResolver {
        PathResolver {
            root: root_dir.to_path_buf(),
            navigation_file: settings.navigation_file.clone(),
            ignored_dirs: settings.ignored_dirs.clone(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// Project-relative path with `/` separators.
    pub fn to_relative(&self, absolute: &Path) -> String {
        let diff = diff_paths(absolute, &self.root).unwrap_or_else(|| absolute.to_path_buf());
        normalize_separators(&diff.to_string_lossy())
    }

    /// Join a root-relative path (leading `/` allowed) onto the project root.
    pub fn to_absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative.trim_start_matches('/'))
    }

    /// Resolve an internal link path like `/quickstart` to the file it names.
    ///
    /// Candidates are probed in priority order: `<base>.md`, `<base>.mdx`,
    /// `<base>/index.mdx`, `<base>/index.md`, then the extensionless exact
    /// path. Returns `None` for non-root-relative links and broken links.
    pub fn resolve_internal_link(&self, link_path: &str) -> Option<PathBuf> {
        let clean = link_path.strip_prefix('/')?;
        let base = self.root.join(clean);

        let with_ext = |ext: &str| {
            let mut s = base.clone().into_os_string();
            s.push(ext);
            PathBuf::from(s)
        };

        [
            with_ext(".md"),
            with_ext(".mdx"),
            base.join("index.mdx"),
            base.join("index.md"),
            base.clone(),
        ]
        .into_iter()
        .find(|candidate| candidate.is_file())
    }

    /// Resolve an import path like `/snippets/note.mdx` to the file it names.
    pub fn resolve_import_path(&self, import_path: &str) -> Option<PathBuf> {
        let clean = import_path.strip_prefix('/')?;
        let full = self.root.join(clean);
        full.is_file().then_some(full)
    }

    /// Internal link form of a file path: `guide/setup.mdx` -> `/guide/setup`.
    pub fn to_internal_link_path(&self, absolute: &Path) -> String {
        let relative = self.to_relative(absolute);
        format!("/{}", strip_markdown_extension(&relative))
    }

    /// Import form of a file path: `snippets/note.mdx` -> `/snippets/note.mdx`.
    pub fn to_import_path(&self, absolute: &Path) -> String {
        format!("/{}", self.to_relative(absolute))
    }

    /// True for files import statements may target (`.md`, `.mdx`, `.jsx`).
    pub fn is_documentation_file(&self, path: &Path) -> bool {
        has_extension(path, &IMPORT_EXTENSIONS)
    }

    /// True for files internal links may target (`.md`, `.mdx`).
    pub fn is_markdown_file(&self, path: &Path) -> bool {
        has_extension(path, &LINK_EXTENSIONS)
    }

    /// Location of the navigation config. An explicit `navigation_file`
    /// setting wins; otherwise `docs.json` is preferred over the legacy
    /// `mint.json`.
    pub fn navigation_config_path(&self) -> PathBuf {
        if !self.navigation_file.is_empty() {
            return self.root.join(&self.navigation_file);
        }
        let docs = self.root.join("docs.json");
        if docs.is_file() {
            return docs;
        }
        let mint = self.root.join("mint.json");
        if mint.is_file() {
            return mint;
        }
        docs
    }

    pub fn has_navigation_config(&self) -> bool {
        self.navigation_config_path().is_file()
    }

    /// All link-eligible files under the project root.
    pub fn all_markdown_files(&self) -> Vec<PathBuf> {
        self.scan_files(&LINK_EXTENSIONS)
    }

    /// All import-eligible files under the project root.
    pub fn all_documentation_files(&self) -> Vec<PathBuf> {
        self.scan_files(&IMPORT_EXTENSIONS)
    }

    fn scan_files(&self, extensions: &[&str]) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| {
                !e.file_name()
                    .to_str()
                    .map(|s| s.starts_with('.') || self.ignored_dirs.iter().any(|d| d == s))
                    .unwrap_or(false)
            })
            .flatten()
            .filter(|e| e.file_type().is_file())
            .filter(|e| has_extension(e.path(), extensions))
            .map(|e| e.path().to_path_buf())
            .collect_vec()
    }
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Strip a trailing `.md`/`.mdx` extension, case-insensitively.
pub(crate) fn strip_markdown_extension(path: &str) -> &str {
    let lower = path.to_ascii_lowercase();
    for ext in [".mdx", ".md"] {
        if lower.ends_with(ext) {
            return &path[..path.len() - ext.len()];
        }
    }
    path
}
