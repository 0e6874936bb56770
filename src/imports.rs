//! Rewrites MDX import statements when a snippet or page changes its path.
//!
//! Only root-relative import paths (leading `/`) are candidates. Relative
//! imports are left alone even though a move can break them; this mirrors
//! the Mintlify convention that snippet imports are root-relative, and is a
//! recorded limitation rather than something to fix silently.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

use crate::report::UpdateResult;
use crate::resolver::PathResolver;

// The binding clause (default, named list, or namespace import) is matched
// only so the statement as a whole is recognized; matching keys on the
// string literal path alone.
static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+(?:(?:\{[^}]+\}|\w+|\*\s+as\s+\w+)\s+from\s+)?['"]([^'"]+)['"]"#)
        .unwrap()
});

/// One import statement pointing at a queried file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReference {
    /// Project-relative path of the importing file.
    pub file: String,
    pub statement: String,
}

/// One root-relative import found in a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStatement {
    pub statement: String,
    pub path: String,
    pub line_number: usize,
}

pub struct ImportUpdater<'a> {
    resolver: &'a PathResolver,
}

impl<'a> ImportUpdater<'a> {
    pub fn new(resolver: &'a PathResolver) -> ImportUpdater<'a> {
        ImportUpdater { resolver }
    }

    /// Rewrite every import statement pointing at `old_path` across the
    /// project (md, mdx and jsx files).
    pub fn update_imports_for_file(&self, old_path: &Path, new_path: &Path) -> UpdateResult {
        let mut result = UpdateResult::new();

        let old_import = self.resolver.to_import_path(old_path);
        let new_import = self.resolver.to_import_path(new_path);
        debug!(old = %old_import, new = %new_import, "updating import statements");

        for file in self.resolver.all_documentation_files() {
            let file_result = self.update_imports_in_file(&file, &old_import, &new_import);
            if file_result.imports_updated > 0 {
                result.imports_updated += file_result.imports_updated;
                result.updated_files.insert(self.resolver.to_relative(&file));
            }
            result.errors.extend(file_result.errors);
        }

        result
    }

    /// Sequential fold over [`Self::update_imports_for_file`].
    pub fn update_imports_for_multiple_files(
        &self,
        changes: &[(PathBuf, PathBuf)],
    ) -> UpdateResult {
        let mut result = UpdateResult::new();
        for (old_path, new_path) in changes {
            result.merge(self.update_imports_for_file(old_path, new_path));
        }
        result
    }

    fn update_imports_in_file(
        &self,
        file: &Path,
        old_import: &str,
        new_import: &str,
    ) -> UpdateResult {
        let mut result = UpdateResult::new();

        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(err) => {
                result
                    .errors
                    .push(format!("failed to read {}: {err}", file.display()));
                return result;
            }
        };

        let mut imports_updated = 0usize;
        let updated = IMPORT_RE.replace_all(&content, |caps: &Captures| {
            let import_path = &caps[1];
            if import_path == old_import {
                imports_updated += 1;
                // Exact string match on the path; the binding clause is
                // carried over unchanged.
                caps[0].replacen(old_import, new_import, 1)
            } else {
                caps[0].to_string()
            }
        });

        if imports_updated > 0 {
            if let Err(err) = fs::write(file, updated.as_ref()) {
                result
                    .errors
                    .push(format!("failed to write {}: {err}", file.display()));
                return result;
            }
            result.imports_updated = imports_updated;
            debug!(file = %file.display(), imports_updated, "rewrote import statements");
        }

        result
    }

    /// Read-only scan for import statements pointing at `target`.
    pub fn find_imports_to_file(&self, target: &Path) -> Vec<ImportReference> {
        let target_import = self.resolver.to_import_path(target);
        let mut imports = Vec::new();

        for file in self.resolver.all_documentation_files() {
            let Ok(content) = fs::read_to_string(&file) else {
                continue;
            };
            for line in content.lines() {
                for caps in IMPORT_RE.captures_iter(line) {
                    if &caps[1] == target_import.as_str() {
                        imports.push(ImportReference {
                            file: self.resolver.to_relative(&file),
                            statement: line.trim().to_string(),
                        });
                    }
                }
            }
        }

        imports
    }

    /// All root-relative imports in one file, with 1-based line numbers.
    pub fn get_imports_from_file(&self, path: &Path) -> Vec<ImportStatement> {
        let mut imports = Vec::new();

        let Ok(content) = fs::read_to_string(path) else {
            return imports;
        };
        for (index, line) in content.lines().enumerate() {
            for caps in IMPORT_RE.captures_iter(line) {
                let import_path = &caps[1];
                if import_path.starts_with('/') {
                    imports.push(ImportStatement {
                        statement: line.trim().to_string(),
                        path: import_path.to_string(),
                        line_number: index + 1,
                    });
                }
            }
        }

        imports
    }

    /// True iff the path is root-relative and resolves to an existing file.
    pub fn validate_import_path(&self, import_path: &str) -> bool {
        import_path.starts_with('/') && self.resolver.resolve_import_path(import_path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::test_utils::create_test_docs_dir;

    fn updater_fixture() -> (tempfile::TempDir, PathBuf, PathResolver) {
        let (temp_dir, docs_dir) = create_test_docs_dir();
        let resolver = PathResolver::new(&Settings::default(), &docs_dir);
        (temp_dir, docs_dir, resolver)
    }

    #[test]
    fn test_default_import_is_rewritten() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        fs::write(
            docs_dir.join("guide.mdx"),
            "import Note from '/snippets/note.mdx'\n\n# Guide\n",
        )
        .unwrap();

        let updater = ImportUpdater::new(&resolver);
        let result = updater.update_imports_for_file(
            &docs_dir.join("snippets/note.mdx"),
            &docs_dir.join("snippets/callout.mdx"),
        );

        assert_eq!(result.imports_updated, 1);
        assert!(result.updated_files.contains("guide.mdx"));
        let content = fs::read_to_string(docs_dir.join("guide.mdx")).unwrap();
        assert!(content.contains("import Note from '/snippets/callout.mdx'"));
    }

    #[test]
    fn test_binding_forms_are_preserved() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        fs::write(
            docs_dir.join("guide.mdx"),
            concat!(
                "import Note from '/snippets/note.mdx'\n",
                "import { one, two } from \"/snippets/note.mdx\"\n",
                "import * as Notes from '/snippets/note.mdx'\n",
            ),
        )
        .unwrap();

        let updater = ImportUpdater::new(&resolver);
        let result = updater.update_imports_for_file(
            &docs_dir.join("snippets/note.mdx"),
            &docs_dir.join("shared/note.mdx"),
        );

        assert_eq!(result.imports_updated, 3);
        let content = fs::read_to_string(docs_dir.join("guide.mdx")).unwrap();
        assert!(content.contains("import Note from '/shared/note.mdx'"));
        assert!(content.contains("import { one, two } from \"/shared/note.mdx\""));
        assert!(content.contains("import * as Notes from '/shared/note.mdx'"));
    }

    #[test]
    fn test_relative_imports_are_not_rewritten() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        let body = "import Note from './note.mdx'\nimport Other from '../snippets/note.mdx'\n";
        fs::write(docs_dir.join("guide.mdx"), body).unwrap();

        let updater = ImportUpdater::new(&resolver);
        let result = updater.update_imports_for_file(
            &docs_dir.join("note.mdx"),
            &docs_dir.join("callout.mdx"),
        );

        assert_eq!(result.imports_updated, 0);
        assert_eq!(fs::read_to_string(docs_dir.join("guide.mdx")).unwrap(), body);
    }

    #[test]
    fn test_exact_path_match_required() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        fs::write(
            docs_dir.join("guide.mdx"),
            "import A from '/snippets/note.mdx'\nimport B from '/snippets/note-extra.mdx'\n",
        )
        .unwrap();

        let updater = ImportUpdater::new(&resolver);
        let result = updater.update_imports_for_file(
            &docs_dir.join("snippets/note.mdx"),
            &docs_dir.join("snippets/callout.mdx"),
        );

        assert_eq!(result.imports_updated, 1);
        let content = fs::read_to_string(docs_dir.join("guide.mdx")).unwrap();
        assert!(content.contains("'/snippets/callout.mdx'"));
        assert!(content.contains("'/snippets/note-extra.mdx'"));
    }

    #[test]
    fn test_jsx_files_are_scanned() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        fs::write(
            docs_dir.join("widget.jsx"),
            "import { Note } from '/snippets/note.mdx'\nexport const W = () => <Note />\n",
        )
        .unwrap();

        let updater = ImportUpdater::new(&resolver);
        let result = updater.update_imports_for_file(
            &docs_dir.join("snippets/note.mdx"),
            &docs_dir.join("snippets/callout.mdx"),
        );

        assert_eq!(result.imports_updated, 1);
        assert!(result.updated_files.contains("widget.jsx"));
    }

    #[test]
    fn test_unreadable_file_does_not_abort_the_scan() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        // Invalid UTF-8 makes the read fail for this file only.
        fs::write(docs_dir.join("broken.mdx"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        fs::write(
            docs_dir.join("guide.mdx"),
            "import Note from '/snippets/note.mdx'\n",
        )
        .unwrap();

        let updater = ImportUpdater::new(&resolver);
        let result = updater.update_imports_for_file(
            &docs_dir.join("snippets/note.mdx"),
            &docs_dir.join("snippets/callout.mdx"),
        );

        assert_eq!(result.imports_updated, 1);
        assert!(result.updated_files.contains("guide.mdx"));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("failed to read"));
        assert!(result.errors[0].contains("broken.mdx"));
    }

    #[test]
    fn test_find_imports_to_file() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        fs::write(
            docs_dir.join("guide.mdx"),
            "import Note from '/snippets/note.mdx'\n",
        )
        .unwrap();
        fs::write(
            docs_dir.join("other.mdx"),
            "import Unrelated from '/snippets/other.mdx'\n",
        )
        .unwrap();

        let updater = ImportUpdater::new(&resolver);
        let found = updater.find_imports_to_file(&docs_dir.join("snippets/note.mdx"));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file, "guide.mdx");
        assert_eq!(found[0].statement, "import Note from '/snippets/note.mdx'");
    }

    #[test]
    fn test_get_imports_from_file() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        fs::write(
            docs_dir.join("guide.mdx"),
            "# Title\n\nimport A from '/a.mdx'\nimport B from './b.mdx'\nimport C from '/c.jsx'\n",
        )
        .unwrap();

        let updater = ImportUpdater::new(&resolver);
        let imports = updater.get_imports_from_file(&docs_dir.join("guide.mdx"));

        // Only the root-relative imports are reported.
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].path, "/a.mdx");
        assert_eq!(imports[0].line_number, 3);
        assert_eq!(imports[1].path, "/c.jsx");
        assert_eq!(imports[1].line_number, 5);
    }

    #[test]
    fn test_validate_import_path() {
        let (_temp_dir, docs_dir, resolver) = updater_fixture();
        fs::create_dir(docs_dir.join("snippets")).unwrap();
        fs::write(docs_dir.join("snippets/note.mdx"), "note").unwrap();

        let updater = ImportUpdater::new(&resolver);
        assert!(updater.validate_import_path("/snippets/note.mdx"));
        assert!(!updater.validate_import_path("/snippets/missing.mdx"));
        assert!(!updater.validate_import_path("snippets/note.mdx"));
    }
}
