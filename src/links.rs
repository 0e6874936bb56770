//! Rewrites internal links when a page changes its path.
//!
//! Two link styles are handled in each file: markdown `[text](/path)` links
//! and JSX/HTML attribute links (`href="/path"` / `to="/path"`). Matching is
//! textual by design; the regexes below are the behavioral contract, not an
//! approximation of a markdown parser.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

use crate::report::UpdateResult;
use crate::resolver::{strip_markdown_extension, PathResolver};

static MD_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").unwrap()); // [display](target)

static ATTR_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(\b(?:href|to)\s*=\s*["'])([^"']+)(["'])"#).unwrap()
});

/// One internal link found by [`LinkUpdater::find_links_to_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReference {
    /// Project-relative path of the file containing the link.
    pub file: String,
    pub link_text: String,
    pub link_path: String,
}

pub struct LinkUpdater<'a> {
    resolver: &'a PathResolver,
}

impl<'a> LinkUpdater<'a> {
    pub fn new(resolver: &'a PathResolver) -> LinkUpdater<'a> {
        LinkUpdater { resolver }
    }

    /// Rewrite every internal link pointing at `old_path` across the project.
    pub fn update_links_for_file(&self, old_path: &Path, new_path: &Path) -> UpdateResult {
        let mut result = UpdateResult::new();

        let old_link = self.resolver.to_internal_link_path(old_path);
        let new_link = self.resolver.to_internal_link_path(new_path);
        debug!(old = %old_link, new = %new_link, "updating internal links");

        for file in self.resolver.all_markdown_files() {
            let file_result = self.update_links_in_file(&file, &old_link, &new_link);
            if file_result.links_updated > 0 {
                result.links_updated += file_result.links_updated;
                result.updated_files.insert(self.resolver.to_relative(&file));
            }
            result.errors.extend(file_result.errors);
        }

        result
    }

    /// Sequential fold over [`Self::update_links_for_file`].
    pub fn update_links_for_multiple_files(
        &self,
        changes: &[(PathBuf, PathBuf)],
    ) -> UpdateResult {
        let mut result = UpdateResult::new();
        for (old_path, new_path) in changes {
            result.merge(self.update_links_for_file(old_path, new_path));
        }
        result
    }

    fn update_links_in_file(&self, file: &Path, old_link: &str, new_link: &str) -> UpdateResult {
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

        let old_normalized = normalize_link_target(old_link);
        let mut links_updated = 0usize;

        // Markdown pass first, attribute pass on its output, so a file mixing
        // both styles is rewritten in a single write.
        let pass_one = MD_LINK_RE.replace_all(&content, |caps: &Captures| {
            let display = &caps[1];
            let target = &caps[2];
            if is_internal_link(target) && normalize_link_target(target) == old_normalized {
                links_updated += 1;
                format!("[{display}]({new_link}{})", link_suffix(target))
            } else {
                caps[0].to_string()
            }
        });

        let pass_two = ATTR_LINK_RE.replace_all(&pass_one, |caps: &Captures| {
            let prefix = &caps[1];
            let url = &caps[2];
            let closing_quote = &caps[3];
            if is_internal_link(url) && normalize_attr_target(url) == old_normalized {
                links_updated += 1;
                format!("{prefix}{new_link}{}{closing_quote}", link_suffix(url))
            } else {
                caps[0].to_string()
            }
        });

        // Only write when something changed, to keep mtimes and diffs quiet.
        if links_updated > 0 {
            if let Err(err) = fs::write(file, pass_two.as_ref()) {
                result
                    .errors
                    .push(format!("failed to write {}: {err}", file.display()));
                return result;
            }
            result.links_updated = links_updated;
            debug!(file = %file.display(), links_updated, "rewrote internal links");
        }

        result
    }

    /// Read-only scan for links pointing at `target`.
    pub fn find_links_to_file(&self, target: &Path) -> Vec<LinkReference> {
        let target_link = normalize_link_target(&self.resolver.to_internal_link_path(target));
        let mut links = Vec::new();

        for file in self.resolver.all_markdown_files() {
            let Ok(content) = fs::read_to_string(&file) else {
                continue;
            };
            for caps in MD_LINK_RE.captures_iter(&content) {
                let link_path = &caps[2];
                if is_internal_link(link_path) && normalize_link_target(link_path) == target_link {
                    links.push(LinkReference {
                        file: self.resolver.to_relative(&file),
                        link_text: caps[1].to_string(),
                        link_path: link_path.to_string(),
                    });
                }
            }
        }

        links
    }
}

/// Internal links are root-relative and never external URLs.
fn is_internal_link(target: &str) -> bool {
    target.starts_with('/') && !target.contains("http")
}

/// Canonical comparison form of a link target: fragment/query stripped,
/// separators normalized, `.md`/`.mdx` extension removed. Markdown link
/// targets keep a trailing slash; only attribute URLs drop it.
fn normalize_link_target(target: &str) -> String {
    let without_fragment = target.split('#').next().unwrap_or(target);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let normalized = without_query.replace('\\', "/");
    strip_markdown_extension(&normalized).to_string()
}

/// Attribute URLs additionally tolerate a trailing slash.
fn normalize_attr_target(target: &str) -> String {
    let normalized = normalize_link_target(target);
    normalized.trim_end_matches('/').to_string()
}

/// The `#fragment`/`?query` tail of a link, preserved verbatim on rewrite.
fn link_suffix(target: &str) -> &str {
    let start = [target.find('#'), target.find('?')]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(target.len());
    &target[start..]
}
