//! Rewrites page paths inside the JSON navigation config.
//!
//! The navigation tree is arbitrarily nested objects/arrays whose string
//! leaves may be page references. There is no marker distinguishing a page
//! path from any other string, so matching is by value equality against the
//! page-path form of the changed file (root-relative, extensionless, no
//! leading slash).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::report::UpdateResult;
use crate::resolver::PathResolver;

/// One navigation entry pointing at a queried file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationReference {
    pub page_path: String,
    /// Dotted/indexed location inside the config, e.g. `navigation.tabs[0].pages[2]`.
    pub location: String,
}

/// Outcome of [`NavigationUpdater::validate_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

pub struct NavigationUpdater<'a> {
    resolver: &'a PathResolver,
}

impl<'a> NavigationUpdater<'a> {
    pub fn new(resolver: &'a PathResolver) -> NavigationUpdater<'a> {
        NavigationUpdater { resolver }
    }

    /// Rewrite navigation entries for one changed file.
    ///
    /// A missing config file is a no-op, not an error: navigation
    /// maintenance is an optional enhancement.
    pub fn update_navigation_for_file(&self, old_path: &Path, new_path: &Path) -> UpdateResult {
        self.update_navigation(&[(old_path.to_path_buf(), new_path.to_path_buf())])
    }

    /// Apply every pending change in a single read-modify-write cycle of the
    /// config file, so intermediate states are never observable on disk.
    pub fn update_navigation_for_multiple_files(
        &self,
        changes: &[(PathBuf, PathBuf)],
    ) -> UpdateResult {
        self.update_navigation(changes)
    }

    fn update_navigation(&self, changes: &[(PathBuf, PathBuf)]) -> UpdateResult {
        let mut result = UpdateResult::new();

        if !self.resolver.has_navigation_config() {
            debug!("no navigation config found, skipping navigation update");
            return result;
        }
        let config_path = self.resolver.navigation_config_path();

        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(err) => {
                result
                    .errors
                    .push(format!("failed to read {}: {err}", config_path.display()));
                return result;
            }
        };

        // A config that fails to parse is skipped entirely; never write a
        // partially rewritten file.
        let mut config: Value = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                result
                    .errors
                    .push(format!("failed to parse {}: {err}", config_path.display()));
                return result;
            }
        };

        let Some(navigation) = config.get_mut("navigation") else {
            debug!("navigation config has no navigation key, nothing to update");
            return result;
        };

        let mut navigation_updated = 0usize;
        for (old_path, new_path) in changes {
            let old_page = self.page_path(old_path);
            let new_page = self.page_path(new_path);
            navigation_updated += replace_in_tree(navigation, &old_page, &new_page);
        }

        if navigation_updated > 0 {
            let updated = match serde_json::to_string_pretty(&config) {
                Ok(updated) => updated,
                Err(err) => {
                    result
                        .errors
                        .push(format!("failed to serialize {}: {err}", config_path.display()));
                    return result;
                }
            };
            if let Err(err) = fs::write(&config_path, updated) {
                result
                    .errors
                    .push(format!("failed to write {}: {err}", config_path.display()));
                return result;
            }
            result.navigation_updated = navigation_updated;
            result
                .updated_files
                .insert(self.resolver.to_relative(&config_path));
            debug!(navigation_updated, "rewrote navigation entries");
        }

        result
    }

    /// Read-only scan of the navigation tree for entries naming `target`.
    pub fn find_navigation_references_to_file(&self, target: &Path) -> Vec<NavigationReference> {
        let mut references = Vec::new();

        if !self.resolver.has_navigation_config() {
            return references;
        }
        let config_path = self.resolver.navigation_config_path();

        let Ok(content) = fs::read_to_string(&config_path) else {
            return references;
        };
        let Ok(config) = serde_json::from_str::<Value>(&content) else {
            return references;
        };

        if let Some(navigation) = config.get("navigation") {
            let target_page = self.page_path(target);
            collect_references(navigation, &target_page, "navigation", &mut references);
        }

        references
    }

    /// Check the navigation config exists, parses, and has a `navigation` key.
    pub fn validate_config(&self) -> ConfigReport {
        let mut errors = Vec::new();

        if !self.resolver.has_navigation_config() {
            errors.push(format!(
                "{} does not exist",
                self.resolver.navigation_config_path().display()
            ));
            return ConfigReport {
                is_valid: false,
                errors,
            };
        }

        let config_path = self.resolver.navigation_config_path();
        match fs::read_to_string(&config_path) {
            Err(err) => {
                errors.push(format!("failed to read {}: {err}", config_path.display()));
                return ConfigReport {
                    is_valid: false,
                    errors,
                };
            }
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Err(err) => {
                    errors.push(format!("failed to parse {}: {err}", config_path.display()));
                    return ConfigReport {
                        is_valid: false,
                        errors,
                    };
                }
                Ok(config) => {
                    if config.get("navigation").is_none() {
                        errors.push(format!(
                            "{} is missing the navigation key",
                            config_path.display()
                        ));
                    }
                }
            },
        }

        ConfigReport {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Navigation entries are stored root-relative without the leading slash.
    fn page_path(&self, file: &Path) -> String {
        self.resolver
            .to_internal_link_path(file)
            .trim_start_matches('/')
            .to_string()
    }
}

/// Recursively replace string leaves equal to `old_page`, whether they sit
/// in arrays or as object values. Returns the number of replacements.
fn replace_in_tree(value: &mut Value, old_page: &str, new_page: &str) -> usize {
    match value {
        Value::String(s) if s == old_page => {
            *s = new_page.to_string();
            1
        }
        Value::Array(items) => items
            .iter_mut()
            .map(|item| replace_in_tree(item, old_page, new_page))
            .sum(),
        Value::Object(map) => map
            .values_mut()
            .map(|item| replace_in_tree(item, old_page, new_page))
            .sum(),
        _ => 0,
    }
}

fn collect_references(
    value: &Value,
    target_page: &str,
    location: &str,
    references: &mut Vec<NavigationReference>,
) {
    match value {
        Value::String(s) if s == target_page => {
            references.push(NavigationReference {
                page_path: target_page.to_string(),
                location: location.to_string(),
            });
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_references(item, target_page, &format!("{location}[{index}]"), references);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                collect_references(item, target_page, &format!("{location}.{key}"), references);
            }
        }
        _ => {}
    }
}
