//! Update accounting shared by every updater, plus the progress interface
//! the orchestrator reports milestones through.

use std::collections::BTreeSet;

use serde::Serialize;

/// Aggregate counters for one logical update operation.
///
/// `merge` is commutative and associative (counters sum, file sets union,
/// errors concatenate), so batch results compose from single-file results
/// in any grouping.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    /// Number of internal links rewritten.
    pub links_updated: usize,
    /// Number of import statements rewritten.
    pub imports_updated: usize,
    /// Number of navigation paths rewritten.
    pub navigation_updated: usize,
    /// Project-relative paths of every file written.
    pub updated_files: BTreeSet<String>,
    /// Per-file failures. A failed file never aborts the batch.
    pub errors: Vec<String>,
}

impl UpdateResult {
    pub fn new() -> UpdateResult {
        UpdateResult::default()
    }

    pub fn merge(&mut self, other: UpdateResult) {
        self.links_updated += other.links_updated;
        self.imports_updated += other.imports_updated;
        self.navigation_updated += other.navigation_updated;
        self.updated_files.extend(other.updated_files);
        self.errors.extend(other.errors);
    }

    pub fn has_changes(&self) -> bool {
        self.links_updated > 0 || self.imports_updated > 0 || self.navigation_updated > 0
    }

    /// Human-readable summary in the "N links, M imports" style.
    pub fn summary(&self) -> String {
        let mut message = String::from("Update completed!");

        if self.has_changes() {
            let mut details = Vec::new();
            if self.links_updated > 0 {
                details.push(format!("{} internal links", self.links_updated));
            }
            if self.imports_updated > 0 {
                details.push(format!("{} import statements", self.imports_updated));
            }
            if self.navigation_updated > 0 {
                details.push(format!("{} navigation paths", self.navigation_updated));
            }
            message.push_str(&format!(" Updated {}", details.join(", ")));

            if !self.updated_files.is_empty() {
                message.push_str("\n\nModified files:\n");
                message.push_str(
                    &self
                        .updated_files
                        .iter()
                        .map(|f| format!("  - {f}"))
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
            }
        } else {
            message.push_str(" No references found to update.");
        }

        if !self.errors.is_empty() {
            message.push_str("\n\nErrors:\n");
            message.push_str(&self.errors.join("\n"));
        }

        message
    }
}

/// Receives coarse progress milestones from the orchestrator. Milestones
/// track the update phases (10/30/60/90/100), for batches as for single
/// updates; per-file progress goes to the log instead.
pub trait ProgressSink {
    fn report(&mut self, percent: u8, message: &str);
}

/// Discards progress. Useful for tests and non-interactive callers.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _percent: u8, _message: &str) {}
}

/// Forwards progress milestones to the log.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, percent: u8, message: &str) {
        tracing::info!("[{percent:>3}%] {message}");
    }
}
