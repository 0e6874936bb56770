//! Orchestrates the three updaters for one or more file changes.
//!
//! The updaters run in a fixed order (links, imports, navigation) and their
//! results merge into a single [`UpdateResult`]. Per-file failures inside an
//! updater never abort the run; they accumulate as error strings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;

use crate::classifier::{ChangeClassifier, FileChangeEvent};
use crate::config::Settings;
use crate::imports::{ImportReference, ImportUpdater};
use crate::links::{LinkReference, LinkUpdater};
use crate::navigation::{ConfigReport, NavigationReference, NavigationUpdater};
use crate::report::{ProgressSink, UpdateResult};
use crate::resolver::PathResolver;

/// Everything in the project that points at one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceReport {
    /// Project-relative path of the analyzed file.
    pub file: String,
    pub links: Vec<LinkReference>,
    pub imports: Vec<ImportReference>,
    pub navigation: Vec<NavigationReference>,
}

pub struct DocService {
    resolver: PathResolver,
    settings: Settings,
}

impl DocService {
    pub fn new(settings: Settings, root_dir: &Path) -> anyhow::Result<DocService> {
        let root_dir = root_dir
            .canonicalize()
            .with_context(|| format!("project root {} does not exist", root_dir.display()))?;
        if !root_dir.is_dir() {
            bail!("project root {} is not a directory", root_dir.display());
        }
        let resolver = PathResolver::new(&settings, &root_dir);
        Ok(DocService { resolver, settings })
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// A classifier wired to this project's resolver and detection window.
    pub fn classifier(&self) -> ChangeClassifier {
        ChangeClassifier::new(
            self.resolver.clone(),
            Duration::from_millis(self.settings.detection_window_ms),
        )
    }

    /// Run all three updaters for a single old-path/new-path pair.
    pub fn update_references_for_file(
        &self,
        old_path: &Path,
        new_path: &Path,
        progress: &mut dyn ProgressSink,
    ) -> UpdateResult {
        info!(
            old = %self.resolver.to_relative(old_path),
            new = %self.resolver.to_relative(new_path),
            "updating references"
        );
        let mut result = UpdateResult::new();

        progress.report(10, "Updating internal links...");
        result.merge(LinkUpdater::new(&self.resolver).update_links_for_file(old_path, new_path));

        progress.report(30, "Updating import statements...");
        result
            .merge(ImportUpdater::new(&self.resolver).update_imports_for_file(old_path, new_path));

        progress.report(60, "Updating navigation structure...");
        result.merge(
            NavigationUpdater::new(&self.resolver).update_navigation_for_file(old_path, new_path),
        );

        progress.report(90, "Finalizing updates...");
        progress.report(100, "All updates completed");
        result
    }

    /// Batch form for directory renames. Links and imports fold per change;
    /// the navigation config is rewritten once for the whole batch.
    ///
    /// Milestones track the update phases, not individual changes, so a
    /// batch reports the same five milestones as a single update.
    pub fn update_references_for_files(
        &self,
        changes: &[(PathBuf, PathBuf)],
        progress: &mut dyn ProgressSink,
    ) -> UpdateResult {
        info!(files = changes.len(), "updating references for batch");
        let mut result = UpdateResult::new();

        progress.report(10, "Updating internal links...");
        result.merge(LinkUpdater::new(&self.resolver).update_links_for_multiple_files(changes));

        progress.report(30, "Updating import statements...");
        result.merge(ImportUpdater::new(&self.resolver).update_imports_for_multiple_files(changes));

        progress.report(60, "Updating navigation structure...");
        result.merge(
            NavigationUpdater::new(&self.resolver).update_navigation_for_multiple_files(changes),
        );

        progress.report(90, "Finalizing updates...");
        progress.report(100, "All updates completed");
        result
    }

    /// Apply one classified rename/move event.
    pub fn apply_event(
        &self,
        event: &FileChangeEvent,
        progress: &mut dyn ProgressSink,
    ) -> UpdateResult {
        self.update_references_for_file(&event.old_path, &event.new_path, progress)
    }

    /// Manual folder rename: the directory has already been moved on disk, so
    /// per-file changes are synthesized by walking the new location.
    pub fn handle_folder_rename(
        &self,
        old_dir: &Path,
        new_dir: &Path,
        progress: &mut dyn ProgressSink,
    ) -> UpdateResult {
        let events = self.classifier().expand_directory_rename(old_dir, new_dir);
        let changes: Vec<(PathBuf, PathBuf)> = events
            .into_iter()
            .map(|event| (event.old_path, event.new_path))
            .collect();
        if changes.is_empty() {
            info!(dir = %new_dir.display(), "no documentation files under renamed directory");
            return UpdateResult::new();
        }
        self.update_references_for_files(&changes, progress)
    }

    /// Read-only aggregation of everything pointing at `path`.
    pub fn analyze_file(&self, path: &Path) -> anyhow::Result<ReferenceReport> {
        if !path.is_file() {
            bail!("{} does not exist", path.display());
        }
        Ok(ReferenceReport {
            file: self.resolver.to_relative(path),
            links: LinkUpdater::new(&self.resolver).find_links_to_file(path),
            imports: ImportUpdater::new(&self.resolver).find_imports_to_file(path),
            navigation: NavigationUpdater::new(&self.resolver)
                .find_navigation_references_to_file(path),
        })
    }

    /// Validate the navigation config file.
    pub fn validate_navigation(&self) -> ConfigReport {
        NavigationUpdater::new(&self.resolver).validate_config()
    }
}
