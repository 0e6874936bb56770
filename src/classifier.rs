//! Rename/move inference from raw create/delete filesystem events.
//!
//! Filesystem watchers report a rename as an unordered delete+create pair.
//! Each path cycles independently through pending-deleted / pending-created
//! states; a delete and a create that land within the detection window and
//! satisfy the pairing predicate are fused into one higher-level event.
//!
//! The pairing is a heuristic: an unrelated delete and create of same-named
//! files in different directories inside the window will be read as a move.
//! That trade-off is accepted rather than hidden; see the tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use itertools::Itertools;
use pathdiff::diff_paths;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::resolver::PathResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Old and new path share the same parent directory.
    Rename,
    /// Old and new path share the same basename in different directories.
    Move,
}

/// A classified file change, consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChangeEvent {
    pub kind: ChangeKind,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub is_directory: bool,
}

/// Time source for the classifier. Injectable so the pairing window can be
/// tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub struct ChangeClassifier {
    resolver: PathResolver,
    window: Duration,
    clock: Arc<dyn Clock>,
    // Files and directories never pair with each other, so each gets its
    // own pending tables.
    deleted_files: HashMap<PathBuf, Instant>,
    created_files: HashMap<PathBuf, Instant>,
    deleted_dirs: HashMap<PathBuf, Instant>,
    created_dirs: HashMap<PathBuf, Instant>,
}

impl ChangeClassifier {
    pub fn new(resolver: PathResolver, window: Duration) -> ChangeClassifier {
        ChangeClassifier::with_clock(resolver, window, Arc::new(SystemClock))
    }

    pub fn with_clock(
        resolver: PathResolver,
        window: Duration,
        clock: Arc<dyn Clock>,
    ) -> ChangeClassifier {
        ChangeClassifier {
            resolver,
            window,
            clock,
            deleted_files: HashMap::new(),
            created_files: HashMap::new(),
            deleted_dirs: HashMap::new(),
            created_dirs: HashMap::new(),
        }
    }

    /// Raw file-create notification. Returns the fused event if this create
    /// completes a pending delete.
    pub fn on_file_created(&mut self, path: &Path) -> Option<FileChangeEvent> {
        let now = self.clock.now();
        // A path holds at most one pending entry per table pair.
        self.created_files.remove(path);

        if let Some((old_path, kind)) =
            take_counterpart(&mut self.deleted_files, path, now, self.window)
        {
            debug!(
                old = %old_path.display(),
                new = %path.display(),
                ?kind,
                "paired file create with pending delete"
            );
            return Some(FileChangeEvent {
                kind,
                old_path,
                new_path: path.to_path_buf(),
                is_directory: false,
            });
        }

        self.created_files.insert(path.to_path_buf(), now);
        None
    }

    /// Raw file-delete notification. Returns the fused event if this delete
    /// completes a pending create.
    pub fn on_file_deleted(&mut self, path: &Path) -> Option<FileChangeEvent> {
        let now = self.clock.now();
        self.deleted_files.remove(path);

        if let Some((new_path, kind)) =
            take_counterpart(&mut self.created_files, path, now, self.window)
        {
            debug!(
                old = %path.display(),
                new = %new_path.display(),
                ?kind,
                "paired file delete with pending create"
            );
            return Some(FileChangeEvent {
                kind,
                old_path: path.to_path_buf(),
                new_path,
                is_directory: false,
            });
        }

        self.deleted_files.insert(path.to_path_buf(), now);
        None
    }

    /// Raw directory-create notification. A paired directory change is
    /// expanded into one event per contained documentation file, since the
    /// updaters work at file granularity.
    pub fn on_directory_created(&mut self, path: &Path) -> Vec<FileChangeEvent> {
        let now = self.clock.now();
        self.created_dirs.remove(path);

        if let Some((old_dir, _)) =
            take_counterpart(&mut self.deleted_dirs, path, now, self.window)
        {
            debug!(old = %old_dir.display(), new = %path.display(), "paired directory change");
            return self.expand_directory_rename(&old_dir, path);
        }

        self.created_dirs.insert(path.to_path_buf(), now);
        Vec::new()
    }

    /// Raw directory-delete notification.
    pub fn on_directory_deleted(&mut self, path: &Path) -> Vec<FileChangeEvent> {
        let now = self.clock.now();
        self.deleted_dirs.remove(path);

        if let Some((new_dir, _)) =
            take_counterpart(&mut self.created_dirs, path, now, self.window)
        {
            debug!(old = %path.display(), new = %new_dir.display(), "paired directory change");
            return self.expand_directory_rename(path, &new_dir);
        }

        self.deleted_dirs.insert(path.to_path_buf(), now);
        Vec::new()
    }

    /// Synthesize per-file events for a directory rename by walking the new
    /// directory and substituting the old prefix. Also the entry point for
    /// user-confirmed folder renames, which bypass the pairing heuristic.
    pub fn expand_directory_rename(&self, old_dir: &Path, new_dir: &Path) -> Vec<FileChangeEvent> {
        WalkDir::new(new_dir)
            .into_iter()
            .flatten()
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.resolver.is_documentation_file(e.path()))
            .filter_map(|e| {
                let relative = diff_paths(e.path(), new_dir)?;
                Some(FileChangeEvent {
                    kind: ChangeKind::Move,
                    old_path: old_dir.join(&relative),
                    new_path: e.path().to_path_buf(),
                    is_directory: false,
                })
            })
            .collect_vec()
    }

    /// Discard pending entries older than the detection window. Unpaired
    /// entries are genuine creates/deletes and produce no downstream event.
    pub fn sweep_expired(&mut self) {
        let now = self.clock.now();
        let window = self.window;
        for table in [
            &mut self.deleted_files,
            &mut self.created_files,
            &mut self.deleted_dirs,
            &mut self.created_dirs,
        ] {
            table.retain(|path, recorded| {
                let keep = now.duration_since(*recorded) <= window;
                if !keep {
                    debug!(path = %path.display(), "pending entry expired unpaired");
                }
                keep
            });
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.deleted_files.is_empty()
            || !self.created_files.is_empty()
            || !self.deleted_dirs.is_empty()
            || !self.created_dirs.is_empty()
    }
}

/// Find and remove the pending entry pairing with `path`.
///
/// Rules are evaluated in order over all entries, so classification does not
/// depend on map iteration order: every same-parent candidate is considered
/// before any same-basename candidate. Ties go to the most recent entry.
fn take_counterpart(
    pending: &mut HashMap<PathBuf, Instant>,
    path: &Path,
    now: Instant,
    window: Duration,
) -> Option<(PathBuf, ChangeKind)> {
    if let Some(p) = best_candidate(pending, now, window, |p| p.parent() == path.parent()) {
        pending.remove(&p);
        return Some((p, ChangeKind::Rename));
    }

    if let Some(p) = best_candidate(pending, now, window, |p| p.file_name() == path.file_name()) {
        pending.remove(&p);
        return Some((p, ChangeKind::Move));
    }

    None
}

fn best_candidate(
    pending: &HashMap<PathBuf, Instant>,
    now: Instant,
    window: Duration,
    matches: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    pending
        .iter()
        .filter(|&(p, recorded)| now.duration_since(*recorded) <= window && matches(p))
        .max_by_key(|&(_, recorded)| *recorded)
        .map(|(p, _)| p.clone())
}
