//! Filesystem watch loop.
//!
//! Raw notify events are bridged onto a tokio channel and fed to the
//! classifier; classified rename/move events run the orchestrator. A periodic
//! tick sweeps pending entries whose detection window has lapsed.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::classifier::{ChangeClassifier, FileChangeEvent};
use crate::report::LogProgress;
use crate::service::DocService;

const SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// Watch the project root until the channel closes (or the process is
/// interrupted), updating references for every classified rename or move.
pub async fn watch(service: &DocService) -> anyhow::Result<()> {
    let root = service.resolver().root_dir().to_path_buf();
    let (tx, mut rx) = mpsc::channel::<Result<Event, notify::Error>>(256);

    // notify runs its own callback thread; blocking_send bridges into tokio.
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.blocking_send(res);
    })
    .context("failed to create filesystem watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", root.display()))?;
    info!(root = %root.display(), "watching for file changes");

    let mut classifier = service.classifier();
    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(Ok(event)) => {
                        for change in route_event(&mut classifier, &event) {
                            run_update(service, &change);
                        }
                    }
                    Some(Err(err)) => warn!(%err, "filesystem watcher error"),
                    None => break,
                }
            }
            _ = sweep.tick() => {
                classifier.sweep_expired();
            }
        }
    }

    Ok(())
}

/// Feed one raw notify event to the classifier.
///
/// Remove events carry a path that no longer exists, so directories are told
/// apart from files only by extension: anything without a documentation
/// extension goes to the directory table. That misroutes deleted non-doc
/// files (`notes.txt`) and catches dotted directory names (`v2.0/`) alike;
/// a non-documentation entry in the directory table can never pair with a
/// documentation counterpart, so the misrouted case stays inert.
fn route_event(classifier: &mut ChangeClassifier, event: &Event) -> Vec<FileChangeEvent> {
    match event.kind {
        EventKind::Create(_) => {
            let mut changes = Vec::new();
            for path in &event.paths {
                if path.is_dir() {
                    changes.extend(classifier.on_directory_created(path));
                } else if is_documentation_path(path) {
                    changes.extend(classifier.on_file_created(path));
                }
            }
            changes
        }
        EventKind::Remove(_) => {
            let mut changes = Vec::new();
            for path in &event.paths {
                if is_documentation_path(path) {
                    changes.extend(classifier.on_file_deleted(path));
                } else {
                    changes.extend(classifier.on_directory_deleted(path));
                }
            }
            changes
        }
        // Some platforms report a rename as one event carrying both paths.
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            let mut changes = Vec::new();
            if let (Some(from), Some(to)) = (event.paths.first(), event.paths.get(1)) {
                if to.is_dir() {
                    changes.extend(classifier.expand_directory_rename(from, to));
                } else if is_documentation_path(to) {
                    changes.extend(classifier.on_file_deleted(from));
                    changes.extend(classifier.on_file_created(to));
                }
            }
            changes
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            let mut changes = Vec::new();
            for path in &event.paths {
                if is_documentation_path(path) {
                    changes.extend(classifier.on_file_deleted(path));
                } else {
                    changes.extend(classifier.on_directory_deleted(path));
                }
            }
            changes
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            let mut changes = Vec::new();
            for path in &event.paths {
                if path.is_dir() {
                    changes.extend(classifier.on_directory_created(path));
                } else if is_documentation_path(path) {
                    changes.extend(classifier.on_file_created(path));
                }
            }
            changes
        }
        _ => {
            debug!(kind = ?event.kind, "ignoring filesystem event");
            Vec::new()
        }
    }
}

fn run_update(service: &DocService, change: &FileChangeEvent) {
    info!(
        kind = ?change.kind,
        old = %change.old_path.display(),
        new = %change.new_path.display(),
        "detected file change"
    );
    let result = service.apply_event(change, &mut LogProgress);
    for line in result.summary().lines() {
        info!("{line}");
    }
}

fn is_documentation_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some(ext) if ["md", "mdx", "jsx"].iter().any(|doc| ext.eq_ignore_ascii_case(doc))
    )
}
