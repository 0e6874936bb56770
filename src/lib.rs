//! mintsync: reference consistency for Mintlify documentation trees
//!
//! This crate keeps a Mintlify documentation project self-consistent when
//! markdown/MDX files are renamed or moved, rewriting the three surfaces
//! that reference a page by path:
//!
//! - **Internal links**: `[text](/path)` markdown links and `href`/`to`
//!   attribute links in MDX components
//! - **Import statements**: `import Snippet from '/snippets/...'`
//! - **Navigation**: string page entries in `docs.json` / `mint.json`
//!
//! # Architecture
//!
//! - [`resolver::PathResolver`] converts between the path spaces involved
//!   (absolute, root-relative, internal link, import path) and scans the
//!   project for documentation files.
//! - [`classifier::ChangeClassifier`] pairs raw create/delete events into
//!   rename/move events within a bounded detection window.
//! - [`links`], [`imports`] and [`navigation`] each rewrite one reference
//!   surface, reporting counts and per-file errors in a
//!   [`report::UpdateResult`].
//! - [`service::DocService`] sequences the updaters and merges results.
//! - [`watch`] bridges filesystem notifications into the classifier.

pub mod classifier;
pub mod config;
pub mod imports;
pub mod links;
pub mod navigation;
pub mod report;
pub mod resolver;
pub mod service;
pub mod watch;

#[cfg(test)]
pub mod test_utils;
