//! Shared test utilities for mintsync.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary documentation directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the docs subdirectory
///
/// # Why this helper exists
///
/// The project scanner uses WalkDir which filters out hidden directories
/// (those starting with `.`). On some systems, temp directories are created
/// under paths like `/tmp/.tmpXXXXX`. By creating a non-hidden subdirectory
/// called "docs", we ensure the scanner can properly find the test files.
///
/// # Example
///
/// ```ignore
/// use crate::test_utils::create_test_docs_dir;
///
/// let (_temp_dir, docs_dir) = create_test_docs_dir();
/// std::fs::write(docs_dir.join("test.md"), "# Test").unwrap();
/// ```
pub fn create_test_docs_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    // Create a non-hidden subdirectory since WalkDir filters out .* dirs
    let docs_dir = temp_dir.path().join("docs");
    fs::create_dir(&docs_dir).expect("Failed to create docs subdirectory");
    (temp_dir, docs_dir)
}
