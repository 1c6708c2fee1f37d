//! Error handling utilities for the git-todos CLI tool.
//!
//! A scan never aborts halfway: whatever goes wrong while gathering inputs is
//! recorded as a [`ScanFailure`] next to the entries that could still be found.

use std::path::PathBuf;

use git2::{ErrorClass, ErrorCode};
use thiserror::Error;

use crate::git::GitError;

/// A non-fatal problem hit while collecting markers.
#[derive(Error, Debug)]
pub enum ScanFailure {
  #[error("Could not diff the working tree: {0}")]
  Diff(#[source] GitError),

  #[error("Could not list untracked files: {0}")]
  Untracked(#[source] GitError),

  #[error("Could not read {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: std::io::Error
  }
}

/// Checks if an error was caused by running outside of a git repository.
///
/// # Examples
///
/// ```
/// use git2::{ErrorClass, ErrorCode};
/// use todos::error::is_missing_repository;
///
/// let git = git2::Error::new(ErrorCode::NotFound, ErrorClass::Repository, "could not find repository");
/// assert!(is_missing_repository(&anyhow::Error::new(git)));
/// ```
pub fn is_missing_repository(error: &anyhow::Error) -> bool {
  error.chain().any(|cause| {
    cause
      .downcast_ref::<git2::Error>()
      .is_some_and(|git| git.code() == ErrorCode::NotFound && git.class() == ErrorClass::Repository)
  })
}
