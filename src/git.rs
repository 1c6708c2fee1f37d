use std::path::Path;
use std::str::FromStr;

use git2::{RepositoryOpenFlags as Flag, *};
use serde::{Deserialize, Serialize};
use log::{debug, warn};
use thiserror::Error;

use crate::diff::Utf8String;
use crate::profile;

#[derive(Error, Debug)]
pub enum GitError {
  #[error("Git error: {0}")]
  Git(#[from] git2::Error),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Repository has no working tree")]
  BareRepository,

  #[error("Unknown diff base '{0}', expected 'index' or 'head'")]
  UnknownBase(String)
}

pub type Result<T, E = GitError> = std::result::Result<T, E>;

/// What the working tree is compared against.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffBase {
  /// Unstaged changes only, like `git diff -U0`.
  #[default]
  Index,
  /// Staged and unstaged changes, like `git diff -U0 HEAD`.
  Head
}

impl FromStr for DiffBase {
  type Err = GitError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "index" => Ok(DiffBase::Index),
      "head" => Ok(DiffBase::Head),
      other => Err(GitError::UnknownBase(other.to_string()))
    }
  }
}

impl std::fmt::Display for DiffBase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DiffBase::Index => write!(f, "index"),
      DiffBase::Head => write!(f, "head")
    }
  }
}

pub struct Repo {
  repo: Repository
}

impl Repo {
  pub fn new() -> Result<Self> {
    Self::new_with_path(".")
  }

  pub fn new_with_path(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Repo {
      repo: Repository::open_ext(path.as_ref(), Flag::empty(), Vec::<&Path>::new())?
    })
  }

  /// Root of the working tree; every reported path is relative to it.
  pub fn workdir(&self) -> Result<&Path> {
    self.repo.workdir().ok_or(GitError::BareRepository)
  }

  /// Renders the working tree changes as a unified diff without context lines.
  pub fn diff_text(&self, base: DiffBase) -> Result<String> {
    profile!("Render working tree diff");

    let mut opts = Repo::diff_options();
    let diff = match base {
      DiffBase::Index => self.repo.diff_index_to_workdir(None, Some(&mut opts))?,
      DiffBase::Head => {
        let tree = self.repo.head().ok().and_then(|head| head.peel_to_tree().ok());
        debug!("Tree: {:?}", tree.as_ref().map(Tree::id));
        self.repo.diff_tree_to_workdir_with_index(tree.as_ref(), Some(&mut opts))?
      }
    };

    debug!("Stats: {:?}", diff.stats().map(|stats| (stats.files_changed(), stats.insertions())));

    let mut patch = Vec::new();
    diff.print(DiffFormat::Patch, |_, _, line| {
      /* Only content lines come without their origin character */
      if matches!(line.origin(), '+' | '-' | ' ') {
        patch.push(line.origin() as u8);
      }
      patch.extend_from_slice(line.content());
      true
    })?;

    Ok(patch.to_utf8())
  }

  /// Lists files that are neither tracked nor ignored, relative to the working tree.
  pub fn untracked_files(&self) -> Result<Vec<String>> {
    profile!("List untracked files");

    let mut opts = StatusOptions::new();
    opts
      .include_untracked(true)
      .recurse_untracked_dirs(true)
      .include_ignored(false)
      .exclude_submodules(true);

    let statuses = self.repo.statuses(Some(&mut opts))?;
    let files: Vec<String> = statuses
      .iter()
      .filter(|entry| entry.status().is_wt_new())
      .filter_map(|entry| match entry.path() {
        Some(path) => Some(path.to_string()),
        None => {
          warn!("[untracked] Skipping path that is not valid UTF-8");
          None
        }
      })
      .collect();

    debug!("[untracked] Found {} files", files.len());
    Ok(files)
  }

  fn diff_options() -> DiffOptions {
    let mut opts = DiffOptions::new();
    opts
      .ignore_submodules(true)
      .include_untracked(false)
      .include_ignored(false)
      .interhunk_lines(0)
      .context_lines(0)
      .minimal(true)
      .indent_heuristic(false);
    opts
  }
}
