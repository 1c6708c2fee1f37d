//! Gathers markers from both the working tree diff and untracked files.

use std::path::{Path, PathBuf};

use log::warn;

use crate::diff::scan_diff;
use crate::error::ScanFailure;
use crate::git::{DiffBase, Repo};
use crate::marker::{MarkerEntry, Markers};
use crate::profile;
use crate::scan::scan_untracked;

/// The outcome of one scan: everything found, plus what could not be looked at.
#[derive(Debug, Default)]
pub struct Collected {
  pub entries:  Vec<MarkerEntry>,
  pub failures: Vec<ScanFailure>
}

impl Collected {
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn get(&self, index: usize) -> Option<&MarkerEntry> {
    self.entries.get(index)
  }
}

/// Diff entries followed by untracked entries, nothing reordered or merged.
pub fn aggregate(diff_entries: Vec<MarkerEntry>, untracked_entries: Vec<MarkerEntry>) -> Vec<MarkerEntry> {
  let mut entries = diff_entries;
  entries.extend(untracked_entries);
  entries
}

/// Scans already gathered inputs, running the diff and file scans side by side.
pub fn scan(diff: &str, root: &Path, untracked: &[String], markers: &Markers) -> Collected {
  let (diff_entries, (untracked_entries, failures)) =
    rayon::join(|| scan_diff(diff, markers), || scan_untracked(root, untracked, markers));

  Collected { entries: aggregate(diff_entries, untracked_entries), failures }
}

/// Finds the markers touched by the uncommitted changes of `repo`.
///
/// Failing to diff or to list untracked files is reported in
/// [`Collected::failures`]; the other half of the scan still runs.
pub fn changed_markers(repo: &Repo, markers: &Markers, base: DiffBase) -> Collected {
  profile!("Collect changed markers");

  let mut failures = Vec::new();

  let diff = repo.diff_text(base).unwrap_or_else(|err| {
    warn!("Error running git diff: {err}");
    failures.push(ScanFailure::Diff(err));
    String::new()
  });

  let listed = repo
    .workdir()
    .map(Path::to_path_buf)
    .and_then(|root| Ok((root, repo.untracked_files()?)));

  let (root, untracked) = listed.unwrap_or_else(|err| {
    warn!("Error listing untracked files: {err}");
    failures.push(ScanFailure::Untracked(err));
    (PathBuf::new(), Vec::new())
  });

  let mut collected = scan(&diff, &root, &untracked, markers);
  failures.append(&mut collected.failures);
  collected.failures = failures;
  collected
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_aggregate_keeps_order() {
    let a = vec![MarkerEntry::new("z", 9, "TODO: z"), MarkerEntry::new("a", 1, "TODO: a")];
    let b = vec![MarkerEntry::new("m", 5, "FIXME: m")];

    let all = aggregate(a.clone(), b.clone());
    assert_eq!(all, [a, b].concat());
  }

  #[test]
  fn test_aggregate_keeps_duplicates() {
    let entry = MarkerEntry::new("x", 1, "TODO: x");
    assert_eq!(aggregate(vec![entry.clone()], vec![entry.clone()]).len(), 2);
    assert!(aggregate(Vec::new(), Vec::new()).is_empty());
  }

  #[test]
  fn test_scan_puts_diff_entries_first() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("y.txt"), "a\nb\n// FIXME: oops\n").unwrap();

    let diff = "diff --git a/x.txt b/x.txt\n@@ -1,0 +2,1 @@\n+// TODO: fix this\n";
    let collected = scan(diff, dir.path(), &["y.txt".to_string()], &Markers::default());

    assert!(collected.failures.is_empty());
    assert_eq!(collected.entries, vec![
      MarkerEntry::new("x.txt", 2, "// TODO: fix this"),
      MarkerEntry::new("y.txt", 3, "// FIXME: oops"),
    ]);
    assert_eq!(collected.len(), 2);
    assert_eq!(collected.get(1).map(|e| e.line), Some(3));
  }
}
