//! Whole-file scanning for files git does not track yet.

use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::diff::Utf8String;
use crate::error::ScanFailure;
use crate::marker::{MarkerEntry, Markers};

/// Bytes inspected when deciding whether a file is binary, same as git.
const BINARY_PROBE_LEN: usize = 8000;

/// Collects every line of `content` that carries a marker, with 1-based line numbers.
pub fn scan_content(file: &str, content: &str, markers: &Markers) -> Vec<MarkerEntry> {
  content
    .lines()
    .enumerate()
    .filter_map(|(idx, line)| {
      let line = line.trim();
      markers.matches(line).then(|| MarkerEntry::new(file, idx + 1, line))
    })
    .collect()
}

fn is_binary(bytes: &[u8]) -> bool {
  bytes.iter().take(BINARY_PROBE_LEN).any(|b| *b == 0)
}

/// Reads `file` below `root` and scans it.
pub fn scan_file(root: &Path, file: &str, markers: &Markers) -> Result<Vec<MarkerEntry>, ScanFailure> {
  let path = root.join(file);
  let bytes = fs::read(&path).map_err(|source| ScanFailure::Read { path, source })?;

  if is_binary(&bytes) {
    log::debug!("[untracked] Skipping binary file {file}");
    return Ok(Vec::new());
  }

  Ok(scan_content(file, &bytes.to_utf8(), markers))
}

/// Scans untracked files in parallel.
///
/// Entries keep the order of `files`. A file that cannot be read is logged,
/// reported in the returned failures and contributes nothing.
pub fn scan_untracked(root: &Path, files: &[String], markers: &Markers) -> (Vec<MarkerEntry>, Vec<ScanFailure>) {
  let results: Vec<_> = files
    .par_iter()
    .map(|file| scan_file(root, file, markers))
    .collect();

  let mut entries = Vec::new();
  let mut failures = Vec::new();

  for result in results {
    match result {
      Ok(found) => entries.extend(found),
      Err(failure) => {
        log::warn!("Error reading untracked file: {failure}");
        failures.push(failure);
      }
    }
  }

  log::debug!("Found {} markers in {} untracked files", entries.len(), files.len());
  (entries, failures)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_scan_content() {
    let entries = scan_content("y.txt", "a\nb\n// FIXME: oops\n", &Markers::default());
    assert_eq!(entries, vec![MarkerEntry::new("y.txt", 3, "// FIXME: oops")]);
  }

  #[test]
  fn test_scan_content_is_ascending_and_trimmed() {
    let content = "    // TODO: one\nplain\n\tFIXME: two   \r\n\n# TODO: three";
    let lines: Vec<(usize, String)> = scan_content("f", content, &Markers::default())
      .into_iter()
      .map(|e| (e.line, e.content))
      .collect();
    assert_eq!(lines, vec![
      (1, "// TODO: one".to_string()),
      (3, "FIXME: two".to_string()),
      (5, "# TODO: three".to_string()),
    ]);
  }

  #[test]
  fn test_scan_untracked_keeps_file_order() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("b.rs"), "// TODO: b\n").unwrap();
    std::fs::write(dir.path().join("nested/a.rs"), "x\n// FIXME: a\n").unwrap();

    let files = vec!["b.rs".to_string(), "nested/a.rs".to_string()];
    let (entries, failures) = scan_untracked(dir.path(), &files, &Markers::default());

    assert!(failures.is_empty());
    assert_eq!(entries, vec![
      MarkerEntry::new("b.rs", 1, "// TODO: b"),
      MarkerEntry::new("nested/a.rs", 2, "// FIXME: a"),
    ]);
  }

  #[test]
  fn test_unreadable_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("present.txt"), "// TODO: here\n").unwrap();

    let files = vec!["missing.txt".to_string(), "present.txt".to_string()];
    let (entries, failures) = scan_untracked(dir.path(), &files, &Markers::default());

    assert_eq!(entries, vec![MarkerEntry::new("present.txt", 1, "// TODO: here")]);
    assert_eq!(failures.len(), 1);
    assert!(matches!(&failures[0], ScanFailure::Read { path, .. } if path.ends_with("missing.txt")));
  }

  #[test]
  fn test_binary_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("blob.bin"), b"\0\x01TODO: not text\n").unwrap();

    let entries = scan_file(dir.path(), "blob.bin", &Markers::default()).unwrap();
    assert!(entries.is_empty());
  }

  #[test]
  fn test_invalid_utf8_is_scanned_lossily() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("latin1.txt"), b"caf\xe9\n// TODO: accents\n").unwrap();

    let entries = scan_file(dir.path(), "latin1.txt", &Markers::default()).unwrap();
    assert_eq!(entries, vec![MarkerEntry::new("latin1.txt", 2, "// TODO: accents")]);
  }
}
