//! Zero-context unified diff scanning.

use std::borrow::Cow;

use crate::diff::Utf8String;
use crate::marker::{MarkerEntry, Markers};

/// Old-side prefixes on the `diff --git` line and the new-side prefixes they
/// pair with. `a/` and `b/` are the defaults, the rest appear with
/// `diff.mnemonicPrefix=true`.
const PREFIX_PAIRS: [(&str, &[&str]); 4] = [("a/", &["b/"]), ("i/", &["w/"]), ("c/", &["i/", "w/"]), ("o/", &["w/"])];

/// What a single physical line of a diff is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine<'a> {
  /// `diff --git a/<old> b/<new>`, carrying the new path, unquoted.
  FileHeader(Cow<'a, str>),
  /// `@@ -a,b +c,d @@`, carrying the new-file start `c`.
  HunkHeader(usize),
  /// A line starting with `@@` that could not be parsed.
  MalformedHunk,
  /// Content of a `+` line, without the `+`.
  Added(&'a str),
  /// `-` lines, including the `---` file marker.
  Removed,
  /// `\ No newline at end of file`.
  NoNewline,
  /// Anything else. Occupies a position in the new file.
  Context
}

fn new_prefixes_for(old: &str) -> Option<&'static [&'static str]> {
  PREFIX_PAIRS
    .iter()
    .find(|(prefix, _)| old.starts_with(prefix))
    .map(|(_, new)| *new)
}

fn strip_new_prefix<'a>(path: Cow<'a, str>, prefixes: &[&str]) -> Option<Cow<'a, str>> {
  let len = prefixes.iter().find(|prefix| path.starts_with(**prefix))?.len();
  let stripped = match path {
    Cow::Borrowed(path) => Cow::Borrowed(&path[len..]),
    Cow::Owned(path) => Cow::Owned(path[len..].to_string())
  };

  if stripped.is_empty() {
    None
  } else {
    Some(stripped)
  }
}

/// Length of the C-quoted string at the start of `s`, closing quote included.
fn quoted_len(s: &str) -> Option<usize> {
  let bytes = s.as_bytes();
  if bytes.first() != Some(&b'"') {
    return None;
  }

  let mut i = 1;
  while i < bytes.len() {
    match bytes[i] {
      b'\\' => i += 2,
      b'"' => return Some(i + 1),
      _ => i += 1
    }
  }
  None
}

/// Decodes a path git wrapped in quotes, e.g. `"caf\303\251.rs"`.
fn unquote(quoted: &str) -> Option<String> {
  let inner = quoted.strip_prefix('"')?.strip_suffix('"')?.as_bytes();
  let mut out = Vec::with_capacity(inner.len());
  let mut i = 0;

  while i < inner.len() {
    if inner[i] != b'\\' {
      out.push(inner[i]);
      i += 1;
      continue;
    }

    let escape = *inner.get(i + 1)?;
    i += 2;
    let byte = match escape {
      b'0'..=b'7' => {
        let mut value = u32::from(escape - b'0');
        for _ in 0..2 {
          match inner.get(i) {
            Some(digit @ b'0'..=b'7') => {
              value = value * 8 + u32::from(digit - b'0');
              i += 1;
            },
            _ => break
          }
        }
        u8::try_from(value).ok()?
      },
      b'n' => b'\n',
      b't' => b'\t',
      b'r' => b'\r',
      b'a' => 0x07,
      b'b' => 0x08,
      b'f' => 0x0c,
      b'v' => 0x0b,
      other => other
    };
    out.push(byte);
  }

  Some(out.to_utf8())
}

/// Header where at least one side is quoted: `diff --git "a/<old>" "b/<new>"`.
fn parse_quoted_header(paths: &str) -> Option<Cow<'_, str>> {
  let (old, new) = match quoted_len(paths) {
    Some(end) => (&paths[1..end], paths[end..].strip_prefix(' ')?),
    None => {
      let at = paths.rfind(" \"")?;
      (&paths[..at], &paths[at + 1..])
    }
  };

  let prefixes = new_prefixes_for(old)?;
  let new = if new.starts_with('"') {
    Cow::Owned(unquote(new)?)
  } else {
    Cow::Borrowed(new)
  };

  strip_new_prefix(new, prefixes)
}

/// Extracts the new-side path from a `diff --git` line.
fn parse_file_header(line: &str) -> Option<Cow<'_, str>> {
  let paths = line.strip_prefix("diff --git ")?;
  if paths.starts_with('"') || paths.ends_with('"') {
    return parse_quoted_header(paths);
  }

  let prefixes = new_prefixes_for(paths)?;

  // Paths may contain the separator themselves, the new path is after the last one.
  let at = prefixes
    .iter()
    .filter_map(|prefix| paths.rfind(&format!(" {prefix}")))
    .max()?;

  strip_new_prefix(Cow::Borrowed(&paths[at + 1..]), prefixes)
}

/// Extracts the new-file start line from `@@ -<os>[,<oc>] +<ns>[,<nc>] @@`.
fn parse_hunk_header(line: &str) -> Option<usize> {
  let mut parts = line.split_whitespace();
  if parts.next()? != "@@" {
    return None;
  }

  let old = parts.next()?.strip_prefix('-')?;
  let new = parts.next()?.strip_prefix('+')?;
  if parts.next()? != "@@" {
    return None;
  }

  let count = |range: &str| -> Option<usize> {
    let mut numbers = range.splitn(2, ',');
    let start = numbers.next()?.parse::<usize>().ok()?;
    if let Some(len) = numbers.next() {
      len.parse::<usize>().ok()?;
    }
    Some(start)
  };

  count(old)?;
  count(new)
}

/// Classifies one physical line, first matching rule wins.
pub fn classify(line: &str) -> DiffLine<'_> {
  if let Some(path) = parse_file_header(line) {
    return DiffLine::FileHeader(path);
  }

  if line.starts_with("@@") {
    return parse_hunk_header(line).map_or(DiffLine::MalformedHunk, DiffLine::HunkHeader);
  }

  if let Some(added) = line.strip_prefix('+') {
    if !added.starts_with("++") {
      return DiffLine::Added(added);
    }
  }

  if line.starts_with('-') {
    DiffLine::Removed
  } else if line.starts_with('\\') {
    DiffLine::NoNewline
  } else {
    DiffLine::Context
  }
}

/// Walks a diff line by line, tracking which file and which new-file line it is on.
#[derive(Debug)]
pub struct DiffScanner<'m> {
  markers:      &'m Markers,
  current_file: String,
  current_line: usize
}

impl<'m> DiffScanner<'m> {
  pub fn new(markers: &'m Markers) -> Self {
    Self { markers, current_file: String::new(), current_line: 0 }
  }

  pub fn current_file(&self) -> &str {
    &self.current_file
  }

  pub fn current_line(&self) -> usize {
    self.current_line
  }

  /// Applies one classified line to the scanner state.
  ///
  /// Returns an entry when the line is an addition carrying a marker.
  pub fn advance(&mut self, line: DiffLine<'_>) -> Option<MarkerEntry> {
    match line {
      DiffLine::FileHeader(path) => {
        log::debug!("[diff] File: {path}");
        self.current_file = path.into_owned();
        None
      },
      DiffLine::HunkHeader(start) => {
        self.current_line = start;
        None
      },
      DiffLine::Added(text) => {
        let content = text.trim();
        let entry = self
          .markers
          .matches(content)
          .then(|| MarkerEntry::new(self.current_file.as_str(), self.current_line, content));
        self.current_line += 1;
        entry
      },
      DiffLine::MalformedHunk => {
        log::debug!("[diff] Ignoring malformed hunk header in {}", self.current_file);
        None
      },
      DiffLine::Removed | DiffLine::NoNewline => None,
      DiffLine::Context => {
        self.current_line += 1;
        None
      }
    }
  }
}

/// Collects every marker on an added line of a zero-context unified diff.
///
/// Malformed input never fails: unknown lines count as context, which at worst
/// shifts the reported line numbers until the next hunk header.
pub fn scan_diff(diff: &str, markers: &Markers) -> Vec<MarkerEntry> {
  let mut scanner = DiffScanner::new(markers);
  let entries: Vec<MarkerEntry> = diff
    .lines()
    .filter_map(|line| scanner.advance(classify(line)))
    .collect();

  log::debug!("Found {} markers in diff of {} lines", entries.len(), diff.lines().count());
  entries
}
