//! Marker tokens and the entries produced when a line carries one.

use std::fmt;

/// Tokens recognized when nothing else is configured.
pub const DEFAULT_MARKERS: [&str; 2] = ["TODO:", "FIXME:"];

/// A line that carries a marker, positioned in the current version of its file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerEntry {
  pub file:    String,
  pub line:    usize,
  pub content: String
}

impl MarkerEntry {
  pub fn new(file: impl Into<String>, line: usize, content: impl Into<String>) -> Self {
    Self { file: file.into(), line, content: content.into() }
  }
}

impl fmt::Display for MarkerEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{} - {}", self.file, self.line, self.content)
  }
}

/// The set of substrings that flag a line.
///
/// Matching is case-sensitive substring containment. The token can sit anywhere
/// in the line, inside an identifier or outside of any comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
  tokens: Vec<String>
}

impl Default for Markers {
  fn default() -> Self {
    Self { tokens: DEFAULT_MARKERS.iter().map(|t| t.to_string()).collect() }
  }
}

impl Markers {
  /// Builds a marker set, dropping blank tokens. Returns `None` if nothing is left.
  pub fn new<I, S>(tokens: I) -> Option<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>
  {
    let tokens: Vec<String> = tokens
      .into_iter()
      .map(|t| t.as_ref().trim().to_string())
      .filter(|t| !t.is_empty())
      .collect();

    if tokens.is_empty() {
      None
    } else {
      Some(Self { tokens })
    }
  }

  /// Parses a comma-separated list such as `TODO:,FIXME:,HACK:`.
  pub fn parse(list: &str) -> Option<Self> {
    Self::new(list.split(','))
  }

  pub fn tokens(&self) -> &[String] {
    &self.tokens
  }

  pub fn matches(&self, text: &str) -> bool {
    self.tokens.iter().any(|token| text.contains(token.as_str()))
  }

  /// Index of the first configured token found in `text`.
  pub fn kind(&self, text: &str) -> Option<usize> {
    self.tokens.iter().position(|token| text.contains(token.as_str()))
  }
}

impl fmt::Display for Markers {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.tokens.join(","))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_markers() {
    let markers = Markers::default();
    assert!(markers.matches("// TODO: fix this"));
    assert!(markers.matches("# FIXME: oops"));
    assert!(!markers.matches("// todo: lowercase is not a marker"));
    assert!(!markers.matches("TODO without colon"));
  }

  #[test]
  fn test_substring_match_is_unanchored() {
    let markers = Markers::default();
    assert!(markers.matches("let nottodo = \"xTODO:y\";"));
  }

  #[test]
  fn test_parse_list() {
    let markers = Markers::parse(" TODO: , HACK: ,,").unwrap();
    assert_eq!(markers.tokens(), &["TODO:".to_string(), "HACK:".to_string()]);
    assert_eq!(markers.to_string(), "TODO:,HACK:");
    assert!(Markers::parse(" , ").is_none());
  }

  #[test]
  fn test_kind() {
    let markers = Markers::default();
    assert_eq!(markers.kind("// FIXME: later"), Some(1));
    assert_eq!(markers.kind("// FIXME: TODO: both"), Some(0));
    assert_eq!(markers.kind("nothing here"), None);
  }

  #[test]
  fn test_entry_display() {
    let entry = MarkerEntry::new("src/lib.rs", 4, "// TODO: split");
    assert_eq!(entry.to_string(), "src/lib.rs:4 - // TODO: split");
  }
}
