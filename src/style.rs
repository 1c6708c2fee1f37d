use std::cmp::Reverse;
use std::path::Path;

use colored::{Color, Colorize};

use crate::marker::{MarkerEntry, Markers};

/// Shown instead of a list when nothing was found.
pub const NO_ENTRIES: &str = "No changed TODOs found.";

/// Colours for the configured tokens, in order.
const PALETTE: [Color; 4] = [Color::Yellow, Color::Red, Color::Magenta, Color::Cyan];

pub fn token_color(kind: usize) -> Color {
  PALETTE[kind % PALETTE.len()]
}

/// File name without its directories, as shown in the list.
pub fn file_name(path: &str) -> &str {
  Path::new(path)
    .file_name()
    .and_then(|name| name.to_str())
    .unwrap_or(path)
}

/// Colours `content` blue with every marker token in its own colour.
pub fn highlight(content: &str, markers: &Markers) -> String {
  let mut out = String::with_capacity(content.len());
  let mut rest = content;

  loop {
    let next = markers
      .tokens()
      .iter()
      .enumerate()
      .filter_map(|(kind, token)| rest.find(token.as_str()).map(|at| (at, kind, token.len())))
      .min_by_key(|(at, _, len)| (*at, Reverse(*len)));

    let Some((at, kind, len)) = next else {
      if !rest.is_empty() {
        out.push_str(&rest.blue().to_string());
      }
      return out;
    };

    if at > 0 {
      out.push_str(&rest[..at].blue().to_string());
    }
    out.push_str(&rest[at..at + len].color(token_color(kind)).to_string());
    rest = &rest[at + len..];
  }
}

/// `<file name>:<line> - <content>`, coloured.
pub fn format_entry(entry: &MarkerEntry, markers: &Markers) -> String {
  format!(
    "{}:{} - {}",
    file_name(&entry.file).green(),
    entry.line.to_string().yellow(),
    highlight(&entry.content, markers)
  )
}

/// Cuts `text` to at most `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
  if text.chars().count() <= width {
    return text.to_string();
  }

  let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
  if width > 0 {
    cut.push('…');
  }
  cut
}
