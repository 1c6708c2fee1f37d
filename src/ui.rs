//! Interactive list of markers.
//!
//! Keys: `↑`/`k` and `↓`/`j` move, `Enter` opens the selected marker,
//! `r` rescans, `q`, `Esc` or `Ctrl-C` quit.

use std::io;
use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use console::{Key, Term};

use crate::collect::{changed_markers, Collected};
use crate::config::Settings;
use crate::git::Repo;
use crate::marker::{MarkerEntry, Markers};
use crate::style::{format_entry, truncate, NO_ENTRIES};

const TITLE: &str = " TODOs ";
const LOADING: &str = "Loading todos...";
const HELP: &str = "↑/↓ move  enter open  r refresh  q quit";
/// Title, help and status lines around the list.
const CHROME_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Up,
  Down,
  Open,
  Refresh,
  Quit,
  Ignore
}

impl From<&Key> for Action {
  fn from(key: &Key) -> Self {
    match key {
      Key::ArrowUp | Key::Char('k') => Action::Up,
      Key::ArrowDown | Key::Char('j') => Action::Down,
      Key::Enter => Action::Open,
      Key::Char('r') | Key::Char('R') => Action::Refresh,
      Key::Escape | Key::Char('q') | Key::Char('Q') => Action::Quit,
      _ => Action::Ignore
    }
  }
}

/// Entries plus the selection and scroll position over them.
#[derive(Debug, Default)]
pub struct ListView {
  entries:  Vec<MarkerEntry>,
  selected: usize,
  offset:   usize
}

impl ListView {
  pub fn new(entries: Vec<MarkerEntry>) -> Self {
    Self { entries, selected: 0, offset: 0 }
  }

  /// Swaps in a fresh scan, keeping the selection where it was if still in range.
  pub fn replace(&mut self, entries: Vec<MarkerEntry>) {
    self.entries = entries;
    self.selected = self.selected.min(self.entries.len().saturating_sub(1));
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn get(&self, index: usize) -> Option<&MarkerEntry> {
    self.entries.get(index)
  }

  pub fn selected_entry(&self) -> Option<&MarkerEntry> {
    self.get(self.selected)
  }

  pub fn up(&mut self) {
    self.selected = self.selected.saturating_sub(1);
  }

  pub fn down(&mut self) {
    if self.selected + 1 < self.entries.len() {
      self.selected += 1;
    }
  }

  /// Moves the window so the selection is within `height` rows.
  pub fn scroll(&mut self, height: usize) {
    let height = height.max(1);
    if self.selected < self.offset {
      self.offset = self.selected;
    } else if self.selected >= self.offset + height {
      self.offset = self.selected + 1 - height;
    }
  }

  /// The rows to draw, at most `height` of them, each cut to `width` columns.
  pub fn rows(&mut self, height: usize, width: usize, markers: &Markers) -> Vec<String> {
    if self.entries.is_empty() {
      return vec![truncate(NO_ENTRIES, width)];
    }

    self.scroll(height);
    self
      .entries
      .iter()
      .enumerate()
      .skip(self.offset)
      .take(height.max(1))
      .map(|(index, entry)| {
        let prefix = if index == self.selected { "> " } else { "  " };
        let location = format!("{}:{} - ", crate::style::file_name(&entry.file), entry.line);
        let room = width.saturating_sub(prefix.len() + location.chars().count());
        let shown = MarkerEntry::new(entry.file.as_str(), entry.line, truncate(&entry.content, room));
        let row = format!("{prefix}{}", format_entry(&shown, markers));
        if index == self.selected {
          row.bold().to_string()
        } else {
          row
        }
      })
      .collect()
  }
}

fn status_line(collected: &Collected) -> Option<String> {
  let first = collected.failures.first()?;
  Some(match collected.failures.len() {
    1 => first.to_string(),
    n => format!("{first} (and {} more)", n - 1)
  })
}

struct Screen<'a> {
  term:     &'a Term,
  repo:     &'a Repo,
  settings: &'a Settings,
  workdir:  &'a Path,
  view:     ListView,
  status:   Option<String>
}

impl Screen<'_> {
  fn refresh(&mut self) -> Result<()> {
    self.term.clear_screen()?;
    self.term.write_line(LOADING)?;

    let collected = changed_markers(self.repo, &self.settings.markers, self.settings.base);
    self.status = status_line(&collected);
    self.view.replace(collected.entries);
    Ok(())
  }

  fn draw(&mut self) -> Result<()> {
    let (rows, cols) = self.term.size();
    let height = (rows as usize).saturating_sub(CHROME_ROWS);
    let width = cols as usize;

    self.term.clear_screen()?;
    self.term.write_line(&TITLE.bold().to_string())?;
    for row in self.view.rows(height, width, &self.settings.markers) {
      self.term.write_line(&row)?;
    }
    self.term.write_line(&truncate(HELP, width).dimmed().to_string())?;
    if let Some(status) = &self.status {
      self.term.write_line(&truncate(status, width).yellow().to_string())?;
    }
    Ok(())
  }

  /// Rescans first, then opens whatever sits at the selected position now.
  fn open_selected(&mut self) -> Result<()> {
    let index = self.view.selected();
    self.refresh()?;

    if let Some(entry) = self.view.get(index) {
      if let Err(err) = self.settings.editor.open(entry, self.workdir) {
        log::error!("Error opening file: {err}");
        self.status = Some(err.to_string());
      }
    }
    Ok(())
  }

  fn event_loop(&mut self) -> Result<()> {
    self.refresh()?;

    loop {
      self.draw()?;

      let key = match self.term.read_key() {
        Ok(key) => key,
        // Ctrl-C in raw mode
        Err(err) if err.kind() == io::ErrorKind::Interrupted => return Ok(()),
        Err(err) => return Err(err.into())
      };

      match Action::from(&key) {
        Action::Up => self.view.up(),
        Action::Down => self.view.down(),
        Action::Open => self.open_selected()?,
        Action::Refresh => self.refresh()?,
        Action::Quit => return Ok(()),
        Action::Ignore => {}
      }
    }
  }
}

/// Runs the interactive list until the user quits.
pub fn run(repo: &Repo, settings: &Settings) -> Result<()> {
  let term = Term::stdout();
  let workdir = repo.workdir()?;

  let mut screen = Screen { term: &term, repo, settings, workdir, view: ListView::default(), status: None };

  term.hide_cursor()?;
  let result = screen.event_loop();
  term.show_cursor()?;
  term.clear_screen()?;
  result
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entries(n: usize) -> Vec<MarkerEntry> {
    (1..=n).map(|i| MarkerEntry::new(format!("src/f{i}.rs"), i, format!("// TODO: {i}"))).collect()
  }

  #[test]
  fn test_key_bindings() {
    assert_eq!(Action::from(&Key::ArrowUp), Action::Up);
    assert_eq!(Action::from(&Key::Char('j')), Action::Down);
    assert_eq!(Action::from(&Key::Enter), Action::Open);
    assert_eq!(Action::from(&Key::Char('R')), Action::Refresh);
    assert_eq!(Action::from(&Key::Escape), Action::Quit);
    assert_eq!(Action::from(&Key::Char('q')), Action::Quit);
    assert_eq!(Action::from(&Key::Char('x')), Action::Ignore);
  }

  #[test]
  fn test_selection_stays_in_bounds() {
    let mut view = ListView::new(entries(2));
    view.up();
    assert_eq!(view.selected(), 0);
    view.down();
    view.down();
    assert_eq!(view.selected(), 1);
    assert_eq!(view.selected_entry().map(|e| e.line), Some(2));

    view.replace(entries(1));
    assert_eq!(view.selected(), 0);

    view.replace(Vec::new());
    assert_eq!(view.selected(), 0);
    assert!(view.selected_entry().is_none());
  }

  #[test]
  fn test_scrolls_to_selection() {
    colored::control::set_override(false);
    let mut view = ListView::new(entries(10));
    for _ in 0..5 {
      view.down();
    }

    let rows = view.rows(3, 80, &Markers::default());
    assert_eq!(rows, vec!["  f4.rs:4 - // TODO: 4", "  f5.rs:5 - // TODO: 5", "> f6.rs:6 - // TODO: 6"]);

    view.up();
    view.up();
    view.up();
    let rows = view.rows(3, 80, &Markers::default());
    assert_eq!(rows[0], "> f3.rs:3 - // TODO: 3");
  }

  #[test]
  fn test_rows_are_cut_to_width() {
    colored::control::set_override(false);
    let mut view = ListView::new(vec![MarkerEntry::new("a.rs", 1, "// TODO: a rather long note")]);
    let rows = view.rows(5, 20, &Markers::default());
    assert_eq!(rows, vec!["> a.rs:1 - // TODO:…"]);
  }

  #[test]
  fn test_empty_list() {
    let mut view = ListView::default();
    assert_eq!(view.rows(5, 80, &Markers::default()), vec![NO_ENTRIES.to_string()]);
  }

  #[test]
  fn test_status_line() {
    use crate::error::ScanFailure;

    let read = |name: &str| ScanFailure::Read {
      path:   name.into(),
      source: io::Error::new(io::ErrorKind::NotFound, "gone")
    };

    assert_eq!(status_line(&Collected::default()), None);

    let collected = Collected { entries: Vec::new(), failures: vec![read("a"), read("b")] };
    assert_eq!(status_line(&collected).as_deref(), Some("Could not read a: gone (and 1 more)"));
  }
}
