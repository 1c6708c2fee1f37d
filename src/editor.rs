//! Launching the user's editor at a marker.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::marker::MarkerEntry;

const FILE_PLACEHOLDER: &str = "{file}";
const LINE_PLACEHOLDER: &str = "{line}";

#[derive(Error, Debug)]
pub enum EditorError {
  #[error("Editor command is empty")]
  EmptyCommand,

  #[error("Failed to launch {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source:  std::io::Error
  }
}

/// An editor command template such as `code -g {file}:{line}` or `vim +{line} {file}`.
///
/// Without placeholders, `<file>:<line>` is passed as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
  program: String,
  args:    Vec<String>
}

impl Editor {
  pub fn parse(template: &str) -> Result<Self, EditorError> {
    let mut words = template.split_whitespace().map(str::to_string);
    let program = words.next().ok_or(EditorError::EmptyCommand)?;
    Ok(Self { program, args: words.collect() })
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  /// Arguments for opening `file` at `line`.
  pub fn args_for(&self, file: &str, line: usize) -> Vec<String> {
    let templated = self
      .args
      .iter()
      .any(|arg| arg.contains(FILE_PLACEHOLDER) || arg.contains(LINE_PLACEHOLDER));

    if !templated {
      let mut args = self.args.clone();
      args.push(format!("{file}:{line}"));
      return args;
    }

    self
      .args
      .iter()
      .map(|arg| arg.replace(FILE_PLACEHOLDER, file).replace(LINE_PLACEHOLDER, &line.to_string()))
      .collect()
  }

  fn command(&self, entry: &MarkerEntry, workdir: &Path) -> Command {
    let mut command = Command::new(&self.program);
    command.args(self.args_for(&entry.file, entry.line)).current_dir(workdir);
    command
  }

  fn spawn_error(&self) -> impl FnOnce(std::io::Error) -> EditorError + '_ {
    move |source| EditorError::Spawn { program: self.program.clone(), source }
  }

  /// Starts the editor in the background, detached from the terminal.
  ///
  /// The returned thread waits for the editor to exit and yields its status.
  pub fn open(&self, entry: &MarkerEntry, workdir: &Path) -> Result<JoinHandle<Option<ExitStatus>>, EditorError> {
    log::debug!("Opening {entry} with {}", self.program);
    let mut child = self
      .command(entry, workdir)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .spawn()
      .map_err(self.spawn_error())?;

    let program = self.program.clone();
    Ok(thread::spawn(move || match child.wait() {
      Ok(status) => Some(status),
      Err(err) => {
        log::warn!("Error waiting for {program}: {err}");
        None
      }
    }))
  }

  /// Runs the editor in the foreground and waits for it to exit.
  pub fn run(&self, entry: &MarkerEntry, workdir: &Path) -> Result<ExitStatus, EditorError> {
    log::debug!("Running {} for {entry}", self.program);
    self.command(entry, workdir).status().map_err(self.spawn_error())
  }
}
