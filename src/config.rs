use std::io::Write;
use std::path::{Path, PathBuf};
use std::fs::File;

use serde::{Deserialize, Serialize};
use config::{Config, FileFormat};
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use console::Emoji;

use crate::editor::Editor;
use crate::git::DiffBase;
use crate::marker::Markers;

// Constants
const DEFAULT_MARKERS: &str = "TODO:,FIXME:";
const DEFAULT_EDITOR: &str = "cursor -g {file}:{line}";
const DEFAULT_BASE: &str = "index";
const ENV_PREFIX: &str = "GIT_TODOS";

#[derive(Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct App {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub markers: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub editor:  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base:    Option<String>
}

/// The configuration after validation, ready to drive a scan.
#[derive(Debug, Clone)]
pub struct Settings {
  pub markers: Markers,
  pub editor:  Editor,
  pub base:    DiffBase
}

#[derive(Debug)]
pub struct ConfigPaths {
  pub dir:  PathBuf,
  pub file: PathBuf
}

lazy_static! {
  pub static ref PATHS: ConfigPaths = ConfigPaths::new();
}

impl ConfigPaths {
  fn new() -> Self {
    let dir = home::home_dir()
      .map(|home| home.join(".config/git-todos"))
      .unwrap_or_else(|| PathBuf::from(".git-todos"));
    let file = dir.join("config.ini");
    Self { dir, file }
  }

  fn ensure_exists(&self) -> Result<()> {
    if !self.dir.exists() {
      std::fs::create_dir_all(&self.dir).with_context(|| format!("Failed to create config directory at {:?}", self.dir))?;
    }
    Ok(())
  }
}

impl App {
  pub fn new() -> Result<Self> {
    Self::load(&PATHS.file)
  }

  /// Reads `file` (if present) and the `GIT_TODOS_*` environment over the defaults.
  pub fn load(file: &Path) -> Result<Self> {
    let config = Config::builder()
      .set_default("markers", DEFAULT_MARKERS)?
      .set_default("editor", DEFAULT_EDITOR)?
      .set_default("base", DEFAULT_BASE)?
      .add_source(config::File::new(file.to_string_lossy().as_ref(), FileFormat::Ini).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?;

    config
      .try_deserialize()
      .context("Failed to deserialize existing config. Please run `git todos config reset` and try again")
  }

  pub fn settings(&self) -> Result<Settings> {
    let markers = self.markers.as_deref().unwrap_or(DEFAULT_MARKERS);
    let editor = self.editor.as_deref().unwrap_or(DEFAULT_EDITOR);
    let base = self.base.as_deref().unwrap_or(DEFAULT_BASE);

    Ok(Settings {
      markers: Markers::parse(markers).with_context(|| format!("No markers configured in '{markers}'"))?,
      editor:  Editor::parse(editor).context("Invalid editor command")?,
      base:    base.parse().context("Invalid diff base")?
    })
  }

  pub fn save(&self) -> Result<()> {
    PATHS.ensure_exists()?;
    self.save_to(&PATHS.file)
  }

  pub fn save_to(&self, path: &Path) -> Result<()> {
    let contents = serde_ini::to_string(&self).context(format!("Failed to serialize config: {:?}", self))?;
    let mut file = File::create(path).with_context(|| format!("Failed to create config file at {:?}", path))?;
    file
      .write_all(contents.as_bytes())
      .context("Failed to write config file")
  }

  pub fn update_markers(&mut self, value: String) -> Result<()> {
    if Markers::parse(&value).is_none() {
      bail!("At least one marker is required, e.g. 'TODO:,FIXME:'");
    }
    self.markers = Some(value);
    self.save_with_message("markers")
  }

  pub fn update_editor(&mut self, value: String) -> Result<()> {
    Editor::parse(&value)?;
    self.editor = Some(value);
    self.save_with_message("editor")
  }

  pub fn update_base(&mut self, value: String) -> Result<()> {
    let base: DiffBase = value.parse()?;
    self.base = Some(base.to_string());
    self.save_with_message("base")
  }

  /// Sets one option by its name.
  pub fn set(&mut self, key: &str, value: String) -> Result<()> {
    match key {
      "markers" => self.update_markers(value),
      "editor" => self.update_editor(value),
      "base" => self.update_base(value),
      other => bail!("Unknown config option '{other}', expected one of: markers, editor, base")
    }
  }

  /// Forgets every saved option, without reading the current file.
  pub fn reset() -> Result<()> {
    PATHS.ensure_exists()?;
    Self::reset_at(&PATHS.file)?;
    println!("{} Configuration reset to defaults", Emoji("✨", ":-)"));
    Ok(())
  }

  pub fn reset_at(path: &Path) -> Result<()> {
    App::default().save_to(path)
  }

  fn save_with_message(&self, option: &str) -> Result<()> {
    println!("{} Configuration option {} updated!", Emoji("✨", ":-)"), option);
    self.save()
  }
}
