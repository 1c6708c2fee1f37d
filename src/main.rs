use anyhow::{bail, Context, Result};
use colored::Colorize;
use console::Term;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn, LevelFilter};
use structopt::StructOpt;
use std::time::Duration;
use todos::config::{App, Settings};
use todos::error::is_missing_repository;
use todos::git::{DiffBase, Repo};
use todos::style::{format_entry, NO_ENTRIES};
use todos::{changed_markers, profile, ui, Collected};

#[derive(StructOpt, Debug)]
#[structopt(name = "git-todos", about = "Lists the TODO and FIXME markers added by your uncommitted changes")]
struct Cli {
  #[structopt(long, help = "Compare against HEAD, including staged changes")]
  head: bool,

  #[structopt(short, long, help = "Enables verbose logging")]
  verbose: bool,

  #[structopt(subcommand)]
  cmd: Option<Cmd>
}

#[derive(StructOpt, Debug)]
enum Cmd {
  /// Prints the markers and exits
  List,

  /// Opens the n-th marker of `list` in the editor
  Open { index: usize },

  /// Changes the configuration
  Config {
    #[structopt(subcommand)]
    action: ConfigCmd
  }
}

#[derive(StructOpt, Debug)]
enum ConfigCmd {
  /// Sets one of: markers, editor, base
  Set { key: String, value: String },

  /// Prints the effective configuration
  Show,

  /// Restores the defaults
  Reset
}

fn init_logging(verbose: bool) {
  let mut builder = env_logger::Builder::from_default_env();
  if verbose {
    builder.filter_level(LevelFilter::Debug).format_target(false);
  }
  builder.init();
  debug!("Verbose logging enabled");
}

fn open_repo() -> Result<Repo> {
  match Repo::new().context("Failed to open repository") {
    Err(err) if is_missing_repository(&err) => bail!("Not inside a git repository"),
    other => other
  }
}

fn collect(repo: &Repo, settings: &Settings) -> Collected {
  let spinner = Term::stderr().is_term().then(|| {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
      .tick_strings(&["-", "\\", "|", "/"])
      .template("{spinner:.blue} {msg}")
    {
      pb.set_style(style);
    }
    pb.set_message("Loading todos...");
    pb.enable_steady_tick(Duration::from_millis(150));
    pb
  });

  let collected = changed_markers(repo, &settings.markers, settings.base);

  if let Some(pb) = spinner {
    pb.finish_and_clear();
  }

  for failure in &collected.failures {
    eprintln!("{} {}", "warning:".yellow().bold(), failure);
  }

  collected
}

fn list(repo: &Repo, settings: &Settings) -> Result<()> {
  profile!("List markers");

  let collected = collect(repo, settings);
  if collected.is_empty() {
    println!("{NO_ENTRIES}");
    return Ok(());
  }

  for (index, entry) in collected.entries.iter().enumerate() {
    println!("{:>3}. {}", index + 1, format_entry(entry, &settings.markers));
  }

  Ok(())
}

fn open(repo: &Repo, settings: &Settings, index: usize) -> Result<()> {
  let collected = collect(repo, settings);
  let Some(entry) = index.checked_sub(1).and_then(|i| collected.get(i)) else {
    bail!("No marker #{index}, found {}", collected.len());
  };

  let status = settings.editor.run(entry, repo.workdir()?)?;
  if !status.success() {
    warn!("Editor exited with {status}");
  }

  Ok(())
}

fn config(action: ConfigCmd) -> Result<()> {
  match action {
    ConfigCmd::Set { key, value } => App::new()?.set(&key, value),
    ConfigCmd::Show => {
      let app = App::new()?;
      let settings = app.settings()?;
      println!("markers = {}", settings.markers);
      println!("editor  = {}", app.editor.unwrap_or_default());
      println!("base    = {}", settings.base);
      Ok(())
    },
    // Must work even when the saved file no longer parses
    ConfigCmd::Reset => App::reset()
  }
}

fn settings(head: bool) -> Result<Settings> {
  let mut settings = App::new()?.settings()?;
  if head {
    settings.base = DiffBase::Head;
  }
  Ok(settings)
}

fn main() -> Result<()> {
  dotenv().ok();

  let cli = Cli::from_args();
  init_logging(cli.verbose);

  match cli.cmd {
    Some(Cmd::Config { action }) => config(action),
    Some(Cmd::List) => list(&open_repo()?, &settings(cli.head)?),
    Some(Cmd::Open { index }) => open(&open_repo()?, &settings(cli.head)?, index),
    None if Term::stdout().is_term() => ui::run(&open_repo()?, &settings(cli.head)?),
    None => list(&open_repo()?, &settings(cli.head)?)
  }
}
