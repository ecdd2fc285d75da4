mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{SettingsArgs, SourceArgs};
use output::print_error;

/// lzrecipe - build and package liblzma from XZ Utils
#[derive(Parser)]
#[command(name = "lzrecipe")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Fetch the upstream source tree without building
  Source {
    #[command(flatten)]
    source: SourceArgs,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
  },

  /// Show strategy, flags, and commands for the given settings (dry-run)
  Plan {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
  },

  /// Fetch, build, and package liblzma
  Create {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(flatten)]
    source: SourceArgs,

    /// Destination of the package (default: the package cache)
    #[arg(long, value_name = "DIR")]
    package_dir: Option<PathBuf>,

    /// Parallel build jobs (default: available CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
  },

  /// Show the detected host and default settings
  Info {
    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Source { source, json } => cmd::cmd_source(&source, json),
    Commands::Plan { settings, json } => cmd::cmd_plan(&settings, cli.verbose, json),
    Commands::Create {
      settings,
      source,
      package_dir,
      jobs,
      json,
    } => cmd::cmd_create(&settings, &source, package_dir, jobs, json),
    Commands::Info { json } => cmd::cmd_info(json),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
