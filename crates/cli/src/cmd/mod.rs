mod create;
mod info;
mod plan;
mod source;

pub use create::cmd_create;
pub use info::cmd_info;
pub use plan::cmd_plan;
pub use source::cmd_source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lzrecipe_lib::consts::{UPSTREAM_REF, UPSTREAM_URL};
use lzrecipe_lib::settings::{BuildSettings, SettingsBuilder};
use lzrecipe_lib::source::SourceSpec;

/// Settings shared by `plan` and `create`.
#[derive(Args, Debug)]
pub struct SettingsArgs {
  /// JSON profile applied on top of the detected host
  #[arg(long, value_name = "FILE")]
  pub profile: Option<PathBuf>,

  /// Override a setting (os, arch, compiler, compiler.version, build_type)
  #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
  pub settings: Vec<String>,

  /// Override a package option (shared, fPIC)
  #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
  pub options: Vec<String>,
}

impl SettingsArgs {
  pub fn resolve(&self) -> Result<BuildSettings> {
    let mut builder = SettingsBuilder::new();
    if let Some(profile) = &self.profile {
      builder = builder.with_profile(profile);
    }
    builder
      .settings_from_args(&self.settings)
      .and_then(|b| b.options_from_args(&self.options))
      .and_then(|b| b.build())
      .context("Invalid settings")
  }
}

/// Where the source tree comes from.
#[derive(Args, Debug)]
pub struct SourceArgs {
  /// Use an existing source tree instead of cloning
  #[arg(long, value_name = "DIR", conflicts_with_all = ["url", "git_ref", "refresh"])]
  pub source_dir: Option<PathBuf>,

  /// Repository to clone
  #[arg(long)]
  pub url: Option<String>,

  /// Branch or tag to check out
  #[arg(long = "ref", value_name = "REF")]
  pub git_ref: Option<String>,

  /// Discard the cached clone and clone again
  #[arg(long)]
  pub refresh: bool,
}

impl SourceArgs {
  pub fn spec(&self) -> SourceSpec {
    match &self.source_dir {
      Some(dir) => SourceSpec::Path(dir.clone()),
      None => SourceSpec::Git {
        url: self.url.clone().unwrap_or_else(|| UPSTREAM_URL.to_string()),
        rev: Some(self.git_ref.clone().unwrap_or_else(|| UPSTREAM_REF.to_string())),
        refresh: self.refresh,
      },
    }
  }
}
