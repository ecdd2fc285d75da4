//! Implementation of the `lzrecipe create` command.
//!
//! Runs the full pipeline: fetch, build, stage, and install the package.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use lzrecipe_lib::Recipe;

use super::{SettingsArgs, SourceArgs};
use crate::output::{
  format_duration, join_or_none, print_info, print_json, print_stat, print_success, print_warning, truncate_hash,
};

pub fn cmd_create(
  settings: &SettingsArgs,
  source: &SourceArgs,
  package_dir: Option<PathBuf>,
  jobs: Option<usize>,
  json: bool,
) -> Result<()> {
  let start = Instant::now();
  let settings = settings.resolve()?;

  let mut recipe = Recipe::new(settings).with_source(source.spec());
  if let Some(dir) = package_dir {
    recipe = recipe.with_package_dir(dir);
  }
  if let Some(jobs) = jobs {
    recipe = recipe.with_jobs(jobs);
  }

  let package_id = recipe.package_id().context("Failed to compute package id")?;
  let destination = recipe.package_dir(&package_id);
  if !json {
    print_info(&format!("Building {} ({})", package_id, recipe.settings()));
    if destination.exists() {
      print_warning(&format!("Replacing existing package at {}", destination.display()));
    }
  }

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;
  let outcome = rt.block_on(recipe.run()).context("Create failed")?;

  if json {
    print_json(&outcome)?;
  } else {
    println!();
    print_success("Package created!");
    print_stat("Package", &outcome.package_id.to_string());
    print_stat("Path", &outcome.package_dir.display().to_string());
    print_stat("Strategy", &outcome.strategy);
    if let Some(commit) = &outcome.commit {
      print_stat("Commit", truncate_hash(commit));
    }
    print_stat("Libraries", &join_or_none(&outcome.metadata.libs));
    print_stat("Defines", &join_or_none(&outcome.metadata.defines));
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}
