//! Implementation of the `lzrecipe source` command.
//!
//! Fetches (or reuses) the upstream tree without building anything.

use anyhow::{Context, Result};
use tracing::debug;

use lzrecipe_lib::platform::paths::{cache_dir, sources_dir};
use lzrecipe_lib::source::acquire;

use super::SourceArgs;
use crate::output::{print_json, print_stat, print_success, truncate_hash};

pub fn cmd_source(args: &SourceArgs, json: bool) -> Result<()> {
  let spec = args.spec();
  let cache = sources_dir(&cache_dir());
  let base_dir = std::env::current_dir().context("Failed to determine current directory")?;
  debug!(?spec, cache = %cache.display(), "acquiring source");

  let location = acquire(&spec, &cache, &base_dir).context("Failed to acquire source")?;

  if json {
    print_json(&location)?;
  } else {
    print_success("Source ready");
    print_stat("Path", &location.path.display().to_string());
    if let Some(commit) = &location.commit {
      print_stat("Commit", truncate_hash(commit));
    }
  }

  Ok(())
}
