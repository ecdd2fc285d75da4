//! Implementation of the `lzrecipe plan` command.
//!
//! Resolves settings and prints what `create` would do, without fetching or
//! building anything.

use anyhow::{Context, Result};

use lzrecipe_lib::Recipe;

use super::SettingsArgs;
use crate::output::{join_or_none, print_info, print_json, print_stat, print_step};

pub fn cmd_plan(args: &SettingsArgs, verbose: bool, json: bool) -> Result<()> {
  let settings = args.resolve()?;
  let plan = Recipe::new(settings).plan().context("Failed to plan build")?;

  if json {
    return print_json(&plan);
  }

  print_info(&format!("Plan: {}", plan.package_id));
  print_stat("Settings", &plan.settings.to_string());
  print_stat("Strategy", &plan.strategy);
  print_stat("Flags", &plan.flags.join(" "));
  print_stat("Defines", &join_or_none(&plan.metadata.defines));
  print_stat("Package", &plan.package_dir.display().to_string());

  println!();
  println!("Steps:");
  for step in plan.steps.steps() {
    // env and cwd are only interesting when debugging a build
    if verbose {
      print_step(&step.to_string());
      if let Some(cwd) = &step.cwd {
        println!("      in {}", cwd.display());
      }
    } else {
      print_step(&step.command_line());
    }
  }

  Ok(())
}
