use anyhow::Result;
use serde::Serialize;

use lzrecipe_lib::consts::{HOMEPAGE, PACKAGE_DESCRIPTION, PACKAGE_LICENSE, PACKAGE_NAME, PACKAGE_VERSION};
use lzrecipe_lib::platform::paths::{cache_dir, packages_dir, sources_dir};
use lzrecipe_lib::platform::platform_triple;
use lzrecipe_lib::settings::BuildSettings;

use crate::output::{print_json, print_stat};

#[derive(Serialize)]
struct InfoOutput {
  package: &'static str,
  version: &'static str,
  platform: Option<String>,
  default_settings: Option<BuildSettings>,
  cache_dir: String,
  sources_dir: String,
  packages_dir: String,
}

pub fn cmd_info(json: bool) -> Result<()> {
  let cache = cache_dir();
  let info = InfoOutput {
    package: PACKAGE_NAME,
    version: PACKAGE_VERSION,
    platform: platform_triple(),
    default_settings: BuildSettings::detect().ok(),
    cache_dir: cache.display().to_string(),
    sources_dir: sources_dir(&cache).display().to_string(),
    packages_dir: packages_dir(&cache).display().to_string(),
  };

  if json {
    return print_json(&info);
  }

  println!("{} {}: {}", PACKAGE_NAME, PACKAGE_VERSION, PACKAGE_DESCRIPTION);
  print_stat("License", PACKAGE_LICENSE);
  print_stat("Homepage", HOMEPAGE);
  println!();
  println!("System:");
  match &info.platform {
    Some(triple) => print_stat("Platform", triple),
    None => println!("Could not detect platform."),
  }
  if let Some(settings) = &info.default_settings {
    print_stat("Default settings", &settings.to_string());
  }
  print_stat("Cache", &info.cache_dir);
  print_stat("Sources", &info.sources_dir);
  print_stat("Packages", &info.packages_dir);

  Ok(())
}
