//! Consumer-facing link metadata.
//!
//! Recorded next to the package as `package_info.json` so that consumers know
//! which libraries to link and which preprocessor defines to set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{PACKAGE_INFO_FILE, PACKAGE_LICENSE, PACKAGE_NAME, PACKAGE_VERSION, STATIC_API_DEFINE};
use crate::layout::{PackageLayout, PackagingError};
use crate::settings::{BuildSettings, Linkage};
use crate::util::hash::PackageId;

/// Build directory consumers search for `liblzma.pc`.
pub const BUILD_DIR_PKGCONFIG: &str = "lib/pkgconfig";

/// Library file suffixes, longest first so `.dll.a` wins over `.a`.
const LIBRARY_SUFFIXES: &[&str] = &[".dll.a", ".dylib", ".lib", ".so", ".a"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
  /// Library names without prefix or extension, sorted.
  pub libs: Vec<String>,
  pub defines: Vec<String>,
  pub build_dirs: Vec<String>,
}

impl LinkMetadata {
  /// Metadata for the staged package at `layout`.
  pub fn collect(settings: &BuildSettings, layout: &PackageLayout) -> Result<Self, PackagingError> {
    Ok(Self {
      libs: collect_libs(&layout.lib_dir())?,
      defines: defines_for(settings),
      build_dirs: vec![BUILD_DIR_PKGCONFIG.to_string()],
    })
  }
}

/// Static consumers must define `LZMA_API_STATIC` so `lzma.h` drops its
/// dllimport decorations.
pub fn defines_for(settings: &BuildSettings) -> Vec<String> {
  match settings.linkage() {
    Linkage::Static => vec![STATIC_API_DEFINE.to_string()],
    Linkage::Shared => Vec::new(),
  }
}

/// Linkable library names found directly in `lib_dir`.
///
/// Unix-style archives and shared objects drop their `lib` prefix
/// (`liblzma.a` → `lzma`); MSVC import libraries keep their full stem
/// (`liblzma.lib` → `liblzma`).
pub fn collect_libs(lib_dir: &Path) -> Result<Vec<String>, PackagingError> {
  let entries = match fs::read_dir(lib_dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => return Err(PackagingError::io(lib_dir)(e)),
  };

  let mut libs = Vec::new();
  for entry in entries {
    let entry = entry.map_err(PackagingError::io(lib_dir))?;
    if !entry.path().is_file() {
      continue;
    }
    let file_name = entry.file_name();
    if let Some(name) = file_name.to_str().and_then(library_name) {
      libs.push(name);
    }
  }

  libs.sort();
  libs.dedup();
  debug!(dir = %lib_dir.display(), libs = ?libs, "collected libraries");
  Ok(libs)
}

fn library_name(file_name: &str) -> Option<String> {
  let suffix = LIBRARY_SUFFIXES.iter().find(|s| file_name.ends_with(*s))?;
  let stem = &file_name[..file_name.len() - suffix.len()];
  if stem.is_empty() {
    return None;
  }
  let name = if *suffix == ".lib" {
    stem
  } else {
    stem.strip_prefix("lib").filter(|s| !s.is_empty()).unwrap_or(stem)
  };
  Some(name.to_string())
}

/// Everything recorded about a finished package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
  pub name: String,
  pub version: String,
  pub license: String,
  pub package_id: PackageId,
  pub settings: BuildSettings,
  /// Upstream commit the package was built from, for git sources.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub commit: Option<String>,
  pub strategy: String,
  #[serde(flatten)]
  pub link: LinkMetadata,
}

impl PackageInfo {
  pub fn new(
    package_id: PackageId,
    settings: &BuildSettings,
    commit: Option<String>,
    strategy: &str,
    link: LinkMetadata,
  ) -> Self {
    Self {
      name: PACKAGE_NAME.to_string(),
      version: PACKAGE_VERSION.to_string(),
      license: PACKAGE_LICENSE.to_string(),
      package_id,
      settings: settings.clone(),
      commit,
      strategy: strategy.to_string(),
      link,
    }
  }

  /// Write `package_info.json` into the layout root.
  pub fn write(&self, layout: &PackageLayout) -> Result<PathBuf, PackagingError> {
    let path = layout.root().join(PACKAGE_INFO_FILE);
    let json = serde_json::to_string_pretty(self)?;
    fs::write(&path, json).map_err(PackagingError::io(&path))?;
    Ok(path)
  }

  pub fn read(package_dir: &Path) -> Result<Self, PackagingError> {
    let path = package_dir.join(PACKAGE_INFO_FILE);
    let content = fs::read_to_string(&path).map_err(PackagingError::io(&path))?;
    Ok(serde_json::from_str(&content)?)
  }
}
