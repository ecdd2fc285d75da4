use crate::consts::{APP_NAME, CACHE_DIR_ENV};
use std::path::{Path, PathBuf};

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("USERPROFILE").map(PathBuf::from)
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// Returns the directory for cache files for the application
///
/// `LZRECIPE_CACHE_DIR` takes precedence over the platform default. A
/// relative override is taken relative to the current directory, so the
/// result can always serve as an install prefix.
pub fn cache_dir() -> PathBuf {
  match std::env::var_os(CACHE_DIR_ENV).filter(|path| !path.is_empty()) {
    Some(path) => absolute(PathBuf::from(path)),
    None => default_cache_dir(),
  }
}

fn absolute(path: PathBuf) -> PathBuf {
  if path.is_absolute() {
    return path;
  }
  match std::env::current_dir() {
    Ok(cwd) => cwd.join(path),
    Err(_) => path,
  }
}

#[cfg(windows)]
fn default_cache_dir() -> PathBuf {
  std::env::var_os("LOCALAPPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(std::env::temp_dir)
    .join(APP_NAME)
    .join("Cache")
}

#[cfg(not(windows))]
fn default_cache_dir() -> PathBuf {
  // relative XDG paths are invalid and must be ignored
  std::env::var_os("XDG_CACHE_HOME")
    .map(PathBuf::from)
    .filter(|path| path.is_absolute())
    .or_else(|| home_dir().map(|home| home.join(".cache")))
    .unwrap_or_else(std::env::temp_dir)
    .join(APP_NAME)
}

/// Where upstream sources are cloned under `cache`
pub fn sources_dir(cache: &Path) -> PathBuf {
  cache.join("sources")
}

/// Scratch trees for out-of-source builds under `cache`, one per package id
pub fn build_root(cache: &Path) -> PathBuf {
  cache.join("build")
}

/// Default destination for finished packages under `cache`, one per package id
pub fn packages_dir(cache: &Path) -> PathBuf {
  cache.join("packages")
}
