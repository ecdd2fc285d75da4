//! Filesystem helpers for preparing build trees and staging artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Recursively copy `src` into `dst`, skipping entries whose file name is in
/// `exclude`. Symlinks are recreated rather than followed on Unix.
pub fn copy_tree(src: &Path, dst: &Path, exclude: &[&str]) -> io::Result<u64> {
  let mut copied = 0;
  let walker = WalkDir::new(src).sort_by_file_name().into_iter().filter_entry(|e| {
    e.depth() == 0
      || e
        .file_name()
        .to_str()
        .map(|name| !exclude.contains(&name))
        .unwrap_or(true)
  });

  for entry in walker {
    let entry = entry?;
    let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
    let target = dst.join(rel);
    let file_type = entry.file_type();

    if file_type.is_dir() {
      fs::create_dir_all(&target)?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
      copied += 1;
    } else {
      fs::copy(entry.path(), &target)?;
      copied += 1;
    }
  }

  Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  let link = fs::read_link(src)?;
  std::os::unix::fs::symlink(link, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  fs::copy(src, dst).map(|_| ())
}

/// Copy files with the given extension from `src` into `dst`.
///
/// With `keep_path` the search is recursive and the directory structure below
/// `src` is reproduced; otherwise only the top level of `src` is searched and
/// files land directly in `dst`. Returns the destination paths, sorted.
pub fn copy_by_extension(src: &Path, dst: &Path, extension: &str, keep_path: bool) -> io::Result<Vec<PathBuf>> {
  let max_depth = if keep_path { usize::MAX } else { 1 };
  let mut copied = Vec::new();

  for entry in WalkDir::new(src).max_depth(max_depth).sort_by_file_name() {
    let entry = entry?;
    if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
      continue;
    }

    let target = if keep_path {
      dst.join(entry.path().strip_prefix(src).unwrap_or(entry.path()))
    } else {
      dst.join(entry.file_name())
    };
    if let Some(parent) = target.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::copy(entry.path(), &target)?;
    copied.push(target);
  }

  Ok(copied)
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extension: &str) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| e.eq_ignore_ascii_case(extension))
    .unwrap_or(false)
}

/// Remove a directory tree if it exists.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
  match fs::remove_dir_all(path) {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    other => other,
  }
}
