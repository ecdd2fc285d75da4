//! Package layout and artifact staging.
//!
//! # Layout
//!
//! ```text
//! <package>/
//! ├── include/            # public headers (lzma.h, lzma/*.h)
//! ├── lib/                # static or import libraries
//! │   └── pkgconfig/      # linker metadata for consumers
//! ├── bin/                # DLLs (Windows shared builds)
//! ├── licenses/           # COPYING
//! └── package_info.json
//! ```
//!
//! The layout is assembled in a staging directory next to the destination and
//! only moved into place once it is complete, so a failed build never leaves a
//! partial package behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::{LICENSE_FILE, MAIN_HEADER};
use crate::util::fs::{copy_by_extension, remove_dir_if_exists};

/// Executables of the upstream project that the package must never contain.
pub const COMPANION_TOOLS: &[&str] = &[
  "xz", "unxz", "xzcat", "lzma", "unlzma", "lzcat", "xzdec", "lzmadec", "lzmainfo",
];

/// An expected artifact is missing or the layout could not be written.
#[derive(Debug, Error)]
pub enum PackagingError {
  #[error("expected {what} not found at '{path}'")]
  MissingArtifact { what: String, path: PathBuf },

  #[error("unexpected companion executable in package: '{0}'")]
  UnexpectedArtifact(PathBuf),

  #[error("failed to stage '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write package metadata: {0}")]
  Metadata(#[from] serde_json::Error),
}

impl PackagingError {
  pub fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
    move |source| Self::Io {
      path: path.to_path_buf(),
      source,
    }
  }

  pub fn missing(what: &str, path: &Path) -> Self {
    Self::MissingArtifact {
      what: what.to_string(),
      path: path.to_path_buf(),
    }
  }
}

/// The canonical directory structure of a package rooted at `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
  root: PathBuf,
}

impl PackageLayout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn include_dir(&self) -> PathBuf {
    self.root.join("include")
  }

  pub fn lib_dir(&self) -> PathBuf {
    self.root.join("lib")
  }

  pub fn pkgconfig_dir(&self) -> PathBuf {
    self.lib_dir().join("pkgconfig")
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.root.join("bin")
  }

  pub fn licenses_dir(&self) -> PathBuf {
    self.root.join("licenses")
  }

  /// Create every directory of the layout.
  pub fn create_dirs(&self) -> Result<(), PackagingError> {
    for dir in [
      self.include_dir(),
      self.pkgconfig_dir(),
      self.bin_dir(),
      self.licenses_dir(),
    ] {
      fs::create_dir_all(&dir).map_err(PackagingError::io(&dir))?;
    }
    Ok(())
  }

  /// Copy the upstream license file from `source_dir` into `licenses/`.
  pub fn copy_license(&self, source_dir: &Path) -> Result<PathBuf, PackagingError> {
    let src = source_dir.join(LICENSE_FILE);
    if !src.is_file() {
      return Err(PackagingError::missing("license file", &src));
    }
    let dst_dir = self.licenses_dir();
    fs::create_dir_all(&dst_dir).map_err(PackagingError::io(&dst_dir))?;
    let dst = dst_dir.join(LICENSE_FILE);
    fs::copy(&src, &dst).map_err(PackagingError::io(&dst))?;
    Ok(dst)
  }

  /// Copy every file with `extension` from `src` into `dst`, requiring at least one.
  pub fn copy_required(
    &self,
    what: &str,
    src: &Path,
    dst: &Path,
    extension: &str,
    keep_path: bool,
  ) -> Result<Vec<PathBuf>, PackagingError> {
    if !src.is_dir() {
      return Err(PackagingError::missing(what, src));
    }
    let copied = copy_by_extension(src, dst, extension, keep_path).map_err(PackagingError::io(src))?;
    if copied.is_empty() {
      return Err(PackagingError::missing(what, &src.join(format!("*.{}", extension))));
    }
    debug!(what, count = copied.len(), dst = %dst.display(), "staged files");
    Ok(copied)
  }

  /// Fail unless `relative` exists below the root.
  pub fn require(&self, what: &str, relative: &str) -> Result<PathBuf, PackagingError> {
    let path = self.root.join(relative);
    if path.exists() {
      Ok(path)
    } else {
      Err(PackagingError::missing(what, &path))
    }
  }

  /// Fail unless at least one file in `dir` has `extension`.
  pub fn require_any(&self, what: &str, dir: &Path, extension: &str) -> Result<(), PackagingError> {
    let found = fs::read_dir(dir)
      .map(|entries| {
        entries
          .flatten()
          .any(|entry| crate::util::fs::has_extension(&entry.path(), extension))
      })
      .unwrap_or(false);
    if found {
      Ok(())
    } else {
      Err(PackagingError::missing(what, &dir.join(format!("*.{}", extension))))
    }
  }

  /// The public header must have been staged.
  pub fn require_headers(&self) -> Result<PathBuf, PackagingError> {
    self.require("public header", &format!("include/{}", MAIN_HEADER))
  }

  /// Fail if any upstream command-line tool ended up in `bin/`.
  pub fn reject_companion_tools(&self) -> Result<(), PackagingError> {
    let bin = self.bin_dir();
    let entries = match fs::read_dir(&bin) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
      Err(e) => return Err(PackagingError::io(&bin)(e)),
    };
    for entry in entries.flatten() {
      let path = entry.path();
      let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
      if COMPANION_TOOLS.contains(&stem) {
        return Err(PackagingError::UnexpectedArtifact(path));
      }
    }
    Ok(())
  }
}

/// Move a completed staged layout to `package_dir`, replacing any previous
/// package there.
pub fn finalize(staged_root: &Path, package_dir: &Path) -> Result<PackageLayout, PackagingError> {
  if package_dir.exists() {
    warn!(path = %package_dir.display(), "replacing existing package");
    remove_dir_if_exists(package_dir).map_err(PackagingError::io(package_dir))?;
  }
  if let Some(parent) = package_dir.parent() {
    fs::create_dir_all(parent).map_err(PackagingError::io(parent))?;
  }
  fs::rename(staged_root, package_dir).map_err(PackagingError::io(package_dir))?;
  Ok(PackageLayout::new(package_dir))
}
