//! Upstream source acquisition.
//!
//! The source tree is fetched once and treated as read-only afterwards; every
//! build works on a private copy (see [`crate::recipe`]).

mod fetch;

pub use fetch::{FetchError, clone_dir, fetch_git, resolve_path};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{SOURCE_CHECKOUT_NAME, UPSTREAM_REF, UPSTREAM_URL};

/// Where the upstream tree comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSpec {
  /// Clone a git repository; `rev` is a branch or tag name.
  Git {
    url: String,
    rev: Option<String>,
    #[serde(default)]
    refresh: bool,
  },
  /// Use an existing directory as-is.
  Path(PathBuf),
}

impl Default for SourceSpec {
  fn default() -> Self {
    Self::upstream()
  }
}

impl SourceSpec {
  /// The official XZ Utils repository at the packaged branch.
  pub fn upstream() -> Self {
    Self::Git {
      url: UPSTREAM_URL.to_string(),
      rev: Some(UPSTREAM_REF.to_string()),
      refresh: false,
    }
  }
}

/// A fetched, read-only source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
  pub path: PathBuf,
  /// Commit hash for git sources.
  pub commit: Option<String>,
}

/// Acquire the source tree described by `spec`.
///
/// Git sources are cloned under `cache_dir`; relative path sources are
/// resolved against `base_dir`.
pub fn acquire(spec: &SourceSpec, cache_dir: &Path, base_dir: &Path) -> Result<SourceLocation, FetchError> {
  match spec {
    SourceSpec::Git { url, rev, refresh } => {
      let (path, commit) = fetch_git(SOURCE_CHECKOUT_NAME, url, rev.as_deref(), cache_dir, *refresh)?;
      Ok(SourceLocation {
        path,
        commit: Some(commit),
      })
    }
    SourceSpec::Path(path) => {
      let path = resolve_path(&path.to_string_lossy(), base_dir)?;
      Ok(SourceLocation { path, commit: None })
    }
  }
}

/// Where `spec` would be found on disk without fetching anything.
///
/// `None` when a git source has not been cloned yet or a path source does not
/// resolve.
pub fn locate(spec: &SourceSpec, cache_dir: &Path, base_dir: &Path) -> Option<PathBuf> {
  match spec {
    SourceSpec::Git { url, rev, .. } => clone_dir(SOURCE_CHECKOUT_NAME, url, rev.as_deref(), cache_dir)
      .ok()
      .filter(|dir| dir.join(".git").exists()),
    SourceSpec::Path(path) => resolve_path(&path.to_string_lossy(), base_dir).ok(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn upstream_points_at_master() {
    match SourceSpec::upstream() {
      SourceSpec::Git { url, rev, refresh } => {
        assert_eq!(url, "https://git.tukaani.org/xz.git");
        assert_eq!(rev.as_deref(), Some("master"));
        assert!(!refresh);
      }
      other => panic!("expected git source, got {:?}", other),
    }
  }

  #[test]
  fn path_source_has_no_commit() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("xz");
    std::fs::create_dir(&tree).unwrap();

    let location = acquire(&SourceSpec::Path(PathBuf::from("xz")), temp.path(), temp.path()).unwrap();
    assert_eq!(location.path, dunce::canonicalize(&tree).unwrap());
    assert_eq!(location.commit, None);
  }

  #[test]
  fn locate_does_not_fetch() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("xz");
    std::fs::create_dir(&tree).unwrap();

    let found = locate(&SourceSpec::Path(PathBuf::from("xz")), temp.path(), temp.path());
    assert_eq!(found, Some(dunce::canonicalize(&tree).unwrap()));
    assert_eq!(locate(&SourceSpec::upstream(), temp.path(), temp.path()), None);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
  }
}
