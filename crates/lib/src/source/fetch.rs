//! Git clone and path resolution for upstream sources.
//!
//! Git sources are cloned into the sources cache with their `.git` directory
//! intact, one clone per (url, ref) pair. A cached clone is reused as-is; a
//! refresh removes it and clones again.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::platform::paths::home_dir;
use crate::util::fs::remove_dir_if_exists;
use crate::util::hash::{HashError, Hashable};

/// Errors that can occur while acquiring the source tree.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Failed to create the cache directory.
  #[error("failed to create cache directory '{0}': {1}")]
  CreateCacheDir(PathBuf, #[source] std::io::Error),

  /// Failed to remove a stale clone before refreshing.
  #[error("failed to remove cached clone '{0}': {1}")]
  RemoveStale(PathBuf, #[source] std::io::Error),

  /// Failed to derive the cache key of a clone.
  #[error("failed to compute cache key for '{url}': {source}")]
  CacheKey {
    url: String,
    #[source]
    source: HashError,
  },

  /// Failed to clone a git repository.
  #[error("failed to clone repository '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// Failed to open an existing git repository.
  #[error("failed to open repository at '{path}': {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: Box<gix::open::Error>,
  },

  /// Failed to check out the cloned worktree.
  #[error("failed to checkout '{rev}': {source}")]
  Checkout {
    rev: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// Failed to resolve HEAD reference.
  #[error("failed to resolve HEAD: {0}")]
  ResolveHead(String),

  /// The path does not exist.
  #[error("path does not exist: {0}")]
  PathNotFound(PathBuf),

  /// The path exists but is not a directory.
  #[error("source path is not a directory: {0}")]
  NotADirectory(PathBuf),

  /// Failed to canonicalize path.
  #[error("failed to resolve path '{path}': {source}")]
  CanonicalizePath {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// What a cached clone was made from.
#[derive(Serialize)]
struct CloneKey<'a> {
  url: &'a str,
  rev: Option<&'a str>,
}

impl Hashable for CloneKey<'_> {}

/// Directory a clone of `url` at `rev` lives in under `cache_dir`.
///
/// Every (url, ref) pair gets its own clone, so asking for another ref never
/// reuses a checkout of a different one.
pub fn clone_dir(name: &str, url: &str, rev: Option<&str>, cache_dir: &Path) -> Result<PathBuf, FetchError> {
  let key = CloneKey { url, rev }.compute_hash().map_err(|e| FetchError::CacheKey {
    url: url.to_string(),
    source: e,
  })?;
  Ok(cache_dir.join(format!("{}-{}", name, key)))
}

/// Clone `url` at `rev` under `cache_dir`, or reuse an existing clone.
///
/// # Returns
///
/// A tuple of `(path, commit)` where `commit` is the hash HEAD resolves to in
/// the checked-out tree.
pub fn fetch_git(
  name: &str,
  url: &str,
  rev: Option<&str>,
  cache_dir: &Path,
  refresh: bool,
) -> Result<(PathBuf, String), FetchError> {
  let repo_path = clone_dir(name, url, rev, cache_dir)?;

  if !cache_dir.exists() {
    fs::create_dir_all(cache_dir).map_err(|e| FetchError::CreateCacheDir(cache_dir.to_path_buf(), e))?;
  }

  if refresh {
    debug!(path = %repo_path.display(), "removing cached clone");
    remove_dir_if_exists(&repo_path).map_err(|e| FetchError::RemoveStale(repo_path.clone(), e))?;
  }

  let repo = if repo_path.join(".git").exists() {
    debug!(name, path = %repo_path.display(), "reusing cached clone");
    gix::open(&repo_path).map_err(|e| FetchError::Open {
      path: repo_path.clone(),
      source: Box::new(e),
    })?
  } else {
    // A half-finished clone from an interrupted run has no usable .git
    remove_dir_if_exists(&repo_path).map_err(|e| FetchError::RemoveStale(repo_path.clone(), e))?;
    info!(name, url, rev = rev.unwrap_or("HEAD"), path = %repo_path.display(), "cloning repository");
    clone_repo(url, rev, &repo_path)?
  };

  let commit = resolve_head(&repo)?;
  debug!(name, commit = %commit, "resolved revision");
  Ok((repo_path, commit))
}

/// Clone a git repository to the specified path, checking out `rev` if given.
fn clone_repo(url: &str, rev: Option<&str>, dest: &Path) -> Result<gix::Repository, FetchError> {
  let clone_err = |e: Box<dyn std::error::Error + Send + Sync>| FetchError::Clone {
    url: url.to_string(),
    source: e,
  };

  let mut prepared = gix::prepare_clone(url, dest).map_err(|e| clone_err(Box::new(e)))?;
  if let Some(rev) = rev {
    prepared = prepared.with_ref_name(Some(rev)).map_err(|e| clone_err(Box::new(e)))?;
  }

  let (mut checkout, _outcome) = prepared
    .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| clone_err(Box::new(e)))?;

  let (repo, _outcome) = checkout
    .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| FetchError::Checkout {
      rev: rev.unwrap_or("HEAD").to_string(),
      source: Box::new(e),
    })?;

  Ok(repo)
}

fn resolve_head(repo: &gix::Repository) -> Result<String, FetchError> {
  let mut head = repo.head().map_err(|e| FetchError::ResolveHead(e.to_string()))?;
  let commit = head
    .peel_to_commit()
    .map_err(|e| FetchError::ResolveHead(e.to_string()))?;
  Ok(commit.id.to_string())
}

/// Resolve a local source path.
///
/// Handles `~` expansion and paths relative to `base_dir`, and checks that the
/// result is an existing directory.
pub fn resolve_path(path_str: &str, base_dir: &Path) -> Result<PathBuf, FetchError> {
  let expanded = match (path_str.strip_prefix("~/"), path_str == "~", home_dir()) {
    (Some(rest), _, Some(home)) => home.join(rest),
    (None, true, Some(home)) => home,
    _ if Path::new(path_str).is_absolute() => PathBuf::from(path_str),
    _ => base_dir.join(path_str),
  };

  let canonical = dunce::canonicalize(&expanded).map_err(|e| {
    if e.kind() == std::io::ErrorKind::NotFound {
      FetchError::PathNotFound(expanded.clone())
    } else {
      FetchError::CanonicalizePath {
        path: expanded.clone(),
        source: e,
      }
    }
  })?;

  if !canonical.is_dir() {
    return Err(FetchError::NotADirectory(canonical));
  }

  debug!(path = %canonical.display(), "resolved path source");
  Ok(canonical)
}
