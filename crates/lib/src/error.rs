use std::path::PathBuf;

use thiserror::Error;

use crate::exec::BuildError;
use crate::layout::PackagingError;
use crate::settings::SettingsError;
use crate::source::FetchError;
use crate::toolchain::UnsupportedToolchainError;
use crate::util::hash::HashError;

/// Any failure of a recipe run. Each stage contributes its own error kind.
#[derive(Debug, Error)]
pub enum RecipeError {
  #[error(transparent)]
  Settings(#[from] SettingsError),

  #[error("source acquisition failed: {0}")]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  UnsupportedToolchain(#[from] UnsupportedToolchainError),

  #[error("build failed: {0}")]
  Build(#[from] BuildError),

  #[error("packaging failed: {0}")]
  Packaging(#[from] PackagingError),

  #[error("failed to compute package id: {0}")]
  Hash(#[source] HashError),

  #[error("failed to prepare '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl RecipeError {
  pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| Self::Io { path, source }
  }
}
