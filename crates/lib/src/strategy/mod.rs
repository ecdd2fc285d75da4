//! Build strategies.
//!
//! The recipe knows exactly two ways to build liblzma:
//!
//! - [`MsBuild`]: the Visual Studio solution shipped under `windows/vs20xx/`
//! - [`Autotools`]: the portable `configure && make && make install` path
//!
//! Both implement [`Backend`]: translate settings to flags, record the
//! external commands into a [`BuildPlan`], run them, and stage the results
//! into a [`PackageLayout`]. [`select`] picks one from the settings alone.

mod autotools;
mod msbuild;

pub use autotools::{Autotools, needs_bootstrap};
pub use msbuild::MsBuild;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::exec::{BuildError, ExecOpts, execute};
use crate::layout::{PackageLayout, PackagingError};
use crate::platform::Platform;
use crate::settings::BuildSettings;
use crate::toolchain::{UnsupportedToolchainError, check_compiler};

/// External programs the strategies invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tools {
  pub make: String,
  pub msbuild: String,
  pub shell: String,
  /// MSYS2 login shell used for MinGW builds on Windows hosts.
  pub bash: String,
}

impl Default for Tools {
  fn default() -> Self {
    Self {
      make: "make".to_string(),
      msbuild: "msbuild".to_string(),
      shell: "sh".to_string(),
      bash: "bash".to_string(),
    }
  }
}

impl Tools {
  /// Defaults, overridden by the conventional `MAKE` and `MSBUILD` variables.
  pub fn from_env() -> Self {
    let var = |name: &str| std::env::var(name).ok().filter(|value| !value.is_empty());
    let defaults = Self::default();
    Self {
      make: var("MAKE").unwrap_or(defaults.make),
      msbuild: var("MSBUILD").unwrap_or(defaults.msbuild),
      ..defaults
    }
  }
}

/// Everything a strategy needs to plan and stage one build.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
  pub settings: &'a BuildSettings,
  /// Private copy of the source tree; builds run in place here.
  pub build_dir: &'a Path,
  /// Final package directory, used as the install prefix.
  pub package_dir: &'a Path,
  /// Scratch directory the layout is assembled in before it is moved.
  pub staging_dir: &'a Path,
  pub tools: &'a Tools,
  pub jobs: usize,
  /// The tree has no generated `configure` and must be bootstrapped first.
  pub bootstrap: bool,
  /// The machine running the build, if known.
  pub host: Option<Platform>,
}

/// Ordered external commands for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildPlan {
  steps: Vec<ExecOpts>,
}

impl BuildPlan {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, step: ExecOpts) {
    self.steps.push(step);
  }

  pub fn steps(&self) -> &[ExecOpts] {
    &self.steps
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

/// The contract every build strategy fulfils.
#[allow(async_fn_in_trait)]
pub trait Backend {
  /// Toolchain-specific flags derived from the settings.
  fn flags(&self) -> Vec<String>;

  /// Record the external commands that build and install the library.
  fn plan(&self, ctx: &BuildContext<'_>) -> BuildPlan;

  /// Directory inside the staging area that becomes the package root.
  fn staged_root(&self, ctx: &BuildContext<'_>) -> PathBuf;

  /// Copy license, headers, and binaries into `layout`, failing if any
  /// expected artifact is missing.
  fn stage(&self, ctx: &BuildContext<'_>, layout: &PackageLayout) -> Result<(), PackagingError>;

  /// Run every planned step in order, stopping at the first failure.
  async fn invoke(&self, ctx: &BuildContext<'_>) -> Result<(), BuildError> {
    let plan = self.plan(ctx);
    for step in plan.steps() {
      execute(step).await?;
    }
    Ok(())
  }
}

/// The closed set of build strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStrategy {
  NativeProject(MsBuild),
  Configure(Autotools),
}

impl BuildStrategy {
  pub fn name(&self) -> &'static str {
    match self {
      Self::NativeProject(_) => "msbuild",
      Self::Configure(_) => "autotools",
    }
  }
}

impl fmt::Display for BuildStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl Backend for BuildStrategy {
  fn flags(&self) -> Vec<String> {
    match self {
      Self::NativeProject(b) => b.flags(),
      Self::Configure(b) => b.flags(),
    }
  }

  fn plan(&self, ctx: &BuildContext<'_>) -> BuildPlan {
    match self {
      Self::NativeProject(b) => b.plan(ctx),
      Self::Configure(b) => b.plan(ctx),
    }
  }

  fn staged_root(&self, ctx: &BuildContext<'_>) -> PathBuf {
    match self {
      Self::NativeProject(b) => b.staged_root(ctx),
      Self::Configure(b) => b.staged_root(ctx),
    }
  }

  fn stage(&self, ctx: &BuildContext<'_>, layout: &PackageLayout) -> Result<(), PackagingError> {
    match self {
      Self::NativeProject(b) => b.stage(ctx, layout),
      Self::Configure(b) => b.stage(ctx, layout),
    }
  }
}

/// Choose the build strategy for `settings`.
///
/// Visual Studio builds from its solution; every other supported compiler
/// goes through configure. There is no fallback between the two.
pub fn select(settings: &BuildSettings) -> Result<BuildStrategy, UnsupportedToolchainError> {
  check_compiler(settings)?;
  if settings.compiler.is_visual_studio() {
    Ok(BuildStrategy::NativeProject(MsBuild::new(settings)?))
  } else {
    Ok(BuildStrategy::Configure(Autotools::new(settings)))
  }
}
