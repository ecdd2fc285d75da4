//! The Visual Studio solution build path.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::exec::ExecOpts;
use crate::layout::{PackageLayout, PackagingError};
use crate::settings::{BuildSettings, Linkage};
use crate::toolchain::{UnsupportedToolchainError, VsProjectDir, msbuild_configuration, msbuild_platform, vs_project_dir};

use super::{Backend, BuildContext, BuildPlan};

const SOLUTION: &str = "xz_win.sln";

/// Public headers relative to the source root.
const API_HEADERS_DIR: &str = "src/liblzma/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsBuild {
  project_dir: VsProjectDir,
  platform: &'static str,
  configuration: &'static str,
  linkage: Linkage,
}

impl MsBuild {
  pub fn new(settings: &BuildSettings) -> Result<Self, UnsupportedToolchainError> {
    Ok(Self {
      project_dir: vs_project_dir(settings)?,
      platform: msbuild_platform(settings.arch)?,
      configuration: msbuild_configuration(settings.build_type),
      linkage: settings.linkage(),
    })
  }

  /// `liblzma_dll` for shared builds, `liblzma` otherwise.
  pub fn target(&self) -> &'static str {
    match self.linkage {
      Linkage::Shared => "liblzma_dll",
      Linkage::Static => "liblzma",
    }
  }

  pub fn project_dir(&self) -> VsProjectDir {
    self.project_dir
  }

  /// `windows/<vs>` inside the source tree.
  fn solution_dir(&self, source: &Path) -> PathBuf {
    source.join("windows").join(self.project_dir.as_str())
  }

  /// `windows/<vs>/<configuration>/<platform>/<target>`, where the solution
  /// writes its libraries and DLLs.
  pub fn output_dir(&self, source: &Path) -> PathBuf {
    self
      .solution_dir(source)
      .join(self.configuration)
      .join(self.platform)
      .join(self.target())
  }
}

impl Backend for MsBuild {
  fn flags(&self) -> Vec<String> {
    vec![
      format!("/t:{}", self.target()),
      format!("/p:Configuration={}", self.configuration),
      format!("/p:Platform={}", self.platform),
    ]
  }

  fn plan(&self, ctx: &BuildContext<'_>) -> BuildPlan {
    let mut plan = BuildPlan::new();
    plan.push(
      ExecOpts::new(&ctx.tools.msbuild)
        .arg(SOLUTION)
        .args(self.flags())
        .arg(format!("/m:{}", ctx.jobs.max(1)))
        .arg("/nologo")
        .with_cwd(self.solution_dir(ctx.build_dir)),
    );
    plan
  }

  fn staged_root(&self, ctx: &BuildContext<'_>) -> PathBuf {
    ctx.staging_dir.join("package")
  }

  fn stage(&self, ctx: &BuildContext<'_>, layout: &PackageLayout) -> Result<(), PackagingError> {
    layout.create_dirs()?;
    layout.copy_license(ctx.build_dir)?;

    layout.copy_required(
      "public headers",
      &ctx.build_dir.join(API_HEADERS_DIR),
      &layout.include_dir(),
      "h",
      true,
    )?;

    let output = self.output_dir(ctx.build_dir);
    debug!(output = %output.display(), "collecting MSBuild outputs");
    layout.copy_required("library", &output, &layout.lib_dir(), "lib", false)?;
    if self.linkage == Linkage::Shared {
      layout.copy_required("shared library", &output, &layout.bin_dir(), "dll", false)?;
    }

    layout.require_headers()?;
    layout.reject_companion_tools()
  }
}
