//! Static lookup tables mapping settings to toolchain-specific names.

use std::fmt;

use thiserror::Error;

use crate::platform::arch::Arch;
use crate::platform::os::Os;
use crate::settings::{BuildSettings, BuildType, CompilerKind};

/// Visual Studio major version → directory of its solution under `windows/`.
static VS_PROJECT_DIRS: &[(u32, &str)] = &[(13, "vs2013"), (14, "vs2015"), (15, "vs2017"), (16, "vs2019")];

/// Architecture → MSBuild `Platform` property.
static MSBUILD_PLATFORMS: &[(Arch, &str)] = &[(Arch::X86, "Win32"), (Arch::X86_64, "x64")];

/// (architecture, OS) → GNU triple passed to configure when cross compiling.
static GNU_TRIPLES: &[(Arch, Os, &str)] = &[
  (Arch::X86, Os::Linux, "i686-linux-gnu"),
  (Arch::X86_64, Os::Linux, "x86_64-linux-gnu"),
  (Arch::Armv7, Os::Linux, "arm-linux-gnueabihf"),
  (Arch::Armv8, Os::Linux, "aarch64-linux-gnu"),
  (Arch::X86_64, Os::MacOs, "x86_64-apple-darwin"),
  (Arch::Armv8, Os::MacOs, "aarch64-apple-darwin"),
  (Arch::X86, Os::Windows, "i686-w64-mingw32"),
  (Arch::X86_64, Os::Windows, "x86_64-w64-mingw32"),
  (Arch::X86, Os::FreeBsd, "i386-unknown-freebsd"),
  (Arch::X86_64, Os::FreeBsd, "x86_64-unknown-freebsd"),
  (Arch::Armv8, Os::FreeBsd, "aarch64-unknown-freebsd"),
];

/// The compiler/version/target combination cannot be built by any strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedToolchainError {
  #[error("compiler '{0}' is not supported")]
  UnknownCompiler(String),

  #[error("{compiler} cannot target {os}")]
  CompilerOsMismatch { compiler: String, os: Os },

  #[error("Visual Studio version is missing")]
  MissingVisualStudioVersion,

  #[error("Visual Studio version '{0}' has no project files (supported: 13, 14, 15, 16)")]
  UnknownVisualStudioVersion(String),

  #[error("architecture {0} is not supported by the Visual Studio solution")]
  UnsupportedMsBuildArch(Arch),
}

/// A Visual Studio project directory name such as `vs2019`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VsProjectDir(&'static str);

impl VsProjectDir {
  pub fn as_str(&self) -> &'static str {
    self.0
  }
}

impl fmt::Display for VsProjectDir {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Look up the solution directory for the configured Visual Studio version.
pub fn vs_project_dir(settings: &BuildSettings) -> Result<VsProjectDir, UnsupportedToolchainError> {
  let raw = settings
    .compiler
    .version
    .as_deref()
    .ok_or(UnsupportedToolchainError::MissingVisualStudioVersion)?;
  let major = settings
    .compiler
    .major_version()
    .ok_or_else(|| UnsupportedToolchainError::UnknownVisualStudioVersion(raw.to_string()))?;

  VS_PROJECT_DIRS
    .iter()
    .find(|(version, _)| *version == major)
    .map(|(_, dir)| VsProjectDir(dir))
    .ok_or_else(|| UnsupportedToolchainError::UnknownVisualStudioVersion(raw.to_string()))
}

pub fn msbuild_platform(arch: Arch) -> Result<&'static str, UnsupportedToolchainError> {
  MSBUILD_PLATFORMS
    .iter()
    .find(|(a, _)| *a == arch)
    .map(|(_, name)| *name)
    .ok_or(UnsupportedToolchainError::UnsupportedMsBuildArch(arch))
}

/// MSBuild only ships Debug and Release configurations; the other build
/// types are treated as Release.
pub fn msbuild_configuration(build_type: BuildType) -> &'static str {
  if build_type.is_debug() { "Debug" } else { "Release" }
}

pub fn gnu_triple(arch: Arch, os: Os) -> Option<&'static str> {
  GNU_TRIPLES
    .iter()
    .find(|(a, o, _)| *a == arch && *o == os)
    .map(|(_, _, triple)| *triple)
}

/// Checks that the compiler is known and can target the configured OS.
pub fn check_compiler(settings: &BuildSettings) -> Result<(), UnsupportedToolchainError> {
  let compiler = &settings.compiler.kind;
  let allowed = match compiler {
    CompilerKind::Other(name) => return Err(UnsupportedToolchainError::UnknownCompiler(name.clone())),
    CompilerKind::VisualStudio => settings.os == Os::Windows,
    CompilerKind::AppleClang => settings.os == Os::MacOs,
    CompilerKind::Gcc | CompilerKind::Clang => true,
  };

  if allowed {
    Ok(())
  } else {
    Err(UnsupportedToolchainError::CompilerOsMismatch {
      compiler: compiler.to_string(),
      os: settings.os,
    })
  }
}
