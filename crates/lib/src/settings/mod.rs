//! Build configuration.
//!
//! [`BuildSettings`] is the complete, immutable description of one package
//! build: target OS and architecture, compiler, build type, and the two
//! package options (`shared`, `fPIC`). Everything downstream (strategy, flags,
//! link metadata, package id) is a pure function of it.
//!
//! Settings start from the detected host, then a JSON profile, then
//! `key=value` overrides, and are finally [normalised](BuildSettings::normalized).

mod compiler;
mod profile;

pub use compiler::{Compiler, CompilerKind};
pub use profile::{SettingsBuilder, parse_assignment};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::Platform;
use crate::platform::arch::Arch;
use crate::platform::os::Os;
use crate::util::hash::Hashable;

/// Errors raised while assembling settings.
#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("invalid value '{value}' for '{key}'")]
  InvalidValue { key: String, value: String },

  #[error("unknown setting '{0}'")]
  UnknownSetting(String),

  #[error("unknown option '{0}'")]
  UnknownOption(String),

  #[error("expected key=value, got '{0}'")]
  MalformedAssignment(String),

  #[error("host platform is not supported; set os and arch explicitly")]
  UnsupportedHost,

  #[error("failed to read profile '{path}': {source}")]
  ReadProfile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse profile '{path}': {source}")]
  ParseProfile {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum BuildType {
  Debug,
  #[default]
  Release,
  RelWithDebInfo,
  MinSizeRel,
}

impl BuildType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "Debug",
      Self::Release => "Release",
      Self::RelWithDebInfo => "RelWithDebInfo",
      Self::MinSizeRel => "MinSizeRel",
    }
  }

  pub fn is_debug(&self) -> bool {
    matches!(self, Self::Debug)
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildType {
  type Err = SettingsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "debug" => Ok(Self::Debug),
      "release" => Ok(Self::Release),
      "relwithdebinfo" => Ok(Self::RelWithDebInfo),
      "minsizerel" => Ok(Self::MinSizeRel),
      _ => Err(SettingsError::InvalidValue {
        key: "build_type".to_string(),
        value: s.to_string(),
      }),
    }
  }
}

impl TryFrom<String> for BuildType {
  type Error = SettingsError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<BuildType> for &'static str {
  fn from(build_type: BuildType) -> Self {
    build_type.as_str()
  }
}

/// How consumers link against the produced library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
  Static,
  Shared,
}

fn default_fpic() -> Option<bool> {
  Some(true)
}

/// Package options.
///
/// `fpic` is `None` once the option has been removed for a toolchain that has
/// no notion of position-independent code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Options {
  #[serde(default)]
  pub shared: bool,
  #[serde(rename = "fPIC", default = "default_fpic", skip_serializing_if = "Option::is_none")]
  pub fpic: Option<bool>,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      shared: false,
      fpic: default_fpic(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildSettings {
  pub os: Os,
  pub arch: Arch,
  pub compiler: Compiler,
  #[serde(default)]
  pub build_type: BuildType,
  #[serde(default)]
  pub options: Options,
}

impl Hashable for BuildSettings {}

impl BuildSettings {
  /// Settings for a native build on `platform` with its default compiler.
  pub fn for_platform(platform: Platform) -> Self {
    Self {
      os: platform.os,
      arch: platform.arch,
      compiler: Compiler::default_for(platform.os),
      build_type: BuildType::default(),
      options: Options::default(),
    }
  }

  /// Settings for a native build on the current host.
  pub fn detect() -> Result<Self, SettingsError> {
    let platform = Platform::current().ok_or(SettingsError::UnsupportedHost)?;
    Ok(Self::for_platform(platform))
  }

  /// Drop options that do not apply to the chosen toolchain.
  ///
  /// Visual Studio has no `fPIC` option, so it is removed rather than left
  /// at a value that would be ignored.
  pub fn normalized(mut self) -> Self {
    if self.compiler.is_visual_studio() {
      self.options.fpic = None;
    }
    self
  }

  pub fn linkage(&self) -> Linkage {
    if self.options.shared {
      Linkage::Shared
    } else {
      Linkage::Static
    }
  }

  pub fn pic_requested(&self) -> bool {
    self.options.fpic.unwrap_or(false)
  }

  pub fn platform(&self) -> Platform {
    Platform::new(self.arch, self.os)
  }

  /// Set a single setting by its dotted name.
  pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
    match key {
      "os" => self.os = value.parse()?,
      "arch" => self.arch = value.parse()?,
      "build_type" => self.build_type = value.parse()?,
      "compiler" => {
        let kind = CompilerKind::from(value);
        if kind != self.compiler.kind {
          self.compiler = Compiler::new(kind, None);
        }
      }
      "compiler.version" => self.compiler.version = Some(value.to_string()),
      _ => return Err(SettingsError::UnknownSetting(key.to_string())),
    }
    Ok(())
  }

  /// Set a single package option.
  pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
    let flag = parse_bool(key, value)?;
    match key {
      "shared" => self.options.shared = flag,
      "fPIC" | "fpic" => self.options.fpic = Some(flag),
      _ => return Err(SettingsError::UnknownOption(key.to_string())),
    }
    Ok(())
  }
}

impl fmt::Display for BuildSettings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {} {} {} shared={}",
      self.os, self.arch, self.compiler, self.build_type, self.options.shared
    )?;
    if let Some(fpic) = self.options.fpic {
      write!(f, " fPIC={}", fpic)?;
    }
    Ok(())
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
  match value.to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Ok(true),
    "false" | "0" | "no" | "off" => Ok(false),
    _ => Err(SettingsError::InvalidValue {
      key: key.to_string(),
      value: value.to_string(),
    }),
  }
}
