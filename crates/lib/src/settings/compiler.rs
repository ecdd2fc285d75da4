//! Compiler identity and version.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::platform::os::Os;

/// The compiler family a package is built with.
///
/// Unrecognised names are kept verbatim so that strategy selection, not
/// parsing, is where an unsupported toolchain is reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompilerKind {
  Gcc,
  Clang,
  AppleClang,
  VisualStudio,
  Other(String),
}

impl CompilerKind {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Gcc => "gcc",
      Self::Clang => "clang",
      Self::AppleClang => "apple-clang",
      Self::VisualStudio => "Visual Studio",
      Self::Other(name) => name,
    }
  }
}

impl From<&str> for CompilerKind {
  fn from(name: &str) -> Self {
    match name.to_ascii_lowercase().as_str() {
      "gcc" => Self::Gcc,
      "clang" => Self::Clang,
      "apple-clang" => Self::AppleClang,
      "visual studio" | "msvc" => Self::VisualStudio,
      _ => Self::Other(name.to_string()),
    }
  }
}

impl From<String> for CompilerKind {
  fn from(name: String) -> Self {
    Self::from(name.as_str())
  }
}

impl From<CompilerKind> for String {
  fn from(kind: CompilerKind) -> Self {
    kind.as_str().to_string()
  }
}

impl fmt::Display for CompilerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Compiler {
  #[serde(rename = "name")]
  pub kind: CompilerKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

impl Compiler {
  pub fn new(kind: CompilerKind, version: Option<&str>) -> Self {
    Self {
      kind,
      version: version.map(str::to_string),
    }
  }

  /// The compiler a host OS uses when none is configured.
  pub fn default_for(os: Os) -> Self {
    match os {
      Os::Linux => Self::new(CompilerKind::Gcc, None),
      Os::FreeBsd => Self::new(CompilerKind::Clang, None),
      Os::MacOs => Self::new(CompilerKind::AppleClang, None),
      Os::Windows => Self::new(CompilerKind::VisualStudio, Some("16")),
    }
  }

  pub fn is_visual_studio(&self) -> bool {
    self.kind == CompilerKind::VisualStudio
  }

  /// Leading integer of the version string ("16", "15.9" and "9.3.0" all work).
  pub fn major_version(&self) -> Option<u32> {
    let version = self.version.as_deref()?;
    version.split('.').next()?.trim().parse().ok()
  }
}

impl fmt::Display for Compiler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.version {
      Some(version) => write!(f, "{} {}", self.kind, version),
      None => write!(f, "{}", self.kind),
    }
  }
}
