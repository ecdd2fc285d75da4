//! Layered settings assembly: host defaults, profile file, then overrides.
//!
//! A profile is a small JSON document:
//!
//! ```json
//! {
//!   "settings": { "os": "Windows", "compiler": "Visual Studio", "compiler.version": "16" },
//!   "options": { "shared": true }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{BuildSettings, SettingsError};

#[derive(Debug, Default, Deserialize)]
struct Profile {
  #[serde(default)]
  settings: BTreeMap<String, String>,
  #[serde(default)]
  options: BTreeMap<String, OptionValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OptionValue {
  Bool(bool),
  Text(String),
}

impl OptionValue {
  fn as_text(&self) -> String {
    match self {
      Self::Bool(b) => b.to_string(),
      Self::Text(s) => s.clone(),
    }
  }
}

/// Split `key=value`, trimming whitespace around both halves.
pub fn parse_assignment(raw: &str) -> Result<(String, String), SettingsError> {
  let (key, value) = raw
    .split_once('=')
    .ok_or_else(|| SettingsError::MalformedAssignment(raw.to_string()))?;
  let (key, value) = (key.trim(), value.trim());
  if key.is_empty() || value.is_empty() {
    return Err(SettingsError::MalformedAssignment(raw.to_string()));
  }
  Ok((key.to_string(), value.to_string()))
}

/// Builds [`BuildSettings`] from the layered sources.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
  base: Option<BuildSettings>,
  profile: Option<PathBuf>,
  settings: Vec<(String, String)>,
  options: Vec<(String, String)>,
}

impl SettingsBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start from these settings instead of the detected host.
  pub fn with_base(mut self, base: BuildSettings) -> Self {
    self.base = Some(base);
    self
  }

  pub fn with_profile(mut self, path: impl AsRef<Path>) -> Self {
    self.profile = Some(path.as_ref().to_path_buf());
    self
  }

  pub fn setting(mut self, key: &str, value: &str) -> Self {
    self.settings.push((key.to_string(), value.to_string()));
    self
  }

  pub fn option(mut self, key: &str, value: &str) -> Self {
    self.options.push((key.to_string(), value.to_string()));
    self
  }

  /// Add raw `key=value` setting assignments.
  pub fn settings_from_args<S: AsRef<str>>(mut self, args: &[S]) -> Result<Self, SettingsError> {
    for arg in args {
      self.settings.push(parse_assignment(arg.as_ref())?);
    }
    Ok(self)
  }

  /// Add raw `key=value` option assignments.
  pub fn options_from_args<S: AsRef<str>>(mut self, args: &[S]) -> Result<Self, SettingsError> {
    for arg in args {
      self.options.push(parse_assignment(arg.as_ref())?);
    }
    Ok(self)
  }

  /// Resolve all layers and normalise the result.
  pub fn build(self) -> Result<BuildSettings, SettingsError> {
    let mut settings = match self.base {
      Some(base) => base,
      None => BuildSettings::detect()?,
    };

    if let Some(path) = &self.profile {
      let profile = load_profile(path)?;
      debug!(path = %path.display(), "applying profile");
      for (key, value) in &profile.settings {
        settings.set(key, value)?;
      }
      for (key, value) in &profile.options {
        settings.set_option(key, &value.as_text())?;
      }
    }

    for (key, value) in &self.settings {
      settings.set(key, value)?;
    }
    for (key, value) in &self.options {
      settings.set_option(key, value)?;
    }

    Ok(settings.normalized())
  }
}

fn load_profile(path: &Path) -> Result<Profile, SettingsError> {
  let content = fs::read_to_string(path).map_err(|source| SettingsError::ReadProfile {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| SettingsError::ParseProfile {
    path: path.to_path_buf(),
    source,
  })
}
