//! External process execution.
//!
//! Build steps are recorded as [`ExecOpts`] and run one at a time. Output is
//! captured so that a failing step can surface what the tool printed.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Number of trailing output lines kept in a [`BuildError`] message.
const OUTPUT_TAIL_LINES: usize = 20;

/// A single external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOpts {
  pub bin: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub args: Vec<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub env: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cwd: Option<PathBuf>,
}

impl ExecOpts {
  pub fn new(bin: &str) -> Self {
    Self {
      bin: bin.to_string(),
      args: Vec::new(),
      env: BTreeMap::new(),
      cwd: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn with_env(mut self, key: &str, value: impl Into<String>) -> Self {
    self.env.insert(key.to_string(), value.into());
    self
  }

  pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
    self.cwd = Some(cwd.as_ref().to_path_buf());
    self
  }

  /// The command line as a shell would show it (without env or cwd).
  pub fn command_line(&self) -> String {
    std::iter::once(self.bin.as_str())
      .chain(self.args.iter().map(String::as_str))
      .map(quote_arg)
      .collect::<Vec<_>>()
      .join(" ")
  }
}

impl fmt::Display for ExecOpts {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (key, value) in &self.env {
      write!(f, "{}={} ", key, quote_arg(value))?;
    }
    write!(f, "{}", self.command_line())
  }
}

fn quote_arg(arg: &str) -> String {
  if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
    arg.to_string()
  } else {
    format!("'{}'", arg.replace('\'', r"'\''"))
  }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
  pub stdout: String,
  pub stderr: String,
}

/// A build step could not be run or exited unsuccessfully.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("failed to start `{cmd}`: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  #[error("`{cmd}` failed with {}{}", exit_status(.code), output_tail(.stdout, .stderr))]
  Failed {
    cmd: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
  },
}

impl BuildError {
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      Self::Spawn { .. } => None,
      Self::Failed { code, .. } => *code,
    }
  }
}

fn exit_status(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

fn output_tail(stdout: &str, stderr: &str) -> String {
  let source = if stderr.trim().is_empty() { stdout } else { stderr };
  let lines: Vec<&str> = source.trim_end().lines().collect();
  if lines.is_empty() {
    return String::new();
  }
  let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
  format!("\n{}", lines[start..].join("\n"))
}

/// Run a command to completion, capturing its output.
///
/// The command inherits the current environment with `opts.env` layered on
/// top, since build tools need the host toolchain on `PATH`.
pub async fn execute(opts: &ExecOpts) -> Result<ExecOutput, BuildError> {
  let cmd = opts.command_line();
  info!(cmd = %cmd, "running");

  let mut command = Command::new(&opts.bin);
  command.args(&opts.args).envs(&opts.env).kill_on_drop(true);
  if let Some(cwd) = &opts.cwd {
    command.current_dir(cwd);
  }

  debug!(cwd = ?opts.cwd, env = ?opts.env, "spawning process");

  let output = command.output().await.map_err(|source| BuildError::Spawn {
    cmd: cmd.clone(),
    source,
  })?;

  let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
  let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

  if !output.status.success() {
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }

    return Err(BuildError::Failed {
      cmd,
      code: output.status.code(),
      stdout,
      stderr,
    });
  }

  Ok(ExecOutput { stdout, stderr })
}
