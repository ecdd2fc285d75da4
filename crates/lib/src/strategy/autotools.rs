//! The configure-script build path.

use std::path::{Component, Path, PathBuf};

use crate::exec::ExecOpts;
use crate::layout::{PackageLayout, PackagingError};
use crate::platform::arch::Arch;
use crate::platform::os::Os;
use crate::settings::{BuildSettings, BuildType, CompilerKind, Linkage};
use crate::toolchain::gnu_triple;

use super::{Backend, BuildContext, BuildPlan};

/// Upstream command-line tools and extras that are never packaged.
const DISABLED_FEATURES: &[&str] = &[
  "--disable-xz",
  "--disable-xzdec",
  "--disable-lzmadec",
  "--disable-lzmainfo",
  "--disable-scripts",
  "--disable-doc",
];

/// Whether `tree` lacks a generated `configure` but can produce one.
///
/// Git checkouts ship `autogen.sh` only; release tarballs ship `configure`.
pub fn needs_bootstrap(tree: &Path) -> bool {
  !tree.join("configure").exists() && tree.join("autogen.sh").exists()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autotools {
  settings: BuildSettings,
}

impl Autotools {
  pub fn new(settings: &BuildSettings) -> Self {
    Self {
      settings: settings.clone(),
    }
  }

  /// MinGW on a Windows host has to go through the MSYS2 shell.
  fn needs_msys(&self, host: Option<&crate::platform::Platform>) -> bool {
    self.settings.os == Os::Windows
      && self.settings.compiler.kind == CompilerKind::Gcc
      && host.map(|h| h.os == Os::Windows).unwrap_or(false)
  }

  /// `--build`/`--host` when the target differs from the build machine.
  fn cross_args(&self, host: Option<&crate::platform::Platform>) -> Vec<String> {
    let Some(host) = host else {
      return Vec::new();
    };
    if *host == self.settings.platform() {
      return Vec::new();
    }
    match (gnu_triple(host.arch, host.os), gnu_triple(self.settings.arch, self.settings.os)) {
      (Some(build), Some(target)) => vec![format!("--build={}", build), format!("--host={}", target)],
      _ => Vec::new(),
    }
  }

  fn arch_flag(&self) -> Option<&'static str> {
    match self.settings.arch {
      Arch::X86 => Some("-m32"),
      Arch::X86_64 => Some("-m64"),
      _ => None,
    }
  }

  fn build_type_flags(&self) -> &'static [&'static str] {
    match self.settings.build_type {
      BuildType::Debug => &["-g"],
      BuildType::Release => &["-O3"],
      BuildType::RelWithDebInfo => &["-O2", "-g"],
      BuildType::MinSizeRel => &["-Os"],
    }
  }

  /// Compiler environment for configure.
  pub fn environment(&self) -> Vec<(&'static str, String)> {
    let mut cflags: Vec<&str> = self.arch_flag().into_iter().collect();
    cflags.extend_from_slice(self.build_type_flags());

    let mut env = vec![("CFLAGS", cflags.join(" "))];
    if let Some(arch) = self.arch_flag() {
      env.push(("LDFLAGS", arch.to_string()));
    }
    if !self.settings.build_type.is_debug() {
      env.push(("CPPFLAGS", "-DNDEBUG".to_string()));
    }
    env
  }

  fn wrap(&self, step: ExecOpts, ctx: &BuildContext<'_>) -> ExecOpts {
    if !self.needs_msys(ctx.host.as_ref()) {
      return step;
    }
    let mut wrapped = ExecOpts::new(&ctx.tools.bash)
      .arg("-lc")
      .arg(step.command_line());
    wrapped.env = step.env;
    wrapped.cwd = step.cwd;
    wrapped
  }
}

impl Backend for Autotools {
  fn flags(&self) -> Vec<String> {
    let mut args: Vec<String> = DISABLED_FEATURES.iter().map(|s| s.to_string()).collect();

    if self.settings.os != Os::Windows && self.settings.pic_requested() {
      args.push("--with-pic".to_string());
    }
    match self.settings.linkage() {
      Linkage::Shared => args.extend(["--disable-static".to_string(), "--enable-shared".to_string()]),
      Linkage::Static => args.extend(["--enable-static".to_string(), "--disable-shared".to_string()]),
    }
    if self.settings.build_type.is_debug() {
      args.push("--enable-debug".to_string());
    }
    args
  }

  fn plan(&self, ctx: &BuildContext<'_>) -> BuildPlan {
    let mut plan = BuildPlan::new();
    let shell = ctx.tools.shell.as_str();

    if ctx.bootstrap {
      plan.push(self.wrap(ExecOpts::new(shell).arg("autogen.sh").with_cwd(ctx.build_dir), ctx));
    }

    let mut configure = ExecOpts::new(shell)
      .arg("./configure")
      .args(self.flags())
      .arg(format!("--prefix={}", ctx.package_dir.display()))
      .args(self.cross_args(ctx.host.as_ref()))
      .with_cwd(ctx.build_dir);
    for (key, value) in self.environment() {
      configure = configure.with_env(key, value);
    }
    plan.push(self.wrap(configure, ctx));

    plan.push(self.wrap(
      ExecOpts::new(&ctx.tools.make)
        .arg(format!("-j{}", ctx.jobs.max(1)))
        .with_cwd(ctx.build_dir),
      ctx,
    ));

    plan.push(self.wrap(
      ExecOpts::new(&ctx.tools.make)
        .arg("install")
        .arg(format!("DESTDIR={}", ctx.staging_dir.display()))
        .with_cwd(ctx.build_dir),
      ctx,
    ));

    plan
  }

  fn staged_root(&self, ctx: &BuildContext<'_>) -> PathBuf {
    destdir_join(ctx.staging_dir, ctx.package_dir)
  }

  fn stage(&self, ctx: &BuildContext<'_>, layout: &PackageLayout) -> Result<(), PackagingError> {
    if !layout.root().is_dir() {
      return Err(PackagingError::missing("installed tree", layout.root()));
    }
    layout.create_dirs()?;
    layout.copy_license(ctx.build_dir)?;
    layout.require_headers()?;

    match self.settings.linkage() {
      Linkage::Static => {
        layout.require("static library", "lib/liblzma.a")?;
      }
      Linkage::Shared => match self.settings.os {
        Os::MacOs => {
          layout.require("shared library", "lib/liblzma.dylib")?;
        }
        Os::Windows => {
          layout.require("import library", "lib/liblzma.dll.a")?;
          layout.require_any("shared library", &layout.bin_dir(), "dll")?;
        }
        Os::Linux | Os::FreeBsd => {
          layout.require("shared library", "lib/liblzma.so")?;
        }
      },
    }

    layout.reject_companion_tools()
  }
}

/// Where `make install DESTDIR=<staging>` puts files for `prefix`.
///
/// A drive prefix becomes a lowercase directory, matching the MSYS2 mount
/// layout (`C:\pkg` installs under `<staging>/c/pkg`).
fn destdir_join(staging: &Path, prefix: &Path) -> PathBuf {
  let mut root = staging.to_path_buf();
  for component in prefix.components() {
    match component {
      Component::Prefix(p) => {
        let drive = p.as_os_str().to_string_lossy().trim_end_matches(':').to_lowercase();
        root.push(drive);
      }
      Component::RootDir | Component::CurDir => {}
      Component::ParentDir => {
        root.pop();
      }
      Component::Normal(part) => root.push(part),
    }
  }
  root
}
