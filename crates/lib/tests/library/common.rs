//! Shared helpers for library integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use lzrecipe_lib::platform::Platform;
use lzrecipe_lib::platform::arch::Arch;
use lzrecipe_lib::platform::os::Os;
use lzrecipe_lib::settings::BuildSettings;
use lzrecipe_lib::strategy::Tools;
use lzrecipe_lib::Recipe;
use lzrecipe_lib::source::SourceSpec;
use tempfile::TempDir;

/// Write an executable shell script.
pub fn write_script(path: &Path, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
  path.to_path_buf()
}

/// Isolated workspace with a fake upstream tree and a fake `make`.
///
/// The fake `make install` honours `DESTDIR` and installs what a real
/// `liblzma` install would for the configured linkage.
pub struct Workspace {
  pub temp: TempDir,
}

impl Workspace {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("xz");
    fs::create_dir_all(src.join("src/liblzma/api/lzma")).unwrap();
    fs::write(src.join("COPYING"), "XZ Utils Licensing\n").unwrap();
    fs::write(src.join("src/liblzma/api/lzma.h"), "").unwrap();
    fs::write(src.join("src/liblzma/api/lzma/version.h"), "").unwrap();
    fs::write(src.join("autogen.sh"), "").unwrap();
    write_script(
      &src.join("configure"),
      r#"echo "$@" > .configure-args
env > .configure-env
for arg in "$@"; do
  case "$arg" in
    --prefix=*) echo "${arg#--prefix=}" > .prefix ;;
    --enable-shared) touch .shared ;;
  esac
done
"#,
    );
    write_script(
      &temp.path().join("make"),
      r#"set -e
echo "$@" >> .make-calls
case "$1" in
  install)
    root="${2#DESTDIR=}$(cat .prefix)"
    mkdir -p "$root/include/lzma" "$root/lib/pkgconfig" "$root/bin"
    cp src/liblzma/api/lzma.h "$root/include/"
    cp src/liblzma/api/lzma/version.h "$root/include/lzma/"
    echo "prefix=$(cat .prefix)" > "$root/lib/pkgconfig/liblzma.pc"
    if [ -f .shared ]; then
      touch "$root/lib/liblzma.so"
    else
      touch "$root/lib/liblzma.a"
    fi
    if [ -f .install-tools ]; then
      touch "$root/bin/xz"
    fi
    ;;
esac
"#,
    );
    Self { temp }
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  pub fn source_dir(&self) -> PathBuf {
    self.path().join("xz")
  }

  pub fn package_dir(&self) -> PathBuf {
    self.path().join("packages/lzma")
  }

  /// Native Linux x86_64 gcc settings.
  pub fn settings(&self, shared: bool) -> BuildSettings {
    let mut settings = BuildSettings::for_platform(Platform::new(Arch::X86_64, Os::Linux));
    settings.options.shared = shared;
    settings.normalized()
  }

  pub fn recipe(&self, settings: BuildSettings) -> Recipe {
    Recipe::new(settings)
      .with_source(SourceSpec::Path(self.source_dir()))
      .with_cache_dir(self.path().join("cache"))
      .with_base_dir(self.path())
      .with_package_dir(self.package_dir())
      .with_host(Some(Platform::new(Arch::X86_64, Os::Linux)))
      .with_jobs(3)
      .with_tools(Tools {
        make: self.path().join("make").to_string_lossy().into_owned(),
        ..Tools::default()
      })
  }

  /// The build directory the recipe used.
  pub fn build_dir(&self, recipe: &Recipe) -> PathBuf {
    recipe.build_dir(&recipe.package_id().unwrap())
  }
}
