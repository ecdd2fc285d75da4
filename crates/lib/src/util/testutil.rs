//! Test utilities for lzrecipe-lib.
//!
//! Besides a cross-platform shell helper this provides a fake upstream tree
//! and fake `configure`/`make` scripts, so the whole recipe can run without a
//! C toolchain.

use std::fs;
use std::path::{Path, PathBuf};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Write an executable script.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
  path.to_path_buf()
}

/// Records its arguments and the prefix for the fake make.
const FAKE_CONFIGURE: &str = r#"echo "$@" > .configure-args
for arg in "$@"; do
  case "$arg" in
    --prefix=*) echo "${arg#--prefix=}" > .prefix ;;
  esac
done
"#;

/// `make install DESTDIR=...` installs headers and a static library under
/// the recorded prefix; plain `make` fails when a `.fail` marker exists.
const FAKE_MAKE: &str = r#"set -e
case "$1" in
  install)
    root="${2#DESTDIR=}$(cat .prefix)"
    mkdir -p "$root/include/lzma" "$root/lib/pkgconfig"
    cp src/liblzma/api/lzma.h "$root/include/"
    touch "$root/lib/liblzma.a"
    ;;
  *)
    if [ -f .fail ]; then
      echo "liblzma: compilation failed" >&2
      exit 2
    fi
    ;;
esac
"#;

/// A minimal upstream tree: license, public header, configure script.
#[cfg(unix)]
pub fn fake_source(root: &Path) -> PathBuf {
  let src = root.join("xz");
  fs::create_dir_all(src.join("src/liblzma/api/lzma")).unwrap();
  fs::write(src.join("COPYING"), "XZ Utils Licensing\n").unwrap();
  fs::write(src.join("src/liblzma/api/lzma.h"), "#define LZMA_H\n").unwrap();
  write_script(&src.join("configure"), FAKE_CONFIGURE);
  src
}

/// A `make` replacement understanding the fake source tree.
#[cfg(unix)]
pub fn fake_make(dir: &Path) -> String {
  write_script(&dir.join("make"), FAKE_MAKE).to_string_lossy().into_owned()
}
