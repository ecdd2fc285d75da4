//! End-to-end recipe runs.

use std::fs;

use lzrecipe_lib::RecipeError;
use lzrecipe_lib::exec::BuildError;
use lzrecipe_lib::layout::PackagingError;
use lzrecipe_lib::metadata::PackageInfo;

use super::common::Workspace;

#[tokio::test]
async fn static_build_produces_complete_package() {
  let ws = Workspace::new();
  let recipe = ws.recipe(ws.settings(false));
  let outcome = recipe.run().await.unwrap();

  let pkg = ws.package_dir();
  assert_eq!(outcome.package_dir, pkg);
  for file in [
    "include/lzma.h",
    "include/lzma/version.h",
    "lib/liblzma.a",
    "lib/pkgconfig/liblzma.pc",
    "licenses/COPYING",
    "package_info.json",
  ] {
    assert!(pkg.join(file).is_file(), "{} missing", file);
  }

  let info = PackageInfo::read(&pkg).unwrap();
  assert_eq!(info.name, "lzma");
  assert_eq!(info.strategy, "autotools");
  assert_eq!(info.package_id, outcome.package_id);
  assert_eq!(info.link.libs, vec!["lzma"]);
  assert_eq!(info.link.defines, vec!["LZMA_API_STATIC"]);
  assert_eq!(info.link.build_dirs, vec!["lib/pkgconfig"]);
  assert_eq!(info.commit, None);
}

#[tokio::test]
async fn configure_receives_flags_and_environment() {
  let ws = Workspace::new();
  let recipe = ws.recipe(ws.settings(false));
  recipe.run().await.unwrap();

  let build_dir = ws.build_dir(&recipe);
  let args = fs::read_to_string(build_dir.join(".configure-args")).unwrap();
  for flag in [
    "--disable-xz",
    "--disable-xzdec",
    "--disable-lzmadec",
    "--disable-lzmainfo",
    "--disable-scripts",
    "--disable-doc",
    "--with-pic",
    "--enable-static",
    "--disable-shared",
  ] {
    assert!(args.split_whitespace().any(|a| a == flag), "{} missing from {}", flag, args);
  }
  assert!(!args.contains("--enable-debug"));

  let env = fs::read_to_string(build_dir.join(".configure-env")).unwrap();
  assert!(env.lines().any(|l| l == "CFLAGS=-m64 -O3"), "{}", env);
  assert!(env.lines().any(|l| l == "CPPFLAGS=-DNDEBUG"), "{}", env);

  let calls = fs::read_to_string(build_dir.join(".make-calls")).unwrap();
  let calls: Vec<&str> = calls.lines().collect();
  assert_eq!(calls[0], "-j3");
  assert!(calls[1].starts_with("install DESTDIR="));
}

#[tokio::test]
async fn shared_build_has_no_static_define() {
  let ws = Workspace::new();
  let outcome = ws.recipe(ws.settings(true)).run().await.unwrap();

  assert!(ws.package_dir().join("lib/liblzma.so").is_file());
  assert!(!ws.package_dir().join("lib/liblzma.a").exists());
  assert!(outcome.metadata.defines.is_empty());
  assert_eq!(outcome.metadata.libs, vec!["lzma"]);
}

#[tokio::test]
async fn source_tree_is_left_untouched() {
  let ws = Workspace::new();
  ws.recipe(ws.settings(false)).run().await.unwrap();

  assert!(!ws.source_dir().join(".configure-args").exists());
  assert!(!ws.source_dir().join(".make-calls").exists());
}

#[tokio::test]
async fn companion_tool_in_install_fails_packaging() {
  let ws = Workspace::new();
  fs::write(ws.source_dir().join(".install-tools"), "").unwrap();

  let err = ws.recipe(ws.settings(false)).run().await.unwrap_err();
  assert!(
    matches!(err, RecipeError::Packaging(PackagingError::UnexpectedArtifact(_))),
    "{:?}",
    err
  );
  assert!(!ws.package_dir().exists());
}

#[tokio::test]
async fn missing_make_is_a_build_error() {
  let ws = Workspace::new();
  fs::remove_file(ws.path().join("make")).unwrap();

  let err = ws.recipe(ws.settings(false)).run().await.unwrap_err();
  assert!(matches!(err, RecipeError::Build(BuildError::Spawn { .. })), "{:?}", err);
  assert!(!ws.package_dir().exists());
}

#[tokio::test]
async fn missing_source_is_a_fetch_error() {
  let ws = Workspace::new();
  fs::remove_dir_all(ws.source_dir()).unwrap();

  let err = ws.recipe(ws.settings(false)).run().await.unwrap_err();
  assert!(matches!(err, RecipeError::Fetch(_)), "{:?}", err);
}
