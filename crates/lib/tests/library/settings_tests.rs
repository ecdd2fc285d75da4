//! Settings assembly through profiles and overrides.

use std::fs;

use lzrecipe_lib::Recipe;
use lzrecipe_lib::platform::Platform;
use lzrecipe_lib::platform::arch::Arch;
use lzrecipe_lib::platform::os::Os;
use lzrecipe_lib::settings::{BuildSettings, CompilerKind, SettingsBuilder};

use super::common::Workspace;

fn base() -> BuildSettings {
  BuildSettings::for_platform(Platform::new(Arch::X86_64, Os::Linux))
}

#[test]
fn profile_then_overrides() {
  let ws = Workspace::new();
  let profile = ws.path().join("windows.json");
  fs::write(
    &profile,
    r#"{
  "settings": { "os": "Windows", "arch": "x86", "compiler": "Visual Studio", "compiler.version": "15" },
  "options": { "shared": true, "fPIC": true }
}"#,
  )
  .unwrap();

  let settings = SettingsBuilder::new()
    .with_base(base())
    .with_profile(&profile)
    .setting("build_type", "Debug")
    .build()
    .unwrap();

  assert_eq!(settings.compiler.kind, CompilerKind::VisualStudio);
  assert_eq!(settings.options.fpic, None);

  let plan = Recipe::new(settings).plan().unwrap();
  assert_eq!(plan.strategy, "msbuild");
  assert_eq!(
    plan.flags,
    vec!["/t:liblzma_dll", "/p:Configuration=Debug", "/p:Platform=Win32"]
  );
}

#[test]
fn unknown_visual_studio_version_is_rejected() {
  let settings = SettingsBuilder::new()
    .with_base(base())
    .setting("os", "Windows")
    .setting("compiler", "Visual Studio")
    .setting("compiler.version", "17")
    .build()
    .unwrap();

  let err = Recipe::new(settings).plan().unwrap_err();
  assert!(err.to_string().contains("17"), "{}", err);
}
