//! The build orchestrator.
//!
//! A [`Recipe`] runs the fixed pipeline:
//!
//! 1. Settings are taken as given (already normalised)
//! 2. The source tree is acquired (cloned or reused)
//! 3. A strategy is selected from the settings
//! 4. The source is copied into a private build directory and built
//! 5. Artifacts are staged into a package layout with link metadata
//! 6. The staged layout replaces the package directory
//!
//! The package directory is only touched in the last step, so any failure
//! before it leaves no package behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::consts::APP_NAME;
use crate::error::RecipeError;
use crate::layout::{PackageLayout, finalize};
use crate::metadata::{BUILD_DIR_PKGCONFIG, LinkMetadata, PackageInfo, defines_for};
use crate::platform::Platform;
use crate::platform::paths;
use crate::settings::BuildSettings;
use crate::source::{SourceSpec, acquire, locate};
use crate::strategy::{Backend, BuildContext, BuildPlan, Tools, needs_bootstrap, select};
use crate::util::fs::{copy_tree, remove_dir_if_exists};
use crate::util::hash::{Hashable, PackageId};

/// Entries of the source tree never copied into a build directory.
const BUILD_TREE_EXCLUDES: &[&str] = &[".git"];

/// One configured package build.
#[derive(Debug, Clone)]
pub struct Recipe {
  settings: BuildSettings,
  source: SourceSpec,
  package_dir: Option<PathBuf>,
  cache_dir: PathBuf,
  base_dir: PathBuf,
  tools: Tools,
  jobs: usize,
  host: Option<Platform>,
}

/// What a dry run would do.
#[derive(Debug, Clone, Serialize)]
pub struct RecipePlan {
  pub package_id: PackageId,
  pub settings: BuildSettings,
  pub strategy: String,
  pub flags: Vec<String>,
  pub build_dir: PathBuf,
  pub package_dir: PathBuf,
  pub steps: BuildPlan,
  pub metadata: LinkPreview,
}

/// Link metadata known before building; libraries are only known afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct LinkPreview {
  pub defines: Vec<String>,
  pub build_dirs: Vec<String>,
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
  pub package_id: PackageId,
  pub package_dir: PathBuf,
  pub strategy: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub commit: Option<String>,
  pub metadata: LinkMetadata,
}

impl Recipe {
  /// A recipe for `settings` building upstream `master` into the cache.
  pub fn new(settings: BuildSettings) -> Self {
    Self {
      settings,
      source: SourceSpec::upstream(),
      package_dir: None,
      cache_dir: paths::cache_dir(),
      base_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
      tools: Tools::from_env(),
      jobs: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
      host: Platform::current(),
    }
  }

  pub fn with_source(mut self, source: SourceSpec) -> Self {
    self.source = source;
    self
  }

  /// Put the finished package at `dir` instead of the cache.
  pub fn with_package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.package_dir = Some(dir.into());
    self
  }

  /// Cache root for sources, build trees, and default packages.
  ///
  /// A relative directory is resolved against the base directory.
  pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cache_dir = dir.into();
    self
  }

  /// Directory relative source and package paths are resolved against.
  pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.base_dir = dir.into();
    self
  }

  pub fn with_tools(mut self, tools: Tools) -> Self {
    self.tools = tools;
    self
  }

  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = jobs.max(1);
    self
  }

  pub fn with_host(mut self, host: Option<Platform>) -> Self {
    self.host = host;
    self
  }

  pub fn settings(&self) -> &BuildSettings {
    &self.settings
  }

  pub fn package_id(&self) -> Result<PackageId, RecipeError> {
    self.settings.compute_hash().map_err(RecipeError::Hash)
  }

  /// Absolute cache root.
  pub fn cache_dir(&self) -> PathBuf {
    self.absolute(&self.cache_dir)
  }

  /// Build directory for `id`; wiped and recreated on every run.
  pub fn build_dir(&self, id: &PackageId) -> PathBuf {
    paths::build_root(&self.cache_dir()).join(&id.0)
  }

  /// Package directory, made absolute so it can serve as install prefix.
  pub fn package_dir(&self, id: &PackageId) -> PathBuf {
    match &self.package_dir {
      Some(dir) => self.absolute(dir),
      None => paths::packages_dir(&self.cache_dir()).join(&id.0),
    }
  }

  fn absolute(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.base_dir.join(path)
    }
  }

  fn sources_dir(&self) -> PathBuf {
    paths::sources_dir(&self.cache_dir())
  }

  /// Resolve strategy, flags, and commands without touching the filesystem.
  pub fn plan(&self) -> Result<RecipePlan, RecipeError> {
    let strategy = select(&self.settings)?;
    let package_id = self.package_id()?;
    let build_dir = self.build_dir(&package_id);
    let package_dir = self.package_dir(&package_id);
    let staging_dir = staging_placeholder(&package_dir);

    // The build tree does not exist yet; judge by the source instead. A git
    // source that is not cloned yet is a checkout without configure.
    let bootstrap = match locate(&self.source, &self.sources_dir(), &self.base_dir) {
      Some(tree) => needs_bootstrap(&tree),
      None => matches!(self.source, SourceSpec::Git { .. }),
    };

    let ctx = self.context(&build_dir, &package_dir, &staging_dir, bootstrap);

    Ok(RecipePlan {
      package_id,
      settings: self.settings.clone(),
      strategy: strategy.name().to_string(),
      flags: strategy.flags(),
      steps: strategy.plan(&ctx),
      build_dir,
      package_dir,
      metadata: LinkPreview {
        defines: defines_for(&self.settings),
        build_dirs: vec![BUILD_DIR_PKGCONFIG.to_string()],
      },
    })
  }

  /// Run the full pipeline.
  pub async fn run(&self) -> Result<BuildOutcome, RecipeError> {
    let strategy = select(&self.settings)?;
    let package_id = self.package_id()?;
    info!(
      package_id = %package_id,
      strategy = %strategy,
      settings = %self.settings,
      "building package"
    );

    let source = acquire(&self.source, &self.sources_dir(), &self.base_dir)?;
    debug!(path = %source.path.display(), commit = ?source.commit, "source ready");

    let build_dir = self.build_dir(&package_id);
    prepare_build_tree(&source.path, &build_dir)?;

    let package_dir = self.package_dir(&package_id);
    let parent = package_dir.parent().unwrap_or(&self.base_dir).to_path_buf();
    std::fs::create_dir_all(&parent).map_err(RecipeError::io(&parent))?;

    // Same filesystem as the package so the final move is a rename
    let staging = tempfile::Builder::new()
      .prefix(&format!(".{}-staging-", APP_NAME))
      .tempdir_in(&parent)
      .map_err(RecipeError::io(&parent))?;

    let ctx = self.context(&build_dir, &package_dir, staging.path(), needs_bootstrap(&build_dir));
    strategy.invoke(&ctx).await?;

    let layout = PackageLayout::new(strategy.staged_root(&ctx));
    strategy.stage(&ctx, &layout)?;

    let link = LinkMetadata::collect(&self.settings, &layout)?;
    let package_info = PackageInfo::new(
      package_id.clone(),
      &self.settings,
      source.commit.clone(),
      strategy.name(),
      link.clone(),
    );
    package_info.write(&layout)?;

    let layout = finalize(layout.root(), &package_dir)?;
    info!(package_id = %package_id, path = %layout.root().display(), "package created");

    Ok(BuildOutcome {
      package_id,
      package_dir: layout.root().to_path_buf(),
      strategy: strategy.name().to_string(),
      commit: source.commit,
      metadata: link,
    })
  }

  fn context<'a>(
    &'a self,
    build_dir: &'a Path,
    package_dir: &'a Path,
    staging_dir: &'a Path,
    bootstrap: bool,
  ) -> BuildContext<'a> {
    BuildContext {
      settings: &self.settings,
      build_dir,
      package_dir,
      staging_dir,
      tools: &self.tools,
      jobs: self.jobs,
      bootstrap,
      host: self.host,
    }
  }
}

/// Replace `build_dir` with a fresh copy of the source tree.
fn prepare_build_tree(source: &Path, build_dir: &Path) -> Result<(), RecipeError> {
  remove_dir_if_exists(build_dir).map_err(RecipeError::io(build_dir))?;
  let copied = copy_tree(source, build_dir, BUILD_TREE_EXCLUDES).map_err(RecipeError::io(build_dir))?;
  debug!(files = copied, path = %build_dir.display(), "prepared build tree");
  Ok(())
}

/// Where a dry run reports the staging area would be.
fn staging_placeholder(package_dir: &Path) -> PathBuf {
  let name = format!(".{}-staging", APP_NAME);
  match package_dir.parent() {
    Some(parent) => parent.join(name),
    None => PathBuf::from(name),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exec::BuildError;
  use crate::platform::arch::Arch;
  use crate::platform::os::Os;
  use crate::settings::{Compiler, CompilerKind};
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn linux_static() -> BuildSettings {
    let mut settings = BuildSettings::for_platform(Platform::new(Arch::X86_64, Os::Linux));
    settings.options.fpic = Some(true);
    settings.normalized()
  }

  fn recipe(temp: &TempDir, settings: BuildSettings) -> Recipe {
    Recipe::new(settings)
      .with_cache_dir(temp.path().join("cache"))
      .with_base_dir(temp.path())
      .with_host(Some(Platform::new(Arch::X86_64, Os::Linux)))
      .with_tools(Tools::default())
      .with_jobs(2)
  }

  #[test]
  fn plan_for_linux_static() {
    let temp = TempDir::new().unwrap();
    let plan = recipe(&temp, linux_static()).plan().unwrap();

    assert_eq!(plan.strategy, "autotools");
    for flag in ["--with-pic", "--enable-static", "--disable-shared"] {
      assert!(plan.flags.contains(&flag.to_string()));
    }
    assert_eq!(plan.metadata.defines, vec!["LZMA_API_STATIC"]);
    assert_eq!(plan.metadata.build_dirs, vec!["lib/pkgconfig"]);
    assert_eq!(plan.package_dir, temp.path().join("cache/packages").join(&plan.package_id.0));
    assert!(!plan.package_dir.exists());
  }

  #[test]
  fn plan_for_visual_studio_shared() {
    let temp = TempDir::new().unwrap();
    let mut settings = BuildSettings::for_platform(Platform::new(Arch::X86_64, Os::Windows));
    settings.compiler = Compiler::new(CompilerKind::VisualStudio, Some("16"));
    settings.options.shared = true;

    let plan = recipe(&temp, settings.normalized()).plan().unwrap();
    assert_eq!(plan.strategy, "msbuild");
    assert!(plan.flags.contains(&"/t:liblzma_dll".to_string()));
    assert!(plan.metadata.defines.is_empty());
    assert_eq!(plan.settings.options.fpic, None);
  }

  #[test]
  fn same_settings_same_directories() {
    let temp = TempDir::new().unwrap();
    let a = recipe(&temp, linux_static()).plan().unwrap();
    let b = recipe(&temp, linux_static()).plan().unwrap();
    assert_eq!(a.package_id, b.package_id);
    assert_eq!(a.build_dir, b.build_dir);

    let mut shared = linux_static();
    shared.options.shared = true;
    let c = recipe(&temp, shared).plan().unwrap();
    assert_ne!(a.package_id, c.package_id);
  }

  #[test]
  fn relative_package_dir_resolves_against_base() {
    let temp = TempDir::new().unwrap();
    let r = recipe(&temp, linux_static()).with_package_dir("out/lzma");
    let id = r.package_id().unwrap();
    assert_eq!(r.package_dir(&id), temp.path().join("out/lzma"));
  }

  #[test]
  fn relative_cache_dir_gives_absolute_prefix() {
    let temp = TempDir::new().unwrap();
    let plan = recipe(&temp, linux_static()).with_cache_dir("lzcache").plan().unwrap();

    let expected = temp.path().join("lzcache/packages").join(&plan.package_id.0);
    assert!(plan.package_dir.is_absolute());
    assert_eq!(plan.package_dir, expected);
    assert_eq!(plan.build_dir, temp.path().join("lzcache/build").join(&plan.package_id.0));

    let configure = plan
      .steps
      .steps()
      .iter()
      .find(|step| step.args.first().map(String::as_str) == Some("./configure"))
      .unwrap();
    assert!(configure.args.contains(&format!("--prefix={}", expected.display())));
  }

  #[test]
  fn dry_run_of_git_checkout_includes_bootstrap() {
    let temp = TempDir::new().unwrap();
    let plan = recipe(&temp, linux_static()).plan().unwrap();
    assert_eq!(plan.steps.steps()[0].command_line(), "sh autogen.sh");
    assert!(!temp.path().join("cache").exists());
  }

  #[test]
  fn dry_run_follows_local_tree() {
    let temp = TempDir::new().unwrap();
    let tree = temp.path().join("xz");
    std::fs::create_dir(&tree).unwrap();
    std::fs::write(tree.join("autogen.sh"), "").unwrap();
    let r = recipe(&temp, linux_static()).with_source(SourceSpec::Path(PathBuf::from("xz")));

    assert_eq!(r.plan().unwrap().steps.len(), 4);

    std::fs::write(tree.join("configure"), "").unwrap();
    let plan = r.plan().unwrap();
    assert_eq!(plan.steps.len(), 3);
    assert!(plan.steps.steps()[0].args.contains(&"./configure".to_string()));
  }

  #[test]
  fn unsupported_toolchain_fails_before_any_work() {
    let temp = TempDir::new().unwrap();
    let mut settings = linux_static();
    settings.compiler = Compiler::new(CompilerKind::VisualStudio, Some("16"));
    let err = recipe(&temp, settings).plan().unwrap_err();
    assert!(matches!(err, RecipeError::UnsupportedToolchain(_)));
    assert!(!temp.path().join("cache").exists());
  }

  #[cfg(unix)]
  mod run {
    use super::*;
    use crate::util::testutil::{fake_make, fake_source};

    fn fake_recipe(temp: &TempDir) -> Recipe {
      let source = fake_source(temp.path());
      let tools = Tools {
        make: fake_make(temp.path()),
        ..Tools::default()
      };
      recipe(temp, linux_static())
        .with_source(SourceSpec::Path(source))
        .with_tools(tools)
        .with_package_dir(temp.path().join("out/lzma"))
    }

    #[tokio::test]
    #[traced_test]
    async fn builds_static_package() {
      let temp = TempDir::new().unwrap();
      let outcome = fake_recipe(&temp).run().await.unwrap();

      let pkg = temp.path().join("out/lzma");
      assert_eq!(outcome.package_dir, pkg);
      assert_eq!(outcome.strategy, "autotools");
      assert!(pkg.join("include/lzma.h").is_file());
      assert!(pkg.join("lib/liblzma.a").is_file());
      assert!(pkg.join("licenses/COPYING").is_file());
      assert!(pkg.join("package_info.json").is_file());
      assert_eq!(outcome.metadata.libs, vec!["lzma"]);
      assert_eq!(outcome.metadata.defines, vec!["LZMA_API_STATIC"]);

      let args = std::fs::read_to_string(fake_recipe_build_dir(&temp).join(".configure-args")).unwrap();
      assert!(args.contains("--disable-xz"));
      assert!(args.contains(&format!("--prefix={}", pkg.display())));

      assert!(logs_contain("package created"));
    }

    fn fake_recipe_build_dir(temp: &TempDir) -> PathBuf {
      let r = recipe(temp, linux_static());
      r.build_dir(&r.package_id().unwrap())
    }

    #[tokio::test]
    async fn failed_make_leaves_no_package() {
      let temp = TempDir::new().unwrap();
      let r = fake_recipe(&temp);
      std::fs::write(temp.path().join("xz/.fail"), "").unwrap();

      let err = r.run().await.unwrap_err();
      match err {
        RecipeError::Build(BuildError::Failed { code, stderr, .. }) => {
          assert_eq!(code, Some(2));
          assert!(stderr.contains("compilation failed"));
        }
        other => panic!("expected build failure, got {:?}", other),
      }
      assert!(!temp.path().join("out/lzma").exists());

      let leftovers: Vec<_> = std::fs::read_dir(temp.path().join("out")).unwrap().collect();
      assert!(leftovers.is_empty(), "staging not cleaned up: {:?}", leftovers);
    }

    #[tokio::test]
    async fn rerun_replaces_package() {
      let temp = TempDir::new().unwrap();
      let r = fake_recipe(&temp);
      r.run().await.unwrap();
      std::fs::write(temp.path().join("out/lzma/stale"), "").unwrap();

      r.run().await.unwrap();
      assert!(!temp.path().join("out/lzma/stale").exists());
      assert!(temp.path().join("out/lzma/lib/liblzma.a").exists());
    }

    #[tokio::test]
    async fn missing_license_is_packaging_error() {
      let temp = TempDir::new().unwrap();
      let r = fake_recipe(&temp);
      std::fs::remove_file(temp.path().join("xz/COPYING")).unwrap();

      let err = r.run().await.unwrap_err();
      assert!(matches!(err, RecipeError::Packaging(_)), "{:?}", err);
      assert!(!temp.path().join("out/lzma").exists());
    }
  }
}
