//! lzrecipe-lib: build and package liblzma from XZ Utils
//!
//! This crate turns a set of build settings into a ready-to-consume liblzma
//! package:
//! - `settings`: the target configuration and how it is assembled
//! - `source`: fetching the upstream tree
//! - `strategy`: the MSBuild and autotools build paths
//! - `layout`: the package directory structure and artifact staging
//! - `metadata`: link information recorded for consumers
//! - `recipe`: the orchestrator tying the stages together

pub mod consts;
pub mod error;
pub mod exec;
pub mod layout;
pub mod metadata;
pub mod platform;
pub mod recipe;
pub mod settings;
pub mod source;
pub mod strategy;
pub mod toolchain;
pub mod util;

pub use error::RecipeError;
pub use recipe::{BuildOutcome, Recipe, RecipePlan};
pub use settings::BuildSettings;
