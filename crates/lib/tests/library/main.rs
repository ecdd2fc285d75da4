//! Library integration tests for lzrecipe-lib.
//!
//! Builds run against a fake upstream tree and a fake `make`, so these only
//! need a POSIX shell.

#![cfg(unix)]

mod common;
mod recipe_tests;
mod settings_tests;
