//! Shared utilities.
//!
//! Hashing for package ids, filesystem helpers, and test helpers.

pub mod fs;
pub mod hash;

#[cfg(test)]
pub mod testutil;
