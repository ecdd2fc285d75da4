//! Content hashing for package ids.
//!
//! A package id is the first 20 hex characters of the SHA-256 of the
//! JSON-serialized settings. Identical settings always map to the same build
//! and package directories.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::PACKAGE_ID_LEN;

pub type HashError = serde_json::Error;

/// Truncated hash identifying one configuration of the package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageId(pub String);

impl std::fmt::Display for PackageId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<PackageId, HashError> {
    let serialized = serde_json::to_string(self)?;
    let digest = Sha256::digest(serialized.as_bytes());
    let full = hex::encode(digest);
    Ok(PackageId(full[..PACKAGE_ID_LEN].to_string()))
  }
}
