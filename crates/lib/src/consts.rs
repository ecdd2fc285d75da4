//! Fixed facts about the packaged library and the recipe's own directories.

pub const APP_NAME: &str = "lzrecipe";

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "LZRECIPE_CACHE_DIR";

pub const PACKAGE_NAME: &str = "lzma";
pub const PACKAGE_VERSION: &str = "5.2.4";
pub const PACKAGE_LICENSE: &str = "Public Domain";
pub const PACKAGE_DESCRIPTION: &str =
  "LZMA library is part of XZ Utils (a free general-purpose data compression software.)";
pub const HOMEPAGE: &str = "https://tukaani.org";

pub const UPSTREAM_URL: &str = "https://git.tukaani.org/xz.git";
pub const UPSTREAM_REF: &str = "master";

/// Name prefix of the upstream clones inside the sources cache.
pub const SOURCE_CHECKOUT_NAME: &str = "xz";

/// Upstream license file copied into `licenses/`.
pub const LICENSE_FILE: &str = "COPYING";

/// Public header whose presence proves the include tree was staged.
pub const MAIN_HEADER: &str = "lzma.h";

/// Define consumers need when linking the static library.
pub const STATIC_API_DEFINE: &str = "LZMA_API_STATIC";

/// Metadata file written at the package root.
pub const PACKAGE_INFO_FILE: &str = "package_info.json";

/// Length of the truncated settings hash used as a package id.
pub const PACKAGE_ID_LEN: usize = 20;
