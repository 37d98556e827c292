//! Version and build metadata
//!
//! `build.rs` stamps commit, date and compiler into env vars at build
//! time; fields fall back to "unknown" when a stamp is unavailable (e.g.
//! building outside a git checkout).

/// Build metadata of the running binary
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub package_version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
    pub rustc: &'static str,
}

/// Collect the stamps baked in at build time
pub fn build_info() -> BuildInfo {
    BuildInfo {
        package_version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("ASTROLABE_COMMIT_SHA").unwrap_or("unknown"),
        date: option_env!("ASTROLABE_BUILD_DATE").unwrap_or("unknown"),
        rustc: option_env!("ASTROLABE_RUSTC_VERSION").unwrap_or("unknown"),
    }
}

/// One-line version string for the CLI
///
/// Format: "astrolabe {version} ({commit} {date}) rustc {rustc}"
pub fn version() -> String {
    let info = build_info();
    format!(
        "astrolabe {} ({} {}) rustc {}",
        info.package_version, info.commit, info.date, info.rustc
    )
}
