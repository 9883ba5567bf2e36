//! Outfitter Core Library
//!
//! This crate provisions the two runtime assets the host application needs
//! before first launch: the Xray proxy engine and a Chrome for Testing
//! browser build. It includes:
//!
//! - Platform detection and release asset-name resolution
//! - Network reachability probing (direct vs. mirrored access)
//! - Release version resolution with a compiled-in fallback
//! - Redirect-aware streaming downloads with single-line progress
//! - Archive extraction via the platform's native unpack mechanism
//! - Shared-resource consolidation and executable finalization
//! - The orchestrating pipeline that sequences a full run

pub mod config;
pub mod consolidate;
pub mod download;
pub mod extract;
pub mod net;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod release;
pub mod runtime;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::SetupConfig;
pub use consolidate::{consolidate_shared_assets, make_executable, SHARED_ASSETS};
pub use download::{download_file, DownloadTask};
pub use extract::{native_extractor, ArchiveExtractor, ExtractError};
pub use net::{build_client, probe_network, NetworkMode};
pub use platform::{Arch, Os, PlatformProfile};
pub use progress::{format_bytes, DownloadProgress, ProgressLine};
pub use release::resolve_latest_version;
pub use runtime::{ChromeForTestingInstaller, InstallRequest, Installation, RuntimeInstaller};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
