//! Setup configuration.
//!
//! All tunable behavior of the pipeline lives in [`SetupConfig`]: endpoint
//! URLs, the mirror prefix used on restricted networks, timeouts, the
//! redirect cap, and the on-disk resources root. The pipeline receives the
//! config by reference and never consults process-wide state, so tests can
//! point every network call at a local server.

use std::path::PathBuf;
use std::time::Duration;

/// Prefix prepended to GitHub URLs when the global network is unreachable.
pub const GH_MIRROR_PREFIX: &str = "https://gh-proxy.com/";

/// Release metadata endpoint for the proxy engine.
pub const RELEASE_API_URL: &str = "https://api.github.com/repos/XTLS/Xray-core/releases/latest";

/// Base URL that release archives are downloaded from.
pub const RELEASE_DOWNLOAD_BASE: &str = "https://github.com/XTLS/Xray-core/releases/download";

/// Version used when release resolution fails.
pub const FALLBACK_VERSION: &str = "v25.12.8";

/// Endpoint used to decide between direct and mirrored access.
pub const PROBE_URL: &str = "https://www.google.com";

/// Chrome for Testing build provisioned for the browser runtime.
pub const CHROME_BUILD_ID: &str = "143.0.7499.169";

/// Default Chrome for Testing download endpoint.
pub const CHROME_BASE_URL: &str = "https://storage.googleapis.com/chrome-for-testing-public";

/// Mirror used for the browser runtime on restricted networks.
pub const CHROME_MIRROR_URL: &str = "https://npmmirror.com/mirrors/chrome-for-testing";

/// Immutable configuration consumed by the provisioning pipeline.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Prefix prepended to GitHub URLs in restricted network mode.
    pub mirror_prefix: String,
    /// Release metadata endpoint (JSON body with a `tag_name` field).
    pub release_api_url: String,
    /// Base URL for release archive downloads.
    pub release_download_base: String,
    /// Version substituted when release resolution fails.
    pub fallback_version: String,
    /// Endpoint probed to classify the network environment.
    pub probe_url: String,
    /// Upper bound on the reachability probe.
    pub probe_timeout: Duration,
    /// Timeout applied to metadata requests (not to archive downloads).
    pub request_timeout: Duration,
    /// Maximum redirect hops followed before a request is failed.
    pub max_redirects: u32,
    /// Browser runtime build identifier.
    pub chrome_build_id: String,
    /// Default browser runtime download endpoint.
    pub chrome_base_url: String,
    /// Browser runtime mirror for restricted networks.
    pub chrome_mirror_url: String,
    /// Root directory that all provisioned assets land under.
    pub resources_root: PathBuf,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            mirror_prefix: GH_MIRROR_PREFIX.to_string(),
            release_api_url: RELEASE_API_URL.to_string(),
            release_download_base: RELEASE_DOWNLOAD_BASE.to_string(),
            fallback_version: FALLBACK_VERSION.to_string(),
            probe_url: PROBE_URL.to_string(),
            probe_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
            max_redirects: 5,
            chrome_build_id: CHROME_BUILD_ID.to_string(),
            chrome_base_url: CHROME_BASE_URL.to_string(),
            chrome_mirror_url: CHROME_MIRROR_URL.to_string(),
            resources_root: PathBuf::from("resources"),
        }
    }
}

impl SetupConfig {
    /// Directory holding the proxy engine binaries and shared data files.
    ///
    /// Path: `{resources_root}/bin/`
    pub fn bin_root(&self) -> PathBuf {
        self.resources_root.join("bin")
    }

    /// Directory holding the browser runtime install tree.
    ///
    /// Path: `{resources_root}/puppeteer/`
    pub fn browser_root(&self) -> PathBuf {
        self.resources_root.join("puppeteer")
    }

    /// Builds the archive download URL for a resolved version and asset name.
    pub fn release_download_url(&self, version: &str, asset: &str) -> String {
        format!("{}/{}/{}", self.release_download_base, version, asset)
    }
}
