//! Release version resolution.
//!
//! Queries the release metadata endpoint (through the mirror in restricted
//! mode) and extracts the latest version tag. Resolution failure is
//! recoverable by design: the orchestrator substitutes the compiled-in
//! fallback version instead of aborting the run.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::SetupConfig;
use crate::net::{get_with_redirects, NetworkMode};

/// The subset of the release metadata body the resolver reads.
#[derive(Debug, Deserialize)]
struct ReleaseMetadata {
    tag_name: String,
}

/// Resolves the latest release tag, e.g. `v25.12.8`.
///
/// # Errors
///
/// Fails on network errors, exhausted redirects, a non-success terminal
/// status, or a body that does not parse as release metadata. The caller
/// is expected to recover with [`SetupConfig::fallback_version`].
pub async fn resolve_latest_version(
    client: &Client,
    config: &SetupConfig,
    mode: NetworkMode,
) -> Result<String> {
    let url = mode.mirrored_url(&config.mirror_prefix, &config.release_api_url);
    info!("Fetching latest release metadata from {}", url);

    let response = get_with_redirects(
        client,
        &url,
        Some(config.request_timeout),
        config.max_redirects,
    )
    .await?;

    let status = response.status();
    if !status.is_success() {
        bail!("Release metadata endpoint returned HTTP {}", status.as_u16());
    }

    let body = response
        .text()
        .await
        .context("Failed to read release metadata body")?;
    let metadata: ReleaseMetadata =
        serde_json::from_str(&body).context("Failed to parse release metadata")?;

    debug!("Resolved latest release tag: {}", metadata.tag_name);
    Ok(metadata.tag_name)
}
