//! Network environment detection and redirect-aware requests.
//!
//! All HTTP in the pipeline goes through a single [`reqwest::Client`] built
//! with automatic redirects disabled: redirect chains are followed manually
//! by [`get_with_redirects`] so the hop count can be bounded against
//! misbehaving mirrors.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::header::LOCATION;
use reqwest::{redirect, Client, Response};
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::SetupConfig;

// ============================================================================
// HTTP Client
// ============================================================================

/// User-Agent sent on every request (the release API rejects anonymous ones).
pub const USER_AGENT: &str = "outfitter-setup";

/// Builds the shared HTTP client.
///
/// Redirects are handled manually, so the client's own policy is `none`.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(redirect::Policy::none())
        .build()
        .context("Failed to build HTTP client")
}

// ============================================================================
// Network Mode
// ============================================================================

/// Which access path the pipeline uses for every network call.
///
/// Computed once per run by [`probe_network`] and never re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    /// The unrestricted global network is reachable; use direct URLs.
    Global,
    /// Direct access failed; route GitHub URLs through the mirror prefix.
    Restricted,
}

impl NetworkMode {
    /// Applies the mirror prefix to a URL when in restricted mode.
    pub fn mirrored_url(&self, mirror_prefix: &str, url: &str) -> String {
        match self {
            Self::Global => url.to_string(),
            Self::Restricted => format!("{}{}", mirror_prefix, url),
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "Global"),
            Self::Restricted => write!(f, "Restricted (mirror)"),
        }
    }
}

// ============================================================================
// Reachability Probe
// ============================================================================

/// Classifies the network environment with a short-timeout probe.
///
/// Best-effort heuristic: a 2xx-3xx response within the timeout means the
/// global network is reachable; any error, timeout, or other status means
/// restricted. Never retries.
pub async fn probe_network(client: &Client, config: &SetupConfig) -> NetworkMode {
    debug!("Probing {}", config.probe_url);

    let result = client
        .get(&config.probe_url)
        .timeout(config.probe_timeout)
        .send()
        .await;

    match result {
        Ok(response) => {
            let status = response.status();
            if status.is_success() || status.is_redirection() {
                NetworkMode::Global
            } else {
                debug!(%status, "Probe returned non-success status");
                NetworkMode::Restricted
            }
        }
        Err(error) => {
            debug!("Probe failed: {}", error);
            NetworkMode::Restricted
        }
    }
}

// ============================================================================
// Bounded Redirect Following
// ============================================================================

/// Issues a GET, following redirects up to `max_redirects` hops.
///
/// Relative `Location` headers are resolved against the redirecting URL.
/// Returns the first non-redirect response without judging its status;
/// callers decide what counts as success.
///
/// # Errors
///
/// Fails when a request errors, a redirect carries no usable `Location`,
/// or the hop limit is exceeded.
pub async fn get_with_redirects(
    client: &Client,
    url: &str,
    timeout: Option<Duration>,
    max_redirects: u32,
) -> Result<Response> {
    let mut current = url.to_string();

    for _ in 0..=max_redirects {
        let mut request = client.get(&current);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", current))?;

        if !response.status().is_redirection() {
            return Ok(response);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| anyhow!("Redirect from {} without a Location header", current))?;

        let next = Url::parse(&current)
            .with_context(|| format!("Invalid request URL: {}", current))?
            .join(location)
            .with_context(|| format!("Invalid redirect target: {}", location))?;

        debug!("Following redirect {} -> {}", current, next);
        current = next.to_string();
    }

    bail!(
        "Exceeded {} redirects while requesting {}",
        max_redirects,
        url
    )
}
