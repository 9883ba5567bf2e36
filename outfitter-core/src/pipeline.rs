//! The provisioning pipeline.
//!
//! Sequences the full run for both assets: network probe, release version
//! resolution (with fallback), proxy engine download/extract/consolidate,
//! then a clean reinstall of the browser runtime. Strictly sequential; the
//! only failure with a recovery policy is version resolution, everything
//! else propagates and fails the run.

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::SetupConfig;
use crate::consolidate::{consolidate_shared_assets, make_executable};
use crate::download::{download_file, DownloadTask};
use crate::extract::ArchiveExtractor;
use crate::net::{probe_network, NetworkMode};
use crate::platform::PlatformProfile;
use crate::progress::ProgressLine;
use crate::release::resolve_latest_version;
use crate::runtime::{InstallRequest, RuntimeInstaller};

/// Filename the proxy engine archive is staged under before extraction.
const PROXY_ARCHIVE_NAME: &str = "xray.zip";

/// Runs the complete provisioning pipeline.
///
/// # Errors
///
/// Any failure other than release-version resolution is fatal and
/// propagates to the caller, which maps it to a non-zero process exit.
pub async fn run(
    config: &SetupConfig,
    client: &Client,
    profile: PlatformProfile,
    extractor: &dyn ArchiveExtractor,
    browser: &dyn RuntimeInstaller,
) -> Result<()> {
    let bin_dir = config.bin_root().join(profile.dir_name());
    tokio::fs::create_dir_all(&bin_dir)
        .await
        .with_context(|| format!("Failed to create {}", bin_dir.display()))?;

    println!("Checking network connectivity...");
    let mode = probe_network(client, config).await;
    println!("Network: {}", mode);

    let version = match resolve_latest_version(client, config, mode).await {
        Ok(version) => {
            println!("Latest Xray version: {}", version);
            version
        }
        Err(error) => {
            warn!(
                "Release resolution failed, using fallback {}: {:#}",
                config.fallback_version, error
            );
            println!(
                "Could not resolve latest version, using fallback {}",
                config.fallback_version
            );
            config.fallback_version.clone()
        }
    };

    install_proxy_engine(config, client, profile, extractor, mode, &version).await?;
    install_browser_runtime(config, browser, mode).await?;

    info!("Provisioning complete");
    println!("All setup completed.");
    Ok(())
}

/// Downloads, extracts, and finalizes the proxy engine for this platform.
async fn install_proxy_engine(
    config: &SetupConfig,
    client: &Client,
    profile: PlatformProfile,
    extractor: &dyn ArchiveExtractor,
    mode: NetworkMode,
    version: &str,
) -> Result<()> {
    let bin_dir = config.bin_root().join(profile.dir_name());
    let asset = profile.proxy_asset_name();
    let url = mode.mirrored_url(
        &config.mirror_prefix,
        &config.release_download_url(version, asset),
    );

    let task = DownloadTask {
        url,
        dest: bin_dir.join(PROXY_ARCHIVE_NAME),
        label: "Xray Core".to_string(),
    };

    println!("Downloading Xray ({})...", version);
    let line = ProgressLine::new(task.label.clone());
    download_file(client, &task, config.max_redirects, |sample| {
        line.update(&sample)
    })
    .await?;
    line.finish();

    debug!("Extracting {}", task.dest.display());
    extractor
        .extract(&task.dest, &bin_dir)
        .await
        .context("Failed to extract proxy engine archive")?;
    tokio::fs::remove_file(&task.dest)
        .await
        .with_context(|| format!("Failed to remove {}", task.dest.display()))?;

    consolidate_shared_assets(&bin_dir, &config.bin_root())?;
    make_executable(&bin_dir.join(profile.executable_name()))?;

    println!("Xray ready ({})", profile);
    Ok(())
}

/// Reinstalls the browser runtime from a clean slate.
///
/// The runtime directory is wiped unconditionally first, so a stale or
/// partial install never lingers and re-runs are idempotent.
async fn install_browser_runtime(
    config: &SetupConfig,
    browser: &dyn RuntimeInstaller,
    mode: NetworkMode,
) -> Result<()> {
    let browser_root = config.browser_root();

    if browser_root.exists() {
        info!(
            "Removing existing browser runtime at {}",
            browser_root.display()
        );
        tokio::fs::remove_dir_all(&browser_root)
            .await
            .with_context(|| format!("Failed to clean {}", browser_root.display()))?;
    }

    let request = InstallRequest {
        cache_dir: browser_root,
        build_id: config.chrome_build_id.clone(),
        base_url: match mode {
            NetworkMode::Global => None,
            NetworkMode::Restricted => Some(config.chrome_mirror_url.clone()),
        },
    };

    println!("Downloading Chrome ({})...", config.chrome_build_id);
    let line = ProgressLine::new("Chrome");
    let installation = browser
        .install(&request, &|sample| line.update(&sample))
        .await
        .context("Browser runtime installation failed")?;
    line.finish();

    println!("Chrome installed at {}", installation.path.display());
    Ok(())
}
