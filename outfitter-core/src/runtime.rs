//! Browser runtime installation.
//!
//! The pipeline treats the browser installer as a collaborator behind
//! [`RuntimeInstaller`]: it receives a cache directory, a build identifier,
//! and an optional mirror base URL, reports download progress through a
//! callback, and returns the final install path.
//! [`ChromeForTestingInstaller`] is the production implementation, built on
//! the crate's own downloader and extractor.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

use crate::download::{download_file, DownloadTask};
use crate::extract::ArchiveExtractor;
use crate::platform::PlatformProfile;
use crate::progress::DownloadProgress;

/// Progress callback invoked with every received chunk.
pub type ProgressFn<'a> = dyn Fn(DownloadProgress) + Send + Sync + 'a;

/// Parameters for one runtime installation.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Root directory the install tree is created under.
    pub cache_dir: PathBuf,
    /// Build identifier, e.g. `143.0.7499.169`.
    pub build_id: String,
    /// Mirror base URL; `None` uses the installer's default endpoint.
    pub base_url: Option<String>,
}

/// A completed runtime installation.
#[derive(Debug, Clone)]
pub struct Installation {
    /// Path to the installed runtime tree.
    pub path: PathBuf,
}

/// Installs a browser runtime build into a cache directory.
#[async_trait]
pub trait RuntimeInstaller: Send + Sync {
    async fn install(&self, request: &InstallRequest, progress: &ProgressFn)
        -> Result<Installation>;
}

/// Downloads and unpacks a Chrome for Testing build.
pub struct ChromeForTestingInstaller {
    client: Client,
    extractor: Box<dyn ArchiveExtractor>,
    default_base_url: String,
    max_redirects: u32,
    profile: PlatformProfile,
}

impl ChromeForTestingInstaller {
    pub fn new(
        client: Client,
        extractor: Box<dyn ArchiveExtractor>,
        profile: PlatformProfile,
        default_base_url: String,
        max_redirects: u32,
    ) -> Self {
        Self {
            client,
            extractor,
            default_base_url,
            max_redirects,
            profile,
        }
    }
}

/// Builds the archive URL for a Chrome for Testing build.
///
/// Both the default endpoint and the npmmirror mirror publish archives at
/// `{base}/{build}/{platform}/chrome-{platform}.zip`.
fn archive_url(base_url: &str, build_id: &str, platform: &str) -> String {
    format!(
        "{}/{}/{}/chrome-{}.zip",
        base_url, build_id, platform, platform
    )
}

#[async_trait]
impl RuntimeInstaller for ChromeForTestingInstaller {
    async fn install(
        &self,
        request: &InstallRequest,
        progress: &ProgressFn,
    ) -> Result<Installation> {
        let platform = self.profile.chrome_platform();
        let base_url = request
            .base_url
            .as_deref()
            .unwrap_or(&self.default_base_url);
        let url = archive_url(base_url, &request.build_id, platform);

        let install_dir = request
            .cache_dir
            .join("chrome")
            .join(format!("{}-{}", platform, request.build_id));
        fs::create_dir_all(&install_dir)
            .await
            .with_context(|| format!("Failed to create {}", install_dir.display()))?;

        let archive_path = request
            .cache_dir
            .join(format!("chrome-{}.zip", request.build_id));
        let task = DownloadTask {
            url,
            dest: archive_path.clone(),
            label: "Chrome".to_string(),
        };
        download_file(&self.client, &task, self.max_redirects, |sample| {
            progress(sample)
        })
        .await?;

        debug!("Extracting browser runtime to {}", install_dir.display());
        self.extractor
            .extract(&archive_path, &install_dir)
            .await
            .context("Failed to extract browser runtime archive")?;

        if let Err(error) = fs::remove_file(&archive_path).await {
            warn!("Failed to clean up runtime archive: {}", error);
        }

        Ok(Installation {
            path: install_dir.join(format!("chrome-{}", platform)),
        })
    }
}
