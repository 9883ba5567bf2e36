//! Streaming asset download with progress reporting.
//!
//! Archives are streamed to disk chunk by chunk so arbitrarily large
//! downloads run in bounded memory. Redirects are followed with the same
//! bounded policy as metadata requests. On any stream or filesystem error
//! the partially written destination is deleted before the error
//! propagates, so failed runs leave no partial artifacts behind.

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use reqwest::Client;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::net::get_with_redirects;
use crate::progress::DownloadProgress;

/// A self-contained unit of download work.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// Source URL; may redirect before settling on the final source.
    pub url: String,
    /// Destination file path.
    pub dest: PathBuf,
    /// Human-readable label shown on the progress line and in errors.
    pub label: String,
}

/// Downloads a file, invoking `progress_cb` on every received chunk.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Fails on network errors, exhausted redirects, a non-2xx terminal status,
/// or filesystem errors. The destination file is removed before any error
/// is returned.
pub async fn download_file<F>(
    client: &Client,
    task: &DownloadTask,
    max_redirects: u32,
    mut progress_cb: F,
) -> Result<u64>
where
    F: FnMut(DownloadProgress),
{
    debug!("Downloading {} to {}", task.url, task.dest.display());

    if let Some(parent) = task.dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let result = stream_to_disk(client, task, max_redirects, &mut progress_cb).await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&task.dest).await;
    }

    result
}

async fn stream_to_disk<F>(
    client: &Client,
    task: &DownloadTask,
    max_redirects: u32,
    progress_cb: &mut F,
) -> Result<u64>
where
    F: FnMut(DownloadProgress),
{
    let response = get_with_redirects(client, &task.url, None, max_redirects).await?;

    let status = response.status();
    if !status.is_success() {
        bail!(
            "Download of {} failed: HTTP {}",
            task.label,
            status.as_u16()
        );
    }

    let total_bytes = response.content_length();
    debug!("Content-Length: {:?}", total_bytes);

    let mut file = File::create(&task.dest)
        .await
        .with_context(|| format!("Failed to create file: {}", task.dest.display()))?;

    let mut stream = response.bytes_stream();
    let mut bytes_received: u64 = 0;

    progress_cb(DownloadProgress::new(0, total_bytes));

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result
            .with_context(|| format!("Stream interrupted while downloading {}", task.label))?;

        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write chunk to {}", task.dest.display()))?;

        bytes_received += chunk.len() as u64;
        progress_cb(DownloadProgress::new(bytes_received, total_bytes));
    }

    file.flush()
        .await
        .with_context(|| format!("Failed to flush {}", task.dest.display()))?;

    info!(
        "Downloaded {}: {} bytes written to {}",
        task.label,
        bytes_received,
        task.dest.display()
    );

    Ok(bytes_received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::build_client;
    use crate::test_support::{redirect_response, serve, serve_truncated, status_response};
    use tempfile::TempDir;

    fn task(url: String, dest: PathBuf) -> DownloadTask {
        DownloadTask {
            url,
            dest,
            label: "Test Asset".to_string(),
        }
    }

    #[tokio::test]
    async fn streams_body_to_disk_with_progress() {
        let base = serve(|request| {
            let _ = request.respond(tiny_http::Response::from_string("archive-bytes"));
        });
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("asset.zip");
        let client = build_client().unwrap();

        let mut samples = Vec::new();
        let written = download_file(
            &client,
            &task(format!("{}/asset.zip", base), dest.clone()),
            5,
            |progress| samples.push(progress),
        )
        .await
        .unwrap();

        assert_eq!(written, 13);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "archive-bytes");

        let last = samples.last().unwrap();
        assert_eq!(last.bytes_received, 13);
        assert_eq!(last.bytes_total, Some(13));
    }

    #[tokio::test]
    async fn follows_redirects_to_final_source() {
        let base = serve(|request| {
            if request.url() == "/start" {
                let _ = request.respond(redirect_response("/real"));
            } else {
                let _ = request.respond(tiny_http::Response::from_string("redirected"));
            }
        });
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("asset.zip");
        let client = build_client().unwrap();

        download_file(
            &client,
            &task(format!("{}/start", base), dest.clone()),
            5,
            |_| {},
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "redirected");
    }

    #[tokio::test]
    async fn non_success_status_fails_without_artifact() {
        let base = serve(|request| {
            let _ = request.respond(status_response(404));
        });
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("asset.zip");
        let client = build_client().unwrap();

        let error = download_file(
            &client,
            &task(format!("{}/missing.zip", base), dest.clone()),
            5,
            |_| {},
        )
        .await
        .unwrap_err();

        assert!(error.to_string().contains("HTTP 404"), "got: {}", error);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn mid_stream_failure_removes_partial_file() {
        // The server promises 64 KiB but closes after 10 bytes.
        let base = serve_truncated(b"0123456789", 64 * 1024);
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("asset.zip");
        let client = build_client().unwrap();

        let error = download_file(
            &client,
            &task(format!("{}/asset.zip", base), dest.clone()),
            5,
            |_| {},
        )
        .await
        .unwrap_err();

        assert!(
            error.to_string().contains("Stream interrupted"),
            "got: {}",
            error
        );
        assert!(!dest.exists(), "partial download must be cleaned up");
    }
}
