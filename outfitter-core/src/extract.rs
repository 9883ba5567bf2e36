//! Archive extraction behind a capability interface.
//!
//! Extraction shells out to the platform's native unpack mechanism:
//! `Expand-Archive` through PowerShell on Windows, the `unzip` utility
//! everywhere else. The [`ArchiveExtractor`] trait keeps the platform
//! branch in one place and lets tests substitute a stub.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

// ============================================================================
// Extraction Capability
// ============================================================================

/// Errors surfaced by archive extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The unpack process could not be launched at all.
    #[error("failed to launch {command}: {source}")]
    Spawn {
        command: &'static str,
        source: std::io::Error,
    },
    /// The unpack process ran but reported failure.
    #[error("{command} {status}: {stderr}")]
    CommandFailed {
        command: &'static str,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Unpacks an archive into a destination directory.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ExtractError>;
}

/// Returns the extractor for the running platform.
pub fn native_extractor() -> Box<dyn ArchiveExtractor> {
    #[cfg(windows)]
    {
        Box::new(PowershellExtractor)
    }
    #[cfg(not(windows))]
    {
        Box::new(UnzipExtractor)
    }
}

// ============================================================================
// Platform Implementations
// ============================================================================

/// Extracts with the `unzip` command-line utility.
pub struct UnzipExtractor;

#[async_trait]
impl ArchiveExtractor for UnzipExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ExtractError> {
        run_unpack(unzip_command(archive, dest), "unzip").await
    }
}

/// Extracts with PowerShell's built-in `Expand-Archive`.
pub struct PowershellExtractor;

#[async_trait]
impl ArchiveExtractor for PowershellExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ExtractError> {
        run_unpack(powershell_command(archive, dest), "powershell").await
    }
}

fn unzip_command(archive: &Path, dest: &Path) -> std::process::Command {
    let mut command = std::process::Command::new("unzip");
    command.arg("-o").arg(archive).arg("-d").arg(dest);
    command
}

fn powershell_command(archive: &Path, dest: &Path) -> std::process::Command {
    let mut command = std::process::Command::new("powershell");
    command.arg("-Command").arg(format!(
        "Expand-Archive -Path '{}' -DestinationPath '{}' -Force",
        archive.display(),
        dest.display()
    ));
    command
}

async fn run_unpack(
    command: std::process::Command,
    name: &'static str,
) -> Result<(), ExtractError> {
    debug!("Running {:?}", command);

    let output = Command::from(command)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| ExtractError::Spawn {
            command: name,
            source,
        })?;

    if !output.status.success() {
        return Err(ExtractError::CommandFailed {
            command: name,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
