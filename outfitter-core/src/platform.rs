//! Platform detection and asset-name resolution.
//!
//! Maps the running operating system and CPU architecture to the release
//! asset to download, the executable name to expect after extraction, and
//! the platform directory the install lands in. Operating systems outside
//! the supported set are a terminal error before any filesystem work.

use anyhow::{bail, Result};
use std::fmt;

// ============================================================================
// Operating System / Architecture
// ============================================================================

/// Supported operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    Macos,
    Linux,
}

impl Os {
    /// Returns the identifier used in the platform directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Macos => "macos",
            Self::Linux => "linux",
        }
    }
}

/// CPU architectures the asset table distinguishes.
///
/// Architectures with no dedicated release asset resolve to [`Arch::X86`],
/// which maps to the 32-bit archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    X86,
    Arm64,
}

impl Arch {
    /// Returns the identifier used in the platform directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X64 => "x86_64",
            Self::X86 => "x86",
            Self::Arm64 => "aarch64",
        }
    }
}

// ============================================================================
// Platform Profile
// ============================================================================

/// A resolved (operating system, architecture) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformProfile {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformProfile {
    /// Detects the platform of the running process.
    ///
    /// # Errors
    ///
    /// Returns an error when the operating system is not Windows, macOS, or
    /// Linux. Unknown architectures do not fail; they fall back to the
    /// 32-bit asset.
    pub fn detect() -> Result<Self> {
        Self::from_os_arch(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Resolves a profile from `std::env::consts`-style identifiers.
    pub fn from_os_arch(os: &str, arch: &str) -> Result<Self> {
        let os = match os {
            "windows" => Os::Windows,
            "macos" => Os::Macos,
            "linux" => Os::Linux,
            other => bail!("Unsupported platform: {}", other),
        };

        let arch = match arch {
            "x86_64" => Arch::X64,
            "aarch64" => Arch::Arm64,
            _ => Arch::X86,
        };

        Ok(Self { os, arch })
    }

    /// Returns the proxy engine release asset for this platform.
    pub fn proxy_asset_name(&self) -> &'static str {
        match (self.os, self.arch) {
            (Os::Windows, Arch::X64) => "Xray-windows-64.zip",
            (Os::Windows, Arch::Arm64) => "Xray-windows-arm64-v8a.zip",
            (Os::Windows, Arch::X86) => "Xray-windows-32.zip",
            (Os::Macos, Arch::Arm64) => "Xray-macos-arm64-v8a.zip",
            (Os::Macos, _) => "Xray-macos-64.zip",
            (Os::Linux, Arch::X64) => "Xray-linux-64.zip",
            (Os::Linux, Arch::Arm64) => "Xray-linux-arm64-v8a.zip",
            (Os::Linux, Arch::X86) => "Xray-linux-32.zip",
        }
    }

    /// Returns the name of the proxy engine executable inside the archive.
    pub fn executable_name(&self) -> &'static str {
        match self.os {
            Os::Windows => "xray.exe",
            Os::Macos | Os::Linux => "xray",
        }
    }

    /// Returns the platform directory name, e.g. `linux-x86_64`.
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.os.as_str(), self.arch.as_str())
    }

    /// Returns the Chrome for Testing platform identifier.
    ///
    /// Linux builds are published for x64 only, so every Linux arch maps to
    /// `linux64`; a mismatched arch surfaces as a download failure rather
    /// than an unsupported-platform error, matching the proxy asset table.
    pub fn chrome_platform(&self) -> &'static str {
        match (self.os, self.arch) {
            (Os::Linux, _) => "linux64",
            (Os::Macos, Arch::Arm64) => "mac-arm64",
            (Os::Macos, _) => "mac-x64",
            (Os::Windows, Arch::X86) => "win32",
            (Os::Windows, _) => "win64",
        }
    }
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}
