//! Shared-resource consolidation.
//!
//! After extraction, data files common to every platform build (geo
//! databases, license, readme) are promoted from the platform-specific
//! directory into the shared bin root. Promotion is first-writer-wins: an
//! existing shared copy is never overwritten, but the platform-local copy
//! is removed either way, so coexisting platform installs stay lean and
//! exactly one canonical copy remains.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Files shared across all platform builds of the proxy engine.
pub const SHARED_ASSETS: &[&str] = &["geoip.dat", "geosite.dat", "LICENSE", "README.md"];

/// Promotes shared assets from `platform_dir` into `shared_root`.
pub fn consolidate_shared_assets(platform_dir: &Path, shared_root: &Path) -> Result<()> {
    for name in SHARED_ASSETS {
        let source = platform_dir.join(name);
        if !source.exists() {
            continue;
        }

        let dest = shared_root.join(name);
        if !dest.exists() {
            fs::copy(&source, &dest).with_context(|| {
                format!("Failed to promote {} to {}", name, shared_root.display())
            })?;
            debug!("Promoted {} to shared root", name);
        }

        fs::remove_file(&source)
            .with_context(|| format!("Failed to remove platform-local copy of {}", name))?;
    }

    Ok(())
}

/// Grants owner/group/other read+execute (mode 0755) on Unix.
///
/// Zip archives do not reliably preserve the executable bit. On Windows
/// this is a no-op.
#[allow(unused_variables)]
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to set executable permission on {}", path.display()))?;
        debug!("Set mode 0755 on {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_dirs() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let shared_root = temp.path().join("bin");
        let platform_dir = shared_root.join("linux-x86_64");
        fs::create_dir_all(&platform_dir).unwrap();
        (temp, platform_dir, shared_root)
    }

    #[test]
    fn promotes_and_removes_platform_copies() {
        let (_temp, platform_dir, shared_root) = setup_dirs();
        for name in SHARED_ASSETS {
            fs::write(platform_dir.join(name), name).unwrap();
        }

        consolidate_shared_assets(&platform_dir, &shared_root).unwrap();

        for name in SHARED_ASSETS {
            assert!(shared_root.join(name).exists(), "{} not promoted", name);
            assert!(
                !platform_dir.join(name).exists(),
                "{} left in platform dir",
                name
            );
        }
    }

    #[test]
    fn existing_shared_copy_is_never_overwritten() {
        let (_temp, platform_dir, shared_root) = setup_dirs();
        fs::write(shared_root.join("geoip.dat"), "canonical").unwrap();
        fs::write(platform_dir.join("geoip.dat"), "newer").unwrap();

        consolidate_shared_assets(&platform_dir, &shared_root).unwrap();

        assert_eq!(
            fs::read_to_string(shared_root.join("geoip.dat")).unwrap(),
            "canonical"
        );
        assert!(
            !platform_dir.join("geoip.dat").exists(),
            "platform copy must be removed even when not promoted"
        );
    }

    #[test]
    fn missing_shared_assets_are_skipped() {
        let (_temp, platform_dir, shared_root) = setup_dirs();
        fs::write(platform_dir.join("geosite.dat"), "data").unwrap();

        consolidate_shared_assets(&platform_dir, &shared_root).unwrap();

        assert!(shared_root.join("geosite.dat").exists());
        assert!(!shared_root.join("geoip.dat").exists());
    }

    #[cfg(unix)]
    #[test]
    fn make_executable_sets_mode_0755() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("xray");
        fs::write(&path, "binary").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        make_executable(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn make_executable_on_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = make_executable(&temp.path().join("absent"));
        #[cfg(unix)]
        assert!(result.is_err());
        #[cfg(not(unix))]
        assert!(result.is_ok());
    }
}
