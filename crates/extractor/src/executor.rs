//! Image content extraction tools.

use async_trait::async_trait;
use snapcheck_common::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Default extraction tool binary.
pub const DEFAULT_OC_BINARY: &str = "oc";

/// Trait for copying a directory out of a container image.
#[async_trait]
pub trait ImageExtractor: Send + Sync {
    /// Copy `source_path` from `image` into the local `destination` directory.
    async fn extract(&self, image: &str, source_path: &str, destination: &Path) -> Result<()>;
}

/// Extractor backed by `oc image extract`, which needs no container runtime.
pub struct OcImageExtractor {
    binary: PathBuf,
}

impl OcImageExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Build the argument list for one extraction.
    fn args(image: &str, source_path: &str, destination: &Path) -> Vec<String> {
        vec![
            "image".to_string(),
            "extract".to_string(),
            image.to_string(),
            format!("--path={}:{}", source_path, destination.display()),
        ]
    }
}

impl Default for OcImageExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_OC_BINARY)
    }
}

#[async_trait]
impl ImageExtractor for OcImageExtractor {
    async fn extract(&self, image: &str, source_path: &str, destination: &Path) -> Result<()> {
        let binary = which::which(&self.binary).map_err(|e| Error::Extraction {
            image: image.to_string(),
            stderr: format!("{} not found: {}", self.binary.display(), e),
        })?;

        let args = Self::args(image, source_path, destination);
        debug!("Running {} {}", binary.display(), args.join(" "));

        let output = Command::new(&binary)
            .args(&args)
            .output()
            .await
            .map_err(|e| Error::Extraction {
                image: image.to_string(),
                stderr: format!("failed to run {}: {}", binary.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::Extraction {
                image: image.to_string(),
                stderr: if stderr.is_empty() {
                    format!("{} exited with {}", binary.display(), output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oc_args() {
        let args = OcImageExtractor::args(
            "quay.io/bpfman/bundle@sha256:abc",
            "/manifests/",
            Path::new("/tmp/x/manifests"),
        );
        assert_eq!(
            args,
            vec![
                "image",
                "extract",
                "quay.io/bpfman/bundle@sha256:abc",
                "--path=/manifests/:/tmp/x/manifests",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_extraction_error() {
        let extractor = OcImageExtractor::new("snapcheck-no-such-oc-binary");
        let dir = tempfile::tempdir().unwrap();
        let err = extractor
            .extract("quay.io/x@sha256:1", "/manifests/", dir.path())
            .await
            .unwrap_err();
        match err {
            Error::Extraction { image, stderr } => {
                assert_eq!(image, "quay.io/x@sha256:1");
                assert!(stderr.contains("snapcheck-no-such-oc-binary"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_failure_carries_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("fake-oc");
        std::fs::write(&tool, "#!/bin/sh\necho 'error: unauthorized' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = OcImageExtractor::new(&tool);
        let err = extractor
            .extract("quay.io/x@sha256:1", "/manifests/", dir.path())
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::Extraction { ref stderr, .. } if stderr == "error: unauthorized")
        );
    }
}
