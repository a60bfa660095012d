//! Bundle manifest extraction.

use crate::executor::ImageExtractor;
use crate::profile::{ExtractionProfile, ManifestKind};
use snapcheck_common::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Raw text of the two bundle manifests the digests are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleManifests {
    pub cluster_service_version: String,
    pub config_map: String,
}

impl BundleManifests {
    pub fn text(&self, kind: ManifestKind) -> &str {
        match kind {
            ManifestKind::ClusterServiceVersion => &self.cluster_service_version,
            ManifestKind::ConfigMap => &self.config_map,
        }
    }
}

/// Extract the CSV and ConfigMap from a bundle image.
///
/// The manifests are copied into a temporary directory owned by this call.
/// It is removed when the call returns, whether extraction succeeded or not.
pub async fn extract_manifests<E>(
    extractor: &E,
    profile: &ExtractionProfile,
    bundle_image: &str,
) -> Result<BundleManifests>
where
    E: ImageExtractor + ?Sized,
{
    let workdir = tempfile::Builder::new()
        .prefix("snapcheck-bundle-")
        .tempdir()?;
    let manifests_dir = workdir.path().join("manifests");
    std::fs::create_dir_all(&manifests_dir)?;

    info!("Extracting {} from {}", profile.image_path, bundle_image);
    extractor
        .extract(bundle_image, &profile.image_path, &manifests_dir)
        .await?;

    let manifests = BundleManifests {
        cluster_service_version: read_manifest(
            &manifests_dir,
            profile
                .manifests
                .file_name(ManifestKind::ClusterServiceVersion),
        )?,
        config_map: read_manifest(
            &manifests_dir,
            profile.manifests.file_name(ManifestKind::ConfigMap),
        )?,
    };

    debug!("Removing {:?}", workdir.path());
    workdir.close()?;

    Ok(manifests)
}

fn read_manifest(dir: &Path, file_name: &str) -> Result<String> {
    let path = dir.join(file_name);
    if !path.is_file() {
        return Err(Error::ManifestNotFound { path });
    }
    Ok(std::fs::read_to_string(&path)?)
}
