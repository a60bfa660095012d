//! Bundle reference extraction for snapcheck.
//!
//! Pulls the manifests out of an operator bundle image and finds the image
//! digests they reference. Extraction (which runs an external tool) is kept
//! apart from parsing, which is pure text matching driven by an
//! [`ExtractionProfile`].

pub mod executor;
pub mod manifests;
pub mod parsers;
pub mod profile;
pub mod required;

pub use executor::{ImageExtractor, OcImageExtractor};
pub use manifests::{extract_manifests, BundleManifests};
pub use parsers::{parse_bundle_references, BundleReferenceSet};
pub use profile::{role_title, ExtractionProfile, ManifestKind, ProfileRules, RoleRule};
pub use required::{resolve_required_components, RequiredComponents};

use snapcheck_common::Result;

/// Extract a bundle image's manifests and parse the digests they reference.
pub async fn extract_bundle_references<E>(
    extractor: &E,
    rules: &ProfileRules,
    bundle_image: &str,
) -> Result<BundleReferenceSet>
where
    E: ImageExtractor + ?Sized,
{
    let manifests = extract_manifests(extractor, rules.profile(), bundle_image).await?;
    Ok(parse_bundle_references(rules, &manifests))
}
