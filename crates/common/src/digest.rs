//! Image digest helpers.

use regex::Regex;
use std::sync::LazyLock;

/// Regex fragment matching a sha256 digest.
///
/// Any non-empty run of lowercase hex is accepted; the canonical 64 character
/// length is not enforced so truncated test digests still compare.
pub const DIGEST_PATTERN: &str = "sha256:[a-f0-9]+";

static DIGEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}$", DIGEST_PATTERN)).unwrap());

/// Split an image reference on its first `@` and return the digest part.
///
/// The suffix is returned as-is, without checking its shape.
pub fn extract_digest(image_ref: &str) -> Option<&str> {
    image_ref.split_once('@').map(|(_, digest)| digest)
}

/// Check whether a value has the `sha256:<hex>` shape.
pub fn is_sha256_digest(value: &str) -> bool {
    DIGEST_RE.is_match(value)
}
