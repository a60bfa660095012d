//! Resolution of the snapshot components a bundle validation needs.

use crate::profile::ExtractionProfile;
use snapcheck_common::{Error, Result, Stream};
use snapcheck_snapshot::{Component, Snapshot};

/// Snapshot component key for a name prefix in a stream.
pub fn component_key(prefix: &str, stream: Stream) -> String {
    format!("{}-{}", prefix, stream)
}

/// The components every evaluable snapshot must contain: one per profile
/// role, plus the bundle.
#[derive(Debug, Clone)]
pub struct RequiredComponents {
    roles: Vec<(String, Component)>,
    pub bundle: Component,
}

impl RequiredComponents {
    pub fn for_role(&self, role: &str) -> Option<&Component> {
        self.roles
            .iter()
            .find(|(name, _)| name == role)
            .map(|(_, component)| component)
    }

    /// Role components, in profile order.
    pub fn roles(&self) -> impl Iterator<Item = (&str, &Component)> {
        self.roles
            .iter()
            .map(|(name, component)| (name.as_str(), component))
    }
}

/// Look up each role's component and the bundle component for `stream`.
///
/// Every missing key is reported, roles first in profile order and the
/// bundle last, not just the first one.
pub fn resolve_required_components(
    snapshot: &Snapshot,
    stream: Stream,
    profile: &ExtractionProfile,
) -> Result<RequiredComponents> {
    let mut missing = Vec::new();
    let mut roles = Vec::with_capacity(profile.roles.len());

    for rule in &profile.roles {
        let key = component_key(&rule.component, stream);
        match snapshot.component(&key) {
            Some(component) => roles.push((rule.role.clone(), component.clone())),
            None => missing.push(key),
        }
    }

    let bundle_key = component_key(&profile.bundle_component, stream);
    let bundle = snapshot.component(&bundle_key);
    if bundle.is_none() {
        missing.push(bundle_key);
    }

    match bundle {
        Some(bundle) if missing.is_empty() => Ok(RequiredComponents {
            roles,
            bundle: bundle.clone(),
        }),
        _ => Err(Error::MissingComponents {
            missing,
            available: snapshot.component_names(),
        }),
    }
}
