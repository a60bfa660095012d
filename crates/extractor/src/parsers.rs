//! Parsers for digest references embedded in bundle manifests.

use crate::manifests::BundleManifests;
use crate::profile::{role, ProfileRules};
use regex::Regex;
use tracing::debug;

/// Digests the bundle's manifests reference, one per profile role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleReferenceSet {
    digests: Vec<(String, Option<String>)>,
}

impl BundleReferenceSet {
    /// Digest found for `role`; `None` when the role is unknown or the
    /// manifest carries no digest for it.
    pub fn get(&self, role: &str) -> Option<&str> {
        self.digests
            .iter()
            .find(|(name, _)| name == role)
            .and_then(|(_, digest)| digest.as_deref())
    }

    /// Roles and their digests, in profile order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.digests
            .iter()
            .map(|(name, digest)| (name.as_str(), digest.as_deref()))
    }
}

impl FromIterator<(String, Option<String>)> for BundleReferenceSet {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self {
            digests: iter.into_iter().collect(),
        }
    }
}

/// Return the first capture of `pattern` in `text`.
pub fn parse_digest(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Apply the named role's pattern to `text`.
pub fn parse_role_digest(rules: &ProfileRules, role: &str, text: &str) -> Option<String> {
    rules
        .pattern(role)
        .and_then(|pattern| parse_digest(pattern, text))
}

/// Operator digest from the CSV's related images.
pub fn parse_operator_digest(rules: &ProfileRules, csv: &str) -> Option<String> {
    parse_role_digest(rules, role::OPERATOR, csv)
}

/// Agent digest from the ConfigMap data.
pub fn parse_agent_digest(rules: &ProfileRules, config_map: &str) -> Option<String> {
    parse_role_digest(rules, role::AGENT, config_map)
}

/// Daemon digest from the ConfigMap data.
pub fn parse_daemon_digest(rules: &ProfileRules, config_map: &str) -> Option<String> {
    parse_role_digest(rules, role::DAEMON, config_map)
}

/// Apply every role's rule to the manifest it names.
pub fn parse_bundle_references(
    rules: &ProfileRules,
    manifests: &BundleManifests,
) -> BundleReferenceSet {
    rules
        .roles()
        .map(|(rule, pattern)| {
            let digest = parse_digest(pattern, manifests.text(rule.manifest));
            debug!(
                "{} reference in {}: {:?}",
                rule.role,
                rule.manifest.label(),
                digest
            );
            (rule.role.clone(), digest)
        })
        .collect()
}
