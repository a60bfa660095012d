//! Extraction profile: the declarative table of where each role's digest
//! lives inside the bundle.

use regex::Regex;
use serde::{Deserialize, Serialize};
use snapcheck_common::digest::DIGEST_PATTERN;
use snapcheck_common::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Role names of the built-in bpfman profile.
pub mod role {
    pub const OPERATOR: &str = "operator";
    pub const AGENT: &str = "agent";
    pub const DAEMON: &str = "daemon";
}

/// Capitalised role name used in report lines.
pub fn role_title(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Bundle manifest a rule reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    ClusterServiceVersion,
    ConfigMap,
}

impl ManifestKind {
    /// Short name used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ManifestKind::ClusterServiceVersion => "CSV",
            ManifestKind::ConfigMap => "ConfigMap",
        }
    }
}

/// File names of the manifests inside the extracted directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFiles {
    pub cluster_service_version: String,
    pub config_map: String,
}

impl ManifestFiles {
    pub fn file_name(&self, kind: ManifestKind) -> &str {
        match kind {
            ManifestKind::ClusterServiceVersion => &self.cluster_service_version,
            ManifestKind::ConfigMap => &self.config_map,
        }
    }
}

/// Where one role's digest is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    /// Role name, e.g. `operator`.
    pub role: String,
    /// Snapshot component name prefix; the stream is appended as `-<stream>`.
    pub component: String,
    /// Manifest the digest is embedded in.
    pub manifest: ManifestKind,
    /// Regex with exactly one capture group yielding the digest.
    pub pattern: String,
}

impl RoleRule {
    pub fn title(&self) -> String {
        role_title(&self.role)
    }
}

/// Full extraction profile for one operator's bundle layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionProfile {
    /// Directory inside the bundle image that holds the manifests.
    #[serde(default = "default_image_path")]
    pub image_path: String,
    /// Snapshot component name prefix of the bundle image itself.
    pub bundle_component: String,
    pub manifests: ManifestFiles,
    /// Digest roles, in reporting order.
    pub roles: Vec<RoleRule>,
}

fn default_image_path() -> String {
    "/manifests/".to_string()
}

impl Default for ExtractionProfile {
    /// Layout of the bpfman operator bundle.
    fn default() -> Self {
        Self {
            image_path: default_image_path(),
            bundle_component: "bpfman-operator-bundle".to_string(),
            manifests: ManifestFiles {
                cluster_service_version: "bpfman-operator.clusterserviceversion.yaml".to_string(),
                config_map: "bpfman-config_v1_configmap.yaml".to_string(),
            },
            roles: vec![
                RoleRule {
                    role: role::OPERATOR.to_string(),
                    component: "bpfman-operator".to_string(),
                    manifest: ManifestKind::ClusterServiceVersion,
                    pattern: format!(
                        r"registry\.redhat\.io/bpfman/bpfman-rhel9-operator@({})",
                        DIGEST_PATTERN
                    ),
                },
                RoleRule {
                    role: role::AGENT.to_string(),
                    component: "bpfman-agent".to_string(),
                    manifest: ManifestKind::ConfigMap,
                    pattern: format!(r"bpfman\.agent\.image:.*@({})", DIGEST_PATTERN),
                },
                RoleRule {
                    role: role::DAEMON.to_string(),
                    component: "bpfman-daemon".to_string(),
                    manifest: ManifestKind::ConfigMap,
                    pattern: format!(r"bpfman\.image:.*@({})", DIGEST_PATTERN),
                },
            ],
        }
    }
}

impl ExtractionProfile {
    /// Parse a profile from YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let profile: ExtractionProfile = serde_yaml::from_str(content)?;
        Ok(profile)
    }

    /// Load a profile from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading extraction profile from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Mutable access to one role's rule, for adjusting a built-in profile.
    pub fn rule_mut(&mut self, role: &str) -> Option<&mut RoleRule> {
        self.roles.iter_mut().find(|rule| rule.role == role)
    }

    /// Validate the profile and compile its patterns.
    pub fn compile(self) -> Result<ProfileRules> {
        if self.image_path.trim().is_empty() {
            return Err(Error::Profile("image_path must not be empty".to_string()));
        }
        if self.bundle_component.trim().is_empty() {
            return Err(Error::Profile(
                "bundle_component must not be empty".to_string(),
            ));
        }
        for name in [
            &self.manifests.cluster_service_version,
            &self.manifests.config_map,
        ] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(Error::Profile(format!(
                    "invalid manifest file name: {:?}",
                    name
                )));
            }
        }

        if self.roles.is_empty() {
            return Err(Error::Profile("at least one role is required".to_string()));
        }

        let mut patterns = Vec::with_capacity(self.roles.len());
        for (i, rule) in self.roles.iter().enumerate() {
            if self.roles[..i].iter().any(|prev| prev.role == rule.role) {
                return Err(Error::Profile(format!("duplicate role: {}", rule.role)));
            }
            patterns.push(compile_rule(rule)?);
        }

        Ok(ProfileRules {
            profile: self,
            patterns,
        })
    }
}

fn compile_rule(rule: &RoleRule) -> Result<Regex> {
    let role = &rule.role;
    if role.trim().is_empty() {
        return Err(Error::Profile("role name must not be empty".to_string()));
    }
    if rule.component.trim().is_empty() {
        return Err(Error::Profile(format!(
            "component prefix for {} must not be empty",
            role
        )));
    }

    let regex = Regex::new(&rule.pattern).map_err(|source| Error::InvalidPattern {
        role: role.clone(),
        source,
    })?;

    // Group 0 is the whole match.
    if regex.captures_len() != 2 {
        return Err(Error::Profile(format!(
            "pattern for {} must have exactly one capture group",
            role
        )));
    }

    Ok(regex)
}

/// A validated profile with its patterns compiled.
#[derive(Debug, Clone)]
pub struct ProfileRules {
    profile: ExtractionProfile,
    /// One per role, in profile order.
    patterns: Vec<Regex>,
}

impl ProfileRules {
    pub fn profile(&self) -> &ExtractionProfile {
        &self.profile
    }

    /// Every role's rule with its compiled pattern, in reporting order.
    pub fn roles(&self) -> impl Iterator<Item = (&RoleRule, &Regex)> {
        self.profile.roles.iter().zip(&self.patterns)
    }

    pub fn rule(&self, role: &str) -> Option<&RoleRule> {
        self.profile.roles.iter().find(|rule| rule.role == role)
    }

    pub fn pattern(&self, role: &str) -> Option<&Regex> {
        self.roles()
            .find(|(rule, _)| rule.role == role)
            .map(|(_, pattern)| pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const BPFMAN_PROFILE: &str = r#"
bundle_component: bpfman-operator-bundle
manifests:
  cluster_service_version: bpfman-operator.clusterserviceversion.yaml
  config_map: bpfman-config_v1_configmap.yaml
roles:
  - role: operator
    component: bpfman-operator
    manifest: cluster_service_version
    pattern: 'registry\.redhat\.io/bpfman/bpfman-rhel9-operator@(sha256:[a-f0-9]+)'
  - role: agent
    component: bpfman-agent
    manifest: config_map
    pattern: 'bpfman\.agent\.image:.*@(sha256:[a-f0-9]+)'
  - role: daemon
    component: bpfman-daemon
    manifest: config_map
    pattern: 'bpfman\.image:.*@(sha256:[a-f0-9]+)'
"#;

    #[test]
    fn test_yaml_profile_matches_default() {
        let profile = ExtractionProfile::from_yaml(BPFMAN_PROFILE).unwrap();
        assert_eq!(profile, ExtractionProfile::default());
    }

    #[test]
    fn test_default_profile_compiles() {
        let rules = ExtractionProfile::default().compile().unwrap();
        assert_eq!(
            rules.rule(role::AGENT).map(|r| r.manifest),
            Some(ManifestKind::ConfigMap)
        );
        assert!(rules
            .pattern(role::OPERATOR)
            .unwrap()
            .is_match("registry.redhat.io/bpfman/bpfman-rhel9-operator@sha256:abc"));

        let order: Vec<&str> = rules.roles().map(|(rule, _)| rule.role.as_str()).collect();
        assert_eq!(order, vec!["operator", "agent", "daemon"]);
        assert!(rules.rule("csi").is_none());
    }

    #[test]
    fn test_role_title() {
        assert_eq!(role_title("operator"), "Operator");
        assert_eq!(role_title("kube-rbac-proxy"), "Kube-rbac-proxy");
        assert_eq!(role_title(""), "");
    }

    #[test]
    fn test_load_profile_from_file() {
        let file = assert_fs::NamedTempFile::new("profile.yaml").unwrap();
        file.write_str(&BPFMAN_PROFILE.replace("bpfman-agent\n", "bpfman-node-agent\n"))
            .unwrap();

        let profile = ExtractionProfile::load(file.path()).unwrap();
        assert_eq!(profile.roles[1].component, "bpfman-node-agent");
    }

    #[test]
    fn test_new_role_is_data_only() {
        let yaml = format!(
            "{}  - role: proxy\n    component: bpfman-kube-rbac-proxy\n    manifest: cluster_service_version\n    pattern: 'ose-kube-rbac-proxy-rhel9@(sha256:[a-f0-9]+)'\n",
            BPFMAN_PROFILE
        );
        let rules = ExtractionProfile::from_yaml(&yaml)
            .unwrap()
            .compile()
            .unwrap();

        assert_eq!(rules.roles().count(), 4);
        let proxy = rules.rule("proxy").unwrap();
        assert_eq!(proxy.title(), "Proxy");
        assert_eq!(proxy.manifest, ManifestKind::ClusterServiceVersion);
    }

    #[test]
    fn test_role_set_must_be_valid() {
        let mut profile = ExtractionProfile::default();
        profile.roles.clear();
        assert!(matches!(profile.compile().unwrap_err(), Error::Profile(_)));

        let mut profile = ExtractionProfile::default();
        profile.roles[2].role = "agent".to_string();
        let err = profile.compile().unwrap_err();
        assert!(err.to_string().contains("duplicate role: agent"));

        let mut profile = ExtractionProfile::default();
        profile.roles[0].role = " ".to_string();
        assert!(matches!(profile.compile().unwrap_err(), Error::Profile(_)));
    }

    #[test]
    fn test_missing_rule_field_is_rejected() {
        let yaml = BPFMAN_PROFILE.replace("    manifest: config_map\n", "");
        let err = ExtractionProfile::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_pattern_needs_one_capture_group() {
        let mut profile = ExtractionProfile::default();
        profile.rule_mut(role::DAEMON).unwrap().pattern =
            r"bpfman\.image:.*@sha256:[a-f0-9]+".to_string();
        let err = profile.compile().unwrap_err();
        assert!(err.to_string().contains("daemon"));

        let mut profile = ExtractionProfile::default();
        profile.rule_mut(role::AGENT).unwrap().pattern = "(a)(b)".to_string();
        assert!(matches!(profile.compile().unwrap_err(), Error::Profile(_)));
    }

    #[test]
    fn test_invalid_regex() {
        let mut profile = ExtractionProfile::default();
        profile.rule_mut(role::OPERATOR).unwrap().pattern = "(unclosed".to_string();
        let err = profile.compile().unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref role, .. } if role == "operator"));
    }

    #[test]
    fn test_manifest_names_must_be_plain_files() {
        let mut profile = ExtractionProfile::default();
        profile.manifests.config_map = "../configmap.yaml".to_string();
        assert!(matches!(profile.compile().unwrap_err(), Error::Profile(_)));
    }
}
