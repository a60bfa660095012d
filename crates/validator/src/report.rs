//! Human-readable validation report.

use crate::compare::{Outcome, ValidationResult};
use snapcheck_extractor::{role_title, BundleReferenceSet, ProfileRules, RequiredComponents};
use snapcheck_snapshot::Snapshot;
use std::io::{self, Write};

/// Absent digests print as `None`.
fn digest_or_none(digest: Option<&str>) -> &str {
    digest.unwrap_or("None")
}

pub fn write_header<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    writeln!(out, "=== Validating Snapshot ===")?;
    writeln!(out, "Application: {}", snapshot.application())?;
    writeln!(out, "Stream: {}", snapshot.stream())?;
    writeln!(out)
}

/// List the missing component keys next to what the snapshot does contain.
pub fn write_missing_components<W: Write>(
    out: &mut W,
    missing: &[String],
    available: &[String],
) -> io::Result<()> {
    writeln!(
        out,
        "ERROR: Missing required components: {}",
        missing.join(", ")
    )?;
    writeln!(out)?;
    writeln!(out, "Available components:")?;
    if available.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for name in available {
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

pub fn write_snapshot_digests<W: Write>(
    out: &mut W,
    required: &RequiredComponents,
) -> io::Result<()> {
    writeln!(out, "Snapshot contains:")?;
    for (role, component) in required.roles() {
        writeln!(
            out,
            "  {:<10}{}",
            format!("{}:", role_title(role)),
            digest_or_none(component.digest.as_deref())
        )?;
    }
    writeln!(
        out,
        "  {:<10}{}",
        "Bundle:",
        digest_or_none(required.bundle.digest.as_deref())
    )?;
    writeln!(out)
}

pub fn write_extraction_target<W: Write>(out: &mut W, bundle_image: &str) -> io::Result<()> {
    writeln!(out, "Extracting bundle manifests from:")?;
    writeln!(out, "  {}", bundle_image)?;
    writeln!(out)
}

pub fn write_bundle_references<W: Write>(
    out: &mut W,
    refs: &BundleReferenceSet,
    rules: &ProfileRules,
) -> io::Result<()> {
    writeln!(out, "Bundle references:")?;
    for (rule, _) in rules.roles() {
        let label = format!("{} {}:", rule.manifest.label(), rule.title());
        writeln!(out, "  {:<18}{}", label, digest_or_none(refs.get(&rule.role)))?;
    }
    writeln!(out)
}

/// Per-role PASS/FAIL lines followed by the summary.
pub fn write_results<W: Write>(
    out: &mut W,
    result: &ValidationResult,
    rules: &ProfileRules,
) -> io::Result<()> {
    writeln!(out, "=== Validation Results ===")?;

    for outcome in &result.outcomes {
        let role = outcome.role.as_str();
        match outcome.outcome {
            Outcome::Match => writeln!(out, "PASS: {} matches", role_title(role))?,
            Outcome::Mismatch => {
                writeln!(out, "FAIL: {} mismatch", role_title(role))?;
                writeln!(
                    out,
                    "  Bundle wants:  {}",
                    digest_or_none(outcome.actual.as_deref())
                )?;
                writeln!(
                    out,
                    "  Snapshot has:  {}",
                    digest_or_none(outcome.expected.as_deref())
                )?;
            }
            Outcome::Missing => writeln!(
                out,
                "FAIL: Could not extract {} reference from {}",
                role,
                rules
                    .rule(role)
                    .map_or("bundle manifests", |rule| rule.manifest.label())
            )?,
        }
    }

    writeln!(out)?;
    if result.passed() {
        writeln!(out, "PASSED: All {} references match", result.matches())?;
        writeln!(out, "This snapshot is self-consistent and safe to release.")
    } else {
        writeln!(
            out,
            "FAILED: {} mismatch(es), {} match(es)",
            result.failures(),
            result.matches()
        )?;
        writeln!(out, "This snapshot should NOT be released.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{aggregate, RoleOutcome};
    use pretty_assertions::assert_eq;
    use snapcheck_extractor::{resolve_required_components, ExtractionProfile};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_missing_components_report() {
        let text = render(|out| {
            write_missing_components(
                out,
                &["bpfman-daemon-zstream".to_string()],
                &[
                    "bpfman-operator-zstream".to_string(),
                    "bpfman-agent-zstream".to_string(),
                ],
            )
        });
        assert_eq!(
            text,
            "ERROR: Missing required components: bpfman-daemon-zstream\n\
             \n\
             Available components:\n\
             \x20 - bpfman-operator-zstream\n\
             \x20 - bpfman-agent-zstream\n"
        );
    }

    #[test]
    fn test_unpinned_snapshot_digest_prints_none() {
        let json = serde_json::json!({
            "application": "bpfman-operator-zstream",
            "components": [
                {"name": "bpfman-operator-zstream", "containerImage": "quay.io/bpfman/operator:v0.5.6"},
                {"name": "bpfman-agent-zstream", "containerImage": "quay.io/bpfman/agent@sha256:bbb"},
                {"name": "bpfman-daemon-zstream", "containerImage": "quay.io/bpfman/daemon@sha256:ccc"},
                {"name": "bpfman-operator-bundle-zstream", "containerImage": "quay.io/bpfman/bundle@sha256:eee"},
            ],
        });
        let snapshot = Snapshot::parse(&json.to_string()).unwrap();
        let required = resolve_required_components(
            &snapshot,
            snapshot.stream(),
            &ExtractionProfile::default(),
        )
        .unwrap();

        let text = render(|out| write_snapshot_digests(out, &required));
        assert_eq!(
            text,
            "Snapshot contains:\n\
             \x20 Operator: None\n\
             \x20 Agent:    sha256:bbb\n\
             \x20 Daemon:   sha256:ccc\n\
             \x20 Bundle:   sha256:eee\n\
             \n"
        );
    }

    #[test]
    fn test_bundle_references_report() {
        let rules = ExtractionProfile::default().compile().unwrap();
        let refs: BundleReferenceSet = [
            ("operator", Some("sha256:aaa")),
            ("agent", None),
            ("daemon", Some("sha256:ccc")),
        ]
        .into_iter()
        .map(|(role, digest)| (role.to_string(), digest.map(str::to_string)))
        .collect();
        let text = render(|out| write_bundle_references(out, &refs, &rules));
        assert_eq!(
            text,
            "Bundle references:\n\
             \x20 CSV Operator:     sha256:aaa\n\
             \x20 ConfigMap Agent:  None\n\
             \x20 ConfigMap Daemon: sha256:ccc\n\
             \n"
        );
    }

    #[test]
    fn test_results_report_failures() {
        let rules = ExtractionProfile::default().compile().unwrap();
        let result = aggregate([
            RoleOutcome::evaluate("operator", Some("sha256:aaa"), None),
            RoleOutcome::evaluate("agent", Some("sha256:bbb"), Some("sha256:ddd")),
            RoleOutcome::evaluate("daemon", Some("sha256:ccc"), Some("sha256:ccc")),
        ]);
        let text = render(|out| write_results(out, &result, &rules));
        assert_eq!(
            text,
            "=== Validation Results ===\n\
             FAIL: Could not extract operator reference from CSV\n\
             FAIL: Agent mismatch\n\
             \x20 Bundle wants:  sha256:ddd\n\
             \x20 Snapshot has:  sha256:bbb\n\
             PASS: Daemon matches\n\
             \n\
             FAILED: 2 mismatch(es), 1 match(es)\n\
             This snapshot should NOT be released.\n"
        );
    }
}
