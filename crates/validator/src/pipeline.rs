//! Snapshot validation pipeline: parse, resolve, extract, compare, report.

use crate::compare::{aggregate, RoleOutcome, ValidationResult};
use crate::report;
use snapcheck_common::{Error, Result};
use snapcheck_extractor::{
    extract_bundle_references, resolve_required_components, ImageExtractor, ProfileRules,
};
use snapcheck_snapshot::Snapshot;
use std::io::Write;
use tracing::{debug, info};

/// Validate a raw snapshot against the manifests of the bundle it names.
///
/// The report is written to `out` as the pipeline progresses. Missing
/// snapshot components are reported in full before the
/// [`Error::MissingComponents`] is returned; any other error aborts the run
/// without a verdict.
pub async fn validate_snapshot<E, W>(
    raw_snapshot: &str,
    extractor: &E,
    rules: &ProfileRules,
    out: &mut W,
) -> Result<ValidationResult>
where
    E: ImageExtractor + ?Sized,
    W: Write,
{
    let snapshot = Snapshot::parse(raw_snapshot)?;
    let stream = snapshot.stream();
    info!(
        "Validating snapshot {} ({} stream)",
        snapshot.application(),
        stream
    );
    report::write_header(out, &snapshot)?;

    let required = match resolve_required_components(&snapshot, stream, rules.profile()) {
        Ok(required) => required,
        Err(Error::MissingComponents { missing, available }) => {
            report::write_missing_components(out, &missing, &available)?;
            return Err(Error::MissingComponents { missing, available });
        }
        Err(e) => return Err(e),
    };
    report::write_snapshot_digests(out, &required)?;

    let bundle_image = required.bundle.image.as_str();
    report::write_extraction_target(out, bundle_image)?;
    out.flush()?;

    let refs = extract_bundle_references(extractor, rules, bundle_image).await?;
    report::write_bundle_references(out, &refs, rules)?;

    let result = aggregate(required.roles().map(|(role, component)| {
        let outcome =
            RoleOutcome::evaluate(role, component.digest.as_deref(), refs.get(role));
        debug!("{}: {}", role, outcome.outcome);
        outcome
    }));

    report::write_results(out, &result, rules)?;
    Ok(result)
}
