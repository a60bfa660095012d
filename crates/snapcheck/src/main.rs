//! snapcheck - Release gate for operator bundles.
//!
//! Checks that the image digests a release snapshot records are the ones the
//! operator bundle's manifests actually reference.

mod input;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use snapcheck_common::{Error, EXIT_OPERATIONAL, EXIT_PASS};
use snapcheck_extractor::executor::DEFAULT_OC_BINARY;
use snapcheck_extractor::{ExtractionProfile, OcImageExtractor};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "snapcheck")]
#[command(
    author,
    version,
    about = "Validate that a release snapshot is self-consistent with its operator bundle"
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Snapshot JSON (can also be provided via SNAPSHOT env var or stdin)
    #[arg(long)]
    snapshot: Option<String>,

    /// Extraction profile (YAML) to use instead of the built-in bpfman layout
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Image extraction tool
    #[arg(long, default_value = DEFAULT_OC_BINARY)]
    oc: PathBuf,

    /// Print the extraction profile as YAML and exit
    #[arg(long)]
    print_profile: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let (code, message) = failure(&e);
            if let Some(message) = message {
                eprintln!("{}", message);
            }
            code
        }
    };

    std::process::exit(code);
}

/// Exit status for a failed run and the message to print on stderr.
///
/// Validation failures have already been reported on stdout and print
/// nothing more.
fn failure(err: &anyhow::Error) -> (i32, Option<String>) {
    let code = err
        .downcast_ref::<Error>()
        .map(Error::exit_code)
        .unwrap_or(EXIT_OPERATIONAL);
    let message = (code == EXIT_OPERATIONAL).then(|| format!("ERROR: {}", render_error(err)));
    (code, message)
}

/// Join the context chain of `err` with `: `.
///
/// snapcheck errors already carry their source in their own message, so the
/// chain stops at the first one.
fn render_error(err: &anyhow::Error) -> String {
    let mut parts = Vec::new();
    for cause in err.chain() {
        parts.push(cause.to_string());
        if cause.is::<Error>() {
            break;
        }
    }
    parts.join(": ")
}

fn load_profile(path: Option<&Path>) -> Result<ExtractionProfile> {
    match path {
        Some(path) => ExtractionProfile::load(path)
            .with_context(|| format!("Failed to load extraction profile {:?}", path)),
        None => Ok(ExtractionProfile::default()),
    }
}

fn require_snapshot(raw: Option<String>) -> Result<String> {
    raw.ok_or_else(|| {
        anyhow!(
            "No snapshot provided\nProvide via --snapshot argument, {} env var, or stdin",
            input::SNAPSHOT_ENV
        )
    })
}

async fn run(cli: Cli) -> Result<i32> {
    let profile = load_profile(cli.profile.as_deref())?;

    if cli.print_profile {
        print!("{}", serde_yaml::to_string(&profile)?);
        return Ok(EXIT_PASS);
    }

    let rules = profile.compile()?;

    let stdin = io::stdin();
    let piped = (!stdin.is_terminal()).then(|| stdin.lock());
    let raw = input::read_snapshot(
        cli.snapshot,
        std::env::var(input::SNAPSHOT_ENV).ok(),
        piped,
    )
    .context("Failed to read snapshot from stdin")?;
    let raw = require_snapshot(raw)?;
    debug!("Read {} bytes of snapshot JSON", raw.len());

    let extractor = OcImageExtractor::new(cli.oc);
    let mut stdout = io::stdout().lock();

    let result =
        snapcheck_validator::validate_snapshot(&raw, &extractor, &rules, &mut stdout).await?;

    info!(
        "Validation finished: {} match(es), {} failure(s)",
        result.matches(),
        result.failures()
    );
    Ok(result.exit_code())
}
