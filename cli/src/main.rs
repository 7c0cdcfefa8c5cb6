mod bindings;
mod checks;

use anyhow::{anyhow, bail, Context, Result};
use bindings::Bindings;
use checks::Report;
use clap::{Parser, ValueEnum};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cmodule-check")]
#[command(about = "Load the ctypes benchmark fixture and verify its exports")]
struct Args {
    /// Path to the built shared object. Overrides --target-dir/--profile.
    #[arg(long, env = "CMODULE_LIBRARY")]
    library: Option<PathBuf>,

    #[arg(long, env = "CARGO_TARGET_DIR", default_value = "target")]
    target_dir: PathBuf,

    #[arg(long, default_value = "release")]
    profile: String,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log: String,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

const LIBRARY_NAME: &str = "cmodule";

fn library_file_name() -> String {
    format!("{DLL_PREFIX}{LIBRARY_NAME}{DLL_SUFFIX}")
}

fn resolve_library(args: &Args) -> Result<PathBuf> {
    let path = match &args.library {
        Some(path) => path.clone(),
        None => args
            .target_dir
            .join(&args.profile)
            .join(library_file_name()),
    };
    if !path.is_file() {
        bail!(
            "shared library not found at {} (build it with `cargo build --release -p bm-ctypes-cmodule`)",
            path.display()
        );
    }
    Ok(path)
}

fn init_tracing(directives: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("parsing log directives {directives:?}"))?;
    // Logs go to stderr so `--format json` leaves stdout to the report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init()
        .map_err(|err| anyhow!("installing tracing subscriber: {err}"))
}

/// Text mode logs one event per check. JSON mode writes the report, and only
/// the report, to `out`.
fn write_report(out: &mut impl Write, report: &Report, format: Format) -> Result<()> {
    match format {
        Format::Text => {
            for outcome in &report.outcomes {
                if outcome.passed {
                    info!(check = %outcome.name, "{}", outcome.detail);
                } else {
                    error!(check = %outcome.name, "{}", outcome.detail);
                }
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, report).context("encoding report as JSON")?;
            writeln!(out).context("writing report")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log)?;

    let path = resolve_library(&args)?;
    info!(library = %path.display(), "loading fixture");

    let bindings = Bindings::load(&path)?;
    debug!(symbols = ?Bindings::symbol_names(), "resolved exports");

    let report = checks::run_checks(&bindings);

    write_report(&mut io::stdout().lock(), &report, args.format)?;

    if !report.is_success() {
        return Err(anyhow!(
            "{} of {} checks failed",
            report.failures().len(),
            report.outcomes.len()
        ));
    }
    info!(checks = report.outcomes.len(), "all checks passed");
    Ok(())
}
