use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use genschema::{GenschemaConfig, RunOptions, ScanOptions};
use genschema_core::{BuildOptions, RenderOptions, UnresolvedPolicy};
use tracing_subscriber::EnvFilter;

/// Generate JSON Schema fragments from the Go structs declared in each
/// directory.
#[derive(Parser)]
#[command(name = "genschema", author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Directories to scan (defaults to the current directory)
    dirs: Vec<PathBuf>,

    /// Output file path (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print each fragment on a single line
    #[arg(long)]
    compact: bool,

    /// What to emit for fields whose type is not a known struct
    #[arg(long, value_enum)]
    unresolved: Option<Unresolved>,

    /// Ignore `json:"..."` struct tags
    #[arg(long)]
    no_json_tags: bool,

    /// Also read _test.go files
    #[arg(long)]
    include_tests: bool,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Unresolved {
    /// Leave the field's type out
    Omit,
    /// Mark the field's type as "??"
    Placeholder,
}

impl From<Unresolved> for UnresolvedPolicy {
    fn from(value: Unresolved) -> Self {
        match value {
            Unresolved::Omit => UnresolvedPolicy::Omit,
            Unresolved::Placeholder => UnresolvedPolicy::Placeholder,
        }
    }
}

impl Cli {
    /// Flags override the loaded config.
    fn run_options(&self, config: &GenschemaConfig) -> RunOptions {
        RunOptions {
            scan: ScanOptions {
                include_tests: self.include_tests || config.include_tests(),
                recursive: self.recursive || config.recursive(),
            },
            build: BuildOptions {
                json_tags: !self.no_json_tags && config.json_tags(),
            },
            render: RenderOptions {
                unresolved: self
                    .unresolved
                    .map(UnresolvedPolicy::from)
                    .unwrap_or_else(|| config.unresolved()),
            },
            pretty: !self.compact && config.pretty(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so schema output on stdout stays clean for piping.
    const CRATES: &[&str] = &["genschema", "genschema_core"];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES
        .iter()
        .map(|c| format!("{c}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{allowlist}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("genschema: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let config = GenschemaConfig::load(&cwd);
    let options = cli.run_options(&config);

    let dirs = if cli.dirs.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.dirs.clone()
    };

    // Stdout must outlive the lock, so bind it first.
    let stdout = std::io::stdout();
    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(stdout.lock()),
    };

    let report = genschema::run(&dirs, &options, &mut *writer)?;
    writer.flush().context("flushing output")?;

    for failure in &report.failures {
        eprintln!("genschema: {failure}");
    }
    tracing::info!(
        scopes = report.scopes,
        types = report.types,
        failures = report.failures.len(),
        "done"
    );

    Ok(ExitCode::from(report.exit_code()))
}
