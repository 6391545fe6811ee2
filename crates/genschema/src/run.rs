//! Scan-then-render driver.
//!
//! Every directory is scanned independently (in parallel); each package
//! scope gets its own registry. Output is written in argument order, then
//! package order, then declaration order, so it does not depend on
//! scheduling.

use crate::scan::{self, ScanError, ScanOptions, Scope};
use anyhow::{Context, Result};
use genschema_core::{BuildOptions, RenderOptions, SchemaFragment, generate};
use rayon::prelude::*;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything that controls one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub scan: ScanOptions,
    pub build: BuildOptions,
    pub render: RenderOptions,
    /// Indent each fragment instead of printing it on one line.
    pub pretty: bool,
}

/// A scope (directory) that produced no output.
#[derive(Debug)]
pub struct ScopeFailure {
    pub scope: PathBuf,
    pub error: ScanError,
}

impl fmt::Display for ScopeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            // These already name the file or directory.
            ScanError::NotADirectory(_) | ScanError::Parse { .. } | ScanError::Read { .. } => {
                write!(f, "{}", self.error)
            }
            ScanError::Walk { .. } => write!(f, "{}: {}", self.scope.display(), self.error),
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct Report {
    pub scopes: usize,
    pub types: usize,
    pub failures: Vec<ScopeFailure>,
}

impl Report {
    /// Process exit status: 0 on success, 2 if any scope failed.
    pub fn exit_code(&self) -> u8 {
        if self.failures.is_empty() { 0 } else { 2 }
    }
}

/// Rendered output of one package scope.
struct ScopeOutput {
    scope: Scope,
    fragments: Vec<SchemaFragment>,
}

/// Scan `roots`, render every struct found and write the fragments to `out`.
///
/// Scan failures are collected in the report; only write errors abort.
pub fn run(roots: &[PathBuf], options: &RunOptions, out: &mut dyn Write) -> Result<Report> {
    let mut report = Report::default();

    let mut dirs = Vec::new();
    for root in roots {
        match scan::source_dirs(root, &options.scan) {
            Ok(found) => dirs.extend(found),
            Err(error) => report.failures.push(ScopeFailure {
                scope: root.clone(),
                error,
            }),
        }
    }

    let results: Vec<(PathBuf, Result<Vec<ScopeOutput>, ScanError>)> = dirs
        .into_par_iter()
        .map(|dir| {
            let result = process_dir(&dir, options);
            (dir, result)
        })
        .collect();

    for (dir, result) in results {
        let outputs = match result {
            Ok(outputs) => outputs,
            Err(error) => {
                tracing::debug!(dir = %dir.display(), "scope failed: {error}");
                report.failures.push(ScopeFailure { scope: dir, error });
                continue;
            }
        };

        for output in outputs {
            report.scopes += 1;
            report.types += output.fragments.len();
            write_scope(&output, options.pretty, out)
                .with_context(|| format!("writing schema for {}", output.scope.dir.display()))?;
        }
    }

    Ok(report)
}

fn process_dir(dir: &Path, options: &RunOptions) -> Result<Vec<ScopeOutput>, ScanError> {
    let scopes = scan::scan_dir(dir, &options.scan)?;
    Ok(scopes
        .into_iter()
        .map(|scope| {
            let fragments = generate(&scope.units, options.build, options.render);
            tracing::debug!(
                dir = %scope.dir.display(),
                package = %scope.package,
                types = fragments.len(),
                "rendered scope"
            );
            ScopeOutput { scope, fragments }
        })
        .collect())
}

fn write_scope(output: &ScopeOutput, pretty: bool, out: &mut dyn Write) -> std::io::Result<()> {
    for fragment in &output.fragments {
        writeln!(out, "=== {} ===", fragment.name)?;
        if pretty {
            writeln!(out, "{}", fragment.to_pretty())?;
        } else {
            writeln!(out, "{fragment}")?;
        }
    }
    Ok(())
}
