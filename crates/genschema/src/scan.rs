//! Source discovery.
//!
//! A scope is one package in one directory: every non-test source file of
//! the directory that declares that package. A file that fails to read or
//! parse fails its whole directory.
//!
//! Ignore files and hidden entries only prune the recursive directory walk.
//! Within a directory every source file is read.

use genschema_core::input::reader_for_extension;
use genschema_core::{ReadError, SourceUnit};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Which files and directories a scan covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Also read `_test.go` files.
    pub include_tests: bool,
    /// Descend into subdirectories.
    pub recursive: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("{}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// The parsed files of one package.
#[derive(Debug, Clone)]
pub struct Scope {
    pub dir: PathBuf,
    pub package: String,
    pub units: Vec<SourceUnit>,
}

/// Directories to scan under `root`: just `root`, or every directory below
/// it when scanning recursively.
pub fn source_dirs(root: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    if !options.recursive {
        return Ok(vec![root.to_path_buf()]);
    }

    let walker = WalkBuilder::new(root).hidden(true).git_ignore(true).build();
    let mut dirs = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            dirs.push(entry.into_path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Source files directly inside `dir`, sorted by path.
pub fn source_files(dir: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    let walker = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.into_path();
        if is_source_file(&path, options) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_source_file(path: &Path, options: &ScanOptions) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    if reader_for_extension(ext).is_none() {
        return false;
    }
    options.include_tests || !name.ends_with("_test.go")
}

/// Read and parse every source file in `dir`, grouped by package.
pub fn scan_dir(dir: &Path, options: &ScanOptions) -> Result<Vec<Scope>, ScanError> {
    let mut packages: BTreeMap<String, Vec<SourceUnit>> = BTreeMap::new();

    for path in source_files(dir, options)? {
        let Some(reader) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(reader_for_extension)
        else {
            continue;
        };

        let source = std::fs::read_to_string(&path).map_err(|source| ScanError::Read {
            path: path.clone(),
            source,
        })?;
        let unit = reader.read(&source).map_err(|source| ScanError::Parse {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), decls = unit.decls.len(), "parsed");
        let package = unit.package.clone().unwrap_or_default();
        packages.entry(package).or_default().push(unit);
    }

    Ok(packages
        .into_iter()
        .map(|(package, units)| Scope {
            dir: dir.to_path_buf(),
            package,
            units,
        })
        .collect())
}
