//! errcodes - error code extraction for JavaScript builds
//!
//! Scans source files for `invariant(condition, message, ...)` calls, gives
//! every distinct message a stable numeric code, keeps the code map in a JSON
//! file and writes the two constructor modules that production builds use to
//! throw short coded errors.
//!
//! # Example
//!
//! ```no_run
//! use errcodes::extract::{ExtractOptions, ExtractSession};
//!
//! # async fn demo() -> errcodes::Result<()> {
//! let options = ExtractOptions::new("scripts/codes.json", "src/shared/errors");
//! let mut session = ExtractSession::load(options).await?;
//! session.scan_source("invariant(input != null, 'Invalid input');")?;
//! session.flush().await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/errcodes")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod extract;
pub mod frontend;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::extract::{ExtractOptions, ExtractSession};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const NAME: &str = "errcodes";

/// Directories never descended into when collecting sources
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Totals of one extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub call_sites: usize,
    pub new_codes: usize,
    pub total_codes: usize,
}

/// Source files under `paths` with one of `extensions`, sorted.
///
/// Files named directly are kept whatever their extension.
pub fn collect_sources(
    paths: &[PathBuf],
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        let walker = WalkDir::new(path).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !SKIPPED_DIRS.iter().any(|dir| entry.file_name() == *dir)
        });
        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
            if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    debug!("Collected {} source files", files.len());
    Ok(files)
}

fn has_extension(
    path: &Path,
    extensions: &[String],
) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}

/// Scan `files` in order and flush once at the end.
///
/// Files that fail to parse are skipped; read and write failures abort the run
/// before anything is flushed.
pub async fn extract_files(
    options: ExtractOptions,
    files: &[PathBuf],
) -> Result<ExtractSummary> {
    let mut session = ExtractSession::load(options)
        .await
        .context("Failed to start extraction")?;
    let mut summary = ExtractSummary::default();

    for file in files {
        match session.scan_file(file).await? {
            Some(report) => {
                summary.files_scanned += 1;
                summary.call_sites += report.sites.len();
                summary.new_codes += report.allocated.len();
            }
            None => summary.files_skipped += 1,
        }
    }

    session.flush().await.with_context(|| {
        format!("Failed to write error codes to {}", session.map_path().display())
    })?;
    summary.total_codes = session.code_map().len();
    Ok(summary)
}
