//! Extraction session
//!
//! A session loads the code map once, scans any number of files into it and
//! flushes the result: the map is persisted first, then both constructor
//! modules are emitted. If persisting fails the map file keeps its previous
//! contents.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::extract::emitter::{emit_modules, DEFAULT_DECODER_URL};
use crate::extract::error::{ExtractError, ExtractResult, ScanError};
use crate::extract::eval::UnfoldablePolicy;
use crate::extract::scanner::{ScanContext, ScanOptions, ScanReport, DEFAULT_ASSERTION_NAME};
use crate::extract::store::{self, CodeMap};
use crate::frontend::Dialect;

/// Options for an [`ExtractSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Persisted code map; required
    pub error_map_path: Option<PathBuf>,
    /// Directory receiving the generated modules; required
    pub app_error_path: Option<PathBuf>,
    pub assertion_name: String,
    pub decoder_url: String,
    pub policy: UnfoldablePolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_map_path: None,
            app_error_path: None,
            assertion_name: DEFAULT_ASSERTION_NAME.to_string(),
            decoder_url: DEFAULT_DECODER_URL.to_string(),
            policy: UnfoldablePolicy::default(),
        }
    }
}

impl ExtractOptions {
    pub fn new(
        error_map_path: impl Into<PathBuf>,
        app_error_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            error_map_path: Some(error_map_path.into()),
            app_error_path: Some(app_error_path.into()),
            ..Self::default()
        }
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            assertion_name: self.assertion_name.clone(),
            policy: self.policy,
        }
    }
}

/// Where a session is in its load, scan, flush cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    MapLoaded,
    Scanning,
    MapPersisted,
    ModulesEmitted,
}

#[derive(Debug)]
pub struct ExtractSession {
    map_path: PathBuf,
    out_dir: PathBuf,
    decoder_url: String,
    scan_options: ScanOptions,
    context: ScanContext,
    phase: SessionPhase,
    /// Codes allocated since the last flush
    pending: usize,
}

impl ExtractSession {
    /// Load the code map named by `options`.
    ///
    /// Both paths are checked before anything is read. A missing or
    /// unparsable map file starts the session with an empty map.
    pub async fn load(options: ExtractOptions) -> ExtractResult<Self> {
        let scan_options = options.scan_options();
        let map_path = options
            .error_map_path
            .ok_or(ExtractError::Config("error_map_path"))?;
        let out_dir = options
            .app_error_path
            .ok_or(ExtractError::Config("app_error_path"))?;

        let map = store::load(&map_path).await;
        let context = ScanContext::new(map)?;
        debug!("Session ready with {} codes", context.map().len());

        Ok(Self {
            map_path,
            out_dir,
            decoder_url: options.decoder_url,
            scan_options,
            context,
            phase: SessionPhase::MapLoaded,
            pending: 0,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn code_map(&self) -> &CodeMap {
        self.context.map()
    }

    pub fn map_path(&self) -> &Path {
        &self.map_path
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Scan source of unknown origin. On error the code map is unchanged.
    pub fn scan_source(
        &mut self,
        source: &str,
    ) -> Result<ScanReport, ScanError> {
        self.scan_source_as(source, Dialect::default())
    }

    pub fn scan_source_as(
        &mut self,
        source: &str,
        dialect: Dialect,
    ) -> Result<ScanReport, ScanError> {
        self.phase = SessionPhase::Scanning;
        let report = self
            .context
            .scan_source(source, dialect, &self.scan_options)?;
        self.pending += report.allocated.len();
        Ok(report)
    }

    /// Read and scan a file.
    ///
    /// Unreadable files are an error; files that fail to scan are logged and
    /// yield `Ok(None)` so that the rest of the build can go on.
    pub async fn scan_file(
        &mut self,
        path: &Path,
    ) -> ExtractResult<Option<ScanReport>> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ExtractError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        match self.scan_source_as(&source, Dialect::from_path(path)) {
            Ok(report) => {
                for (message, id) in &report.allocated {
                    debug!("{}: new code {} for {:?}", path.display(), id, message);
                }
                Ok(Some(report))
            }
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                Ok(None)
            }
        }
    }

    /// Persist the map, then write both constructor modules
    pub async fn flush(&mut self) -> ExtractResult<()> {
        store::persist(&self.map_path, self.context.map()).await?;
        self.phase = SessionPhase::MapPersisted;

        emit_modules(&self.out_dir, &self.decoder_url).await?;
        self.phase = SessionPhase::ModulesEmitted;

        info!(
            "{} error codes ({} new) written to {}",
            self.context.map().len(),
            self.pending,
            self.map_path.display()
        );
        self.pending = 0;
        self.phase = SessionPhase::Idle;
        Ok(())
    }
}
