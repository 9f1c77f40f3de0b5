//! Build pipeline adapter
//!
//! Wraps a session as a per-file transform. Each transformed file is scanned
//! and the session flushed right away, so the map on disk is current after
//! every file. The code itself passes through unchanged.

use tracing::debug;

use crate::extract::error::ExtractResult;
use crate::extract::session::{ExtractOptions, ExtractSession};

/// Output of a successful transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
    /// Source map; extraction never changes the code, so there is none
    pub map: Option<String>,
}

pub struct ErrorExtraction {
    session: ExtractSession,
}

impl ErrorExtraction {
    pub const NAME: &'static str = "Extract errors";

    /// Load the code map. Configuration errors are reported here.
    pub async fn new(options: ExtractOptions) -> ExtractResult<Self> {
        Ok(Self {
            session: ExtractSession::load(options).await?,
        })
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn session(&self) -> &ExtractSession {
        &self.session
    }

    /// Scan `code` and flush. Returns `None` if either step fails, leaving the
    /// file to the rest of the pipeline.
    pub async fn transform(
        &mut self,
        code: &str,
    ) -> Option<TransformOutput> {
        if let Err(err) = self.session.scan_source(code) {
            debug!("{}: {}", Self::NAME, err);
            return None;
        }
        if let Err(err) = self.session.flush().await {
            debug!("{}: {}", Self::NAME, err);
            return None;
        }
        Some(TransformOutput {
            code: code.to_string(),
            map: None,
        })
    }
}
