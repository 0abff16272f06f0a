use std::path::{Path, PathBuf};

use crate::error::CleanupError;
use crate::format::OutputFormat;
use crate::runid::RunId;

/// A single extraction job: which second of `source` to capture, and in
/// which format.
///
/// The diagnostic fields are filled by
/// [`Thumbnailer::generate`](crate::Thumbnailer::generate) and reset on every
/// call.
#[derive(Debug)]
pub struct ThumbnailRequest {
    pub source: PathBuf,
    pub format: OutputFormat,
    pub timestamp: i64,

    pub(crate) stdout: Vec<u8>,
    pub(crate) stderr: Vec<u8>,
    pub(crate) run_id: Option<RunId>,
    pub(crate) cleanup_error: Option<CleanupError>,
}

impl ThumbnailRequest {
    pub fn new(source: impl Into<PathBuf>, format: OutputFormat, timestamp: i64) -> Self {
        ThumbnailRequest {
            source: source.into(),
            format,
            timestamp,
            stdout: Vec::new(),
            stderr: Vec::new(),
            run_id: None,
            cleanup_error: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Output of the last VLC process, as `(stdout, stderr)`.
    ///
    /// Useful to debug failures that are not detected by the classifier.
    pub fn command_log(&self) -> (&[u8], &[u8]) {
        (&self.stdout, &self.stderr)
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Error from removing the temporary file, if any.
    pub fn cleanup_error(&self) -> Option<&CleanupError> {
        self.cleanup_error.as_ref()
    }

    pub(crate) fn reset_diagnostics(&mut self) {
        self.stdout.clear();
        self.stderr.clear();
        self.run_id = None;
        self.cleanup_error = None;
    }
}
