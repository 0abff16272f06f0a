//! Error kinds reported by the validator and the extraction engine.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use crate::classify::MediaError;

/// Failure to resolve the environment a job needs (work dir, VLC binary).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("work directory was not set and the current directory is unavailable: {0}")]
    WorkDirUnavailable(#[source] io::Error),

    #[error("VLC binary was set but not found at {}", .0.display())]
    BinaryMissing(PathBuf),

    #[error("VLC binary at {} is not accessible: {source}", path.display())]
    BinaryInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("VLC binary was not set, failed to run {} to find {name}: {source}", locator.display())]
    LookupFailed {
        locator: PathBuf,
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("VLC binary was not set, failed to find {name} ({status})")]
    LookupStatus { name: String, status: String },
}

/// A request that can not be executed.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid output format: {0}")]
    InvalidFormat(String),

    #[error("invalid timestamp {0}: must be equal to or greater than 0")]
    InvalidTimestamp(i64),

    #[error("no source file found at {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("source file {} is not accessible: {source}", path.display())]
    SourceInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to run {}: {source}", binary.display())]
    Launch {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("vlc error: {0}")]
    Media(#[from] MediaError),

    #[error("vlc failed with {0} (see the command log for details)")]
    ExitStatus(ExitStatus),

    #[error("vlc did not finish in {0:?}")]
    Timeout(Duration),

    #[error("vlc did not produce {}: {source}", path.display())]
    OutputMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write thumbnail to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// `true` if the job was rejected before VLC was spawned.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// The temporary file could not be removed after a job.
///
/// This never replaces the result of the job. It is kept in
/// [`ThumbnailRequest::cleanup_error`](crate::ThumbnailRequest::cleanup_error).
#[derive(Error, Debug)]
#[error("failed to remove temp file {}: {source}", path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

pub type Result<T> = std::result::Result<T, Error>;
