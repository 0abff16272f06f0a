//! Checks a request and resolves the work directory and the VLC binary.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::{Config, ResolvedConfig};
use crate::error::{ConfigError, ValidationError};
use crate::request::ThumbnailRequest;

/// Validates requests against a [`Config`].
///
/// Values missing in the configuration are resolved on first successful use
/// and cached. The lock is held while resolving, so concurrent callers
/// resolve each value only once.
#[derive(Debug)]
pub struct Resolver {
    config: Config,
    work_dir: Mutex<Option<PathBuf>>,
    binary: Mutex<Option<PathBuf>>,
}

impl Resolver {
    pub fn new(config: Config) -> Self {
        Resolver {
            config,
            work_dir: Mutex::new(None),
            binary: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Forget cached values, so the next validation resolves them again.
    pub fn reset(&self) {
        *lock(&self.work_dir) = None;
        *lock(&self.binary) = None;
    }

    pub fn validate(&self, request: &ThumbnailRequest) -> Result<ResolvedConfig, ValidationError> {
        let work_dir = self.work_dir()?;

        if request.timestamp < 0 {
            return Err(ValidationError::InvalidTimestamp(request.timestamp));
        }

        if let Err(e) = std::fs::metadata(&request.source) {
            return Err(if e.kind() == ErrorKind::NotFound {
                ValidationError::SourceNotFound(request.source.clone())
            } else {
                ValidationError::SourceInaccessible {
                    path: request.source.clone(),
                    source: e,
                }
            });
        }

        let binary = self.binary()?;

        Ok(ResolvedConfig {
            work_dir,
            binary,
            disable_hw_decoding: self.config.disable_hw_decoding,
        })
    }

    fn work_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.config.work_dir {
            return Ok(dir.clone());
        }

        let mut cached = lock(&self.work_dir);
        if let Some(dir) = &*cached {
            return Ok(dir.clone());
        }

        let dir = std::env::current_dir().map_err(ConfigError::WorkDirUnavailable)?;
        tracing::debug!(work_dir = %dir.display(), "using current directory for snapshots");

        *cached = Some(dir.clone());
        Ok(dir)
    }

    fn binary(&self) -> Result<PathBuf, ConfigError> {
        let mut cached = lock(&self.binary);
        if let Some(path) = &*cached {
            return Ok(path.clone());
        }

        let path = match &self.config.binary_path {
            Some(path) => {
                check_binary(path)?;
                path.clone()
            }

            None => {
                let path = find_binary(&self.config.locator, &self.config.binary_name)?;
                tracing::debug!(binary = %path.display(), "found VLC binary");
                path
            }
        };

        *cached = Some(path.clone());
        Ok(path)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn check_binary(path: &Path) -> Result<(), ConfigError> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ConfigError::BinaryMissing(path.to_owned())),
        Err(e) => Err(ConfigError::BinaryInaccessible {
            path: path.to_owned(),
            source: e,
        }),
    }
}

/// Find `name` with the system lookup utility (usually `which`).
///
/// Only works if the binary is in one of the `PATH` directories.
fn find_binary(locator: &Path, name: &str) -> Result<PathBuf, ConfigError> {
    let output = Command::new(locator)
        .arg(name)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| ConfigError::LookupFailed {
            locator: locator.to_owned(),
            name: name.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(ConfigError::LookupStatus {
            name: name.to_string(),
            status: output.status.to_string(),
        });
    }

    let location = String::from_utf8_lossy(&output.stdout);
    let location = location.lines().next().unwrap_or_default().trim();

    if location.is_empty() {
        return Err(ConfigError::LookupStatus {
            name: name.to_string(),
            status: "empty output".to_string(),
        });
    }

    Ok(PathBuf::from(location))
}
