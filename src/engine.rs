//! Run VLC for a request and collect the snapshot it writes.

use std::io::ErrorKind;
use std::path::Path;

use crate::args::build_args;
use crate::classify::Classifier;
use crate::config::{Config, ResolvedConfig};
use crate::error::{CleanupError, Error, Result, ValidationError};
use crate::process::{self, Captured, Outcome};
use crate::request::ThumbnailRequest;
use crate::runid::RunId;
use crate::validate::Resolver;

/// Generates thumbnails with a shared configuration.
///
/// A `Thumbnailer` can be shared between threads. Each call to
/// [`generate`](Thumbnailer::generate) runs its own VLC process and blocks
/// until it finishes.
#[derive(Debug)]
pub struct Thumbnailer {
    resolver: Resolver,
    classifier: Classifier,
}

impl Thumbnailer {
    pub fn new(config: Config) -> Self {
        Thumbnailer::with_classifier(config, Classifier::default())
    }

    pub fn with_classifier(config: Config, classifier: Classifier) -> Self {
        Thumbnailer {
            resolver: Resolver::new(config),
            classifier,
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn validate(&self, request: &ThumbnailRequest) -> std::result::Result<ResolvedConfig, ValidationError> {
        self.resolver.validate(request)
    }

    /// Writes the snapshot to `path`. No extension is added to it.
    pub fn generate_to(&self, request: &mut ThumbnailRequest, path: impl AsRef<Path>) -> Result<()> {
        let data = self.generate(request)?;

        let path = path.as_ref();
        std::fs::write(path, data).map_err(|e| Error::Write {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Returns the contents of the snapshot taken at `request.timestamp`.
    pub fn generate(&self, request: &mut ThumbnailRequest) -> Result<Vec<u8>> {
        request.reset_diagnostics();

        let resolved = self.validate(request)?;

        let run_id = RunId::new(&self.resolver.config().run_prefix);
        let args = build_args(request, &run_id, &resolved);
        let temp_file = resolved.work_dir.join(run_id.file_name(request.format.extension()));

        tracing::debug!(
            source = %request.source.display(),
            binary = %resolved.binary.display(),
            ?args,
            "running vlc"
        );

        request.run_id = Some(run_id);

        let timeout = self.resolver.config().timeout;
        let result = match process::run(&resolved.binary, &args, timeout) {
            Ok(captured) => {
                let result = self.check(&captured).and_then(|()| {
                    std::fs::read(&temp_file).map_err(|e| Error::OutputMissing {
                        path: temp_file.clone(),
                        source: e,
                    })
                });

                request.stdout = captured.stdout;
                request.stderr = captured.stderr;
                result
            }

            Err(e) => Err(Error::Launch {
                binary: resolved.binary.clone(),
                source: e,
            }),
        };

        if let Ok(data) = &result {
            if !request.format.matches_signature(data) {
                tracing::warn!(
                    path = %temp_file.display(),
                    format = %request.format,
                    "snapshot does not look like the requested format"
                );
            }
        }

        // The file is removed even if the job failed, since VLC may have
        // written a partial snapshot.
        settle(request, result, remove_temp_file(&temp_file))
    }

    /// Looks for errors in the output of VLC.
    ///
    /// VLC does not always exit with a non-zero status when it fails, so the
    /// logs are checked even if the process succeeded. A failed process is
    /// classified from stderr first, a successful one from stdout first.
    fn check(&self, captured: &Captured) -> Result<()> {
        let (first, second) = match captured.outcome {
            Outcome::Exited(status) if status.success() => (&captured.stdout, &captured.stderr),
            _ => (&captured.stderr, &captured.stdout),
        };

        if let Some(e) = self.classifier.classify(first).or_else(|| self.classifier.classify(second)) {
            return Err(e.into());
        }

        match captured.outcome {
            Outcome::Exited(status) if status.success() => Ok(()),
            Outcome::Exited(status) => Err(Error::ExitStatus(status)),
            Outcome::TimedOut => Err(Error::Timeout(self.resolver.config().timeout.unwrap_or_default())),
        }
    }
}

/// Keep the cleanup error in the request. It never replaces the result of
/// the job.
fn settle(
    request: &mut ThumbnailRequest,
    result: Result<Vec<u8>>,
    cleanup: std::result::Result<(), CleanupError>,
) -> Result<Vec<u8>> {
    if let Err(e) = cleanup {
        tracing::warn!("{e}");
        request.cleanup_error = Some(e);
    }

    result
}

fn remove_temp_file(path: &Path) -> std::result::Result<(), CleanupError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CleanupError {
            path: path.to_owned(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use std::io;
    use std::path::PathBuf;

    fn cleanup_error() -> CleanupError {
        CleanupError {
            path: PathBuf::from("/tmp/work/vlc_conv_1.jpg"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
    }

    #[test]
    fn failed_cleanup_keeps_the_snapshot() {
        let mut request = ThumbnailRequest::new("clip.mp4", OutputFormat::Jpeg, 0);

        let data = settle(&mut request, Ok(vec![0xFF, 0xD8]), Err(cleanup_error())).unwrap();

        assert_eq!(data, [0xFF, 0xD8]);

        let cleanup = request.cleanup_error().unwrap();
        assert_eq!(cleanup.path, PathBuf::from("/tmp/work/vlc_conv_1.jpg"));
        assert_eq!(cleanup.source.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn failed_cleanup_keeps_the_job_error() {
        let mut request = ThumbnailRequest::new("clip.mp4", OutputFormat::Jpeg, 0);
        let error = Error::Timeout(std::time::Duration::from_secs(1));

        let err = settle(&mut request, Err(error), Err(cleanup_error())).unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        assert!(request.cleanup_error().is_some());
    }

    #[test]
    fn clean_run() {
        let mut request = ThumbnailRequest::new("clip.mp4", OutputFormat::Png, 0);

        let data = settle(&mut request, Ok(vec![1, 2, 3]), Ok(())).unwrap();

        assert_eq!(data, [1, 2, 3]);
        assert!(request.cleanup_error().is_none());
    }

    #[test]
    fn missing_file_is_not_a_cleanup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vlc_conv_1.png");
        assert!(remove_temp_file(&path).is_ok());

        std::fs::write(&path, b"x").unwrap();
        assert!(remove_temp_file(&path).is_ok());
        assert!(!path.exists());
    }
}
