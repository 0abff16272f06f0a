//! Detect VLC failures from its log output.
//!
//! VLC does not always exit with a non-zero status when it fails to write a
//! snapshot, so the log lines are the only reliable signal.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaErrorKind {
    SnapshotFailed,
    FilesystemStream,
    UnknownCodec,
    Custom(String),
}

impl fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaErrorKind::SnapshotFailed => f.write_str("snapshot failed"),
            MediaErrorKind::FilesystemStream => f.write_str("filesystem stream error"),
            MediaErrorKind::UnknownCodec => f.write_str("unknown codec"),
            MediaErrorKind::Custom(label) => f.write_str(label),
        }
    }
}

/// A log line that matched one of the markers of a [`Classifier`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}")]
pub struct MediaError {
    pub kind: MediaErrorKind,
    pub line: String,
}

#[derive(Debug, Clone)]
pub struct Marker {
    needle: Cow<'static, str>,
    kind: MediaErrorKind,
}

/// Ordered list of substrings that identify a failed job.
#[derive(Debug, Clone)]
pub struct Classifier {
    markers: Vec<Marker>,
}

impl Default for Classifier {
    fn default() -> Self {
        let marker = |needle, kind| Marker {
            needle: Cow::Borrowed(needle),
            kind,
        };

        Classifier {
            markers: vec![
                marker("could not create snapshot", MediaErrorKind::SnapshotFailed),
                marker("filesystem stream error", MediaErrorKind::FilesystemStream),
                marker("could not identify codec", MediaErrorKind::UnknownCodec),
            ],
        }
    }
}

impl Classifier {
    /// A classifier without markers. Nothing is ever classified.
    pub fn empty() -> Self {
        Classifier {
            markers: Vec::new(),
        }
    }

    /// Add a marker. Lines containing `needle` are reported with a
    /// [`MediaErrorKind::Custom`] kind.
    pub fn with_marker(mut self, needle: impl Into<String>, label: impl Into<String>) -> Self {
        self.markers.push(Marker {
            needle: Cow::Owned(needle.into()),
            kind: MediaErrorKind::Custom(label.into()),
        });
        self
    }

    /// Returns the first line in `output` that contains any marker.
    pub fn classify(&self, output: &[u8]) -> Option<MediaError> {
        let output = String::from_utf8_lossy(output);

        for line in output.lines() {
            if let Some(marker) = self.markers.iter().find(|m| line.contains(&*m.needle)) {
                return Some(MediaError {
                    kind: marker.kind.clone(),
                    line: line.trim_end().to_string(),
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_output() {
        let log = b"VLC media player 3.0.18 Vetinari\n[0000] main interface: quitting\n";
        assert_eq!(Classifier::default().classify(log), None);
        assert_eq!(Classifier::default().classify(b""), None);
    }

    #[test]
    fn first_matching_line_wins() {
        let log = b"starting\n\
            [00007f] avcodec decoder error: could not identify codec\n\
            [00007f] scene video filter error: could not create snapshot\n";

        let err = Classifier::default().classify(log).unwrap();
        assert_eq!(err.kind, MediaErrorKind::UnknownCodec);
        assert_eq!(err.line, "[00007f] avcodec decoder error: could not identify codec");
    }

    #[test]
    fn line_is_reported_verbatim() {
        let log = b"[01] filesystem stream error: cannot open file /x.mp4 (No such file)\r\n";

        let err = Classifier::default().classify(log).unwrap();
        assert_eq!(err.kind, MediaErrorKind::FilesystemStream);
        assert_eq!(err.to_string(), "[01] filesystem stream error: cannot open file /x.mp4 (No such file)");
    }

    #[test]
    fn invalid_utf8_does_not_hide_markers() {
        let log = b"\xff\xfe garbage\nscene: could not create snapshot\n";
        let err = Classifier::default().classify(log).unwrap();
        assert_eq!(err.kind, MediaErrorKind::SnapshotFailed);
    }

    #[test]
    fn custom_markers() {
        let classifier = Classifier::empty().with_marker("main decoder error", "decoder");
        assert_eq!(classifier.classify(b"could not create snapshot"), None);

        let err = classifier.classify(b"[02] main decoder error: oops").unwrap();
        assert_eq!(err.kind, MediaErrorKind::Custom("decoder".into()));
        assert_eq!(err.kind.to_string(), "decoder");
    }
}
