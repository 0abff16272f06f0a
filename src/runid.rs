//! Unique names for the temporary snapshots.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Token used as `--scene-prefix`, so concurrent jobs sharing a work
/// directory never write to the same file.
///
/// Format is `<prefix><epoch-millis>-<pid>-<seq>`. The process id separates
/// jobs from different processes, and the sequence separates jobs started in
/// the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    pub fn new(prefix: &str) -> RunId {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);

        RunId(format!("{prefix}{millis}-{}-{seq}", std::process::id()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the snapshot VLC writes for this run.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
