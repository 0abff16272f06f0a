//! Keep a cache of generated thumbnails.

use std::env;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha224};
use vlc_thumbnail::OutputFormat;

/// Variable name to use a specific cache for this program.
const CACHE_DIR_ENV: &str = "VLC_THUMBNAIL_CACHE";

pub struct Cache {
    timestamp: i64,

    format: OutputFormat,

    cache_dir: PathBuf,
}

impl Cache {
    pub fn new(timestamp: i64, format: OutputFormat) -> Option<Cache> {
        let cache_dir = if let Some(value) = env::var_os(CACHE_DIR_ENV) {
            PathBuf::from(value)
        } else {
            let path = dirs::cache_dir()?;
            path.join(env!("CARGO_PKG_NAME"))
        };

        Cache::with_dir(cache_dir, timestamp, format)
    }

    pub fn with_dir(cache_dir: PathBuf, timestamp: i64, format: OutputFormat) -> Option<Cache> {
        std::fs::create_dir_all(&cache_dir).ok()?;

        Some(Cache {
            timestamp,
            format,
            cache_dir,
        })
    }

    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        let cached_path = self.file_hash(path)?;
        let data = std::fs::read(cached_path).ok()?;

        // Ignore truncated or foreign files.
        if !self.format.matches_signature(&data) {
            return None;
        }

        Some(data)
    }

    pub fn store(&self, path: &Path, frame: &[u8]) {
        if let Some(cached_path) = self.file_hash(path) {
            if let Err(e) = std::fs::write(&cached_path, frame) {
                tracing::debug!(path = %cached_path.display(), "can't update cache: {e}");
            }
        }
    }

    fn file_hash(&self, path: &Path) -> Option<PathBuf> {
        let metadata = std::fs::metadata(path).ok()?;
        let mut hash = Sha224::new();

        // Build a hash using data from the metadata.
        hash.update(metadata.len().to_ne_bytes());
        hash.update(metadata.mtime().to_ne_bytes());
        hash.update(metadata.dev().to_ne_bytes());
        hash.update(metadata.ino().to_ne_bytes());

        // Same video, different frame.
        hash.update(self.timestamp.to_ne_bytes());
        hash.update(self.format.extension().as_bytes());

        let filename = hex::encode(hash.finalize());
        Some(self.cache_dir.join(filename))
    }
}
