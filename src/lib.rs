//! Generate still thumbnails from video files by running a headless VLC
//! (`cvlc`) process.
//!
//! VLC writes the captured frame to a temporary file in a work directory.
//! The file is loaded into memory and removed before the bytes are returned.
//!
//! ```no_run
//! use vlc_thumbnail::{Config, OutputFormat, ThumbnailRequest, Thumbnailer};
//!
//! let thumbnailer = Thumbnailer::new(Config::from_env());
//! let mut request = ThumbnailRequest::new("clip.mp4", OutputFormat::Jpeg, 5);
//! let jpeg = thumbnailer.generate(&mut request)?;
//! # Ok::<(), vlc_thumbnail::Error>(())
//! ```

pub mod args;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod process;
pub mod request;
pub mod runid;
pub mod validate;

pub use classify::{Classifier, MediaError, MediaErrorKind};
pub use config::{Config, ResolvedConfig};
pub use engine::Thumbnailer;
pub use error::{CleanupError, ConfigError, Error, Result, ValidationError};
pub use format::OutputFormat;
pub use request::ThumbnailRequest;
pub use runid::RunId;
pub use validate::Resolver;
