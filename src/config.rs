use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::time::Duration;

/// Variable to set the directory where VLC writes its snapshots.
const WORK_DIR_ENV: &str = "VLC_THUMBNAIL_WORK_DIR";

/// Variable to set the path of the VLC binary.
const BINARY_ENV: &str = "VLC_THUMBNAIL_BIN";

/// Variable to disable hardware decoding (`1`, `true` or `yes`).
const DISABLE_HW_ENV: &str = "VLC_THUMBNAIL_DISABLE_HW";

/// Variable to limit how many seconds a VLC process can run.
const TIMEOUT_ENV: &str = "VLC_THUMBNAIL_TIMEOUT";

const DEFAULT_BINARY_NAME: &str = "cvlc";

const DEFAULT_LOCATOR: &str = "which";

const DEFAULT_RUN_PREFIX: &str = "vlc_conv_";

/// Settings shared by every job of a [`Thumbnailer`](crate::Thumbnailer).
///
/// Missing values are resolved on first use (see [`Resolver`](crate::Resolver)).
#[derive(Debug, Clone)]
pub struct Config {
    /// Where VLC writes the temporary snapshot. Defaults to the current
    /// directory.
    pub work_dir: Option<PathBuf>,

    /// Path to the VLC binary. If unset, `binary_name` is searched with
    /// `locator`.
    pub binary_path: Option<PathBuf>,

    pub binary_name: String,

    pub locator: PathBuf,

    /// Force software decoding. This may solve problems with some GPU
    /// drivers.
    pub disable_hw_decoding: bool,

    /// Prefix for the temporary file names.
    pub run_prefix: String,

    /// Kill VLC if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            work_dir: None,
            binary_path: None,
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            locator: PathBuf::from(DEFAULT_LOCATOR),
            disable_hw_decoding: false,
            run_prefix: DEFAULT_RUN_PREFIX.to_string(),
            timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Some(value) = non_empty_var(WORK_DIR_ENV) {
            config.work_dir = Some(PathBuf::from(value));
        }

        if let Some(value) = non_empty_var(BINARY_ENV) {
            config.binary_path = Some(PathBuf::from(value));
        }

        if let Ok(value) = env::var(DISABLE_HW_ENV) {
            config.disable_hw_decoding = parse_flag(&value);
        }

        if let Ok(value) = env::var(TIMEOUT_ENV) {
            match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Some(Duration::from_secs(secs)),
                _ => tracing::warn!("ignoring invalid {TIMEOUT_ENV}={value:?}"),
            }
        }

        config
    }

    pub fn work_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(path.into());
        self
    }

    pub fn binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    pub fn binary_name(mut self, name: impl Into<String>) -> Self {
        self.binary_name = name.into();
        self
    }

    pub fn locator(mut self, path: impl Into<PathBuf>) -> Self {
        self.locator = path.into();
        self
    }

    pub fn disable_hw_decoding(mut self, disable: bool) -> Self {
        self.disable_hw_decoding = disable;
        self
    }

    pub fn run_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.run_prefix = prefix.into();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

fn non_empty_var(name: &str) -> Option<OsString> {
    env::var_os(name).filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

/// Environment prerequisites of a job, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub work_dir: PathBuf,
    pub binary: PathBuf,
    pub disable_hw_decoding: bool,
}

impl ResolvedConfig {
    /// Work directory with a trailing separator.
    ///
    /// `--scene-path` is only taken as a directory if it ends with a
    /// separator.
    pub fn work_dir(&self) -> OsString {
        with_trailing_separator(&self.work_dir)
    }
}

fn with_trailing_separator(path: &Path) -> OsString {
    let mut dir = path.as_os_str().to_owned();

    let has_separator = dir
        .to_string_lossy()
        .chars()
        .last()
        .map_or(false, std::path::is_separator);

    if !has_separator {
        dir.push(MAIN_SEPARATOR.to_string());
    }

    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_separator() {
        let sep = MAIN_SEPARATOR.to_string();

        let resolved = ResolvedConfig {
            work_dir: PathBuf::from("/tmp/thumbs"),
            binary: PathBuf::from("/usr/bin/cvlc"),
            disable_hw_decoding: false,
        };
        assert_eq!(resolved.work_dir(), OsString::from(format!("/tmp/thumbs{sep}")));

        let resolved = ResolvedConfig {
            work_dir: PathBuf::from(format!("/tmp/thumbs{sep}")),
            ..resolved
        };
        assert_eq!(resolved.work_dir(), OsString::from(format!("/tmp/thumbs{sep}")));
    }

    #[test]
    fn flags() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn builder() {
        let config = Config::default()
            .work_dir("/var/tmp")
            .binary_path("/opt/vlc/cvlc")
            .disable_hw_decoding(true)
            .timeout(Some(Duration::from_secs(30)));

        assert_eq!(config.work_dir.as_deref(), Some(Path::new("/var/tmp")));
        assert_eq!(config.binary_path.as_deref(), Some(Path::new("/opt/vlc/cvlc")));
        assert!(config.disable_hw_decoding);
        assert_eq!(config.binary_name, "cvlc");
        assert_eq!(config.run_prefix, "vlc_conv_");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }
}
