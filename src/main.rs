mod imgcache;
mod term;

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vlc_thumbnail::{Config, OutputFormat, ThumbnailRequest, Thumbnailer};

/// Generate thumbnails from video files with VLC.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Second of the video to capture.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    time: i64,

    /// Image format (jpeg, png, tiff).
    #[arg(short, long, default_value = "jpeg")]
    format: OutputFormat,

    /// Directory for the generated thumbnails.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Directory where VLC writes its temporary snapshots.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Path to the cvlc binary.
    #[arg(long)]
    vlc: Option<PathBuf>,

    /// Use software decoding.
    #[arg(long)]
    no_hw_decoding: bool,

    /// Kill VLC after this number of seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Number of VLC processes to run in parallel.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Show the thumbnails in the terminal (iTerm2 protocol).
    #[arg(long)]
    preview: bool,

    /// Don't read or update the thumbnail cache.
    #[arg(long)]
    no_cache: bool,

    /// Video files.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

type JobResult = (PathBuf, anyhow::Result<Vec<u8>>);

struct Job {
    path: PathBuf,
    tx: crossbeam_channel::Sender<JobResult>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let thumbnailer = Arc::new(Thumbnailer::new(config(&args)));

    let cache = if args.no_cache {
        None
    } else {
        imgcache::Cache::new(args.time, args.format).map(Arc::new)
    };

    // Launch multiple threads to run VLC.

    let (pending_tx, pending_rx) = crossbeam_channel::unbounded::<Job>();

    let workers = args.jobs.unwrap_or_else(num_cpus::get).max(1);
    for _ in 0..workers {
        let rx = pending_rx.clone();
        let thumbnailer = Arc::clone(&thumbnailer);
        let cache = cache.clone();
        let (timestamp, format) = (args.time, args.format);

        std::thread::spawn(move || {
            while let Ok(job) = rx.recv() {
                let frame = thumbnail(&thumbnailer, cache.as_deref(), &job.path, timestamp, format);
                let _ = job.tx.send((job.path, frame));
            }
        });
    }

    let jobs: Vec<_> = args
        .files
        .iter()
        .map(|file| {
            let path = file.canonicalize().unwrap_or_else(|_| file.clone());

            let (tx, rx) = crossbeam_channel::bounded(1);
            pending_tx.send(Job { path, tx })?;

            Ok(rx)
        })
        .collect::<anyhow::Result<_>>()?;

    drop(pending_tx);

    // Collect results from the threads, in the same order as the arguments.

    let mut failed = Vec::new();
    let mut stdout = std::io::stdout().lock();

    for job in &jobs {
        let (path, frame) = job.recv()?;

        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                failed.push((path, e));
                continue;
            }
        };

        let target = output_path(&args.output_dir, &path, args.format);
        if let Err(e) = std::fs::write(&target, &frame) {
            failed.push((path, anyhow::Error::new(e).context(format!("writing {}", target.display()))));
            continue;
        }

        if args.preview {
            term::render(&mut stdout, &target, &frame)?;
        }

        writeln!(
            stdout,
            "{} -> {} ({})",
            path.display(),
            target.display(),
            bytesize::ByteSize(frame.len() as u64)
        )?;
    }

    for (path, err) in &failed {
        eprintln!("{}: {:#}", path.display(), err);
    }

    if !failed.is_empty() {
        anyhow::bail!("{} of {} thumbnails failed", failed.len(), jobs.len());
    }

    Ok(())
}

fn config(args: &Args) -> Config {
    let mut config = Config::from_env();

    if let Some(work_dir) = &args.work_dir {
        config = config.work_dir(work_dir);
    }

    if let Some(vlc) = &args.vlc {
        config = config.binary_path(vlc);
    }

    if args.no_hw_decoding {
        config = config.disable_hw_decoding(true);
    }

    if let Some(secs) = args.timeout {
        config = config.timeout(Some(Duration::from_secs(secs)));
    }

    config
}

/// Get a thumbnail from the cache, or run VLC to create it.
fn thumbnail(
    thumbnailer: &Thumbnailer,
    cache: Option<&imgcache::Cache>,
    path: &Path,
    timestamp: i64,
    format: OutputFormat,
) -> anyhow::Result<Vec<u8>> {
    if let Some(frame) = cache.and_then(|c| c.get(path)) {
        tracing::debug!(path = %path.display(), "found in cache");
        return Ok(frame);
    }

    let mut request = ThumbnailRequest::new(path, format, timestamp);

    let frame = match thumbnailer.generate(&mut request) {
        Ok(frame) => frame,
        Err(e) => {
            let (_, stderr) = request.command_log();
            if !stderr.is_empty() {
                tracing::debug!(path = %path.display(), "vlc stderr:\n{}", String::from_utf8_lossy(stderr));
            }

            return Err(e.into());
        }
    };

    if let Some(cache) = cache {
        cache.store(path, &frame);
    }

    Ok(frame)
}

/// `<output_dir>/<video stem>.<ext>`
fn output_path(output_dir: &Path, video: &Path, format: OutputFormat) -> PathBuf {
    let mut name = OsString::from(video.file_stem().unwrap_or(video.as_os_str()));
    name.push(".");
    name.push(format.extension());
    output_dir.join(name)
}
