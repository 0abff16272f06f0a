//! Tests with a real VLC installation.
//!
//! They need `cvlc` in `PATH` and a video in `VLC_THUMBNAIL_SAMPLE`.

use std::path::PathBuf;

use vlc_thumbnail::{Config, OutputFormat, ThumbnailRequest, Thumbnailer};

fn sample() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var_os("VLC_THUMBNAIL_SAMPLE")?);
    path.exists().then_some(path)
}

fn thumbnailer(work_dir: &std::path::Path) -> Option<Thumbnailer> {
    let thumbnailer = Thumbnailer::new(Config::default().work_dir(work_dir).disable_hw_decoding(true));

    // Skip if cvlc can not be found.
    let probe = ThumbnailRequest::new(sample()?, OutputFormat::Jpeg, 0);
    thumbnailer.validate(&probe).ok()?;

    Some(thumbnailer)
}

#[test]
fn snapshot_in_every_format() {
    let work_dir = tempfile::tempdir().unwrap();
    let (Some(source), Some(thumbnailer)) = (sample(), thumbnailer(work_dir.path())) else {
        eprintln!("skipping test: set VLC_THUMBNAIL_SAMPLE and install cvlc");
        return;
    };

    for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Tiff] {
        let mut request = ThumbnailRequest::new(&source, format, 1);
        let data = match thumbnailer.generate(&mut request) {
            Ok(data) => data,
            Err(e) => {
                let (stdout, stderr) = request.command_log();
                panic!(
                    "{format}: {e}\nstdout: {}\nstderr: {}",
                    String::from_utf8_lossy(stdout),
                    String::from_utf8_lossy(stderr)
                );
            }
        };

        assert!(format.matches_signature(&data), "{format}: unexpected signature");
    }

    assert_eq!(std::fs::read_dir(work_dir.path()).unwrap().count(), 0);
}
