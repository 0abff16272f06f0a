//! Command line for `cvlc`.

use std::ffi::OsString;

use crate::config::ResolvedConfig;
use crate::request::ThumbnailRequest;
use crate::runid::RunId;

/// Playback rate to reach the start time as fast as possible.
const PLAYBACK_RATE: u32 = 99999;

/// Arguments to capture one frame of `request` into the work directory.
///
/// VLC parses options in order, so the order of the list must be kept.
pub fn build_args(request: &ThumbnailRequest, run_id: &RunId, resolved: &ResolvedConfig) -> Vec<OsString> {
    let mut args = Vec::with_capacity(16);

    let mut source = OsString::from("file://");
    source.push(&request.source);
    args.push(source);

    if resolved.disable_hw_decoding {
        args.push("--avcodec-hw".into());
        args.push("none".into());
    }

    args.push(format!("--rate={PLAYBACK_RATE}").into());

    // Scene filter writes the frames. Dummy outputs keep it headless.
    args.push("--video-filter=scene".into());
    args.push("--vout=dummy".into());
    args.push("--aout=dummy".into());

    args.push(format!("--start-time={}", request.timestamp).into());
    args.push(format!("--stop-time={}", request.timestamp.saturating_add(1)).into());

    args.push(format!("--scene-format={}", request.format.extension()).into());
    args.push(format!("--scene-prefix={run_id}").into());

    // Without this, VLC appends a frame number to the file name.
    args.push("--scene-replace".into());

    let mut scene_path = OsString::from("--scene-path=");
    scene_path.push(resolved.work_dir());
    args.push(scene_path);

    args.push("vlc://quit".into());

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use std::path::{PathBuf, MAIN_SEPARATOR};

    fn resolved(disable_hw_decoding: bool) -> ResolvedConfig {
        ResolvedConfig {
            work_dir: PathBuf::from("/tmp/work"),
            binary: PathBuf::from("/usr/bin/cvlc"),
            disable_hw_decoding,
        }
    }

    fn as_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.into_string().unwrap()).collect()
    }

    #[test]
    fn argument_order() {
        let request = ThumbnailRequest::new("/videos/clip.mp4", OutputFormat::Png, 5);
        let run_id = RunId::new("vlc_conv_");

        let args = as_strings(build_args(&request, &run_id, &resolved(false)));

        assert_eq!(
            args,
            [
                "file:///videos/clip.mp4".to_string(),
                "--rate=99999".to_string(),
                "--video-filter=scene".to_string(),
                "--vout=dummy".to_string(),
                "--aout=dummy".to_string(),
                "--start-time=5".to_string(),
                "--stop-time=6".to_string(),
                "--scene-format=png".to_string(),
                format!("--scene-prefix={run_id}"),
                "--scene-replace".to_string(),
                format!("--scene-path=/tmp/work{MAIN_SEPARATOR}"),
                "vlc://quit".to_string(),
            ]
        );
    }

    #[test]
    fn hardware_decoding_flag() {
        let request = ThumbnailRequest::new("clip.mp4", OutputFormat::Jpeg, 0);
        let run_id = RunId::new("x");

        let args = as_strings(build_args(&request, &run_id, &resolved(true)));

        assert_eq!(args[0], "file://clip.mp4");
        assert_eq!(args[1], "--avcodec-hw");
        assert_eq!(args[2], "none");
        assert_eq!(args[3], "--rate=99999");
        assert!(args.contains(&"--scene-format=jpg".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("vlc://quit"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_source() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"/videos/\xffclip.mp4");
        let request = ThumbnailRequest::new(name, OutputFormat::Jpeg, 0);

        let args = build_args(&request, &RunId::new("x"), &resolved(false));
        assert_eq!(args[0].as_bytes(), b"file:///videos/\xffclip.mp4");
    }
}
