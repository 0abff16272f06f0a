//! Show images inline with the iTerm2 protocol.

use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn render(mut output: impl Write, path: &Path, img: &[u8]) -> std::io::Result<()> {
    let name = path.file_name().unwrap_or(path.as_os_str());

    write!(
        output,
        "\x1B]1337;File=name={};size={};inline=1:",
        STANDARD.encode(name.as_encoded_bytes()),
        img.len()
    )?;

    let mut b64 = base64::write::EncoderWriter::new(&mut output, &STANDARD);
    b64.write_all(img)?;
    b64.finish()?;
    drop(b64);

    output.write_all(b"\x07\n")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_sequence() {
        let mut output = Vec::new();
        render(&mut output, Path::new("/out/clip.jpg"), &[0xFF, 0xD8, 0xFF]).unwrap();

        assert_eq!(output, b"\x1B]1337;File=name=Y2xpcC5qcGc=;size=3;inline=1:/9j/\x07\n");
    }
}
