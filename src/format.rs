use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Image formats that VLC's scene filter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Tiff,
}

impl OutputFormat {
    /// Extension used both for `--scene-format` and for the temporary file.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Magic bytes at the start of a file in this format.
    ///
    /// TIFF has two valid headers (little and big endian); both are returned.
    pub fn signature(self) -> &'static [&'static [u8]] {
        match self {
            OutputFormat::Jpeg => &[&[0xFF, 0xD8]],
            OutputFormat::Png => &[&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]],
            OutputFormat::Tiff => &[b"II*\0", b"MM\0*"],
        }
    }

    pub fn matches_signature(self, data: &[u8]) -> bool {
        self.signature().iter().any(|magic| data.starts_with(magic))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
        };

        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            _ => Err(ValidationError::InvalidFormat(s.to_string())),
        }
    }
}

impl TryFrom<i32> for OutputFormat {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OutputFormat::Jpeg),
            1 => Ok(OutputFormat::Png),
            2 => Ok(OutputFormat::Tiff),
            _ => Err(ValidationError::InvalidFormat(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("tif".parse::<OutputFormat>().unwrap(), OutputFormat::Tiff);
    }

    #[test]
    fn reject_unknown_formats() {
        let err = "webp".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat(ref v) if v == "webp"));

        assert!(OutputFormat::try_from(3).is_err());
        assert!(OutputFormat::try_from(-1).is_err());
        assert_eq!(OutputFormat::try_from(2).unwrap(), OutputFormat::Tiff);
    }

    #[test]
    fn signatures() {
        assert!(OutputFormat::Jpeg.matches_signature(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!OutputFormat::Jpeg.matches_signature(b"\x89PNG\r\n\x1a\n"));
        assert!(OutputFormat::Png.matches_signature(b"\x89PNG\r\n\x1a\n...."));
        assert!(OutputFormat::Tiff.matches_signature(b"MM\0*...."));
        assert!(OutputFormat::Tiff.matches_signature(b"II*\0...."));
        assert!(!OutputFormat::Tiff.matches_signature(b""));
    }
}
