use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use crate::utils::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
}

impl ImageFormat {
    /// Format recognised from a file name's extension, case-insensitively.
    ///
    /// `None` means the file is not one of the re-encoded families and is
    /// passed through byte-for-byte.
    pub fn from_filename(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| Self::from_str(e).ok())
    }
}

impl FromStr for ImageFormat {
    type Err = PipelineError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            _ => Err(PipelineError::format(format!(
                "Unsupported image format: {}", ext
            ))),
        }
    }
}

/// Whether a file name belongs in a batch (`.png`, `.jpg`, `.jpeg`, any case).
pub fn is_supported_image(name: &str) -> bool {
    ImageFormat::from_filename(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(ImageFormat::from_filename("a.JPG"), Some(ImageFormat::JPEG));
        assert_eq!(ImageFormat::from_filename("b.Jpeg"), Some(ImageFormat::JPEG));
        assert_eq!(ImageFormat::from_filename("c.PnG"), Some(ImageFormat::PNG));
        assert_eq!("JPEG".parse::<ImageFormat>().unwrap(), ImageFormat::JPEG);
    }

    #[test]
    fn unknown_extensions_are_passthrough() {
        assert_eq!(ImageFormat::from_filename("anim.gif"), None);
        assert_eq!(ImageFormat::from_filename("README"), None);
        assert!(!is_supported_image("photo.webp"));
        assert!(is_supported_image("photo.jpeg"));
    }
}
