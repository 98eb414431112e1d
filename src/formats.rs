//! Typed image and manifest formats.
//!
//! Extensions arrive as raw strings (the tail of a URL or a file name); these
//! enums give them a checked shape before anything downstream depends on them.

use crate::error::ValidationError;
use image::ImageFormat;
use std::fmt;
use std::str::FromStr;

/// Image extensions the pipeline will re-encode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExtension {
    Jpg,
    Jpeg,
    Png,
}

impl ImageExtension {
    /// Returns the file extension exactly as it will be written
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Png => "png",
        }
    }

    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            ImageExtension::Jpg | ImageExtension::Jpeg => ImageFormat::Jpeg,
            ImageExtension::Png => ImageFormat::Png,
        }
    }

    /// Map a sniffed source format back to an extension; only PNG and JPEG are accepted.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(ImageExtension::Png),
            ImageFormat::Jpeg => Some(ImageExtension::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageExtension {
    type Err = ValidationError;

    // Case-sensitive on purpose: `PNG` is not in the supported set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" => Ok(ImageExtension::Jpg),
            "jpeg" => Ok(ImageExtension::Jpeg),
            "png" => Ok(ImageExtension::Png),
            _ => Err(ValidationError::UnsupportedExtension(s.to_string())),
        }
    }
}

/// Which reader a manifest file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Csv,
    Spreadsheet,
}

impl ManifestKind {
    /// `csv` goes to the line parser; `xls` and `xlsx` go to the spreadsheet reader.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "csv" => Some(ManifestKind::Csv),
            "xls" | "xlsx" => Some(ManifestKind::Spreadsheet),
            _ => None,
        }
    }
}
