use crate::config::CompressionConfig;
use crate::constants::{
    LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_QUALITY, MIN_QUALITY, OXIPNG_PRESET,
    ZOPFLI_ITERATIONS,
};
use crate::error::CodecError;
use crate::formats::ImageExtension;
use crate::storage::{unique_file_name, unique_file_name_from};
use crate::utils::{calculate_compression_ratio, format_file_size};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use oxipng::{Deflaters, Options};
use reqwest::blocking::Client;
use std::borrow::Cow;
use std::fs;
use std::io::{Cursor, Read};
use std::num::NonZeroU8;
use std::path::Path;

/// Where the pixels come from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    Url(&'a str),
    Bytes(&'a [u8]),
}

/// The image encoding collaborator.
///
/// Implementations fetch or decode the source, re-encode it at `quality`,
/// write the result into `destination`, and return the generated file name.
/// A URL source must come with its `extension`; raw bytes are sniffed.
pub trait ImageCodec: Send + Sync {
    fn fetch_and_encode(
        &self,
        source: ImageSource<'_>,
        extension: Option<ImageExtension>,
        quality: i32,
        destination: &Path,
    ) -> Result<String, CodecError>;
}

/// Checks the quality range. Must run before any network or decode work.
pub fn check_quality(quality: i32) -> Result<u8, CodecError> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(CodecError::InvalidQuality(quality));
    }
    u8::try_from(quality).map_err(|_| CodecError::InvalidQuality(quality))
}

/// Default codec: `reqwest` for downloads, `image` for JPEG, `image` + `oxipng` for PNG.
pub struct HttpImageCodec {
    client: Client,
    timeout_secs: u64,
    max_download_bytes: u64,
    max_dimension: u32,
}

impl HttpImageCodec {
    pub fn new(config: &CompressionConfig) -> Result<Self, CodecError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| CodecError::Fetch(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.fetch_timeout_secs,
            max_download_bytes: config.max_download_bytes(),
            max_dimension: config.max_image_dimension,
        })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, CodecError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                CodecError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout_secs,
                }
            } else {
                CodecError::Fetch(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CodecError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_download_bytes {
                return Err(CodecError::DownloadTooLarge(length, self.max_download_bytes));
            }
        }

        // Content-Length can lie or be absent; cap the read as well.
        let mut bytes = Vec::new();
        response
            .take(self.max_download_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| CodecError::Fetch(e.to_string()))?;

        let read = bytes.len() as u64;
        if read > self.max_download_bytes {
            return Err(CodecError::DownloadTooLarge(read, self.max_download_bytes));
        }

        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        let img = image::load_from_memory(bytes)?;

        let (width, height) = img.dimensions();
        if width > self.max_dimension || height > self.max_dimension {
            return Err(CodecError::InvalidDimensions(
                width,
                height,
                self.max_dimension,
            ));
        }

        Ok(img)
    }
}

impl ImageCodec for HttpImageCodec {
    fn fetch_and_encode(
        &self,
        source: ImageSource<'_>,
        extension: Option<ImageExtension>,
        quality: i32,
        destination: &Path,
    ) -> Result<String, CodecError> {
        let quality = check_quality(quality)?;

        let (bytes, extension, file_name): (Cow<'_, [u8]>, ImageExtension, String) = match source
        {
            ImageSource::Url(url) => {
                let extension = extension.ok_or_else(|| {
                    CodecError::UnsupportedFormat(format!("no extension given for {}", url))
                })?;
                let bytes = self.download(url)?;
                let file_name = unique_file_name_from(url, extension.as_str());
                (Cow::Owned(bytes), extension, file_name)
            }
            ImageSource::Bytes(raw) => {
                let format = image::guess_format(raw)?;
                let extension = ImageExtension::from_image_format(format).ok_or_else(|| {
                    CodecError::UnsupportedFormat(format!("{:?}", format))
                })?;
                (Cow::Borrowed(raw), extension, unique_file_name(extension.as_str()))
            }
        };

        let img = self.decode(&bytes)?;
        let encoded = encode_image(&img, extension, quality)?;

        fs::create_dir_all(destination).map_err(|source| CodecError::Write {
            path: destination.to_path_buf(),
            source,
        })?;
        let path = destination.join(&file_name);
        fs::write(&path, &encoded).map_err(|source| CodecError::Write {
            path: path.clone(),
            source,
        })?;

        let original_size = bytes.len() as u64;
        let compressed_size = encoded.len() as u64;
        log::debug!(
            "Encoded {} at quality {}: {} -> {} ({:.1}%)",
            file_name,
            quality,
            format_file_size(original_size),
            format_file_size(compressed_size),
            calculate_compression_ratio(original_size, compressed_size)
        );

        Ok(file_name)
    }
}

/// Re-encode `img` as `extension` in memory.
pub fn encode_image(
    img: &DynamicImage,
    extension: ImageExtension,
    quality: u8,
) -> Result<Vec<u8>, CodecError> {
    match extension.to_image_format() {
        ImageFormat::Jpeg => {
            let mut out = Vec::new();
            // JPEG has no alpha channel; the encoder's quality scale starts at 1.
            let encoder = JpegEncoder::new_with_quality(&mut out, quality.max(1));
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
            Ok(out)
        }
        ImageFormat::Png => {
            let mut png = Vec::new();
            img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|e| CodecError::Encode(e.to_string()))?;

            oxipng::optimize_from_memory(&png, &png_options(quality))
                .map_err(|e| CodecError::PngOptimization(e.to_string()))
        }
        other => Err(CodecError::UnsupportedFormat(format!("{:?}", other))),
    }
}

/// PNG is lossless; quality picks how hard oxipng works on the deflate stream.
pub fn png_options(quality: u8) -> Options {
    let mut options = Options::from_preset(OXIPNG_PRESET);
    options.force = true;

    options.deflate = if quality >= 90 {
        Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
        }
    } else if quality >= 70 {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    options
}
