//! Request-level entry points.
//!
//! One method per kind of inbound request: a single image reference, a list
//! of references, a manifest on disk, an uploaded manifest, or raw image
//! bytes. Each returns an [`OutputEnvelope`] or a bad-request style error.

use crate::batch::Compressor;
use crate::codec::{HttpImageCodec, ImageCodec};
use crate::config::ServiceConfig;
use crate::error::{CompressionError, Result, ValidationError};
use crate::manifest::{parse_csv_file, parse_manifest, store_uploaded_manifest};
use crate::output::{negotiate, OutputEnvelope};
use crate::storage::provision;
use crate::types::{
    CompressionOutcome, CompressionRequest, CompressionResult, ImageRecord, OutputMode,
};
use crate::validation::validate_manifest_path;
use std::path::Path;

/// Id given to a result that has no caller-supplied id (raw uploads).
pub const RAW_IMAGE_ID: i64 = 1;

pub struct CompressorService<C: ImageCodec> {
    compressor: Compressor<C>,
}

impl CompressorService<HttpImageCodec> {
    /// Provision the stores and build the default HTTP codec.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        provision(&config.storage)?;
        let codec = HttpImageCodec::new(&config.compression)?;
        Ok(Self::new(codec, config))
    }
}

impl<C: ImageCodec> CompressorService<C> {
    pub fn new(codec: C, config: ServiceConfig) -> Self {
        Self {
            compressor: Compressor::new(codec, config),
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.compressor = self.compressor.with_progress(show_progress);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        self.compressor.config()
    }

    /// One image reference. Any failure is returned as an error, not embedded.
    pub fn compress_image(&self, request: &CompressionRequest) -> Result<OutputEnvelope> {
        let record = self.compressor.try_compress(request)?;
        self.respond(
            CompressionResult::Single(CompressionOutcome::Ok(record)),
            request.output,
        )
    }

    /// A list of references. `None` stands for an absent list and is rejected like an empty one.
    pub fn compress_images(
        &self,
        records: Option<Vec<ImageRecord>>,
        quality: Option<i32>,
        output: OutputMode,
    ) -> Result<OutputEnvelope> {
        let records = records
            .filter(|records| !records.is_empty())
            .ok_or(ValidationError::EmptyBatch)?;

        let requests: Vec<CompressionRequest> = records
            .into_iter()
            .map(|record| {
                CompressionRequest::new(record)
                    .with_quality(quality)
                    .with_output(output)
            })
            .collect();

        let outcomes = self.compressor.compress_batch(&requests)?;
        self.respond(CompressionResult::Batch(outcomes), output)
    }

    /// A manifest already on disk. The extension is checked before the file is opened.
    pub fn compress_from_manifest(
        &self,
        path: &Path,
        quality: Option<i32>,
        output: OutputMode,
    ) -> Result<OutputEnvelope> {
        validate_manifest_path(&path.to_string_lossy())?;
        let records = parse_manifest(path)?;
        log::info!("Loaded {} images from {}", records.len(), path.display());
        self.compress_images(Some(records), quality, output)
    }

    /// An uploaded CSV manifest: stored in the upload store, then parsed.
    pub fn compress_from_manifest_bytes(
        &self,
        bytes: &[u8],
        quality: Option<i32>,
        output: OutputMode,
    ) -> Result<OutputEnvelope> {
        let path = store_uploaded_manifest(bytes, &self.config().storage.upload_dir)?;
        log::debug!("Stored uploaded manifest at {}", path.display());
        let records = parse_csv_file(&path)?;
        self.compress_images(Some(records), quality, output)
    }

    /// Raw image bytes; PNG and JPEG are detected from content.
    pub fn compress_raw_image(
        &self,
        bytes: &[u8],
        quality: Option<i32>,
        output: OutputMode,
    ) -> Result<OutputEnvelope> {
        let record = self
            .compressor
            .compress_bytes(RAW_IMAGE_ID, bytes, quality)
            .map_err(CompressionError::from)?;
        self.respond(
            CompressionResult::Single(CompressionOutcome::Ok(record)),
            output,
        )
    }

    fn respond(&self, result: CompressionResult, output: OutputMode) -> Result<OutputEnvelope> {
        negotiate(result, output, &self.config().storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ImageSource;
    use crate::error::CodecError;
    use crate::formats::ImageExtension;
    use std::fs;
    use tempfile::TempDir;

    struct EchoCodec;

    impl ImageCodec for EchoCodec {
        fn fetch_and_encode(
            &self,
            source: ImageSource<'_>,
            extension: Option<ImageExtension>,
            quality: i32,
            _destination: &Path,
        ) -> std::result::Result<String, CodecError> {
            crate::codec::check_quality(quality)?;
            match source {
                ImageSource::Url(url) if url.contains("timeout") => Err(CodecError::Timeout {
                    url: url.to_string(),
                    timeout_secs: 30,
                }),
                ImageSource::Url(_) => Ok(format!(
                    "q{}.{}",
                    quality,
                    extension.map(|e| e.as_str()).unwrap_or_default()
                )),
                ImageSource::Bytes(_) => Ok(format!("raw-q{}.png", quality)),
            }
        }
    }

    fn service(temp_dir: &TempDir) -> CompressorService<EchoCodec> {
        CompressorService::new(EchoCodec, ServiceConfig::rooted_at(temp_dir.path()))
    }

    fn inline_outcomes(envelope: OutputEnvelope) -> Vec<CompressionOutcome> {
        match envelope {
            OutputEnvelope::Inline(result) => result.outcomes().to_vec(),
            other => panic!("expected inline output, got {:?}", other),
        }
    }

    #[test]
    fn test_compress_image_success() {
        let temp_dir = TempDir::new().unwrap();
        let request = CompressionRequest::new(ImageRecord::new(5, "https://example.com/a.jpg"))
            .with_quality(Some(55));

        let outcomes = inline_outcomes(service(&temp_dir).compress_image(&request).unwrap());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].id(), 5);
        assert!(outcomes[0].manifest_value().ends_with("q55.jpg"));
    }

    #[test]
    fn test_compress_image_failures_are_errors() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);

        let bad_url = CompressionRequest::new(ImageRecord::new(1, "htt://example.com/a.png"));
        let err = service.compress_image(&bad_url).unwrap_err();
        assert!(err.is_bad_request());
        assert!(matches!(err, CompressionError::Validation(_)));

        let timeout =
            CompressionRequest::new(ImageRecord::new(1, "http://example.com/timeout.png"));
        assert!(matches!(
            service.compress_image(&timeout),
            Err(CompressionError::Codec(CodecError::Timeout { .. }))
        ));
    }

    #[test]
    fn test_compress_images_rejects_absent_or_empty() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);

        for records in [None, Some(Vec::new())] {
            assert!(matches!(
                service.compress_images(records, None, OutputMode::Inline),
                Err(CompressionError::Validation(ValidationError::EmptyBatch))
            ));
        }
    }

    #[test]
    fn test_compress_images_applies_call_quality() {
        let temp_dir = TempDir::new().unwrap();
        let records = vec![
            ImageRecord::new(1, "http://example.com/a.png"),
            ImageRecord::new(2, "http://example.com/timeout.png"),
        ];

        let outcomes = inline_outcomes(
            service(&temp_dir)
                .compress_images(Some(records), Some(42), OutputMode::Inline)
                .unwrap(),
        );
        assert!(outcomes[0].manifest_value().ends_with("q42.png"));
        assert!(!outcomes[1].is_ok());
    }

    #[test]
    fn test_compress_from_manifest_checks_extension_first() {
        let temp_dir = TempDir::new().unwrap();
        let result = service(&temp_dir).compress_from_manifest(
            Path::new("/does/not/exist/Book2.cs"),
            None,
            OutputMode::Inline,
        );
        assert!(matches!(
            result,
            Err(CompressionError::Validation(ValidationError::UnsupportedExtension(_)))
        ));
    }

    #[test]
    fn test_compress_from_manifest_to_result_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("Book2.csv");
        fs::write(
            &manifest,
            "ImageId,ImageURL\n1,http://example.com/a.png\n2,Invalid URL.\n",
        )
        .unwrap();
        let service = service(&temp_dir);

        let envelope = service
            .compress_from_manifest(&manifest, Some(70), OutputMode::Manifest)
            .unwrap();
        let OutputEnvelope::Manifest { file_name, .. } = envelope else {
            panic!("expected manifest output");
        };

        let content =
            fs::read_to_string(service.config().storage.manifest_dir.join(file_name)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "ImageId,CompressedImageURL");
        assert!(lines[1].starts_with("1,") && lines[1].ends_with("q70.png"));
        assert!(lines[2].starts_with("2,Invalid source URL"));
    }

    #[test]
    fn test_compress_from_manifest_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir);

        let outcomes = inline_outcomes(
            service
                .compress_from_manifest_bytes(
                    b"ImageId,ImageURL\n3,http://example.com/a.jpeg\n",
                    None,
                    OutputMode::Inline,
                )
                .unwrap(),
        );
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].id(), 3);
        assert_eq!(
            fs::read_dir(&service.config().storage.upload_dir).unwrap().count(),
            1
        );
    }

    #[test]
    fn test_compress_raw_image() {
        let temp_dir = TempDir::new().unwrap();
        let outcomes = inline_outcomes(
            service(&temp_dir)
                .compress_raw_image(b"\x89PNG", None, OutputMode::Inline)
                .unwrap(),
        );
        assert_eq!(outcomes[0].id(), RAW_IMAGE_ID);
        assert!(outcomes[0].manifest_value().ends_with("raw-q80.png"));
    }

    #[test]
    fn test_compress_raw_image_invalid_quality() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            service(&temp_dir).compress_raw_image(b"\x89PNG", Some(-3), OutputMode::Inline),
            Err(CompressionError::Codec(CodecError::InvalidQuality(-3)))
        ));
    }
}
