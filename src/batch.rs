use crate::codec::{ImageCodec, ImageSource};
use crate::config::ServiceConfig;
use crate::error::{CodecError, CompressionError, Result, ValidationError};
use crate::storage::resolve_location;
use crate::types::{CompressionOutcome, CompressionRequest, ImageRecord};
use crate::utils::create_progress_bar;
use crate::validation::validate_image_source;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

/// Runs compression requests against a codec with a fixed, read-only configuration.
///
/// Per-request quality is resolved on the request itself, so concurrent
/// callers never observe each other's overrides.
pub struct Compressor<C: ImageCodec> {
    codec: C,
    config: ServiceConfig,
    show_progress: bool,
}

impl<C: ImageCodec> Compressor<C> {
    pub fn new(codec: C, config: ServiceConfig) -> Self {
        Self {
            codec,
            config,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while a batch runs.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Compress one URL-sourced request, surfacing the failure as an error.
    ///
    /// Validation failures come back as `CompressionError::Validation` with no
    /// I/O attempted; everything else is a `CompressionError::Codec`.
    pub fn try_compress(&self, request: &CompressionRequest) -> Result<ImageRecord> {
        let record = &request.record;
        let extension = validate_image_source(&record.source)?;
        let quality = request.resolved_quality(self.config.compression.default_quality);

        let attempt = catch_unwind(AssertUnwindSafe(|| {
            self.codec.fetch_and_encode(
                ImageSource::Url(&record.source),
                Some(extension),
                quality,
                &self.config.storage.compressed_dir,
            )
        }));
        let file_name = match attempt {
            Ok(result) => result?,
            Err(_) => return Err(CodecError::Encode("codec panicked".to_string()).into()),
        };

        Ok(ImageRecord::new(record.id, self.location(&file_name)))
    }

    /// Compress one request. Never fails as a whole: problems become a `Failed` outcome.
    pub fn compress_one(&self, request: &CompressionRequest) -> CompressionOutcome {
        let id = request.record.id;
        match self.try_compress(request) {
            Ok(record) => CompressionOutcome::Ok(record),
            Err(CompressionError::Validation(e)) => CompressionOutcome::rejected(id, e),
            Err(e) => CompressionOutcome::execution_failed(id, e),
        }
    }

    /// Compress raw image bytes; the format is detected from content.
    pub fn compress_bytes(
        &self,
        id: i64,
        bytes: &[u8],
        quality: Option<i32>,
    ) -> std::result::Result<ImageRecord, CodecError> {
        let quality = quality.unwrap_or(i32::from(self.config.compression.default_quality));
        let file_name = self.codec.fetch_and_encode(
            ImageSource::Bytes(bytes),
            None,
            quality,
            &self.config.storage.compressed_dir,
        )?;
        Ok(ImageRecord::new(id, self.location(&file_name)))
    }

    /// Compress every request, one outcome per request, in input order.
    ///
    /// Only an empty batch is rejected as a whole. Items run in parallel on a
    /// scoped pool sized by `compression.workers`.
    pub fn compress_batch(
        &self,
        requests: &[CompressionRequest],
    ) -> Result<Vec<CompressionOutcome>> {
        if requests.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }

        let start_time = Instant::now();
        let total = requests.len();
        let threads = self.config.compression.workers.clamp(1, total);
        log::info!("Starting batch compression of {} images on {} workers", total, threads);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| CompressionError::WorkerPool(e.to_string()))?;

        let progress = create_progress_bar(total as u64, self.show_progress);

        // par_iter + collect keeps input order regardless of completion order.
        let outcomes: Vec<CompressionOutcome> = pool.install(|| {
            requests
                .par_iter()
                .map(|request| {
                    let outcome = self.compress_one(request);
                    if let CompressionOutcome::Failed { id, reason, .. } = &outcome {
                        log::warn!("Failed to compress image {}: {}", id, reason);
                    }
                    progress.inc(1);
                    outcome
                })
                .collect()
        });

        progress.finish_and_clear();

        let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
        log::info!(
            "Batch complete: {} succeeded, {} failed in {:.2?}",
            succeeded,
            total - succeeded,
            start_time.elapsed()
        );

        Ok(outcomes)
    }

    fn location(&self, file_name: &str) -> String {
        resolve_location(
            &self.config.storage.compressed_dir,
            self.config.storage.compressed_base_url.as_deref(),
            file_name,
        )
    }
}
