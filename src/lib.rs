pub mod batch;
pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod logger;
pub mod manifest;
pub mod output;
pub mod service;
pub mod storage;
pub mod types;
pub mod utils;
pub mod validation;

pub use batch::Compressor;
pub use codec::{check_quality, encode_image, HttpImageCodec, ImageCodec, ImageSource};
pub use config::{CompressionConfig, ServiceConfig, StorageConfig};
pub use error::{
    CodecError, CompressionError, ConfigError, ManifestError, Result, StorageError,
    ValidationError,
};
pub use formats::{ImageExtension, ManifestKind};
pub use manifest::{parse_csv, parse_manifest, render_manifest, write_manifest};
pub use output::{negotiate, negotiate_requested, OutputEnvelope};
pub use service::{CompressorService, RAW_IMAGE_ID};
pub use types::{
    CompressionOutcome, CompressionRequest, CompressionResult, FailureKind, ImageRecord,
    OutputMode,
};
pub use validation::{
    validate_extension, validate_image_source, validate_manifest_path, validate_source_url,
};
