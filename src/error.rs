use std::path::PathBuf;
use thiserror::Error;

/// Caller-side input problems. Nothing has been fetched or written when one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid source URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    #[error("{}", crate::constants::EMPTY_BATCH_MESSAGE)]
    EmptyBatch,

    #[error("Unsupported output mode: {0}")]
    UnsupportedOutputMode(String),
}

/// Failures inside the codec adapter for a single item. Recoverable at the item level.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("quality must be between 0 and 100, got {0}")]
    InvalidQuality(i32),

    #[error("Exception while downloading image from url: {0}")]
    Fetch(String),

    #[error("Timed out after {timeout_secs}s while downloading {url}")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Download too large: {0} bytes. Maximum allowed: {1} bytes")]
    DownloadTooLarge(u64, u64),

    #[error("Error while creating image from raw image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("Exception while saving compressed image: {0}")]
    Encode(String),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Failed to write compressed image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A manifest that cannot be read in full. Never partially salvaged.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest row {line}: expected `id,source`, got {content:?}")]
    MalformedRow { line: usize, content: String },

    #[error("Invalid image id on manifest row {line}: {value:?}")]
    InvalidId { line: usize, value: String },

    #[error("Embedded commas are not supported (manifest row {line})")]
    EmbeddedComma { line: usize },

    #[error("Spreadsheet is missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Cannot write manifest field with embedded comma for image {id}: {value}")]
    UnwritableField { id: i64, value: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create output directory: {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl CompressionError {
    /// True when the caller supplied something unusable, as opposed to a fault on our side.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            CompressionError::Validation(_)
                | CompressionError::Codec(_)
                | CompressionError::Manifest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
