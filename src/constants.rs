pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: i32 = 0;
pub const MAX_QUALITY: i32 = 100;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_DOWNLOAD_MB: u64 = 100;
pub const MAX_IMAGE_DIMENSION: u32 = 16384;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

/// Image extensions accepted for compression (case-sensitive).
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Manifest extensions accepted on upload (case-sensitive).
pub const SUPPORTED_MANIFEST_EXTENSIONS: &[&str] = &["csv", "xls"];

pub const INPUT_MANIFEST_HEADER: &str = "ImageId,ImageURL";
pub const OUTPUT_MANIFEST_HEADER: &str = "ImageId,CompressedImageURL";
pub const MANIFEST_DELIMITER: char = ',';

pub const SPREADSHEET_ID_COLUMN: &str = "ImageId";
pub const SPREADSHEET_URL_COLUMN: &str = "ImageURL";

pub const DEFAULT_COMPRESSED_DIR: &str = "storage/compressed";
pub const DEFAULT_MANIFEST_DIR: &str = "storage/results";
pub const DEFAULT_UPLOAD_DIR: &str = "storage/uploads";

/// Longest source stem kept in a generated file name.
pub const MAX_FILE_STEM_LEN: usize = 64;

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub const EMPTY_BATCH_MESSAGE: &str = "No image to compress in the list.";
