use crate::constants::{SUPPORTED_IMAGE_EXTENSIONS, SUPPORTED_MANIFEST_EXTENSIONS};
use crate::error::ValidationError;
use crate::formats::{ImageExtension, ManifestKind};
use reqwest::Url;

/// True iff `source` is an absolute `http` or `https` URL with a host.
///
/// Never fails: anything malformed, relative, or on another scheme is just `false`.
pub fn validate_source_url(source: &str) -> bool {
    match Url::parse(source) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Extension of the final path segment, without the dot.
///
/// Returns `None` when the last segment has no `.` or ends with one.
pub fn extract_extension(source: &str) -> Option<&str> {
    let segment = source.rsplit(['/', '\\']).next().unwrap_or(source);
    let (_, extension) = segment.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension)
    }
}

/// True iff the trailing extension is non-empty and in `allowed` (case-sensitive).
pub fn validate_extension(source: &str, allowed: &[&str]) -> bool {
    extract_extension(source).is_some_and(|ext| allowed.contains(&ext))
}

/// Full check applied to every image reference before any I/O.
pub fn validate_image_source(source: &str) -> Result<ImageExtension, ValidationError> {
    if !validate_source_url(source) {
        return Err(ValidationError::InvalidUrl(source.to_string()));
    }
    if !validate_extension(source, SUPPORTED_IMAGE_EXTENSIONS) {
        return Err(ValidationError::UnsupportedExtension(source.to_string()));
    }
    // Extension is in the supported set, so this parse cannot miss.
    extract_extension(source)
        .unwrap_or_default()
        .parse::<ImageExtension>()
}

/// Check an uploaded manifest name and decide which reader handles it.
pub fn validate_manifest_path(path: &str) -> Result<ManifestKind, ValidationError> {
    if !validate_extension(path, SUPPORTED_MANIFEST_EXTENSIONS) {
        return Err(ValidationError::UnsupportedExtension(path.to_string()));
    }
    extract_extension(path)
        .and_then(ManifestKind::from_extension)
        .ok_or_else(|| ValidationError::UnsupportedExtension(path.to_string()))
}
