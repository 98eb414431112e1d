//! Flat, append-only file stores.
//!
//! Every file the pipeline writes gets a stamp-derived name, so concurrent
//! requests can share a directory without locking.

use crate::config::StorageConfig;
use crate::constants::MAX_FILE_STEM_LEN;
use crate::error::StorageError;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Nanosecond wall-clock stamp, strictly increasing across the whole process.
pub fn unique_stamp() -> i64 {
    let now = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1000));

    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_STAMP.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// `<stamp>.<extension>`
pub fn unique_file_name(extension: &str) -> String {
    format!("{}.{}", unique_stamp(), extension)
}

/// `<stamp>-<stem>.<extension>`, keeping the source's file stem readable.
pub fn unique_file_name_from(source: &str, extension: &str) -> String {
    let segment = source
        .split(['?', '#'])
        .next()
        .unwrap_or(source)
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);
    let mut stem = sanitize_stem(stem);
    // sanitized stems are ASCII, so byte truncation is safe
    stem.truncate(MAX_FILE_STEM_LEN);

    if stem.is_empty() {
        unique_file_name(extension)
    } else {
        format!("{}-{}.{}", unique_stamp(), stem, extension)
    }
}

fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Create all three stores if missing.
pub fn provision(storage: &StorageConfig) -> Result<(), StorageError> {
    for dir in [
        &storage.compressed_dir,
        &storage.manifest_dir,
        &storage.upload_dir,
    ] {
        ensure_dir(dir)?;
    }
    Ok(())
}

pub fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|source| StorageError::DirectoryCreationFailed {
        path: dir.to_path_buf(),
        source,
    })?;
    log::debug!("Storage directory ready: {}", dir.display());
    Ok(())
}

/// Write `bytes` under `dir/file_name`, creating `dir` when needed.
pub fn write_file(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
    ensure_dir(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, bytes).map_err(|source| StorageError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Public URL when a base is configured, otherwise the local path.
pub fn resolve_location(dir: &Path, base_url: Option<&str>, file_name: &str) -> String {
    match base_url {
        Some(base) if base.ends_with('/') => format!("{}{}", base, file_name),
        Some(base) => format!("{}/{}", base, file_name),
        None => dir.join(file_name).to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn test_unique_stamp_strictly_increases() {
        let stamps: Vec<i64> = (0..1000).map(|_| unique_stamp()).collect();
        assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_unique_file_names_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| (0..200).map(|_| unique_file_name("csv")).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for name in handle.join().unwrap() {
                assert!(name.ends_with(".csv"));
                assert!(seen.insert(name), "duplicate file name generated");
            }
        }
    }

    #[test]
    fn test_unique_file_name_from_source() {
        let name = unique_file_name_from(
            "http://example.com/pokemon/Pikachu_(Tournament).png?size=large",
            "png",
        );
        assert!(name.ends_with("-Pikachu__Tournament_.png"), "{name}");

        let name = unique_file_name_from("http://example.com/", "jpg");
        assert!(!name.contains('-'));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_unique_file_name_from_long_stem_is_truncated() {
        let source = format!("https://example.com/{}.png", "a".repeat(300));
        let name = unique_file_name_from(&source, "png");

        let (_, stem) = name.split_once('-').unwrap();
        assert_eq!(stem, format!("{}.png", "a".repeat(MAX_FILE_STEM_LEN)));

        let temp_dir = TempDir::new().unwrap();
        assert!(write_file(temp_dir.path(), &name, b"x").is_ok());
    }

    #[test]
    fn test_resolve_location() {
        let dir = Path::new("/srv/compressed");
        assert_eq!(
            resolve_location(dir, Some("https://cdn.example.com/img/"), "1.png"),
            "https://cdn.example.com/img/1.png"
        );
        assert_eq!(
            resolve_location(dir, Some("https://cdn.example.com/img"), "1.png"),
            "https://cdn.example.com/img/1.png"
        );
        assert_eq!(resolve_location(dir, None, "1.png"), "/srv/compressed/1.png");
    }

    #[test]
    fn test_provision_and_write() {
        let temp_dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            compressed_dir: temp_dir.path().join("a"),
            manifest_dir: temp_dir.path().join("b"),
            upload_dir: temp_dir.path().join("c/d"),
            compressed_base_url: None,
            manifest_base_url: None,
        };

        provision(&storage).unwrap();
        assert!(storage.upload_dir.is_dir());

        let path = write_file(&storage.manifest_dir, "x.csv", b"ImageId").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"ImageId");
    }

    #[test]
    fn test_provision_fails_when_path_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let result = ensure_dir(&blocker.join("child"));
        assert!(matches!(
            result,
            Err(StorageError::DirectoryCreationFailed { .. })
        ));
    }
}
