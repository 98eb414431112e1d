#![allow(dead_code)]

use img_press::constants::INPUT_MANIFEST_HEADER;
use img_press::{check_quality, CodecError, ImageCodec, ImageExtension, ImageSource, ServiceConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Codec that never touches the network. URLs containing "fail" fail to fetch.
#[derive(Default)]
pub struct StubCodec {
    pub calls: AtomicUsize,
}

impl ImageCodec for StubCodec {
    fn fetch_and_encode(
        &self,
        source: ImageSource<'_>,
        extension: Option<ImageExtension>,
        quality: i32,
        _destination: &Path,
    ) -> Result<String, CodecError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        check_quality(quality)?;
        match source {
            ImageSource::Url(url) if url.contains("fail") => {
                Err(CodecError::Fetch(format!("unreachable: {}", url)))
            }
            ImageSource::Url(_) => Ok(format!(
                "{}.{}",
                call,
                extension.map(|e| e.as_str()).unwrap_or("png")
            )),
            ImageSource::Bytes(_) => Ok(format!("{}.png", call)),
        }
    }
}

impl StubCodec {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Write a config file whose stores live under `root` and return its path.
pub fn write_config(root: &Path) -> PathBuf {
    let config = ServiceConfig::rooted_at(root);
    let path = root.join("press.toml");
    fs::write(&path, config.to_toml().unwrap()).unwrap();
    path
}

/// Write a CSV manifest with the standard header followed by `id,source` rows.
pub fn write_csv_manifest(dir: &Path, name: &str, rows: &[(i64, &str)]) -> PathBuf {
    let mut content = format!("{}\n", INPUT_MANIFEST_HEADER);
    for (id, source) in rows {
        content.push_str(&format!("{},{}\n", id, source));
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
