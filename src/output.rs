use crate::config::StorageConfig;
use crate::error::Result;
use crate::manifest::write_manifest;
use crate::storage::resolve_location;
use crate::types::{CompressionResult, OutputMode};
use serde::Serialize;

/// What goes back to the caller: the result itself, or where its manifest was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutputEnvelope {
    Inline(CompressionResult),
    Manifest {
        #[serde(rename = "manifestURL")]
        location: String,
        #[serde(rename = "fileName")]
        file_name: String,
    },
}

/// Shape `result` for `mode`. Manifest mode writes a new file into the result store.
pub fn negotiate(
    result: CompressionResult,
    mode: OutputMode,
    storage: &StorageConfig,
) -> Result<OutputEnvelope> {
    match mode {
        OutputMode::Inline => Ok(OutputEnvelope::Inline(result)),
        OutputMode::Manifest => {
            let file_name = write_manifest(result.outcomes(), &storage.manifest_dir)?;
            let location = resolve_location(
                &storage.manifest_dir,
                storage.manifest_base_url.as_deref(),
                &file_name,
            );
            log::info!("Result manifest available at {}", location);
            Ok(OutputEnvelope::Manifest {
                location,
                file_name,
            })
        }
    }
}

/// Like [`negotiate`], taking the mode as the caller sent it. Absent means inline.
pub fn negotiate_requested(
    result: CompressionResult,
    mode: Option<&str>,
    storage: &StorageConfig,
) -> Result<OutputEnvelope> {
    let mode = match mode {
        Some(raw) => raw.parse::<OutputMode>()?,
        None => OutputMode::default(),
    };
    negotiate(result, mode, storage)
}
