use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One image reference: an input source, or after compression, its storage location.
///
/// Ids are not required to be unique; duplicates are carried through independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "imageId")]
    pub id: i64,
    #[serde(rename = "imageURL")]
    pub source: String,
}

impl ImageRecord {
    pub fn new(id: i64, source: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
        }
    }
}

/// A single unit of work. `quality` falls back to the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionRequest {
    pub record: ImageRecord,
    pub quality: Option<i32>,
    pub output: OutputMode,
}

impl CompressionRequest {
    pub fn new(record: ImageRecord) -> Self {
        Self {
            record,
            quality: None,
            output: OutputMode::default(),
        }
    }

    pub fn with_quality(mut self, quality: Option<i32>) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Resolve the effective quality for this request only; shared configuration is never touched.
    pub fn resolved_quality(&self, default_quality: u8) -> i32 {
        self.quality.unwrap_or(i32::from(default_quality))
    }
}

/// Whether an item was refused before any I/O or failed while being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Rejected,
    Execution,
}

/// Per-item result. A batch yields exactly one outcome per input, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CompressionOutcome {
    Ok(ImageRecord),
    Failed {
        #[serde(rename = "imageId")]
        id: i64,
        kind: FailureKind,
        reason: String,
    },
}

impl CompressionOutcome {
    pub fn rejected(id: i64, reason: impl fmt::Display) -> Self {
        CompressionOutcome::Failed {
            id,
            kind: FailureKind::Rejected,
            reason: reason.to_string(),
        }
    }

    pub fn execution_failed(id: i64, reason: impl fmt::Display) -> Self {
        CompressionOutcome::Failed {
            id,
            kind: FailureKind::Execution,
            reason: reason.to_string(),
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            CompressionOutcome::Ok(record) => record.id,
            CompressionOutcome::Failed { id, .. } => *id,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CompressionOutcome::Ok(_))
    }

    /// The value written to the second manifest column: location on success, reason on failure.
    pub fn manifest_value(&self) -> &str {
        match self {
            CompressionOutcome::Ok(record) => &record.source,
            CompressionOutcome::Failed { reason, .. } => reason,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Inline,
    Manifest,
}

impl FromStr for OutputMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(OutputMode::Inline),
            "csv" | "manifest" => Ok(OutputMode::Manifest),
            other => Err(ValidationError::UnsupportedOutputMode(other.to_string())),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Inline => f.write_str("inline"),
            OutputMode::Manifest => f.write_str("csv"),
        }
    }
}

/// Shape of a result, fixed at the call boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CompressionResult {
    Single(CompressionOutcome),
    Batch(Vec<CompressionOutcome>),
}

impl CompressionResult {
    pub fn outcomes(&self) -> &[CompressionOutcome] {
        match self {
            CompressionResult::Single(outcome) => std::slice::from_ref(outcome),
            CompressionResult::Batch(outcomes) => outcomes,
        }
    }
}
