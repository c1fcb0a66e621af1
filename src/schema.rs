//! Versioned JSON shape for persisted analyses.
//!
//! Everything crossing the save/load boundary is plain nested maps,
//! sequences, numbers, and strings; no engine-internal representation
//! (nalgebra matrices included) survives a round trip. The version field is
//! checked before the body is deserialized so a newer file fails with a
//! clear error rather than a field-level decode failure.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::analysis::{AnalysisOutput, AnalysisRequest};

/// Current persisted schema version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unsupported schema version {found}, this build supports {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("malformed stored analysis: {0}")]
    Json(#[from] serde_json::Error),
}

/// One complete persisted analysis: the request that produced it and the
/// full output, so a load restores exactly what the engines saw and said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub version: u32,
    /// Unix seconds at save time.
    pub saved_at: i64,
    pub request: AnalysisRequest,
    pub output: AnalysisOutput,
}

impl StoredAnalysis {
    pub fn new(request: AnalysisRequest, output: AnalysisOutput) -> Self {
        Self {
            version: SCHEMA_VERSION,
            saved_at: now_epoch(),
            request,
            output,
        }
    }
}

/// Only the envelope, for the version gate.
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

pub fn encode(analysis: &StoredAnalysis) -> Result<String, SchemaError> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

pub fn decode(raw: &str) -> Result<StoredAnalysis, SchemaError> {
    let probe: VersionProbe = serde_json::from_str(raw)?;
    if probe.version != SCHEMA_VERSION {
        return Err(SchemaError::UnsupportedVersion {
            found: probe.version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(serde_json::from_str(raw)?)
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
