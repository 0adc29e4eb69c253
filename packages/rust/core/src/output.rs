//! Writes a conversion run to disk.
//!
//! Layout:
//! ```text
//! <out>/
//! ├── design.md
//! ├── openapi.yaml
//! ├── client.md
//! ├── context.md     (only when a context pack was built)
//! ├── hints.json
//! └── run.json       (manifest with checksums)
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use soapbridge_shared::{Result, SoapBridgeError, TargetStack};

use crate::pipeline::ConvertOutput;

/// Metadata for a single written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFileMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// `run.json` manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Time-sortable run identifier (UUID v7).
    pub run_id: Uuid,
    pub tool_version: String,
    pub model: String,
    pub target_stack: TargetStack,
    pub created_at: DateTime<Utc>,
    /// Reference file names, in the order they were supplied.
    pub reference_files: Vec<String>,
    pub context_chunks: usize,
    pub files: Vec<OutputFileMeta>,
}

/// Run details not carried by [`ConvertOutput`].
#[derive(Debug, Clone)]
pub struct RunInfo<'a> {
    pub model: &'a str,
    pub target_stack: TargetStack,
    pub reference_files: &'a [String],
}

/// Write every output file plus `run.json` into `out_dir`.
///
/// Each file is written to a temp file first and renamed into place.
#[instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn write_outputs(
    out_dir: &Path,
    output: &ConvertOutput,
    info: &RunInfo<'_>,
) -> Result<RunManifest> {
    std::fs::create_dir_all(out_dir).map_err(|e| SoapBridgeError::io(out_dir, e))?;

    let hints_json = serde_json::to_string_pretty(&output.hints)
        .map_err(|e| SoapBridgeError::validation(format!("JSON serialization failed: {e}")))?;

    let mut files: Vec<(&str, &str)> = vec![
        ("design.md", &output.design),
        ("openapi.yaml", &output.openapi_yaml),
        ("client.md", &output.code),
    ];
    if !output.context.is_empty() {
        files.push(("context.md", &output.context));
    }
    files.push(("hints.json", &hints_json));

    let mut metas = Vec::with_capacity(files.len());
    for (filename, content) in files {
        metas.push(write_atomic(out_dir, filename, content)?);
    }

    let manifest = RunManifest {
        run_id: Uuid::now_v7(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        model: info.model.to_string(),
        target_stack: info.target_stack,
        created_at: Utc::now(),
        reference_files: info.reference_files.to_vec(),
        context_chunks: output.context_chunks,
        files: metas,
    };

    let manifest_json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| SoapBridgeError::validation(format!("JSON serialization failed: {e}")))?;
    write_atomic(out_dir, "run.json", &manifest_json)?;

    info!(run_id = %manifest.run_id, files = manifest.files.len(), "outputs written");
    Ok(manifest)
}

fn write_atomic(dir: &Path, filename: &str, content: &str) -> Result<OutputFileMeta> {
    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, content).map_err(|e| SoapBridgeError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| SoapBridgeError::io(&target, e))?;

    let hash = format!("{:x}", Sha256::digest(content.as_bytes()));
    debug!(file = %filename, size = content.len(), "wrote output file");

    Ok(OutputFileMeta {
        filename: filename.to_string(),
        sha256: hash,
        size_bytes: content.len(),
    })
}
