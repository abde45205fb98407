//! Binary model artifact
//!
//! Layout: 8-byte magic `PAWPIPE\0` followed by a bincode-encoded
//! [`PipelineArtifact`]. The artifact records the encoding schema it was
//! trained under and a BLAKE3 hash of the encoded pipeline so truncated or
//! tampered files are rejected at load time.
//!
//! Writes go through a temporary file in the destination directory that is
//! synced and then renamed over the target, so readers only ever observe a
//! complete artifact.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::{ModelError, Result};
use crate::pipeline::Pipeline;
use crate::record::FEATURE_COLUMNS;
use crate::schema::EncodingSchema;

pub const ARTIFACT_MAGIC: &[u8; 8] = b"PAWPIPE\0";

/// Bumped whenever the encoded layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    pub crate_version: String,
    pub schema_version: u32,
    pub schema_fingerprint: String,
    pub feature_names: Vec<String>,
    /// BLAKE3 hex of the bincode-encoded pipeline
    pub integrity_hash: String,
    pub pipeline: Pipeline,
}

impl PipelineArtifact {
    pub fn new(pipeline: &Pipeline, schema: &EncodingSchema) -> std::result::Result<Self, String> {
        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            crate_version: crate::VERSION.to_string(),
            schema_version: schema.version,
            schema_fingerprint: schema.fingerprint(),
            feature_names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            integrity_hash: pipeline_hash(pipeline)?,
            pipeline: pipeline.clone(),
        })
    }

    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, String> {
        let mut bytes = ARTIFACT_MAGIC.to_vec();
        bincode::serialize_into(&mut bytes, self).map_err(|e| e.to_string())?;
        Ok(bytes)
    }

    /// Decode and structurally verify an artifact. Schema compatibility is
    /// checked separately by [`load_pipeline_with_schema`].
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self> {
        let corrupt = |reason: String| ModelError::Corrupt {
            path: path.display().to_string(),
            reason,
        };

        let body = bytes
            .strip_prefix(ARTIFACT_MAGIC.as_slice())
            .ok_or_else(|| corrupt("missing artifact header".to_string()))?;

        let artifact: PipelineArtifact =
            bincode::deserialize(body).map_err(|e| corrupt(format!("decode failed: {e}")))?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        if artifact.feature_names != FEATURE_COLUMNS {
            return Err(corrupt(format!(
                "feature set {:?} does not match {:?}",
                artifact.feature_names, FEATURE_COLUMNS
            )));
        }

        let actual = pipeline_hash(&artifact.pipeline).map_err(corrupt)?;
        if actual != artifact.integrity_hash {
            return Err(corrupt("integrity hash mismatch".to_string()));
        }

        artifact
            .pipeline
            .validate()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(artifact)
    }
}

fn pipeline_hash(pipeline: &Pipeline) -> std::result::Result<String, String> {
    let encoded = bincode::serialize(pipeline).map_err(|e| e.to_string())?;
    Ok(hex::encode(blake3::hash(&encoded).as_bytes()))
}

/// Persist a fitted pipeline under the builtin encoding schema.
pub fn persist<P: AsRef<Path>>(pipeline: &Pipeline, path: P) -> Result<()> {
    persist_with_schema(pipeline, EncodingSchema::builtin(), path)
}

pub fn persist_with_schema<P: AsRef<Path>>(
    pipeline: &Pipeline,
    schema: &EncodingSchema,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let persist_err = |reason: String| ModelError::Persist {
        path: path.display().to_string(),
        reason,
    };

    let bytes = PipelineArtifact::new(pipeline, schema)
        .and_then(|artifact| artifact.to_bytes())
        .map_err(|e| persist_err(format!("encode failed: {e}")))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .map_err(|e| persist_err(format!("create directory {}: {e}", parent.display())))?;

    let mut temp = NamedTempFile::new_in(&parent)
        .map_err(|e| persist_err(format!("create temp file in {}: {e}", parent.display())))?;
    temp.write_all(&bytes)
        .map_err(|e| persist_err(format!("write temp file: {e}")))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| persist_err(format!("sync temp file: {e}")))?;
    temp.persist(path)
        .map_err(|e| persist_err(format!("rename into place: {}", e.error)))?;

    info!(
        "Persisted pipeline ({} trees, {} bytes) to {}",
        pipeline.forest.num_trees(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Read and verify an artifact without checking schema compatibility.
pub fn read_artifact<P: AsRef<Path>>(path: P) -> Result<PipelineArtifact> {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ModelError::NotFound {
                path: path.display().to_string(),
            })
        }
        Err(e) => {
            return Err(ModelError::Corrupt {
                path: path.display().to_string(),
                reason: format!("read failed: {e}"),
            })
        }
    };

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    PipelineArtifact::from_bytes(path, &bytes)
}

/// Load a pipeline trained under the builtin encoding schema.
pub fn load_pipeline<P: AsRef<Path>>(path: P) -> Result<Pipeline> {
    load_pipeline_with_schema(path, EncodingSchema::builtin())
}

pub fn load_pipeline_with_schema<P: AsRef<Path>>(
    path: P,
    schema: &EncodingSchema,
) -> Result<Pipeline> {
    let artifact = read_artifact(path.as_ref())?;
    schema.ensure_compatible(artifact.schema_version, &artifact.schema_fingerprint)?;

    info!(
        "Loaded pipeline from {} ({} trees, trained on {} rows)",
        path.as_ref().display(),
        artifact.pipeline.forest.num_trees(),
        artifact.pipeline.metadata.n_samples
    );
    Ok(artifact.pipeline)
}
