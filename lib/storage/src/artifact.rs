//! Trained model artifact: vectorizer plus neighbour index in one file.
//!
//! Layout: a gzip stream wrapping a bincode [`Envelope`] whose payload is
//! itself the bincode encoding of the vectorizer and the index. The SHA-256
//! of the payload is stored next to it and checked on every load.

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use skillmatch_core::{Error, Metric, NeighborIndex, Result, SemanticMatcher, TfidfVectorizer};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: [u8; 4] = *b"SKMA";
pub const FORMAT_VERSION: u32 = 1;

/// Descriptive header stored alongside the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub created_at: DateTime<Utc>,
    pub vocabulary_rows: usize,
    pub features: usize,
    pub metric: Metric,
    pub n_neighbors: usize,
    pub checksum: String,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    version: u32,
    metadata: ArtifactMetadata,
    payload: Vec<u8>,
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    vectorizer: &'a TfidfVectorizer,
    index: &'a NeighborIndex,
}

#[derive(Deserialize)]
struct Payload {
    vectorizer: TfidfVectorizer,
    index: NeighborIndex,
}

/// A matcher read back from disk with its header.
#[derive(Debug)]
pub struct LoadedModel {
    pub matcher: SemanticMatcher,
    pub metadata: ArtifactMetadata,
}

pub struct ModelArtifact;

impl ModelArtifact {
    /// Encode a matcher into artifact bytes.
    pub fn to_bytes(matcher: &SemanticMatcher) -> Result<(Vec<u8>, ArtifactMetadata)> {
        let payload = bincode::serialize(&PayloadRef {
            vectorizer: matcher.vectorizer(),
            index: matcher.index(),
        })
        .map_err(|e| Error::ModelLoad(format!("serialization error: {}", e)))?;

        let metadata = ArtifactMetadata {
            created_at: Utc::now(),
            vocabulary_rows: matcher.cardinality(),
            features: matcher.vectorizer().n_features(),
            metric: matcher.index().metric(),
            n_neighbors: matcher.index().n_neighbors(),
            checksum: format!("{:x}", Sha256::digest(&payload)),
        };
        let envelope = Envelope {
            magic: MAGIC,
            version: FORMAT_VERSION,
            metadata: metadata.clone(),
            payload,
        };
        let encoded = bincode::serialize(&envelope)
            .map_err(|e| Error::ModelLoad(format!("serialization error: {}", e)))?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded)?;
        Ok((encoder.finish()?, metadata))
    }

    /// Decode and verify artifact bytes. Any defect is a `ModelLoad` error.
    pub fn from_bytes(bytes: &[u8]) -> Result<LoadedModel> {
        decode(bytes).map_err(|e| Error::ModelLoad(format!("{:#}", e)))
    }

    /// Write the artifact next to `path` and rename it into place.
    pub fn save<P: AsRef<Path>>(matcher: &SemanticMatcher, path: P) -> Result<ArtifactMetadata> {
        let path = path.as_ref();
        let (bytes, metadata) = Self::to_bytes(matcher)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_file = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&temp_file)?);
            writer.write_all(&bytes)?;
            writer.flush()?;
        }
        fs::rename(&temp_file, path)?;

        tracing::info!(
            path = %path.display(),
            rows = metadata.vocabulary_rows,
            features = metadata.features,
            "Saved model artifact"
        );
        Ok(metadata)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<LoadedModel> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        File::open(path)
            .and_then(|f| BufReader::new(f).read_to_end(&mut bytes))
            .map_err(|e| Error::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let model = Self::from_bytes(&bytes).map_err(|e| match e {
            Error::ModelLoad(reason) => Error::ModelLoad(format!("{}: {}", path.display(), reason)),
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            rows = model.metadata.vocabulary_rows,
            features = model.metadata.features,
            metric = %model.metadata.metric,
            created_at = %model.metadata.created_at,
            "Loaded model artifact"
        );
        Ok(model)
    }

    /// Header of a verified artifact.
    pub fn inspect<P: AsRef<Path>>(path: P) -> Result<ArtifactMetadata> {
        Self::load(path).map(|m| m.metadata)
    }
}

fn decode(bytes: &[u8]) -> anyhow::Result<LoadedModel> {
    let mut raw = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut raw)
        .context("artifact is not a gzip stream")?;

    let envelope: Envelope = bincode::deserialize(&raw).context("malformed artifact envelope")?;
    if envelope.magic != MAGIC {
        bail!("not a skillmatch model artifact");
    }
    if envelope.version != FORMAT_VERSION {
        bail!(
            "unsupported artifact version {} (expected {})",
            envelope.version,
            FORMAT_VERSION
        );
    }

    let actual = format!("{:x}", Sha256::digest(&envelope.payload));
    if actual != envelope.metadata.checksum {
        return Err(anyhow!(
            "checksum mismatch: expected {}, got {}",
            envelope.metadata.checksum,
            actual
        ));
    }

    let payload: Payload = bincode::deserialize(&envelope.payload).context("malformed model payload")?;
    let matcher = SemanticMatcher::new(payload.vectorizer, payload.index)?;
    if matcher.cardinality() != envelope.metadata.vocabulary_rows {
        bail!(
            "header declares {} rows but the index holds {}",
            envelope.metadata.vocabulary_rows,
            matcher.cardinality()
        );
    }

    Ok(LoadedModel {
        matcher,
        metadata: envelope.metadata,
    })
}
