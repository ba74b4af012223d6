//! File fallback tier: one JSON document per learner.
//!
//! Documents are written atomically (temp file + rename) and carry a
//! SHA-256 checksum of the serialized context.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::warn;

use crate::domain::foundation::LearnerId;
use crate::domain::learner::UserContext;
use crate::ports::{ContextTier, StoreOutcome, TierError, TierKind};

const DOCUMENT_VERSION: u32 = 1;

/// On-disk document wrapping a serialized context.
#[derive(Debug, Serialize, Deserialize)]
struct FallbackDocument {
    version: u32,
    learner_id: String,
    checksum: String,
    context: String,
}

/// Filesystem-based fallback storage
///
/// Layout: `{base_dir}/{learner}.json`, where `{learner}` is the sanitized
/// learner id. Ids changed by sanitizing get a short hash suffix so two ids
/// never share a file.
pub struct FileContextStore {
    base_dir: PathBuf,
    write_seq: AtomicU64,
}

impl FileContextStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, learner_id: &LearnerId) -> PathBuf {
        let safe = learner_id.file_safe();
        let name = if safe == learner_id.as_str() {
            safe
        } else {
            format!("{}-{}", safe, &checksum(learner_id.as_str())[..8])
        };
        self.base_dir.join(format!("{}.json", name))
    }

    async fn ensure_dir_exists(&self) -> Result<(), TierError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| TierError::Io(format!("Failed to create directory: {}", e)))
    }

    async fn read_document(&self, path: &Path) -> Result<Option<FallbackDocument>, TierError> {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TierError::Io(format!("Failed to read file: {}", e))),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| TierError::Serialization(format!("Malformed fallback document: {}", e)))
    }
}

fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ContextTier for FileContextStore {
    fn kind(&self) -> TierKind {
        TierKind::File
    }

    async fn load(&self, learner_id: &LearnerId) -> Result<Option<UserContext>, TierError> {
        let path = self.file_path(learner_id);
        let document = match self.read_document(&path).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(None),
            Err(TierError::Serialization(reason)) => {
                return Err(TierError::Corrupt {
                    learner_id: learner_id.clone(),
                    reason,
                })
            }
            Err(e) => return Err(e),
        };

        if document.checksum != checksum(&document.context) {
            return Err(TierError::Corrupt {
                learner_id: learner_id.clone(),
                reason: "checksum mismatch".to_string(),
            });
        }

        let context: UserContext =
            serde_json::from_str(&document.context).map_err(|e| TierError::Corrupt {
                learner_id: learner_id.clone(),
                reason: e.to_string(),
            })?;

        if context.learner_id() != learner_id {
            return Err(TierError::Corrupt {
                learner_id: learner_id.clone(),
                reason: format!("document belongs to {}", context.learner_id()),
            });
        }
        Ok(Some(context))
    }

    async fn store(&self, context: &UserContext) -> Result<StoreOutcome, TierError> {
        self.ensure_dir_exists().await?;

        let serialized =
            serde_json::to_string(context).map_err(|e| TierError::Serialization(e.to_string()))?;
        let document = FallbackDocument {
            version: DOCUMENT_VERSION,
            learner_id: context.learner_id().to_string(),
            checksum: checksum(&serialized),
            context: serialized,
        };
        let body = serde_json::to_string_pretty(&document)
            .map_err(|e| TierError::Serialization(e.to_string()))?;

        let file_path = self.file_path(context.learner_id());
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let temp_path = file_path.with_extension(format!("json.{}.tmp", seq));

        fs::write(&temp_path, body)
            .await
            .map_err(|e| TierError::Io(format!("Failed to write temporary file: {}", e)))?;

        if let Err(e) = fs::rename(&temp_path, &file_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(TierError::Io(format!("Failed to rename file: {}", e)));
        }

        Ok(StoreOutcome::Applied)
    }

    async fn remove(&self, learner_id: &LearnerId) -> Result<(), TierError> {
        match fs::remove_file(self.file_path(learner_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TierError::Io(format!("Failed to delete file: {}", e))),
        }
    }

    async fn list(&self) -> Result<Vec<LearnerId>, TierError> {
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(TierError::Io(format!("Failed to list directory: {}", e))),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| TierError::Io(format!("Failed to list directory: {}", e)))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match self.read_document(&path).await {
                Ok(Some(doc)) => match LearnerId::new(doc.learner_id) {
                    Ok(id) => ids.push(id),
                    Err(e) => warn!(path = %path.display(), error = %e, "Skipping fallback document"),
                },
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping fallback document"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
