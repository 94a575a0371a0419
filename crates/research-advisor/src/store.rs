//! Optional persistence of returned papers.
//!
//! Storing is fire-and-forget from the request's point of view: the
//! aggregator spawns [`PaperStore::store`] and only logs the outcome.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Paper;

/// Durable sink for papers.
#[async_trait]
pub trait PaperStore: Send + Sync {
    /// Persist the papers, returning how many were written.
    async fn store(&self, papers: &[Paper]) -> AppResult<usize>;
}

/// One stored paper with its capture metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPaper {
    /// The paper as returned to the client.
    #[serde(flatten)]
    pub paper: Paper,

    /// When the batch was captured.
    pub timestamp: DateTime<Utc>,

    /// Identifier shared by every paper stored from one request.
    pub capture_id: Uuid,
}

/// Appends papers as JSON lines to a file.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Create a store writing to `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the store appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, buf: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buf).await?;
        file.flush().await
    }
}

#[async_trait]
impl PaperStore for JsonlStore {
    async fn store(&self, papers: &[Paper]) -> AppResult<usize> {
        if papers.is_empty() {
            return Ok(0);
        }

        let timestamp = Utc::now();
        let capture_id = Uuid::new_v4();

        let mut buf = Vec::new();
        for paper in papers {
            let record = StoredPaper { paper: paper.clone(), timestamp, capture_id };
            serde_json::to_writer(&mut buf, &record)?;
            buf.push(b'\n');
        }

        self.append(&buf).await.map_err(|e| {
            AppError::store(format!("failed to append to {}: {e}", self.path.display()))
        })?;

        tracing::info!(count = papers.len(), path = %self.path.display(), %capture_id, "Stored papers");
        Ok(papers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    #[test]
    fn test_stored_paper_is_flat() {
        let record = StoredPaper {
            paper: Paper::new("Flat", Source::Crossref).with_doi(Some("10.1/x".to_string())),
            timestamp: Utc::now(),
            capture_id: Uuid::new_v4(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["title"], "Flat");
        assert_eq!(json["source"], "CrossRef");
        assert_eq!(json["doi"], "10.1/x");
        assert!(json.get("timestamp").is_some());
        assert!(json.get("paper").is_none());
    }
}
