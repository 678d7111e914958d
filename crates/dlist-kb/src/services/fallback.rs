//! Fallback poem source backed by JSON snapshots on disk
//!
//! Used only when the primary poem query fails. Every `*.json` file in the
//! directory must hold an array of poem-like objects; a file that cannot be
//! read or parsed is skipped with a warning and the scan continues.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::data::{CoreError, PoemRecord, TraceContext};
use crate::services::normalizer::poem_from_properties;

#[derive(Debug, Clone)]
pub struct FallbackPoemSource {
    dir: PathBuf,
}

impl FallbackPoemSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads every record of every snapshot file, in file name order.
    ///
    /// Fails only when the directory itself cannot be listed; an empty result
    /// is left for the caller to judge.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id, dir = %self.dir.display()))]
    pub async fn load(&self, trace_ctx: &TraceContext) -> Result<Vec<PoemRecord>, CoreError> {
        let files = self.snapshot_files().await?;
        let mut poems = Vec::new();
        for file in files {
            match load_file(&file).await {
                Ok(records) => {
                    debug!("Loaded {} fallback records from {}", records.len(), file.display());
                    poems.extend(records);
                }
                Err(e) => warn!("Skipping fallback file: {}", e),
            }
        }
        info!("Fallback source yielded {} poems", poems.len());
        Ok(poems)
    }

    async fn snapshot_files(&self) -> Result<Vec<PathBuf>, CoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            CoreError::FallbackUnavailable(format!("cannot read {}: {}", self.dir.display(), e))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            CoreError::FallbackUnavailable(format!("cannot list {}: {}", self.dir.display(), e))
        })? {
            let path = entry.path();
            if is_json_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Parses one snapshot file into poem records.
pub async fn load_file(path: &Path) -> Result<Vec<PoemRecord>, CoreError> {
    let parse_failure = |reason: String| CoreError::PartialParseFailure {
        file: path.to_path_buf(),
        reason,
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| parse_failure(e.to_string()))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| parse_failure(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(parse_failure("top-level value is not an array".to_string()));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(properties) => Some(poem_from_properties(properties)),
            other => {
                debug!("Ignoring non-object entry in {}: {}", path.display(), other);
                None
            }
        })
        .collect())
}
