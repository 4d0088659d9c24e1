// src/fetch/cache.rs

//! On-disk page cache.
//!
//! One file per offset, `{offset}.json`, holding the raw API response body
//! verbatim. Entries are write-once and never invalidated, within a run or
//! across runs: a repeated run over the same range is free and
//! deterministic.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Directory of cached raw pages keyed by offset.
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    /// Create a cache rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File path for an offset.
    fn path(&self, offset: u64) -> PathBuf {
        self.dir.join(format!("{offset}.json"))
    }

    /// Load the cached body for an offset, or None if never fetched.
    pub async fn load(&self, offset: u64) -> Result<Option<String>> {
        let path = self.path(offset);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Persist a raw response body verbatim (write to temp, then rename).
    pub async fn save(&self, offset: u64, body: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path(offset);
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(body.as_bytes()).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
