//! On-disk result cache.
//!
//! One JSON file per completed execution unit:
//!
//! ```text
//! <root>/{suite_id}/{version}/{model}__run{N}__test{I}.json
//! ```
//!
//! A stored result is only reused when its `signature` equals the freshly
//! computed fingerprint, so editing a prompt or its answers under the same
//! version makes the old entry miss without explicit invalidation.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::errors::CacheError;
use crate::model::{CachedResult, CACHE_VERSION};

pub(crate) mod io;
pub mod key;
pub mod status;

pub use key::CacheKey;
pub use status::{cache_status, CacheStatus};

#[derive(Debug, Clone)]
pub struct ResultCache {
    root: PathBuf,
}

impl ResultCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        key::result_path(&self.root, key)
    }

    /// Reads a raw entry without validating it against a fingerprint.
    pub async fn read(&self, key: &CacheKey) -> Result<Option<CachedResult>, CacheError> {
        let path = self.path_for(key);
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Returns a reusable result for `key`, or `None`.
    ///
    /// Never fails: I/O and parse errors, version skew and signature
    /// mismatches all count as a miss.
    pub async fn lookup(&self, key: &CacheKey, fingerprint: &str) -> Option<CachedResult> {
        match self.read(key).await {
            Ok(Some(entry)) => {
                if entry.cache_version != CACHE_VERSION {
                    debug!(
                        model = %key.model,
                        test_index = key.test_index,
                        found = entry.cache_version,
                        "cache entry version skew"
                    );
                    None
                } else if entry.signature != fingerprint {
                    debug!(
                        model = %key.model,
                        test_index = key.test_index,
                        run_number = key.run_number,
                        "stale cache entry (signature mismatch)"
                    );
                    None
                } else {
                    Some(entry)
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!(model = %key.model, test_index = key.test_index, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Persists one result. Last write wins for the same key.
    pub async fn store(&self, result: &CachedResult) -> Result<(), CacheError> {
        let key = key_of(result);
        let path = self.path_for(&key);
        let content = serde_json::to_string_pretty(result)?;
        io::write_atomic(&path, &content).await?;
        debug!(path = %path.display(), "cached result");
        Ok(())
    }

    /// Version directories present for a suite, sorted ascending.
    pub async fn versions(&self, suite_id: &str) -> Vec<String> {
        let dir = self.root.join(key::sanitize(suite_id));
        let mut out = Vec::new();
        let Ok(mut entries) = fs::read_dir(&dir).await else {
            return out;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                out.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        out.sort();
        out
    }

    /// Every parseable result under one suite version; unreadable files are skipped.
    pub async fn list_version(&self, suite_id: &str, version: &str) -> Vec<CachedResult> {
        let dir = key::version_dir(&self.root, suite_id, version);
        let mut out = read_results_in(&dir).await;
        out.sort_by(|a, b| {
            (a.model.as_str(), a.run_number, a.test_index).cmp(&(
                b.model.as_str(),
                b.run_number,
                b.test_index,
            ))
        });
        out
    }

    /// Every parseable result in the cache.
    pub async fn list_all(&self) -> Vec<CachedResult> {
        let mut out = Vec::new();
        let Ok(mut suites) = fs::read_dir(&self.root).await else {
            return out;
        };
        while let Ok(Some(suite)) = suites.next_entry().await {
            let Ok(mut versions) = fs::read_dir(suite.path()).await else {
                continue;
            };
            while let Ok(Some(version)) = versions.next_entry().await {
                out.extend(read_results_in(&version.path()).await);
            }
        }
        out
    }
}

pub fn key_of(result: &CachedResult) -> CacheKey {
    CacheKey::new(
        result.suite_id.clone(),
        result.version.clone(),
        result.model.clone(),
        result.run_number,
        result.test_index,
    )
}

async fn read_results_in(dir: &Path) -> Vec<CachedResult> {
    let mut out = Vec::new();
    let Ok(mut entries) = fs::read_dir(dir).await else {
        return out;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }
        match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<CachedResult>(&content) {
                Ok(r) => out.push(r),
                Err(e) => debug!(path = %path.display(), error = %e, "skipping unparseable cache file"),
            },
            Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable cache file"),
        }
    }
    out
}
