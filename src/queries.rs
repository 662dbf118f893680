//! Recently searched queries, offered back as search suggestions.
//!
//! Most recent first, no duplicates, capped at `max` entries. Persisted as a
//! JSON array next to the config file.

use crate::movie::MovieQuery;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueriesError {
    #[error("Failed to access recent queries file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid recent queries JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentQueries {
    queries: Vec<MovieQuery>,
    max: usize,
}

impl RecentQueries {
    pub fn new(max: usize) -> Self {
        Self {
            queries: Vec::new(),
            max,
        }
    }

    /// Move `query` to the front, dropping the oldest entry past `max`.
    ///
    /// Empty queries are ignored.
    pub fn record(&mut self, query: MovieQuery) {
        if query.is_empty() || self.max == 0 {
            return;
        }
        self.queries.retain(|q| q != &query);
        self.queries.insert(0, query);
        self.queries.truncate(self.max);
    }

    /// Up to `count` most recent queries.
    pub fn recent(&self, count: usize) -> &[MovieQuery] {
        &self.queries[..count.min(self.queries.len())]
    }

    pub fn all(&self) -> &[MovieQuery] {
        &self.queries
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Load from a JSON file. A missing file yields an empty list.
    pub fn load(path: &Path, max: usize) -> Result<Self, QueriesError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No recent queries file, starting empty");
                return Ok(Self::new(max));
            }
            Err(e) => return Err(QueriesError::Io(e)),
        };

        let mut queries: Vec<MovieQuery> = serde_json::from_str(&content)?;
        queries.retain(|q| !q.is_empty());
        queries.truncate(max);
        tracing::debug!(path = %path.display(), count = queries.len(), "Loaded recent queries");
        Ok(Self { queries, max })
    }

    /// Write to `path` via a temp file and rename, so a crash never leaves a partial file.
    pub fn save(&self, path: &Path) -> Result<(), QueriesError> {
        let json = serde_json::to_vec_pretty(&self.queries)?;
        let temp_path = path.with_extension("json.tmp");

        let mut temp_file = std::fs::File::create(&temp_path)?;
        if let Err(e) = temp_file.write_all(&json).and_then(|_| temp_file.sync_all()) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(QueriesError::Io(e));
        }
        drop(temp_file);

        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(QueriesError::Io(e));
        }
        tracing::debug!(path = %path.display(), count = self.queries.len(), "Saved recent queries");
        Ok(())
    }
}
