//! Offline catalog source.
//!
//! Serves trending and search pages from an in-memory movie list, normally
//! loaded from a JSON file of the form `{"movies": [...]}`. Every fetch runs
//! in its own tokio task; the returned handle aborts it.

use super::{catch_task_panic, FetchError, FetchHandle, FetchPort, PageReply};
use crate::movie::{Movie, MovieQuery, MoviesPage};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct CatalogFile {
    movies: Vec<Movie>,
}

/// In-memory [`FetchPort`] over a fixed movie list.
///
/// Trending order is catalog order. Search is a case-insensitive substring
/// match on the title.
#[derive(Clone)]
pub struct CatalogPort {
    movies: Arc<Vec<Movie>>,
    page_size: u32,
    delay: Duration,
    offline: bool,
}

impl CatalogPort {
    pub fn new(movies: Vec<Movie>, page_size: u32) -> Self {
        Self {
            movies: Arc::new(movies),
            page_size: page_size.max(1),
            delay: Duration::ZERO,
            offline: false,
        }
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: &Path, page_size: u32) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        tracing::info!(path = %path.display(), movies = file.movies.len(), "Loaded catalog");
        Ok(Self::new(file.movies, page_size))
    }

    /// Artificial latency before each answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// When set, every fetch fails with [`FetchError::NotConnected`].
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    fn spawn(&self, query: Option<String>, page: u32, reply: PageReply) -> Option<FetchHandle> {
        let movies = Arc::clone(&self.movies);
        let page_size = self.page_size;
        let delay = self.delay;
        let offline = self.offline;
        let generation = reply.generation();

        tracing::debug!(query = ?query, page, generation, "Spawning catalog fetch");

        let handle = tokio::spawn(async move {
            let outcome = catch_task_panic(async {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if offline {
                    return Err(FetchError::NotConnected);
                }
                Ok(paginate(&movies, query.as_deref(), page, page_size))
            })
            .await;

            let result = match outcome {
                Ok(result) => result,
                Err(panic_msg) => {
                    tracing::error!(task = "catalog_fetch", generation, error = %panic_msg, "Background task panicked");
                    Err(FetchError::Other(panic_msg))
                }
            };
            reply.complete(result);
        });

        Some(Box::new(handle))
    }
}

impl FetchPort for CatalogPort {
    fn fetch_trending(&self, page: u32, reply: PageReply) -> Option<FetchHandle> {
        self.spawn(None, page, reply)
    }

    fn fetch_search(
        &self,
        query: &MovieQuery,
        page: u32,
        reply: PageReply,
    ) -> Option<FetchHandle> {
        self.spawn(Some(query.query.clone()), page, reply)
    }
}

/// Slice one page out of the (optionally filtered) catalog.
///
/// `total_pages` is 0 when nothing matches. Pages past the end come back
/// empty with the real total.
fn paginate(movies: &[Movie], query: Option<&str>, page: u32, page_size: u32) -> MoviesPage {
    let needle = query.map(str::to_lowercase);
    let matches: Vec<&Movie> = movies
        .iter()
        .filter(|m| match &needle {
            Some(n) => m.title.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .collect();

    let size = page_size.max(1) as usize;
    let total_pages = matches.len().div_ceil(size) as u32;
    let start = (page.max(1) as usize - 1).saturating_mul(size);

    MoviesPage {
        page,
        total_pages,
        movies: matches
            .into_iter()
            .skip(start)
            .take(size)
            .cloned()
            .collect(),
    }
}
