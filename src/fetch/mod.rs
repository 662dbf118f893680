//! Paged fetch contract consumed by the list controller.
//!
//! A [`FetchPort`] answers one request with up to two kinds of callback,
//! delivered through a [`PageReply`]:
//!
//! - `cached(page)` - best-effort early data, zero or more times
//! - `complete(result)` - the authoritative answer, exactly once unless cancelled
//!
//! Callbacks may come from any thread. `PageReply` never touches controller
//! state directly; it forwards a [`FetchEvent`] tagged with the request's
//! generation over an unbounded channel that the controller drains on its
//! own context.
//!
//! # Module Structure
//!
//! - `error` - `FetchError` and its connectivity/generic classification
//! - `caching` - LRU response cache decorator (`CachingPort`)
//! - `catalog` - Offline JSON catalog source (`CatalogPort`)

mod caching;
mod catalog;
mod error;

pub use caching::CachingPort;
pub use catalog::{CatalogError, CatalogPort};
pub use error::FetchError;

use crate::movie::{MovieQuery, MoviesPage};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handle that stops an in-flight fetch.
///
/// After `cancel` returns, the fetch must not deliver any further callbacks.
pub trait Cancellable: Send {
    fn cancel(&mut self);
}

/// Spawned fetch tasks are cancelled by aborting them.
impl Cancellable for tokio::task::JoinHandle<()> {
    fn cancel(&mut self) {
        self.abort();
    }
}

pub type FetchHandle = Box<dyn Cancellable>;

/// Source of movie pages, one operation per query mode.
///
/// Page numbers are 1-based. A page with `total_pages == 0` means "no results"
/// and is a success, not an error. Returning `None` means the fetch cannot be
/// cancelled (typically because it already completed synchronously).
pub trait FetchPort {
    fn fetch_trending(&self, page: u32, reply: PageReply) -> Option<FetchHandle>;

    fn fetch_search(&self, query: &MovieQuery, page: u32, reply: PageReply)
        -> Option<FetchHandle>;
}

impl<P: FetchPort + ?Sized> FetchPort for Arc<P> {
    fn fetch_trending(&self, page: u32, reply: PageReply) -> Option<FetchHandle> {
        (**self).fetch_trending(page, reply)
    }

    fn fetch_search(
        &self,
        query: &MovieQuery,
        page: u32,
        reply: PageReply,
    ) -> Option<FetchHandle> {
        (**self).fetch_search(query, page, reply)
    }
}

/// Callback delivered from a fetch to its controller.
#[derive(Debug)]
pub enum FetchEvent {
    /// Page served from a local cache; advisory.
    Cached { generation: u64, page: MoviesPage },
    /// Terminal result of the fetch.
    Completed {
        generation: u64,
        result: Result<MoviesPage, FetchError>,
    },
}

impl FetchEvent {
    pub fn generation(&self) -> u64 {
        match self {
            FetchEvent::Cached { generation, .. } | FetchEvent::Completed { generation, .. } => {
                *generation
            }
        }
    }
}

type SuccessHook = Box<dyn FnOnce(&MoviesPage) + Send>;

/// Callback handle given to a [`FetchPort`] for one request.
///
/// `complete` consumes the reply, so a port cannot complete the same request
/// twice. Dropping a reply without completing it (for example when its task is
/// aborted) delivers nothing.
pub struct PageReply {
    generation: u64,
    tx: mpsc::UnboundedSender<FetchEvent>,
    on_success: Vec<SuccessHook>,
}

impl PageReply {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<FetchEvent>) -> Self {
        Self {
            generation,
            tx,
            on_success: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register a hook run with the page just before a successful completion is sent.
    ///
    /// Used by decorators such as [`CachingPort`] to observe authoritative pages.
    pub fn on_success(mut self, hook: impl FnOnce(&MoviesPage) + Send + 'static) -> Self {
        self.on_success.push(Box::new(hook));
        self
    }

    /// Deliver a page read from a local cache.
    pub fn cached(&self, page: MoviesPage) {
        self.send(FetchEvent::Cached {
            generation: self.generation,
            page,
        });
    }

    /// Deliver the authoritative result.
    pub fn complete(mut self, result: Result<MoviesPage, FetchError>) {
        if let Ok(ref page) = result {
            for hook in self.on_success.drain(..) {
                hook(page);
            }
        }
        self.send(FetchEvent::Completed {
            generation: self.generation,
            result,
        });
    }

    fn send(&self, event: FetchEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!(
                generation = e.0.generation(),
                "Fetch callback dropped (controller gone)"
            );
        }
    }
}

impl std::fmt::Debug for PageReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageReply")
            .field("generation", &self.generation)
            .field("on_success", &self.on_success.len())
            .finish()
    }
}

/// Wraps a future to catch panics and convert them to errors.
///
/// A panicking source would otherwise drop its reply without completing,
/// leaving the controller in a loading state forever.
pub(crate) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}
