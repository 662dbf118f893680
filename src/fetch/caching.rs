//! In-memory response cache in front of another port.
//!
//! A hit is delivered through `cached()` before the inner port is asked for
//! the authoritative page, producing the cached-then-fresh sequence the list
//! controller reconciles. Only authoritative successes are stored.

use super::{FetchHandle, FetchPort, PageReply};
use crate::movie::{MovieQuery, MoviesPage};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Trending { page: u32 },
    Search { query: String, page: u32 },
}

type PageCache = Arc<Mutex<LruCache<CacheKey, MoviesPage>>>;

/// Decorator that adds an LRU page cache to any [`FetchPort`].
///
/// A capacity of zero disables caching; requests pass straight through.
pub struct CachingPort<P> {
    inner: P,
    cache: Option<PageCache>,
}

impl<P: FetchPort> CachingPort<P> {
    pub fn new(inner: P, capacity: usize) -> Self {
        let cache = NonZeroUsize::new(capacity).map(|cap| Arc::new(Mutex::new(LruCache::new(cap))));
        if cache.is_none() {
            tracing::debug!("Response cache disabled (capacity 0)");
        }
        Self { inner, cache }
    }

    /// Number of cached pages.
    pub fn cached_pages(&self) -> usize {
        self.cache
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(PoisonError::into_inner).len())
            .unwrap_or(0)
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Serve a hit through `cached()` and arrange for a fresh success to be stored.
    fn wrap(&self, key: CacheKey, reply: PageReply) -> PageReply {
        let Some(cache) = &self.cache else {
            return reply;
        };

        let hit = cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(page) = hit {
            tracing::debug!(key = ?key, generation = reply.generation(), "Response cache hit");
            reply.cached(page);
        }

        let cache = Arc::clone(cache);
        reply.on_success(move |page| {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(key, page.clone());
        })
    }
}

impl<P: FetchPort> FetchPort for CachingPort<P> {
    fn fetch_trending(&self, page: u32, reply: PageReply) -> Option<FetchHandle> {
        let reply = self.wrap(CacheKey::Trending { page }, reply);
        self.inner.fetch_trending(page, reply)
    }

    fn fetch_search(
        &self,
        query: &MovieQuery,
        page: u32,
        reply: PageReply,
    ) -> Option<FetchHandle> {
        let key = CacheKey::Search {
            query: query.query.clone(),
            page,
        };
        let reply = self.wrap(key, reply);
        self.inner.fetch_search(query, page, reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchEvent};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::mpsc;

    /// Port that completes synchronously with a scripted result.
    struct ScriptedPort {
        result: StdMutex<Result<MoviesPage, FetchError>>,
    }

    impl ScriptedPort {
        fn new(result: Result<MoviesPage, FetchError>) -> Self {
            Self {
                result: StdMutex::new(result),
            }
        }

        fn set(&self, result: Result<MoviesPage, FetchError>) {
            *self.result.lock().unwrap() = result;
        }
    }

    impl FetchPort for ScriptedPort {
        fn fetch_trending(&self, _page: u32, reply: PageReply) -> Option<FetchHandle> {
            reply.complete(self.result.lock().unwrap().clone());
            None
        }

        fn fetch_search(&self, _q: &MovieQuery, _page: u32, reply: PageReply) -> Option<FetchHandle> {
            reply.complete(self.result.lock().unwrap().clone());
            None
        }
    }

    fn page(number: u32, total: u32) -> MoviesPage {
        MoviesPage {
            page: number,
            total_pages: total,
            movies: Vec::new(),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<FetchEvent>) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_miss_then_hit_delivers_cached_first() {
        let port = CachingPort::new(ScriptedPort::new(Ok(page(1, 4))), 8);
        let (tx, mut rx) = mpsc::unbounded_channel();

        port.fetch_trending(1, PageReply::new(1, tx.clone()));
        let first = drain(&mut rx);
        assert_eq!(first.len(), 1);
        assert!(matches!(first[0], FetchEvent::Completed { .. }));
        assert_eq!(port.cached_pages(), 1);

        port.inner().set(Ok(page(1, 5)));
        port.fetch_trending(1, PageReply::new(2, tx));
        let second = drain(&mut rx);
        assert_eq!(second.len(), 2);
        match &second[0] {
            FetchEvent::Cached { generation, page } => {
                assert_eq!(*generation, 2);
                assert_eq!(page.total_pages, 4);
            }
            other => panic!("expected cached event, got {other:?}"),
        }
        match &second[1] {
            FetchEvent::Completed { result: Ok(page), .. } => assert_eq!(page.total_pages, 5),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_not_cached() {
        let port = CachingPort::new(ScriptedPort::new(Err(FetchError::NotConnected)), 8);
        let (tx, _rx) = mpsc::unbounded_channel();
        port.fetch_search(&MovieQuery::new("dune"), 1, PageReply::new(1, tx));
        assert_eq!(port.cached_pages(), 0);
    }

    #[test]
    fn test_search_and_trending_keys_are_distinct() {
        let port = CachingPort::new(ScriptedPort::new(Ok(page(1, 1))), 8);
        let (tx, mut rx) = mpsc::unbounded_channel();
        port.fetch_trending(1, PageReply::new(1, tx.clone()));
        drain(&mut rx);

        port.fetch_search(&MovieQuery::new("dune"), 1, PageReply::new(2, tx));
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1, "search must not hit the trending entry");
        assert_eq!(port.cached_pages(), 2);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let port = CachingPort::new(ScriptedPort::new(Ok(page(1, 1))), 0);
        let (tx, mut rx) = mpsc::unbounded_channel();
        port.fetch_trending(1, PageReply::new(1, tx.clone()));
        port.fetch_trending(1, PageReply::new(2, tx));
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, FetchEvent::Completed { .. })));
        assert_eq!(port.cached_pages(), 0);
    }

    #[test]
    fn test_lru_evicts_oldest() {
        let port = CachingPort::new(ScriptedPort::new(Ok(page(1, 3))), 2);
        let (tx, _rx) = mpsc::unbounded_channel();
        for n in 1..=3 {
            port.fetch_trending(n, PageReply::new(u64::from(n), tx.clone()));
        }
        assert_eq!(port.cached_pages(), 2);
    }
}
