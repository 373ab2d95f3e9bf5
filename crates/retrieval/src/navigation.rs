use crate::cache::BoundedCache;
use crate::error::Result;
use crate::host::{Location, SymbolNavigator};
use async_trait::async_trait;
use context_code_window::Position;
use std::sync::Arc;

type QueryKey = (String, Position);

/// Memoizes definition and reference lookups of another navigator.
///
/// Keys are `(path, position)`; each query kind has its own LRU. Failed
/// lookups are not cached, and a result whose file was invalidated while the
/// lookup was in flight is returned but not stored.
pub struct CachedNavigator {
    inner: Arc<dyn SymbolNavigator>,
    definitions: BoundedCache<QueryKey, Option<Location>>,
    references: BoundedCache<QueryKey, Vec<Location>>,
}

impl CachedNavigator {
    pub fn new(inner: Arc<dyn SymbolNavigator>, capacity: usize) -> Self {
        Self {
            inner,
            definitions: BoundedCache::new(capacity),
            references: BoundedCache::new(capacity),
        }
    }

    /// Forget every lookup issued from `path` or answered with a location in it
    pub fn invalidate_file(&self, path: &str) -> usize {
        let names = |location: &Location| location.filepath == path;
        let definitions = self
            .definitions
            .invalidate_where(|(key_path, _), found| key_path == path || found.iter().any(names));
        let references = self
            .references
            .invalidate_where(|(key_path, _), found| key_path == path || found.iter().any(names));
        definitions + references
    }
}

#[async_trait]
impl SymbolNavigator for CachedNavigator {
    async fn definition(&self, path: &str, position: Position) -> Result<Option<Location>> {
        let key = (path.to_string(), position);
        if let Some(hit) = self.definitions.get(&key) {
            return Ok((*hit).clone());
        }
        let epoch = self.definitions.epoch();
        let found = self.inner.definition(path, position).await?;
        self.definitions.insert_if_current(key, found.clone(), epoch);
        Ok(found)
    }

    async fn references(&self, path: &str, position: Position) -> Result<Vec<Location>> {
        let key = (path.to_string(), position);
        if let Some(hit) = self.references.get(&key) {
            return Ok((*hit).clone());
        }
        let epoch = self.references.epoch();
        let found = self.inner.references(path, position).await?;
        self.references.insert_if_current(key, found.clone(), epoch);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;
    use context_code_window::Range;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingNavigator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SymbolNavigator for CountingNavigator {
        async fn definition(&self, _path: &str, position: Position) -> Result<Option<Location>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RetrievalError::navigation("server not ready"));
            }
            Ok(Some(Location::new("def.py", Range::lines(position.line, position.line))))
        }

        async fn references(&self, _path: &str, _position: Position) -> Result<Vec<Location>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Location::new("use.py", Range::lines(3, 3))])
        }
    }

    /// Answers after 100ms; the answer's line is the call number
    #[derive(Default)]
    struct SlowNavigator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SymbolNavigator for SlowNavigator {
        async fn definition(&self, path: &str, _position: Position) -> Result<Option<Location>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(Some(Location::new(path, Range::lines(call, call))))
        }

        async fn references(&self, _path: &str, _position: Position) -> Result<Vec<Location>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_repeated_lookups_hit_cache() {
        let inner = Arc::new(CountingNavigator::default());
        let nav = CachedNavigator::new(inner.clone(), 50);

        let first = nav.definition("a.py", Position::new(1, 2)).await.unwrap();
        let second = nav.definition("a.py", Position::new(1, 2)).await.unwrap();
        assert_eq!(first, second);
        nav.references("a.py", Position::new(1, 2)).await.unwrap();
        nav.references("a.py", Position::new(1, 2)).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let inner = Arc::new(CountingNavigator {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let nav = CachedNavigator::new(inner.clone(), 50);

        assert!(nav.definition("a.py", Position::new(0, 0)).await.is_err());
        assert!(nav.definition("a.py", Position::new(0, 0)).await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_file() {
        let inner = Arc::new(CountingNavigator::default());
        let nav = CachedNavigator::new(inner.clone(), 50);
        nav.definition("a.py", Position::new(0, 0)).await.unwrap();
        nav.definition("b.py", Position::new(0, 0)).await.unwrap();

        assert_eq!(nav.invalidate_file("a.py"), 1);
        nav.definition("a.py", Position::new(0, 0)).await.unwrap();
        nav.definition("b.py", Position::new(0, 0)).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalidate_drops_answers_pointing_into_file() {
        let inner = Arc::new(CountingNavigator::default());
        let nav = CachedNavigator::new(inner.clone(), 50);
        nav.references("def.py", Position::new(0, 0)).await.unwrap();

        // the cached answer lists a reference in use.py
        assert_eq!(nav.invalidate_file("use.py"), 1);
        nav.references("def.py", Position::new(0, 0)).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_during_lookup_is_not_undone() {
        let inner = Arc::new(SlowNavigator::default());
        let nav = Arc::new(CachedNavigator::new(inner.clone(), 50));

        let in_flight = tokio::spawn({
            let nav = Arc::clone(&nav);
            async move { nav.definition("a.py", Position::new(1, 1)).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        nav.invalidate_file("a.py");

        let stale = in_flight.await.unwrap().unwrap().unwrap();
        assert_eq!(stale.range.start.line, 0);

        let fresh = nav.definition("a.py", Position::new(1, 1)).await.unwrap().unwrap();
        assert_eq!(fresh.range.start.line, 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
