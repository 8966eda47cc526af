use core::num::NonZeroUsize;

use lru::LruCache;

use crate::query::Query;
use crate::statement::Statement;

/// Bounded cache of prepared statements, keyed by query name.
///
/// Evicting a statement only drops the cache's handle to it, the native
/// statement stays alive for as long as a caller holds a clone.
pub(crate) struct StatementCache {
    inner: Option<LruCache<Box<str>, Statement>>,
}

impl StatementCache {
    /// Construct a cache, where a capacity of zero disables caching.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up a statement which was prepared from an identical named query.
    pub(crate) fn get(&mut self, query: &Query) -> Option<Statement> {
        let inner = self.inner.as_mut()?;
        let name = query.name()?;

        let stale = match inner.get(name) {
            Some(stmt) if is_same_query(stmt, query) => return Some(stmt.clone()),
            Some(..) => true,
            None => false,
        };

        if stale {
            inner.pop(name);
        }

        None
    }

    pub(crate) fn insert(&mut self, name: &str, stmt: Statement) {
        let Some(inner) = &mut self.inner else {
            return;
        };

        if let Some((name, ..)) = inner.push(name.into(), stmt) {
            tracing::trace!(?name, "evicted cached statement");
        }
    }

    /// Remove the given statement from the cache if present.
    pub(crate) fn evict(&mut self, stmt: &Statement) {
        let Some(inner) = &mut self.inner else {
            return;
        };

        let Some(name) = stmt.name() else {
            return;
        };

        if inner.peek(name).is_some_and(|cached| cached.same(stmt)) {
            inner.pop(name);
        }
    }

    pub(crate) fn clear(&mut self) {
        if let Some(inner) = &mut self.inner {
            inner.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, LruCache::len)
    }
}

fn is_same_query(stmt: &Statement, query: &Query) -> bool {
    stmt.sql() == query.sql() && stmt.command() == query.command() && !stmt.is_released()
}
