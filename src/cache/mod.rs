//! Page cache for on-demand generation and timed revalidation
//!
//! Routes not pre-rendered are generated on first request. While that
//! runs, other requests for the same route see [`Lookup::Pending`]. A page
//! older than its revalidation window is still served, and exactly one
//! caller is told to regenerate it in the background.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Most not-found pages kept at once; the oldest is evicted beyond this
const MAX_NOT_FOUND: usize = 256;

/// A rendered page and whether it is the real page or a not-found page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub html: String,
    pub found: bool,
}

impl CachedPage {
    pub fn found(html: String) -> Self {
        Self { html, found: true }
    }

    pub fn not_found(html: String) -> Self {
        Self { html, found: false }
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Serve as is.
    Fresh(CachedPage),
    /// Serve as is; when `regenerate` is set the caller owns a background
    /// regeneration and must finish it with [`PageCache::store`] or
    /// [`PageCache::release`].
    Stale { page: CachedPage, regenerate: bool },
    /// Another caller is generating this page; show the placeholder.
    Pending,
    /// Not cached; the caller owns generation, as for a regenerating `Stale`.
    Generate,
}

#[derive(Debug, Clone)]
struct Entry {
    page: CachedPage,
    generated_at: Instant,
    /// `None` never goes stale
    revalidate: Option<Duration>,
}

impl Entry {
    fn is_stale(&self, now: Instant) -> bool {
        match self.revalidate {
            Some(window) => now.saturating_duration_since(self.generated_at) >= window,
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    pending: HashSet<String>,
}

impl Inner {
    /// Forget not-found pages past their window and keep at most
    /// `MAX_NOT_FOUND` of them
    fn prune_not_found(&mut self, now: Instant) {
        self.entries
            .retain(|_, entry| entry.page.found || !entry.is_stale(now));

        let mut missing: Vec<(Instant, String)> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.page.found)
            .map(|(key, entry)| (entry.generated_at, key.clone()))
            .collect();
        if missing.len() <= MAX_NOT_FOUND {
            return;
        }
        missing.sort();
        let excess = missing.len() - MAX_NOT_FOUND;
        for (_, key) in missing.into_iter().take(excess) {
            self.entries.remove(&key);
        }
    }
}

/// Rendered pages keyed by route
#[derive(Debug, Default)]
pub struct PageCache {
    inner: Mutex<Inner>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, claiming generation when it is due
    pub async fn lookup(&self, key: &str, now: Instant) -> Lookup {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let claimed = inner.pending.contains(key);

        // An expired not-found page is dropped, not served stale
        if inner
            .entries
            .get(key)
            .is_some_and(|entry| !entry.page.found && entry.is_stale(now))
        {
            inner.entries.remove(key);
        }

        if let Some(entry) = inner.entries.get(key) {
            if !entry.is_stale(now) {
                return Lookup::Fresh(entry.page.clone());
            }
            let page = entry.page.clone();
            if !claimed {
                inner.pending.insert(key.to_string());
            }
            return Lookup::Stale {
                page,
                regenerate: !claimed,
            };
        }

        if claimed {
            return Lookup::Pending;
        }
        inner.pending.insert(key.to_string());
        Lookup::Generate
    }

    /// Store a freshly generated page and end its generation claim
    pub async fn store(
        &self,
        key: &str,
        page: CachedPage,
        revalidate: Option<Duration>,
        now: Instant,
    ) {
        let mut inner = self.inner.lock().await;
        inner.pending.remove(key);
        let found = page.found;
        inner.entries.insert(
            key.to_string(),
            Entry {
                page,
                generated_at: now,
                revalidate,
            },
        );
        if !found {
            inner.prune_not_found(now);
        }
    }

    /// End a generation claim without a new page; any stale copy is kept
    pub async fn release(&self, key: &str) {
        self.inner.lock().await.pending.remove(key);
    }

    /// Number of cached pages
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}
