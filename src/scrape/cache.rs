use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

struct CachedPage {
    body: String,
    fetched_at: Instant,
}

impl CachedPage {
    fn is_stale(&self, max_age: Duration) -> bool {
        self.fetched_at.elapsed() > max_age
    }
}

/// Response bodies keyed by URL. Freshness is decided by the caller on each lookup.
#[derive(Default)]
pub struct PageCache {
    entries: RwLock<HashMap<String, CachedPage>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached body for `url` if it is younger than `max_age`.
    pub fn get(&self, url: &str, max_age: Duration) -> Option<String> {
        if max_age.is_zero() {
            return None;
        }

        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(url)
            .filter(|page| !page.is_stale(max_age))
            .map(|page| page.body.clone())
    }

    pub fn insert(&self, url: &str, body: String) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, page| page.fetched_at.elapsed() < MAX_RETENTION);
        entries.insert(
            url.to_string(),
            CachedPage {
                body,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entries older than this are dropped on the next insert regardless of the lookup window.
const MAX_RETENTION: Duration = Duration::from_secs(60 * 60);
