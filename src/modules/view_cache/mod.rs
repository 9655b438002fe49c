//! In-process cache for rendered list views.
//!
//! List endpoints that back a frontend view (home carousel, submissions
//! grid, admin tables) cache their serialized payload under the view
//! path. Mutating actions invalidate every path that could show stale
//! data. Entries also expire on a TTL so a missed invalidation cannot
//! pin stale data forever.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct CachedView {
    value: serde_json::Value,
    stored_at: Instant,
}

pub struct ViewCache {
    entries: RwLock<HashMap<&'static str, CachedView>>,
    ttl: Duration,
}

impl ViewCache {
    const DEFAULT_TTL: Duration = Duration::from_secs(60);

    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Fetch a cached view payload if present and fresh.
    pub async fn get(&self, view: &'static str) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        entries
            .get(view)
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
            .map(|cached| cached.value.clone())
    }

    /// Store a view payload.
    pub async fn put(&self, view: &'static str, value: serde_json::Value) {
        let mut entries = self.entries.write().await;
        entries.insert(
            view,
            CachedView {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every listed view path.
    pub async fn invalidate(&self, views: &[&'static str]) {
        let mut entries = self.entries.write().await;
        for view in views {
            if entries.remove(view).is_some() {
                tracing::debug!("Invalidated cached view: {}", view);
            }
        }
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn invalidate_removes_only_listed_views() {
        let cache = ViewCache::new();
        cache.put("/submissions", json!([1, 2, 3])).await;
        cache.put("/admin/users", json!(["a"])).await;

        cache.invalidate(&["/submissions", "/"]).await;

        assert!(cache.get("/submissions").await.is_none());
        assert_eq!(cache.get("/admin/users").await, Some(json!(["a"])));
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = ViewCache::with_ttl(Duration::from_millis(0));
        cache.put("/", json!({"ok": true})).await;
        assert!(cache.get("/").await.is_none());
    }
}
