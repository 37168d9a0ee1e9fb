use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// Query families that are cached per user. Anything that mutates a user's
/// mastery records or track preference must invalidate that user's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Groups,
    Recommendation,
    Overview,
    Level,
}

/// Short-TTL response cache keyed by (user, query kind).
///
/// Explicitly owned by `AppState` and injected into handlers; invalidation
/// is the caller's responsibility on every mutation.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<(String, QueryKind), (Instant, Value)>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, user_id: &str, kind: QueryKind) -> Option<Value> {
        let entries = self.entries.read().await;
        let (stored_at, value) = entries.get(&(user_id.to_string(), kind))?;
        if stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(value.clone())
    }

    pub async fn put(&self, user_id: &str, kind: QueryKind, value: Value) {
        let mut entries = self.entries.write().await;
        // Opportunistic cleanup keeps the map from accumulating dead entries.
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert((user_id.to_string(), kind), (Instant::now(), value));
    }

    pub async fn invalidate_user(&self, user_id: &str) {
        let mut entries = self.entries.write().await;
        entries.retain(|(uid, _), _| uid != user_id);
    }
}
