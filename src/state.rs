use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::middleware::rate_limit::RateLimitState;
use crate::srs::engine::SrsEngine;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    srs: Arc<SrsEngine>,
    cache: Arc<ResponseCache>,
    rate_limit: Arc<RateLimitState>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        srs: Arc<SrsEngine>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(
            config.cache.ttl_secs,
        )));
        let rate_limit = Arc::new(RateLimitState::new(
            config.rate_limit.window_secs,
            config.rate_limit.max_requests,
        ));

        Self {
            store,
            srs,
            cache,
            rate_limit,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn srs(&self) -> &SrsEngine {
        &self.srs
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn rate_limit(&self) -> &Arc<RateLimitState> {
        &self.rate_limit
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use crate::config::Config;
    use crate::srs::config::SrsConfig;
    use crate::srs::engine::SrsEngine;
    use crate::store::Store;

    use super::*;

    fn build_state(name: &str) -> (tempfile::TempDir, AppState) {
        let cfg = Config::from_env();
        let tmp = tempfile::tempdir().expect("tempdir");
        let store =
            Arc::new(Store::open(tmp.path().join(name).to_str().unwrap()).expect("open store"));
        let srs = Arc::new(SrsEngine::new(SrsConfig::default(), store.clone()));
        let (tx, _) = broadcast::channel(4);
        (tmp, AppState::new(store, srs, &cfg, tx))
    }

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let (_tmp, state) = build_state("state_shutdown.sled");

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        state.shutdown_tx().send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn cache_is_shared_between_clones() {
        let (_tmp, state) = build_state("state_cache.sled");
        let clone = state.clone();

        state
            .cache()
            .put("u1", crate::cache::QueryKind::Overview, serde_json::json!(1))
            .await;
        assert!(clone
            .cache()
            .get("u1", crate::cache::QueryKind::Overview)
            .await
            .is_some());
    }
}
