use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use kanji_backend::config::{CacheConfig, Config, RateLimitConfig, SrsEnvConfig};
use kanji_backend::routes::build_router;
use kanji_backend::srs::config::SrsConfig;
use kanji_backend::srs::engine::SrsEngine;
use kanji_backend::state::AppState;
use kanji_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

async fn spawn_with_limits(api_limit: u64) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("kanji-test.sled");

    // Construct the Config directly instead of via set_var: parallel test
    // binaries must not race on process-wide env state.
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        jwt_secret: format!("integration-test-jwt-secret-{}", uuid::Uuid::new_v4()),
        jwt_expires_in_hours: 24,
        cors_origin: "http://localhost:5173".to_string(),
        trust_proxy: false,
        rate_limit: RateLimitConfig {
            window_secs: 60,
            max_requests: api_limit,
        },
        cache: CacheConfig { ttl_secs: 120 },
        srs: SrsEnvConfig {
            review_cooldown_hours: 12,
            vocab_cooldown_mins: 60,
            trusted_horizon_days: 30,
            review_batch_size: 15,
            discovery_limit: 7,
        },
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let srs_engine = Arc::new(SrsEngine::new(SrsConfig::from_env(&config.srs), store.clone()));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, srs_engine, &config, shutdown_tx);

    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with_limits(500).await
}

pub async fn spawn_test_app_with_rate_limit(api_limit: u64) -> TestApp {
    spawn_with_limits(api_limit).await
}
