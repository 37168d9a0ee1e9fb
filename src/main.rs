use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};
use kanji_backend::config::Config;
use kanji_backend::logging::{init_tracing, LogConfig};
use kanji_backend::routes::build_router;
use kanji_backend::srs::config::SrsConfig;
use kanji_backend::srs::engine::SrsEngine;
use kanji_backend::state::AppState;
use kanji_backend::store::Store;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

const CSP_HEADER: &str = "default-src 'self'; script-src 'self'; style-src 'self'; connect-src 'self'; img-src 'self' data:; frame-ancestors 'none'; base-uri 'self'; form-action 'self'";
const HSTS_HEADER: &str = "max-age=31536000; includeSubDomains";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig {
        log_level: config.log_level.clone(),
        enable_file_logs: config.enable_file_logs,
        log_dir: config.log_dir.clone(),
    });
    tracing::info!("Starting kanji-backend");

    let store = Arc::new(Store::open(&config.sled_path).expect("Failed to open sled database"));
    store.run_migrations().expect("Failed to run migrations");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let srs_config = SrsConfig::from_env(&config.srs);
    let srs_engine = Arc::new(SrsEngine::new(srs_config, store.clone()));

    let state = AppState::new(store.clone(), srs_engine, &config, shutdown_tx.clone());

    let cors_layer = build_cors_layer(&config);

    let app = build_router(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("content-security-policy"),
            HeaderValue::from_static(CSP_HEADER),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static(HSTS_HEADER),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    let server_future = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()));

    if let Err(e) = server_future.await {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
    }
    tracing::info!("Shutdown complete");
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origin.trim() == "*" {
        // Wildcard mode is development-only; wildcard and credentials are
        // mutually exclusive.
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_credentials(false)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any);
    }

    match config.cors_origin.parse::<axum::http::HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any),
        Err(e) => {
            panic!(
                "FATAL: Invalid CORS_ORIGIN '{}': {}. \
                 Fix the CORS_ORIGIN environment variable.",
                config.cors_origin, e
            );
        }
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
