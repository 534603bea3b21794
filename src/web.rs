//! HTTP server: API routes plus static frontend assets

use anyhow::{Context, Result};
use axum::{Router, http::StatusCode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::api::{self, ApiState};
use crate::config::BreezeConfig;
use crate::dashboard::Dashboard;
use crate::providers::Transport;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Full application router
pub fn app(config: &BreezeConfig, dashboard: Arc<Dashboard>, transport: Arc<dyn Transport>) -> Router {
    let state = ApiState {
        dashboard,
        transport,
        pollen: Arc::new(config.pollen.clone()),
    };

    Router::new()
        .nest("/api", api::router(state, &config.server))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down web server");
}

pub async fn run(
    config: &BreezeConfig,
    dashboard: Arc<Dashboard>,
    transport: Arc<dyn Transport>,
) -> Result<()> {
    let port = config.server.port;
    let app = app(config, dashboard, transport);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    #[cfg(feature = "tls")]
    {
        if let (Some(cert), Some(key)) = (&config.server.tls_cert_path, &config.server.tls_key_path) {
            return run_tls(app, addr, cert, key).await;
        }
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;
    Ok(())
}

#[cfg(feature = "tls")]
async fn run_tls(app: Router, addr: SocketAddr, cert: &str, key: &str) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    // a second install only fails if another provider is already active
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cert = BreezeConfig::expand_path(cert);
    let key = BreezeConfig::expand_path(key);
    let tls = RustlsConfig::from_pem_file(&cert, &key)
        .await
        .with_context(|| format!("Failed to load TLS certificate {}", cert.display()))?;

    info!("Web server running at https://localhost:{}", addr.port());
    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::ScriptedTransport;
    use crate::resolution::Unsupported;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_static_fallback_and_api_nesting() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Breeze</h1>").unwrap();

        let mut config = BreezeConfig::default();
        config.server.static_dir = dir.path().to_string_lossy().into_owned();
        let transport: Arc<dyn Transport> = Arc::new(ScriptedTransport::new());
        let dashboard = Arc::new(Dashboard::new(&config, transport.clone(), Arc::new(Unsupported)));
        let app = app(&config, dashboard, transport);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<h1>Breeze</h1>");

        let response = app
            .oneshot(Request::builder().uri("/api/pollen").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
