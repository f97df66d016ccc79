//! HTTP Server
//!
//! 组装中间件并启动 axum 服务

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 请求体上限，足够容纳长篇合成文本
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", 8000)
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 跨域配置：浏览器播放器需要读取 Content-Disposition
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([CONTENT_TYPE, CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(3600))
}

/// 组装完整的应用 Router
pub fn app(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    create_routes()
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(error_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 启动服务器，`shutdown_signal` 完成后停止接收新连接
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.addr()).await?;
        tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

        axum::serve(listener, app(self.state, self.config.max_body_bytes))
            .with_graceful_shutdown(shutdown_signal)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::DEFAULT_CATALOG_TTL;
    use crate::infrastructure::adapters::{FakeTtsClient, JiebaTokenizer};
    use crate::infrastructure::memory::{HybridSessionStore, SessionStoreConfig};
    use crate::infrastructure::persistence::{FileAudioCache, FileCacheConfig};
    use axum::body::Body;
    use http::{header, Request, StatusCode};
    use tower::util::ServiceExt;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8000");
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn test_app_rejects_oversized_body_and_sets_cors() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileAudioCache::open(&FileCacheConfig {
            cache_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .await
        .unwrap();
        let state = AppState::new(
            Arc::new(FakeTtsClient::with_defaults()),
            Arc::new(cache),
            Arc::new(HybridSessionStore::new(SessionStoreConfig::default(), None)),
            Arc::new(JiebaTokenizer::new()),
            DEFAULT_CATALOG_TTL,
        );
        let router = app(Arc::new(state), 64);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/ping")
                    .header(header::ORIGIN, "http://player.local")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let text = "很长的文本".repeat(32);
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/segment")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::json!({ "text": text }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
