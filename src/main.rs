//! voxcache - 带混合缓存的语音合成服务
//!
//! 启动顺序: 配置 -> 日志 -> 适配器 -> 应用状态 -> HTTP 服务器

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use voxcache::application::ports::KeyValueStorePort;
use voxcache::config::{load_config, print_config, LogConfig};
use voxcache::infrastructure::adapters::{HttpTtsClient, HttpTtsClientConfig, JiebaTokenizer};
use voxcache::infrastructure::http::{AppState, HttpServer, ServerConfig};
use voxcache::infrastructure::memory::{HybridSessionStore, SessionStoreConfig};
use voxcache::infrastructure::persistence::{FileAudioCache, FileCacheConfig, SledKeyValueStore};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},voxcache={},tower_http=debug", log.level, log.level);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("voxcache v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // TTS 引擎
    let tts_engine = Arc::new(HttpTtsClient::new(
        HttpTtsClientConfig::new(&config.tts.url).with_timeout(config.tts.timeout_secs),
    )?);

    // 文件音频缓存
    let audio_cache = Arc::new(
        FileAudioCache::open(&FileCacheConfig {
            cache_dir: config.cache.dir.clone(),
            max_size_bytes: config.cache.max_size_bytes(),
            default_ttl: config.cache.default_ttl(),
        })
        .await?,
    );

    // 持久会话存储（可选）
    let persistent: Option<Arc<dyn KeyValueStorePort>> = if config.store.enabled {
        if let Some(parent) = config.store.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let store: Arc<dyn KeyValueStorePort> = SledKeyValueStore::open(&config.store.path)?.arc();
        Some(store)
    } else {
        tracing::info!("Persistent session store disabled");
        None
    };

    // 双层会话存储 + 后台清理
    let session_store = HybridSessionStore::new(
        SessionStoreConfig {
            default_ttl: config.session.default_ttl(),
        },
        persistent,
    )
    .arc();
    session_store.start_cleanup_task(config.session.cleanup_interval());

    let state = AppState::new(
        tts_engine,
        audio_cache.clone(),
        session_store.clone(),
        Arc::new(JiebaTokenizer::new()),
        config.voices.catalog_ttl(),
    );

    let server = HttpServer::new(
        ServerConfig::new(&config.server.host, config.server.port),
        state,
    );

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    session_store.stop_cleanup_task().await;
    audio_cache.flush().await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
