//! Web 服务器模块
//!
//! 提供翻译提交、任务轮询、文章导入和推送通道的 HTTP 接口

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use handlers::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::env::EnvError;
use crate::network::{ArticleFetcher, ImportError};
use crate::translation::{create_orchestrator, TranslationConfig, TranslationError};

/// 服务器启动与运行错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(#[from] EnvError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("抓取客户端初始化失败: {0}")]
    Fetcher(#[from] ImportError),

    #[error("无法绑定 {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("服务器错误: {0}")]
    Serve(#[source] std::io::Error),
}

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
    translation_config: TranslationConfig,
    state: Arc<AppState>,
}

impl WebServer {
    /// 使用 OpenAI 兼容的翻译服务创建服务器
    pub fn new(
        config: WebConfig,
        translation_config: TranslationConfig,
    ) -> Result<Self, ServerError> {
        config.validate()?;
        let orchestrator = create_orchestrator(&translation_config)?;
        let state = AppState::new(orchestrator, ArticleFetcher::new()?);

        Ok(Self {
            config,
            translation_config,
            state: Arc::new(state),
        })
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// 启动 Web 服务器，收到 Ctrl-C 后优雅退出
    pub async fn start(&self) -> Result<(), ServerError> {
        let sweeper = self.state.store.spawn_sweeper(
            self.translation_config.sweep_interval(),
            self.translation_config.job_max_age(),
        );
        let heartbeat = self
            .state
            .notifier
            .spawn_heartbeat(self.translation_config.heartbeat_interval());

        let app = create_router(Arc::clone(&self.state), &self.config);
        let address = self.config.listen_address();

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;

        tracing::info!("Web server starting at http://{}", address);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServerError::Serve);

        sweeper.abort();
        heartbeat.abort();
        tracing::info!("Web server stopped");

        served
    }
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let mut app = create_routes()
        .with_state(app_state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http());

    // 添加静态文件服务（如果配置了）
    if let Some(static_dir) = &config.static_dir {
        app = app.nest_service("/static", ServeDir::new(static_dir));
    }

    app
}

fn cors_layer(config: &WebConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("忽略无效的 CORS 源: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听 Ctrl-C 信号: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，正在关闭服务器");
}
