//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 翻译服务默认设置
    pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;
    pub const DEFAULT_MAX_TOKENS: u32 = 4000;
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_TARGET_LANG: &str = "English";

    // 分片相关
    pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 10000;
    pub const MIN_CHUNK_LENGTH: usize = 100;
    pub const DIRECT_TRANSLATION_THRESHOLD: usize = 1000;
    pub const CHUNK_DELAY: Duration = Duration::from_millis(500);

    // 安全切分点的回看窗口
    pub const STRUCTURAL_SEARCH_WINDOW: usize = 100;
    pub const WHITESPACE_SEARCH_WINDOW: usize = 50;

    // 任务生命周期
    pub const COMPLETED_RETENTION: Duration = Duration::from_secs(30 * 60);
    pub const JOB_MAX_AGE: Duration = Duration::from_secs(60 * 60);
    pub const SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

    // 推送通道心跳
    pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
    pub const CLIENT_QUEUE_CAPACITY: usize = 64;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "parallel-reader.toml",
        "config.toml",
        ".parallel-reader.toml",
        "~/.config/parallel-reader/config.toml",
        "/etc/parallel-reader/config.toml",
    ];
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 加载配置，失败时回退到默认配置
pub fn load_translation_config() -> TranslationConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.into_config(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            TranslationConfig::default()
        }
    }
}
