//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::env::EnvVar;
use crate::translation::error::{helpers::config_error, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 翻译服务
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub target_lang: String,

    // 分片
    pub max_chunk_length: usize,
    pub direct_translation_threshold: usize,
    pub chunk_delay_ms: u64,

    // 生命周期
    pub completed_retention_secs: u64,
    pub job_max_age_secs: u64,
    pub sweep_interval_secs: u64,
    pub heartbeat_interval_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: None,
            model: constants::DEFAULT_MODEL.to_string(),
            temperature: constants::DEFAULT_TEMPERATURE,
            max_tokens: constants::DEFAULT_MAX_TOKENS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),

            max_chunk_length: constants::DEFAULT_MAX_CHUNK_LENGTH,
            direct_translation_threshold: constants::DIRECT_TRANSLATION_THRESHOLD,
            chunk_delay_ms: constants::CHUNK_DELAY.as_millis() as u64,

            completed_retention_secs: constants::COMPLETED_RETENTION.as_secs(),
            job_max_age_secs: constants::JOB_MAX_AGE.as_secs(),
            sweep_interval_secs: constants::SWEEP_INTERVAL.as_secs(),
            heartbeat_interval_secs: constants::HEARTBEAT_INTERVAL.as_secs(),
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.max_chunk_length < constants::MIN_CHUNK_LENGTH {
            return Err(config_error(format!(
                "分片长度不能小于{}",
                constants::MIN_CHUNK_LENGTH
            )));
        }

        if self.direct_translation_threshold == 0 {
            return Err(config_error("直接翻译阈值不能为0"));
        }

        if self.model.trim().is_empty() {
            return Err(config_error("模型名称不能为空"));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(config_error(format!("无效的翻译服务地址: {}", self.api_url)));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(config_error("temperature 必须在 0 到 2 之间"));
        }

        if self.request_timeout_secs == 0
            || self.completed_retention_secs == 0
            || self.job_max_age_secs == 0
            || self.sweep_interval_secs == 0
            || self.heartbeat_interval_secs == 0
        {
            return Err(config_error("时间间隔必须大于0"));
        }

        Ok(())
    }

    /// 应用环境变量覆盖，只处理显式设置的变量
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{jobs, realtime, translator};

        if let Some(api_url) = env_override::<_, translator::ApiUrl>() {
            tracing::info!("环境变量覆盖 API URL: {}", api_url);
            self.api_url = api_url;
        }

        if let Some(api_key) = env_override::<_, translator::ApiKey>() {
            self.api_key = Some(api_key);
        }

        if let Some(model) = env_override::<_, translator::Model>() {
            self.model = model;
        }

        if let Some(timeout) = env_override::<_, translator::RequestTimeout>() {
            self.request_timeout_secs = timeout.as_secs();
        }

        if let Some(target_lang) = env_override::<_, translator::TargetLang>() {
            self.target_lang = target_lang;
        }

        if let Some(max_len) = env_override::<_, jobs::MaxChunkLength>() {
            self.max_chunk_length = max_len;
        }

        if let Some(threshold) = env_override::<_, jobs::DirectThreshold>() {
            self.direct_translation_threshold = threshold;
        }

        if let Some(delay) = env_override::<_, jobs::ChunkDelayMs>() {
            self.chunk_delay_ms = delay.as_millis() as u64;
        }

        if let Some(retention) = env_override::<_, jobs::Retention>() {
            self.completed_retention_secs = retention.as_secs();
        }

        if let Some(max_age) = env_override::<_, jobs::MaxAge>() {
            self.job_max_age_secs = max_age.as_secs();
        }

        if let Some(interval) = env_override::<_, jobs::SweepInterval>() {
            self.sweep_interval_secs = interval.as_secs();
        }

        if let Some(interval) = env_override::<_, realtime::HeartbeatInterval>() {
            self.heartbeat_interval_secs = interval.as_secs();
        }
    }

    /// 转换为Duration类型
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn completed_retention(&self) -> Duration {
        Duration::from_secs(self.completed_retention_secs)
    }

    pub fn job_max_age(&self) -> Duration {
        Duration::from_secs(self.job_max_age_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

/// 仅在变量存在时读取；解析失败记录警告并忽略
fn env_override<T, V: EnvVar<T>>() -> Option<T> {
    std::env::var(V::NAME).ok()?;
    match V::get() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("忽略无效的环境变量: {}", e);
            None
        }
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从现成配置创建（测试和嵌入方使用）
    pub fn from_config(config: TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 从文件加载配置
    fn load_config() -> TranslationResult<TranslationConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        // 查找配置文件
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置
    pub fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("读取配置文件失败: {}", e)))?;

        Self::parse_config(&content, path.ends_with(".toml"))
    }

    fn parse_config(content: &str, is_toml: bool) -> TranslationResult<TranslationConfig> {
        if is_toml {
            toml::from_str(content).map_err(|e| config_error(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(content)
                .map_err(|e| config_error(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env.development", ".env.production", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| config_error(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| config_error(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::error::TranslationError;

    #[test]
    fn test_default_config_is_valid() {
        let config = TranslationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_chunk_length, 10000);
        assert_eq!(config.direct_translation_threshold, 1000);
        assert_eq!(config.chunk_delay(), Duration::from_millis(500));
        assert_eq!(config.completed_retention(), Duration::from_secs(1800));
        assert_eq!(config.job_max_age(), Duration::from_secs(3600));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = TranslationConfig::default();
        config.max_chunk_length = 10;
        assert!(matches!(
            config.validate(),
            Err(TranslationError::ConfigError(_))
        ));

        let mut config = TranslationConfig::default();
        config.api_url = "localhost:1188".to_string();
        assert!(config.validate().is_err());

        let mut config = TranslationConfig::default();
        config.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = TranslationConfig::default();
        config.heartbeat_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ConfigManager::parse_config(
            "model = \"gpt-4o-mini\"\nmax_chunk_length = 4000\n",
            true,
        )
        .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_chunk_length, 4000);
        assert_eq!(config.target_lang, "English");
    }

    #[test]
    fn test_json_config() {
        let config =
            ConfigManager::parse_config(r#"{"target_lang": "German", "chunk_delay_ms": 0}"#, false)
                .unwrap();
        assert_eq!(config.target_lang, "German");
        assert_eq!(config.chunk_delay(), Duration::ZERO);

        assert!(ConfigManager::parse_config("not json", false).is_err());
    }

    #[test]
    fn test_from_config_validates() {
        let mut config = TranslationConfig::default();
        config.model = "  ".to_string();
        assert!(ConfigManager::from_config(config).is_err());
    }
}
