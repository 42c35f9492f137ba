//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，所有服务配置都经由这里读取

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 应用运行模式
    pub struct Mode;
    impl EnvVar<String> for Mode {
        const NAME: &'static str = "PARALLEL_READER_MODE";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("production".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Application mode: development, staging, production";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "development" | "dev" => Ok("development".to_string()),
                "staging" | "stage" => Ok("staging".to_string()),
                "production" | "prod" => Ok("production".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid mode '{}'. Use: development, staging, production",
                        value
                    ),
                }),
            }
        }
    }

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PARALLEL_READER_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 翻译服务（外部翻译 API）相关环境变量
pub mod translator {
    use super::*;

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "OPENAI_API_KEY";
        const DEFAULT: Option<String> = None; // 无默认值
        const DESCRIPTION: &'static str = "API key for the chat-completions translator";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.len() < 8 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key must be at least 8 characters".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "PARALLEL_READER_TRANSLATOR_URL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("https://api.openai.com/v1/chat/completions".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Chat-completions endpoint used for translation";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 模型名称
    pub struct Model;
    impl EnvVar<String> for Model {
        const NAME: &'static str = "PARALLEL_READER_TRANSLATOR_MODEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("gpt-3.5-turbo".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Model name sent to the translator";

        fn parse(value: &str) -> EnvResult<String> {
            let model = value.trim();
            if model.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Model name cannot be empty".to_string(),
                });
            }
            Ok(model.to_string())
        }
    }

    /// 请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "PARALLEL_READER_TRANSLATOR_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(60));
        const DESCRIPTION: &'static str = "Translator request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 600)
        }
    }

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "PARALLEL_READER_TARGET_LANG";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("English".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Language the articles are translated into";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            if lang.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Target language cannot be empty".to_string(),
                });
            }
            Ok(lang.to_string())
        }
    }
}

/// 翻译任务相关环境变量
pub mod jobs {
    use super::*;

    /// 单个分片最大长度
    pub struct MaxChunkLength;
    impl EnvVar<usize> for MaxChunkLength {
        const NAME: &'static str = "PARALLEL_READER_MAX_CHUNK_LENGTH";
        const DEFAULT: Option<usize> = Some(10000);
        const DESCRIPTION: &'static str = "Maximum characters per translated fragment";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 100, 100000)
        }
    }

    /// 直接翻译阈值
    pub struct DirectThreshold;
    impl EnvVar<usize> for DirectThreshold {
        const NAME: &'static str = "PARALLEL_READER_DIRECT_THRESHOLD";
        const DEFAULT: Option<usize> = Some(1000);
        const DESCRIPTION: &'static str =
            "Inputs shorter than this are translated synchronously without a job";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100000)
        }
    }

    /// 分片之间的间隔
    pub struct ChunkDelayMs;
    impl EnvVar<Duration> for ChunkDelayMs {
        const NAME: &'static str = "PARALLEL_READER_CHUNK_DELAY_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(500));
        const DESCRIPTION: &'static str = "Pause between fragments in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_positive_usize(value, Self::NAME, 0, 60000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }

    /// 完成后保留时间
    pub struct Retention;
    impl EnvVar<Duration> for Retention {
        const NAME: &'static str = "PARALLEL_READER_JOB_RETENTION";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30 * 60));
        const DESCRIPTION: &'static str = "Seconds a completed job stays pollable";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 86400)
        }
    }

    /// 任务最大存活时间
    pub struct MaxAge;
    impl EnvVar<Duration> for MaxAge {
        const NAME: &'static str = "PARALLEL_READER_JOB_MAX_AGE";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(60 * 60));
        const DESCRIPTION: &'static str = "Seconds after creation when any job is swept";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 86400 * 7)
        }
    }

    /// 清理周期
    pub struct SweepInterval;
    impl EnvVar<Duration> for SweepInterval {
        const NAME: &'static str = "PARALLEL_READER_SWEEP_INTERVAL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(15 * 60));
        const DESCRIPTION: &'static str = "Seconds between expiry sweeps";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 86400)
        }
    }
}

/// 推送通道相关环境变量
pub mod realtime {
    use super::*;

    /// 心跳周期
    pub struct HeartbeatInterval;
    impl EnvVar<Duration> for HeartbeatInterval {
        const NAME: &'static str = "PARALLEL_READER_HEARTBEAT_INTERVAL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Seconds between WebSocket liveness pings";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 3600)
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "PARALLEL_READER_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Web server bind address";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "PARALLEL_READER_PORT";
        const DEFAULT: Option<u16> = Some(5000);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }

    /// 静态文件目录
    pub struct StaticDir;
    impl EnvVar<String> for StaticDir {
        const NAME: &'static str = "PARALLEL_READER_STATIC_DIR";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(String::new()),
            }
        }
        const DESCRIPTION: &'static str = "Static files directory (empty disables)";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }

    /// CORS允许的源
    pub struct CorsOrigins;
    impl EnvVar<Vec<String>> for CorsOrigins {
        const NAME: &'static str = "PARALLEL_READER_CORS_ORIGINS";
        const DEFAULT: Option<Vec<String>> = None;

        fn get() -> EnvResult<Vec<String>> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]),
            }
        }
        const DESCRIPTION: &'static str = "CORS allowed origins (comma-separated, * for any)";

        fn parse(value: &str) -> EnvResult<Vec<String>> {
            Ok(value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect())
        }
    }
}

/// 辅助函数
fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_seconds(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let seconds = parse_positive_usize(value, var_name, min as usize, max as usize)?;
    Ok(Duration::from_secs(seconds as u64))
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    fn line<T: fmt::Debug>(name: &str, description: &str, default: Option<T>) -> String {
        format!("- `{}`: {} (default: {:?})\n", name, description, default)
    }

    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&line(core::Mode::NAME, core::Mode::DESCRIPTION, Some("production")));
    docs.push_str(&line(core::LogLevel::NAME, core::LogLevel::DESCRIPTION, Some("info")));

    docs.push_str("\n## Translator Configuration\n\n");
    docs.push_str(&line(
        translator::ApiKey::NAME,
        translator::ApiKey::DESCRIPTION,
        translator::ApiKey::DEFAULT,
    ));
    docs.push_str(&line(
        translator::ApiUrl::NAME,
        translator::ApiUrl::DESCRIPTION,
        Some("https://api.openai.com/v1/chat/completions"),
    ));
    docs.push_str(&line(
        translator::Model::NAME,
        translator::Model::DESCRIPTION,
        Some("gpt-3.5-turbo"),
    ));
    docs.push_str(&line(
        translator::RequestTimeout::NAME,
        translator::RequestTimeout::DESCRIPTION,
        translator::RequestTimeout::DEFAULT,
    ));
    docs.push_str(&line(
        translator::TargetLang::NAME,
        translator::TargetLang::DESCRIPTION,
        Some("English"),
    ));

    docs.push_str("\n## Job Configuration\n\n");
    docs.push_str(&line(
        jobs::MaxChunkLength::NAME,
        jobs::MaxChunkLength::DESCRIPTION,
        jobs::MaxChunkLength::DEFAULT,
    ));
    docs.push_str(&line(
        jobs::DirectThreshold::NAME,
        jobs::DirectThreshold::DESCRIPTION,
        jobs::DirectThreshold::DEFAULT,
    ));
    docs.push_str(&line(
        jobs::ChunkDelayMs::NAME,
        jobs::ChunkDelayMs::DESCRIPTION,
        jobs::ChunkDelayMs::DEFAULT,
    ));
    docs.push_str(&line(jobs::Retention::NAME, jobs::Retention::DESCRIPTION, jobs::Retention::DEFAULT));
    docs.push_str(&line(jobs::MaxAge::NAME, jobs::MaxAge::DESCRIPTION, jobs::MaxAge::DEFAULT));
    docs.push_str(&line(
        jobs::SweepInterval::NAME,
        jobs::SweepInterval::DESCRIPTION,
        jobs::SweepInterval::DEFAULT,
    ));

    docs.push_str("\n## Push Channel Configuration\n\n");
    docs.push_str(&line(
        realtime::HeartbeatInterval::NAME,
        realtime::HeartbeatInterval::DESCRIPTION,
        realtime::HeartbeatInterval::DEFAULT,
    ));

    docs.push_str("\n## Web Server Configuration\n\n");
    docs.push_str(&line(web::BindAddress::NAME, web::BindAddress::DESCRIPTION, Some("127.0.0.1")));
    docs.push_str(&line(web::Port::NAME, web::Port::DESCRIPTION, web::Port::DEFAULT));
    docs.push_str(&line(web::StaticDir::NAME, web::StaticDir::DESCRIPTION, Some("")));
    docs.push_str(&line(
        web::CorsOrigins::NAME,
        web::CorsOrigins::DESCRIPTION,
        Some("http://localhost:3000,http://127.0.0.1:3000"),
    ));

    docs
}
