//! Web 服务器配置
//!
//! 使用类型安全的环境变量系统进行配置管理

use crate::env::{EnvError, EnvResult, EnvVar};

/// Web 服务器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    /// 静态文件目录
    pub static_dir: Option<String>,
    /// 允许跨域的源，包含 `*` 时允许任意源
    pub cors_origins: Vec<String>,
}

impl WebConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        use crate::env::web;

        let static_dir = web::StaticDir::get()?;
        let static_dir = if static_dir.is_empty() {
            None
        } else {
            Some(static_dir)
        };

        Ok(Self {
            bind_addr: web::BindAddress::get()?,
            port: web::Port::get()?,
            static_dir,
            cors_origins: web::CorsOrigins::get()?,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.bind_addr.is_empty() {
            return Err(EnvError {
                variable: "PARALLEL_READER_BIND_ADDRESS".to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: "PARALLEL_READER_PORT".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if let Some(ref static_dir) = self.static_dir {
            if !std::path::Path::new(static_dir).exists() {
                tracing::warn!("Static directory '{}' does not exist", static_dir);
            }
        }

        Ok(())
    }

    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// 是否允许任意源
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load web config from environment: {}. Using defaults.", e);
            Self {
                bind_addr: "127.0.0.1".to_string(),
                port: 5000,
                static_dir: None,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ],
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WebConfig {
        WebConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: None,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }

    #[test]
    fn test_listen_address() {
        assert_eq!(config().listen_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = config();
        assert!(config.validate().is_ok());
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wildcard_origin() {
        let mut config = config();
        assert!(!config.allows_any_origin());
        config.cors_origins.push("*".to_string());
        assert!(config.allows_any_origin());
    }
}
