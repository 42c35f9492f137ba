//! Web 服务器主程序入口

use clap::Parser;
use tracing_subscriber::EnvFilter;

use parallel_reader::env::core::{LogLevel, Mode};
use parallel_reader::env::{generate_env_docs, EnvVar};
use parallel_reader::translation::{load_translation_config, ConfigManager};
use parallel_reader::web::{WebConfig, WebServer};

#[derive(Parser, Debug)]
#[command(name = "parallel-reader-web")]
#[command(version)]
#[command(about = "Side-by-side article translation server")]
struct Args {
    /// Bind address (overrides PARALLEL_READER_BIND_ADDRESS)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port number (overrides PARALLEL_READER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory served under /static
    #[arg(long)]
    static_dir: Option<String>,

    /// Translation config file (.toml or .json)
    #[arg(short, long)]
    config: Option<String>,

    /// Write an example translation config to the given path and exit
    #[arg(long, value_name = "PATH")]
    generate_config: Option<String>,

    /// Print the supported environment variables and exit
    #[arg(long)]
    env_docs: bool,
}

/// 未设置 RUST_LOG 时的日志过滤规则，开发模式下输出每个请求的 tower_http 日志
fn default_log_filter(log_level: &str, mode: &str) -> String {
    let http_level = if mode == "development" { "debug" } else { "info" };
    format!("{},tower_http={}", log_level, http_level)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.env_docs {
        println!("{}", generate_env_docs());
        return Ok(());
    }

    if let Some(path) = args.generate_config.as_deref() {
        ConfigManager::generate_example_config(path)?;
        println!("Example config written to {}", path);
        return Ok(());
    }

    let log_level = LogLevel::get_or_default("info".to_string());
    let mode = Mode::get_or_default("production".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(&log_level, &mode))),
        )
        .init();

    let translation_config = match args.config.as_deref() {
        Some(path) => {
            let mut config = ConfigManager::load_from_file(path)?;
            config.apply_env_overrides();
            ConfigManager::from_config(config)?.into_config()
        }
        None => load_translation_config(),
    };

    let mut web_config = WebConfig::default();
    if let Some(bind) = args.bind {
        web_config.bind_addr = bind;
    }
    if let Some(port) = args.port {
        web_config.port = port;
    }
    if args.static_dir.is_some() {
        web_config.static_dir = args.static_dir;
    }

    tracing::info!(
        "翻译服务: {} ({})，目标语言 {}",
        translation_config.api_url,
        translation_config.model,
        translation_config.target_lang
    );

    let server = WebServer::new(web_config, translation_config)?;
    server.start().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_follows_mode() {
        assert_eq!(default_log_filter("info", "production"), "info,tower_http=info");
        assert_eq!(default_log_filter("warn", "staging"), "warn,tower_http=info");
        assert_eq!(
            default_log_filter("info", "development"),
            "info,tower_http=debug"
        );
    }
}
