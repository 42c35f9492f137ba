//! 文章抓取
//!
//! 模拟浏览器请求下载页面，按响应声明的字符集解码后交给正文提取。

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect, Client};
use thiserror::Error;
use url::Url;

use crate::parsers::html::extract_article_from_bytes;

/// 抓取超时
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// 最多跟随的重定向次数
pub const MAX_REDIRECTS: usize = 5;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 文章导入错误
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("无效的URL: {0}")]
    InvalidUrl(String),

    #[error("抓取失败: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("目标站点返回状态码 {0}")]
    HttpStatus(u16),

    #[error("页面中没有可提取的正文")]
    NoContent,
}

/// 文章抓取器
#[derive(Clone)]
pub struct ArticleFetcher {
    client: Client,
}

impl ArticleFetcher {
    pub fn new() -> Result<Self, ImportError> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(FETCH_TIMEOUT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }

    /// 下载页面并提取正文
    ///
    /// # 参数
    ///
    /// * `url` - 页面地址，只接受 http 和 https
    ///
    /// # 返回值
    ///
    /// 折叠空白后的正文 HTML
    pub async fn fetch_article(&self, url: &str) -> Result<String, ImportError> {
        let url = validate_url(url)?;
        tracing::info!("开始导入文章: {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(header::REFERER, referer_for(&url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("导入 {} 失败，状态码 {}", url, status);
            return Err(ImportError::HttpStatus(status.as_u16()));
        }

        let charset = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| parse_content_type(value).1)
            .filter(|charset| !charset.is_empty())
            .unwrap_or_else(|| "utf-8".to_string());

        let body = response.bytes().await?;
        let content = extract_article_from_bytes(&body, &charset)?;
        tracing::info!("文章导入完成: {} ({} 字节)", url, content.len());
        Ok(content)
    }
}

/// 校验导入地址
pub fn validate_url(raw: &str) -> Result<Url, ImportError> {
    let url = Url::parse(raw.trim()).map_err(|e| ImportError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ImportError::InvalidUrl(format!("不支持的协议: {}", other))),
    }
}

/// 解析 Content-Type，返回 (媒体类型, 字符集)
pub fn parse_content_type(content_type: &str) -> (String, String) {
    let mut parts = content_type.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_lowercase();

    let charset = parts
        .map(str::trim)
        .find_map(|part| {
            part.get(..8)
                .filter(|key| key.eq_ignore_ascii_case("charset="))
                .map(|_| part[8..].trim_matches('"').to_string())
        })
        .unwrap_or_default();

    (media_type, charset)
}

fn referer_for(url: &Url) -> String {
    format!("{}/", url.origin().ascii_serialization())
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/post/1").is_ok());
        assert!(validate_url("  http://example.com  ").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(ImportError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(ImportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_content_type() {
        assert_eq!(
            parse_content_type("text/html; charset=\"ISO-8859-1\""),
            ("text/html".to_string(), "ISO-8859-1".to_string())
        );
        assert_eq!(
            parse_content_type("Text/HTML;Charset=utf-8"),
            ("text/html".to_string(), "utf-8".to_string())
        );
        assert_eq!(
            parse_content_type("text/html"),
            ("text/html".to_string(), String::new())
        );
    }

    #[test]
    fn test_referer_is_site_origin() {
        let url = Url::parse("https://news.example.com:8443/a/b?c=d").unwrap();
        assert_eq!(referer_for(&url), "https://news.example.com:8443/");
    }
}
