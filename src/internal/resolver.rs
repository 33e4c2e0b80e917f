//! 下载地址解析：在真正下载前把用户给出的地址换成最终地址。

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// 地址中携带 base64 目标地址的查询参数名。
pub const EMBEDDED_URL_PARAM: &str = "url";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("URL 无效: {0}")]
    InvalidUrl(String),

    #[error("内嵌地址解码失败: {0}")]
    Decode(String),

    #[error("解析请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("解析超时（{0:?}）")]
    Timeout(std::time::Duration),
}

/// 地址解析能力。
///
/// 引擎在下载前调用；失败或超时时记录错误日志并回退到原始地址，不影响下载继续。
#[async_trait]
pub trait UrlResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<String, ResolveError>;
}

/// 原样返回输入地址。
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

#[async_trait]
impl UrlResolver for PassthroughResolver {
    async fn resolve(&self, url: &str) -> Result<String, ResolveError> {
        Ok(url.to_string())
    }
}

/// 跟随跳转的解析器：
/// 1. 地址带 `url=<base64>` 参数时先解出内嵌的目标地址；
/// 2. 对目标地址发 GET（reqwest 自动跟随重定向，不读取响应体），返回最终响应的地址。
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    client: Client,
}

impl RedirectResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 取出 `url=` 参数中 base64 编码的目标地址；没有该参数时返回 `None`。
    pub fn decode_embedded_url(url: &str) -> Result<Option<String>, ResolveError> {
        let parsed = Url::parse(url).map_err(|e| ResolveError::InvalidUrl(format!("{url}: {e}")))?;
        let Some((_, encoded)) = parsed
            .query_pairs()
            .find(|(k, _)| k == EMBEDDED_URL_PARAM)
        else {
            return Ok(None);
        };

        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .or_else(|_| URL_SAFE.decode(encoded.as_bytes()))
            .map_err(|e| ResolveError::Decode(e.to_string()))?;
        let decoded = String::from_utf8(bytes).map_err(|e| ResolveError::Decode(e.to_string()))?;
        Url::parse(&decoded).map_err(|e| ResolveError::Decode(format!("{decoded}: {e}")))?;
        Ok(Some(decoded))
    }
}

#[async_trait]
impl UrlResolver for RedirectResolver {
    async fn resolve(&self, url: &str) -> Result<String, ResolveError> {
        let target = Self::decode_embedded_url(url)?.unwrap_or_else(|| url.to_string());
        let resp = self.client.get(&target).send().await?;
        Ok(resp.url().to_string())
    }
}
