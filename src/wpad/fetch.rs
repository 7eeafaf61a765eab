use std::fmt;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info};

use crate::common::{bounded, DiscoveryError};

/// GET 请求目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTarget {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// 路径，含查询串
    pub path: String,
}

impl HttpTarget {
    pub fn parse(url: &str) -> Result<Self, DiscoveryError> {
        let parsed = Url::parse(url)
            .map_err(|e| DiscoveryError::MalformedUrl(format!("'{}': {}", url, e)))?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DiscoveryError::MalformedUrl(format!("'{}': missing host", url)))?
            .to_string();
        let port = parsed.port_or_known_default().unwrap_or(80);
        let path = match parsed.query() {
            Some(q) => format!("{}?{}", parsed.path(), q),
            None => parsed.path().to_string(),
        };
        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host,
            port,
            path,
        })
    }
}

impl fmt::Display for HttpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP 传输原语；非 200 状态也以 `Ok` 返回，由 fetcher 判断
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, target: &HttpTarget) -> Result<HttpResponse>;
}

/// 基于 reqwest 的 HTTP 传输
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
}

impl ReqwestHttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .user_agent(concat!("wpadscout/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn get(&self, target: &HttpTarget) -> Result<HttpResponse> {
        let response = self.client.get(target.to_string()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// 下载 WPAD 配置文件
pub struct WpadFetcher {
    transport: std::sync::Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl WpadFetcher {
    pub fn new(transport: std::sync::Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub async fn fetch(&self, url: &str) -> Result<String, DiscoveryError> {
        let target = HttpTarget::parse(url)?;
        debug!(target = %target, "fetching WPAD file");

        let response = bounded(self.timeout, "HTTP GET", self.transport.get(&target))
            .await
            .map_err(|e| DiscoveryError::TransportFailure(format!("{}: {}", url, e)))?;

        if response.status != 200 {
            return Err(DiscoveryError::HttpStatusFailure {
                status: response.status,
                url: url.to_string(),
            });
        }

        info!(url = url, bytes = response.body.len(), "WPAD file fetched");
        Ok(response.body)
    }
}
