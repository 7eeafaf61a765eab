use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::common::DiscoveryError;
use crate::wpad::DEFAULT_WPAD_FILE;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub dns: DnsConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.discovery.skip_dns && self.discovery.skip_dhcp {
            return Err(DiscoveryError::ConfigConflict(
                "both discovery methods disabled".to_string(),
            )
            .into());
        }
        if self.timeouts.dhcp_ms == 0 || self.timeouts.dns_ms == 0 || self.timeouts.http_ms == 0 {
            anyhow::bail!("timeouts must be greater than zero");
        }
        if let Some(domain) = &self.discovery.domain {
            if domain.trim().trim_matches('.').is_empty() {
                anyhow::bail!("discovery domain must not be empty");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 发现策略开关
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// 显式搜索域；为空时通过接口地址反查
    pub domain: Option<String>,

    #[serde(rename = "skip-dns")]
    pub skip_dns: bool,

    #[serde(rename = "skip-dhcp")]
    pub skip_dhcp: bool,

    /// 返回原始配置文本而不是代理列表
    pub raw: bool,

    /// 只在该接口上探测
    pub interface: Option<String>,

    /// DNS 发现时请求的文件名
    #[serde(rename = "wpad-file")]
    pub wpad_file: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            domain: None,
            skip_dns: false,
            skip_dhcp: false,
            raw: false,
            interface: None,
            wpad_file: DEFAULT_WPAD_FILE.to_string(),
        }
    }
}

/// 各阶段等待上限（毫秒）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    #[serde(rename = "dhcp")]
    pub dhcp_ms: u64,
    #[serde(rename = "dns")]
    pub dns_ms: u64,
    #[serde(rename = "http")]
    pub http_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            dhcp_ms: 3000,
            dns_ms: 2000,
            http_ms: 5000,
        }
    }
}

impl TimeoutConfig {
    pub fn dhcp(&self) -> Duration {
        Duration::from_millis(self.dhcp_ms)
    }

    pub fn dns(&self) -> Duration {
        Duration::from_millis(self.dns_ms)
    }

    pub fn http(&self) -> Duration {
        Duration::from_millis(self.http_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    /// 上游 DNS，"ip" 或 "ip:port"；为空时使用系统配置
    pub nameserver: Option<String>,
}
