//! 发现流程编排
//!
//! DHCP 优先（需要特权），DNS 兜底；每种策略每次运行最多执行一次。
//! 任一策略找到 URL 后立即下载，下载失败即本次运行失败，不再尝试其它策略。

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::common::DiscoveryError;
use crate::config::{DiscoveryConfig, TimeoutConfig};
use crate::dhcp::{extract_wpad, DhcpTransport, DhcpWpadProbe};
use crate::dns::{DnsCandidate, DnsTransport, DnsWpadSearch, TriedNames};
use crate::iface::{select_named, HostSnapshot};
use crate::wpad::{self, HttpTransport, ProxyEntry, WpadFetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Dhcp,
    Dns,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Dhcp => write!(f, "DHCP"),
            Source::Dns => write!(f, "DNS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Proxies(Vec<ProxyEntry>),
    Raw(String),
}

/// 一次成功发现的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryResult {
    pub source: Source,
    pub url: String,
    /// DNS 发现时命中的主机
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<DnsCandidate>,
    pub payload: Payload,
}

pub struct WpadDiscovery {
    options: DiscoveryConfig,
    dhcp: DhcpWpadProbe,
    dns: DnsWpadSearch,
    fetcher: WpadFetcher,
}

impl WpadDiscovery {
    pub fn new(
        options: DiscoveryConfig,
        timeouts: &TimeoutConfig,
        dhcp: Arc<dyn DhcpTransport>,
        dns: Arc<dyn DnsTransport>,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            options,
            dhcp: DhcpWpadProbe::new(dhcp, timeouts.dhcp()),
            dns: DnsWpadSearch::new(dns, timeouts.dns()),
            fetcher: WpadFetcher::new(http, timeouts.http()),
        }
    }

    pub async fn run(&self, host: &HostSnapshot) -> Result<DiscoveryResult, DiscoveryError> {
        let opts = &self.options;
        if opts.skip_dns && opts.skip_dhcp {
            return Err(DiscoveryError::ConfigConflict(
                "both discovery methods disabled".to_string(),
            ));
        }

        let interfaces = select_named(&host.interfaces, opts.interface.as_deref());
        info!(
            eligible = interfaces.len(),
            total = host.interfaces.len(),
            privileged = host.privileged,
            "starting WPAD discovery"
        );

        let mut dhcp_attempted = false;
        if !opts.skip_dhcp {
            if host.privileged {
                dhcp_attempted = true;
                match self.dhcp.probe(&interfaces).await {
                    Some(response) => match extract_wpad(&response) {
                        Some(url) => {
                            info!(
                                interface = response.interface.as_str(),
                                url = url.as_str(),
                                "WPAD URL from DHCP"
                            );
                            return self.fetch(Source::Dhcp, url, None).await;
                        }
                        None => info!(
                            interface = response.interface.as_str(),
                            "DHCP response carries no WPAD option"
                        ),
                    },
                    None => info!("no DHCP response on any interface"),
                }
            } else {
                debug!("not privileged, DHCP discovery skipped");
            }
        }

        if opts.skip_dns {
            let reason = if dhcp_attempted {
                "WPAD not found via DHCP"
            } else {
                "no discovery method available: DHCP needs privileges and DNS is disabled"
            };
            return Err(DiscoveryError::NotFound(reason.to_string()));
        }

        // 每次运行一份，运行结束即丢弃
        let mut tried = TriedNames::new();
        let candidate = match opts.domain.as_deref() {
            Some(domain) => self.dns.reduce_search(domain, &mut tried).await,
            None => self.dns.reverse_search(&interfaces, &mut tried).await,
        };
        debug!(queried = tried.len(), "DNS search finished");

        match candidate {
            Some(candidate) => {
                let url = wpad::url_for_host(&candidate.name, &opts.wpad_file);
                self.fetch(Source::Dns, url, Some(candidate)).await
            }
            None => {
                let via = if dhcp_attempted { "DNS/DHCP" } else { "DNS" };
                Err(DiscoveryError::NotFound(format!("WPAD not found via {}", via)))
            }
        }
    }

    async fn fetch(
        &self,
        source: Source,
        url: String,
        candidate: Option<DnsCandidate>,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let body = self.fetcher.fetch(&url).await?;
        let payload = if self.options.raw {
            Payload::Raw(body)
        } else {
            let proxies = wpad::parse(&body);
            info!(source = %source, count = proxies.len(), "proxies extracted");
            Payload::Proxies(proxies)
        };
        Ok(DiscoveryResult {
            source,
            url,
            candidate,
            payload,
        })
    }
}
