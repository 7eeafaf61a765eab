pub mod discovery;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::common::DiscoveryError;
use crate::config::Config;
use crate::dhcp::SocketDhcpTransport;
use crate::dns::HickoryDnsTransport;
use crate::iface::system;
use crate::wpad::ReqwestHttpTransport;

pub use discovery::{DiscoveryResult, Payload, Source, WpadDiscovery};

/// 用系统默认协作者（netdev / UDP 广播 / hickory / reqwest）组装的发现器
pub struct App {
    discovery: WpadDiscovery,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let dns = HickoryDnsTransport::build(config.dns.nameserver.as_deref())?;
        let http = ReqwestHttpTransport::new()?;
        let discovery = WpadDiscovery::new(
            config.discovery.clone(),
            &config.timeouts,
            Arc::new(SocketDhcpTransport::new()),
            Arc::new(dns),
            Arc::new(http),
        );
        Ok(Self { discovery })
    }

    pub async fn run(&self) -> Result<DiscoveryResult, DiscoveryError> {
        let host = system::snapshot();
        let result = self.discovery.run(&host).await;
        if let Ok(found) = &result {
            info!(source = %found.source, url = found.url.as_str(), "WPAD discovery succeeded");
        }
        result
    }
}
