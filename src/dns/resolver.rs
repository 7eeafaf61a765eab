use std::net::IpAddr;

use anyhow::Result;
use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, info};

use super::DnsTransport;

/// 基于 hickory-resolver 的 DNS 传输
pub struct HickoryDnsTransport {
    resolver: TokioAsyncResolver,
}

impl HickoryDnsTransport {
    /// 使用系统配置（/etc/resolv.conf 或平台等价物）
    pub fn from_system() -> Result<Self> {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()?;
        opts.use_hosts_file = false;
        info!("Hickory DNS transport created from system configuration");
        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        })
    }

    /// 使用指定的 UDP 上游，格式 "ip" 或 "ip:port"
    pub fn new(address: &str) -> Result<Self> {
        let (ip, port) = parse_ip_port(address, 53)?;
        let group = NameServerConfigGroup::from_ips_clear(&[ip], port, true);
        let config = ResolverConfig::from_parts(None, vec![], group);
        let mut opts = ResolverOpts::default();
        opts.use_hosts_file = false;
        info!(address = address, "Hickory DNS transport created");
        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        })
    }

    /// 有上游地址时用它，否则读系统配置
    pub fn build(nameserver: Option<&str>) -> Result<Self> {
        match nameserver {
            Some(address) => Self::new(address),
            None => Self::from_system(),
        }
    }
}

#[async_trait]
impl DnsTransport for HickoryDnsTransport {
    async fn lookup_addresses(&self, name: &str) -> Result<Vec<IpAddr>> {
        // 末尾加点，避免 search 列表把名字再拼接一次
        let fqdn = format!("{}.", name.trim_end_matches('.'));
        let response = self.resolver.lookup_ip(fqdn.as_str()).await?;
        let addrs: Vec<IpAddr> = response.iter().collect();
        debug!(name = name, count = addrs.len(), "hickory address lookup");
        Ok(addrs)
    }

    async fn lookup_ptr(&self, name: &str) -> Result<Vec<String>> {
        let fqdn = format!("{}.", name.trim_end_matches('.'));
        let lookup = self.resolver.lookup(fqdn.as_str(), RecordType::PTR).await?;
        let names: Vec<String> = lookup
            .iter()
            .filter_map(|rdata| match rdata {
                RData::PTR(ptr) => Some(ptr.0.to_utf8()),
                _ => None,
            })
            .collect();
        debug!(name = name, count = names.len(), "hickory PTR lookup");
        Ok(names)
    }
}

/// 解析 "ip" 或 "ip:port" 或 "[ipv6]" 或 "[ipv6]:port" 格式
fn parse_ip_port(s: &str, default_port: u16) -> Result<(IpAddr, u16)> {
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Ok((ip, default_port));
    }
    if let Ok(addr) = s.parse::<std::net::SocketAddr>() {
        return Ok((addr.ip(), addr.port()));
    }
    let stripped = s.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = stripped.parse::<IpAddr>() {
        return Ok((ip, default_port));
    }
    anyhow::bail!("invalid DNS address: {}", s)
}
