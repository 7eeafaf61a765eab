//! DNS 域名缩减搜索
//!
//! 从给定域名开始依次查询 `wpad.<suffix>`，每轮去掉最左侧一个标签，
//! 直到某个名字有地址记录或标签耗尽。公共后缀（如 `co.uk`）不做特殊处理，
//! `wpad.co.uk`、`wpad.uk` 同样会被查询。
//!
//! 同一次运行中查过的名字记录在 [`TriedNames`] 里，命中即停止，
//! 多个接口反查出相同父域时不会重复发包。

use std::collections::{BTreeSet, HashSet};
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::proto::rr::Name;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{is_reverse_zone, parse_name, query_string, reverse_name, DnsTransport};
use crate::common::bounded;
use crate::iface::Interface;

/// 查询成功的候选主机
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsCandidate {
    pub name: String,
    pub address: IpAddr,
}

/// 本次运行已查询过的 `wpad.<suffix>` 名字
#[derive(Debug, Default)]
pub struct TriedNames {
    names: HashSet<String>,
}

impl TriedNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次记录返回 true，已存在返回 false
    pub fn mark(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// 去掉最左侧标签；没有剩余标签时返回 `None`
pub fn parent_domain(name: &Name) -> Option<Name> {
    if name.num_labels() > 1 {
        Some(name.base_name())
    } else {
        None
    }
}

/// `wpad.<suffix>`，超长时返回 `None`
fn wpad_name(suffix: &Name) -> Option<Name> {
    Name::from_str("wpad").ok()?.append_domain(suffix).ok()
}

pub struct DnsWpadSearch {
    transport: Arc<dyn DnsTransport>,
    timeout: Duration,
}

impl DnsWpadSearch {
    pub fn new(transport: Arc<dyn DnsTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// 对单个域名做缩减搜索
    pub async fn reduce_search(&self, domain: &str, tried: &mut TriedNames) -> Option<DnsCandidate> {
        let domain = parse_name(domain)?;
        self.reduce_from(domain, tried).await
    }

    async fn reduce_from(&self, domain: Name, tried: &mut TriedNames) -> Option<DnsCandidate> {
        let mut suffix = domain;
        loop {
            let name = query_string(&wpad_name(&suffix)?);
            if !tried.mark(&name) {
                debug!(name = name.as_str(), "DNS: already tried, stopping reduction");
                return None;
            }

            match bounded(
                self.timeout,
                "DNS address query",
                self.transport.lookup_addresses(&name),
            )
            .await
            {
                Ok(addrs) => {
                    if let Some(&address) = addrs.first() {
                        info!(name = name.as_str(), address = %address, "DNS: WPAD host found");
                        return Some(DnsCandidate { name, address });
                    }
                    debug!(name = name.as_str(), "DNS: empty answer");
                }
                Err(e) => {
                    debug!(name = name.as_str(), error = %e, "DNS: query failed");
                }
            }

            suffix = parent_domain(&suffix)?;
        }
    }

    /// 通过接口地址的反向解析推导候选域名，再逐个缩减搜索
    ///
    /// 推导出的域名只在单个接口内去重；跨接口的重复由 `tried` 拦截，
    /// 同一个 `wpad.<suffix>` 整次运行最多查询一次。
    pub async fn reverse_search(
        &self,
        interfaces: &[Interface],
        tried: &mut TriedNames,
    ) -> Option<DnsCandidate> {
        for iface in interfaces {
            let Some(addr) = iface.address else {
                debug!(interface = iface.name.as_str(), "DNS: no address, skipped");
                continue;
            };

            let domains = self.derive_domains(addr).await;
            let names: Vec<String> = domains.iter().map(query_string).collect();
            debug!(
                interface = iface.name.as_str(),
                domains = ?names,
                "DNS: derived search domains"
            );

            for domain in domains {
                if let Some(candidate) = self.reduce_from(domain, tried).await {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// 反查地址得到主机名，去掉主机标签后去重
    async fn derive_domains(&self, addr: IpAddr) -> BTreeSet<Name> {
        let ptr_name = query_string(&reverse_name(addr));
        let answers = match bounded(
            self.timeout,
            "DNS PTR query",
            self.transport.lookup_ptr(&ptr_name),
        )
        .await
        {
            Ok(answers) => answers,
            Err(e) => {
                warn!(name = ptr_name.as_str(), error = %e, "DNS: reverse lookup failed");
                return BTreeSet::new();
            }
        };

        answers
            .iter()
            .filter_map(|answer| parse_name(answer))
            .filter(|host| !is_reverse_zone(host))
            .filter_map(|host| parent_domain(&host))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iface::{LinkType, OperState};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockDns {
        hosts: HashMap<String, IpAddr>,
        ptrs: HashMap<String, Vec<String>>,
        hang: HashSet<String>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DnsTransport for MockDns {
        async fn lookup_addresses(&self, name: &str) -> Result<Vec<IpAddr>> {
            self.queries.lock().unwrap().push(name.to_string());
            if self.hang.contains(name) {
                std::future::pending::<()>().await;
            }
            match self.hosts.get(name) {
                Some(addr) => Ok(vec![*addr]),
                None => anyhow::bail!("NXDOMAIN: {}", name),
            }
        }

        async fn lookup_ptr(&self, name: &str) -> Result<Vec<String>> {
            if self.hang.contains(name) {
                std::future::pending::<()>().await;
            }
            Ok(self.ptrs.get(name).cloned().unwrap_or_default())
        }
    }

    fn search(mock: Arc<MockDns>) -> DnsWpadSearch {
        DnsWpadSearch::new(mock, Duration::from_millis(100))
    }

    fn iface(name: &str, addr: &str) -> Interface {
        Interface {
            name: name.to_string(),
            link_type: LinkType::Ethernet,
            state: OperState::Up,
            mac: None,
            address: Some(addr.parse().unwrap()),
        }
    }

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn parent_domain_strips_one_label() {
        let parent = parent_domain(&name("a.example.com")).unwrap();
        assert_eq!(query_string(&parent), "example.com");
        assert!(parent_domain(&name("com")).is_none());
        assert!(parent_domain(&name("com.")).is_none());
    }

    #[tokio::test]
    async fn reduction_walks_every_suffix() {
        let mock = Arc::new(MockDns::default());
        let mut tried = TriedNames::new();
        let found = search(mock.clone())
            .reduce_search("a.b.c.example.com", &mut tried)
            .await;
        assert!(found.is_none());
        assert_eq!(
            *mock.queries.lock().unwrap(),
            vec![
                "wpad.a.b.c.example.com",
                "wpad.b.c.example.com",
                "wpad.c.example.com",
                "wpad.example.com",
                "wpad.com",
            ]
        );
    }

    #[tokio::test]
    async fn reduction_stops_at_first_answer() {
        let mut mock = MockDns::default();
        mock.hosts
            .insert("wpad.example.com".into(), "10.0.0.8".parse().unwrap());
        let mock = Arc::new(mock);
        let mut tried = TriedNames::new();
        let found = search(mock.clone())
            .reduce_search("Corp.Example.com.", &mut tried)
            .await
            .unwrap();
        assert_eq!(found.name, "wpad.example.com");
        assert_eq!(found.address, "10.0.0.8".parse::<IpAddr>().unwrap());
        assert_eq!(
            *mock.queries.lock().unwrap(),
            vec!["wpad.corp.example.com", "wpad.example.com"]
        );
    }

    #[tokio::test]
    async fn tried_cache_prevents_requery() {
        let mock = Arc::new(MockDns::default());
        let s = search(mock.clone());
        let mut tried = TriedNames::new();
        assert!(s.reduce_search("a.example.com", &mut tried).await.is_none());
        assert!(s.reduce_search("b.example.com", &mut tried).await.is_none());
        let queries = mock.queries.lock().unwrap().clone();
        assert_eq!(
            queries,
            vec![
                "wpad.a.example.com",
                "wpad.example.com",
                "wpad.com",
                "wpad.b.example.com",
            ]
        );
        assert_eq!(tried.len(), 4);
    }

    #[tokio::test]
    async fn empty_domain_queries_nothing() {
        let mock = Arc::new(MockDns::default());
        let mut tried = TriedNames::new();
        assert!(search(mock.clone()).reduce_search(".", &mut tried).await.is_none());
        assert!(mock.queries.lock().unwrap().is_empty());
        assert!(tried.is_empty());
    }

    #[tokio::test]
    async fn reverse_search_no_interfaces() {
        let mock = Arc::new(MockDns::default());
        let mut tried = TriedNames::new();
        assert!(search(mock).reverse_search(&[], &mut tried).await.is_none());
    }

    #[tokio::test]
    async fn reverse_search_derives_and_dedups() {
        let mut mock = MockDns::default();
        mock.ptrs.insert(
            "10.1.168.192.in-addr.arpa".into(),
            vec![
                "host1.a.example.com.".into(),
                "alias.a.example.com.".into(),
                "10.1.168.192.in-addr.arpa.".into(),
            ],
        );
        mock.ptrs.insert(
            "11.1.168.192.in-addr.arpa".into(),
            vec!["host2.b.example.com.".into()],
        );
        mock.hosts
            .insert("wpad.b.example.com".into(), "10.0.0.9".parse().unwrap());
        let mock = Arc::new(mock);

        let ifaces = vec![iface("eth0", "192.168.1.10"), iface("eth1", "192.168.1.11")];
        let mut tried = TriedNames::new();
        let found = search(mock.clone())
            .reverse_search(&ifaces, &mut tried)
            .await
            .unwrap();
        assert_eq!(found.name, "wpad.b.example.com");

        let queries = mock.queries.lock().unwrap().clone();
        assert_eq!(
            queries,
            vec![
                "wpad.a.example.com",
                "wpad.example.com",
                "wpad.com",
                "wpad.b.example.com",
            ]
        );
        assert_eq!(
            queries.iter().filter(|q| *q == "wpad.example.com").count(),
            1
        );
    }

    #[tokio::test]
    async fn hung_address_query_moves_to_parent() {
        let mut mock = MockDns::default();
        mock.hang.insert("wpad.a.example.com".into());
        mock.hosts
            .insert("wpad.example.com".into(), "10.0.0.7".parse().unwrap());
        let mock = Arc::new(mock);
        let mut tried = TriedNames::new();

        let found = DnsWpadSearch::new(mock.clone(), Duration::from_millis(20))
            .reduce_search("a.example.com", &mut tried)
            .await
            .unwrap();
        assert_eq!(found.name, "wpad.example.com");
        assert_eq!(
            *mock.queries.lock().unwrap(),
            vec!["wpad.a.example.com", "wpad.example.com"]
        );
    }

    #[tokio::test]
    async fn hung_ptr_query_skips_interface() {
        let mut mock = MockDns::default();
        mock.hang.insert("10.1.168.192.in-addr.arpa".into());
        mock.ptrs.insert(
            "11.1.168.192.in-addr.arpa".into(),
            vec!["host2.b.example.com.".into()],
        );
        mock.hosts
            .insert("wpad.b.example.com".into(), "10.0.0.9".parse().unwrap());
        let mock = Arc::new(mock);

        let ifaces = vec![iface("eth0", "192.168.1.10"), iface("eth1", "192.168.1.11")];
        let mut tried = TriedNames::new();
        let found = DnsWpadSearch::new(mock.clone(), Duration::from_millis(20))
            .reverse_search(&ifaces, &mut tried)
            .await
            .unwrap();
        assert_eq!(found.name, "wpad.b.example.com");
        assert_eq!(*mock.queries.lock().unwrap(), vec!["wpad.b.example.com"]);
    }
}
