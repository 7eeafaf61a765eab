pub mod resolver;
pub mod search;

use std::net::IpAddr;
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::Result;
use async_trait::async_trait;
use hickory_resolver::proto::rr::Name;

pub use resolver::HickoryDnsTransport;
pub use search::{DnsCandidate, DnsWpadSearch, TriedNames};

/// DNS 传输原语，名字以不带末尾点的小写字符串传递
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// 查询 A/AAAA 记录，返回全部答案
    async fn lookup_addresses(&self, name: &str) -> Result<Vec<IpAddr>>;

    /// 查询 PTR 记录，`name` 为反向区域下的名字
    async fn lookup_ptr(&self, name: &str) -> Result<Vec<String>>;
}

fn reverse_zones() -> &'static [Name; 2] {
    static ZONES: OnceLock<[Name; 2]> = OnceLock::new();
    ZONES.get_or_init(|| {
        [
            Name::from_str("in-addr.arpa.").expect("static zone name"),
            Name::from_str("ip6.arpa.").expect("static zone name"),
        ]
    })
}

/// 地址对应的反向查询名，如 `10.1.168.192.in-addr.arpa.`
pub fn reverse_name(addr: IpAddr) -> Name {
    Name::from(addr)
}

/// 名字是否位于反向解析区域内
pub fn is_reverse_zone(name: &Name) -> bool {
    reverse_zones().iter().any(|zone| zone.zone_of(name))
}

/// 解析并小写；空名、根名或非法名返回 `None`
pub fn parse_name(name: &str) -> Option<Name> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let parsed = Name::from_str(name).ok()?;
    if parsed.is_root() {
        return None;
    }
    Some(parsed.to_lowercase())
}

/// 交给传输层的查询字符串
pub fn query_string(name: &Name) -> String {
    name.to_lowercase()
        .to_ascii()
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn reverse_name_v4() {
        let rev = reverse_name("192.168.1.10".parse().unwrap());
        assert_eq!(query_string(&rev), "10.1.168.192.in-addr.arpa");
        assert!(is_reverse_zone(&rev));
    }

    #[test]
    fn reverse_name_v6() {
        let rev = query_string(&reverse_name("2001:db8::1".parse().unwrap()));
        assert!(rev.starts_with("1.0.0.0.0.0.0.0"));
        assert!(rev.ends_with(".8.b.d.0.1.0.0.2.ip6.arpa"));
        // 32 个半字节 + ip6.arpa
        assert_eq!(rev.split('.').count(), 34);
    }

    #[test]
    fn reverse_zone_detection() {
        assert!(is_reverse_zone(&name("10.1.168.192.in-addr.arpa.")));
        assert!(is_reverse_zone(&name("1.0.IP6.ARPA")));
        assert!(!is_reverse_zone(&name("host.corp.example.com.")));
        assert!(!is_reverse_zone(&name("notin-addr.arpa.example")));
    }

    #[test]
    fn parse_name_lowercases_and_rejects_root() {
        let parsed = parse_name(" Host.Example.COM. ").unwrap();
        assert_eq!(query_string(&parsed), "host.example.com");
        assert!(parse_name("").is_none());
        assert!(parse_name(".").is_none());
    }
}
