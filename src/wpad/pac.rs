//! PAC 文本中 `PROXY host:port` 指令的提取
//!
//! 不执行 JavaScript，只做文本扫描；格式不符合预期时返回空列表。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// PAC 中声明的一个代理端点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyEntry {
    pub host: String,
    pub port: Option<u16>,
}

impl ProxyEntry {
    /// 按最后一个冒号拆分 host 与端口；端口不是数字时整体视为 host
    pub fn from_token(token: &str) -> Self {
        if let Some((host, port)) = token.rsplit_once(':') {
            if let Ok(port) = port.parse::<u16>() {
                if !host.is_empty() {
                    return Self {
                        host: host.to_string(),
                        port: Some(port),
                    };
                }
            }
        }
        Self {
            host: token.to_string(),
            port: None,
        }
    }
}

impl fmt::Display for ProxyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

fn proxy_directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"PROXY\s+([^"';\s]+)"#).expect("static regex"))
}

/// 按出现顺序提取所有 PROXY 条目，不去重
pub fn parse(body: &str) -> Vec<ProxyEntry> {
    proxy_directive()
        .captures_iter(body)
        .filter_map(|cap| cap.get(1))
        .map(|m| ProxyEntry::from_token(m.as_str()))
        .collect()
}
