//! DHCP WPAD 探测
//!
//! 每个候选接口广播一个 DISCOVER，请求列表里带上 option 252 (WPAD)。
//! 所有接口并发探测，最先收到应答的接口胜出，其余探测直接丢弃。
//! 应答里没有 WPAD 也算"收到应答"，由调用方用 [`extract_wpad`] 区分。

pub mod options;
pub mod socket;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

use crate::common::bounded;
use crate::iface::Interface;

pub use socket::SocketDhcpTransport;

/// 一次 DISCOVER 的内容，由传输层编码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpRequest {
    pub xid: u32,
    pub chaddr: [u8; 6],
    pub broadcast: bool,
    pub requested: Vec<u8>,
}

impl DhcpRequest {
    /// 以接口 MAC 为 chaddr 构建带 WPAD 请求的 DISCOVER
    pub fn discover(chaddr: [u8; 6]) -> Self {
        Self {
            xid: rand::random(),
            chaddr,
            broadcast: true,
            requested: options::REQUESTED.to_vec(),
        }
    }
}

/// 应答中的一个选项，按名称暴露
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpOption {
    pub name: String,
    pub value: Vec<u8>,
}

impl DhcpOption {
    pub fn from_code(code: u8, value: Vec<u8>) -> Self {
        Self {
            name: options::name(code),
            value,
        }
    }
}

/// 解码后的 DHCP 应答
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DhcpResponse {
    /// 收到应答的接口名
    pub interface: String,
    pub options: Vec<DhcpOption>,
}

impl DhcpResponse {
    pub fn option(&self, name: &str) -> Option<&DhcpOption> {
        self.options.iter().find(|opt| opt.name == name)
    }
}

/// DHCP 传输原语：发送一个广播请求并等待单个应答
#[async_trait]
pub trait DhcpTransport: Send + Sync {
    async fn exchange(&self, interface: &Interface, request: &DhcpRequest)
        -> Result<DhcpResponse>;
}

/// 从应答中取出 WPAD URL（去掉末尾的 NUL 和空白）
pub fn extract_wpad(response: &DhcpResponse) -> Option<String> {
    let opt = response.option("WPAD")?;
    let value = String::from_utf8_lossy(&opt.value);
    let value = value.trim_end_matches('\0').trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub struct DhcpWpadProbe {
    transport: Arc<dyn DhcpTransport>,
    timeout: Duration,
}

impl DhcpWpadProbe {
    pub fn new(transport: Arc<dyn DhcpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// 并发探测所有接口，返回第一个应答；全部超时或失败时返回 `None`
    pub async fn probe(&self, interfaces: &[Interface]) -> Option<DhcpResponse> {
        let mut pending = FuturesUnordered::new();

        for iface in interfaces {
            let Some(mac) = iface.mac else {
                debug!(interface = iface.name.as_str(), "DHCP: no hardware address, skipped");
                continue;
            };
            let request = DhcpRequest::discover(mac);
            let transport = self.transport.clone();
            let timeout = self.timeout;
            pending.push(async move {
                debug!(
                    interface = iface.name.as_str(),
                    xid = request.xid,
                    "DHCP: sending DISCOVER"
                );
                let result =
                    bounded(timeout, "DHCP exchange", transport.exchange(iface, &request)).await;
                (iface, result)
            });
        }

        while let Some((iface, result)) = pending.next().await {
            match result {
                Ok(response) => {
                    info!(
                        interface = iface.name.as_str(),
                        options = response.options.len(),
                        "DHCP: response received"
                    );
                    return Some(response);
                }
                Err(e) => {
                    warn!(interface = iface.name.as_str(), error = %e, "DHCP: no response");
                }
            }
        }

        None
    }
}
