//! 网络接口快照与筛选
//!
//! 接口列表由外部枚举（见 [`system`]），这里只做只读筛选。

pub mod system;

use std::net::IpAddr;

use serde::Serialize;

/// 链路类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Ethernet,
    Wireless,
    Loopback,
    Tunnel,
    Other,
}

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperState {
    Up,
    Down,
}

/// 单个网络接口的不可变快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub name: String,
    pub link_type: LinkType,
    pub state: OperState,
    pub mac: Option<[u8; 6]>,
    pub address: Option<IpAddr>,
}

impl Interface {
    pub fn is_eligible(&self) -> bool {
        self.link_type == LinkType::Ethernet && self.state == OperState::Up
    }
}

/// 一次发现运行所需的主机信息
#[derive(Debug, Clone, Default)]
pub struct HostSnapshot {
    pub interfaces: Vec<Interface>,
    /// 能否发送特权（广播到 68 端口）报文
    pub privileged: bool,
}

/// 以太网且处于 up 状态的接口，保持枚举顺序
pub fn select_eligible(interfaces: &[Interface]) -> Vec<Interface> {
    interfaces
        .iter()
        .filter(|iface| iface.is_eligible())
        .cloned()
        .collect()
}

/// 在 [`select_eligible`] 基础上按名称进一步限制
pub fn select_named(interfaces: &[Interface], only: Option<&str>) -> Vec<Interface> {
    let eligible = select_eligible(interfaces);
    match only {
        Some(name) => eligible.into_iter().filter(|i| i.name == name).collect(),
        None => eligible,
    }
}
