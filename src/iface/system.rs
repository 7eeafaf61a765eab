//! 系统网络接口枚举与权限检测
//!
//! - 接口: `netdev::get_interfaces()`
//! - 权限: Linux 上检查有效 uid 是否为 0，其它平台视为无权限

use std::net::IpAddr;

use netdev::interface::InterfaceType;
use tracing::debug;

use super::{HostSnapshot, Interface, LinkType, OperState};

/// 枚举本机所有网络接口
pub fn interfaces() -> Vec<Interface> {
    let interfaces: Vec<Interface> = netdev::get_interfaces()
        .into_iter()
        .map(|iface| {
            let link_type = if iface.is_loopback() {
                LinkType::Loopback
            } else if iface.is_tun() {
                LinkType::Tunnel
            } else {
                match iface.if_type {
                    InterfaceType::Ethernet => LinkType::Ethernet,
                    InterfaceType::Wireless80211 => LinkType::Wireless,
                    InterfaceType::Loopback => LinkType::Loopback,
                    InterfaceType::Tunnel => LinkType::Tunnel,
                    _ => LinkType::Other,
                }
            };

            let address = iface
                .ipv4
                .first()
                .map(|net| IpAddr::V4(net.addr()))
                .or_else(|| iface.ipv6.first().map(|net| IpAddr::V6(net.addr())));

            Interface {
                name: iface.name.clone(),
                link_type,
                state: if iface.is_up() {
                    OperState::Up
                } else {
                    OperState::Down
                },
                mac: iface.mac_addr.map(|mac| mac.octets()),
                address,
            }
        })
        .collect();

    debug!(count = interfaces.len(), "enumerated network interfaces");
    interfaces
}

/// 是否有权限绑定 68 端口并发送 DHCP 广播
pub fn is_privileged() -> bool {
    #[cfg(target_os = "linux")]
    {
        // SAFETY: geteuid 没有前置条件，也不会失败
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

/// 采集一次运行所需的主机快照
pub fn snapshot() -> HostSnapshot {
    HostSnapshot {
        interfaces: interfaces(),
        privileged: is_privileged(),
    }
}
