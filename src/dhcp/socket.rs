//! 基于 UDP 广播的 DHCP 传输
//!
//! socket2 创建 0.0.0.0:68 套接字（SO_BROADCAST + SO_REUSEADDR，Linux 下绑定到接口），
//! dhcproto 负责报文编解码。只接收 xid 匹配的 BOOTREPLY。

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use anyhow::{Context, Result};
use async_trait::async_trait;
use dhcproto::v4::{self, Flags, Message, MessageType, Opcode, OptionCode};
use dhcproto::{Decodable, Encodable};
use tokio::net::UdpSocket;
use tracing::debug;

use super::{DhcpOption, DhcpRequest, DhcpResponse, DhcpTransport};
use crate::iface::Interface;

const CLIENT_PORT: u16 = 68;
const SERVER_PORT: u16 = 67;

#[derive(Debug, Default)]
pub struct SocketDhcpTransport;

impl SocketDhcpTransport {
    pub fn new() -> Self {
        Self
    }

    fn bind(interface: &Interface) -> Result<UdpSocket> {
        let socket = socket2::Socket::new(
            socket2::Domain::IPV4,
            socket2::Type::DGRAM,
            Some(socket2::Protocol::UDP),
        )?;
        socket.set_reuse_address(true)?;
        socket.set_broadcast(true)?;
        #[cfg(any(target_os = "linux", target_os = "android"))]
        socket
            .bind_device(Some(interface.name.as_bytes()))
            .with_context(|| format!("bind to device {}", interface.name))?;
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let _ = interface;

        let local = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, CLIENT_PORT));
        socket
            .bind(&local.into())
            .with_context(|| format!("bind {}", local))?;
        socket.set_nonblocking(true)?;

        let std_socket: std::net::UdpSocket = socket.into();
        Ok(UdpSocket::from_std(std_socket)?)
    }
}

/// 把请求编码为 DHCPDISCOVER 报文
pub fn encode_request(request: &DhcpRequest) -> Result<Vec<u8>> {
    let mut msg = Message::default();
    msg.set_opcode(Opcode::BootRequest);
    msg.set_xid(request.xid);
    msg.set_chaddr(&request.chaddr);
    if request.broadcast {
        msg.set_flags(Flags::default().set_broadcast());
    }
    msg.opts_mut()
        .insert(v4::DhcpOption::MessageType(MessageType::Discover));
    msg.opts_mut().insert(v4::DhcpOption::ParameterRequestList(
        request.requested.iter().map(|c| OptionCode::from(*c)).collect(),
    ));
    msg.to_vec()
        .map_err(|e| anyhow::anyhow!("failed to encode DHCP request: {}", e))
}

/// 解析应答；不是对应 xid 的 BOOTREPLY 时返回 `None`
pub fn decode_reply(data: &[u8], xid: u32, interface: &str) -> Result<Option<DhcpResponse>> {
    let msg = Message::from_bytes(data)
        .map_err(|e| anyhow::anyhow!("failed to parse DHCP packet: {}", e))?;
    if msg.opcode() != Opcode::BootReply || msg.xid() != xid {
        return Ok(None);
    }

    let mut options = Vec::new();
    for (code, opt) in msg.opts().iter() {
        let value = match opt {
            v4::DhcpOption::Unknown(unknown) => unknown.data().to_vec(),
            other => {
                // code + len + data
                let encoded = other
                    .to_vec()
                    .map_err(|e| anyhow::anyhow!("failed to re-encode option: {}", e))?;
                encoded.get(2..).unwrap_or_default().to_vec()
            }
        };
        options.push(DhcpOption::from_code(u8::from(*code), value));
    }

    Ok(Some(DhcpResponse {
        interface: interface.to_string(),
        options,
    }))
}

#[async_trait]
impl DhcpTransport for SocketDhcpTransport {
    async fn exchange(
        &self,
        interface: &Interface,
        request: &DhcpRequest,
    ) -> Result<DhcpResponse> {
        let socket = Self::bind(interface)?;
        let packet = encode_request(request)?;
        let server = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, SERVER_PORT));
        socket.send_to(&packet, server).await?;

        let mut buf = vec![0u8; 1500];
        loop {
            let (n, from) = socket.recv_from(&mut buf).await?;
            match decode_reply(&buf[..n], request.xid, &interface.name) {
                Ok(Some(response)) => {
                    debug!(interface = interface.name.as_str(), from = %from, "DHCP reply matched");
                    return Ok(response);
                }
                Ok(None) => continue,
                Err(e) => {
                    debug!(from = %from, error = %e, "DHCP: ignoring undecodable packet");
                }
            }
        }
    }
}
