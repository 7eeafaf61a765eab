//! DHCPv4 option codes used by the WPAD probe (RFC 2132, draft-ietf-wrec-wpad).

pub const SUBNET_MASK: u8 = 1;
pub const ROUTER: u8 = 3;
pub const DOMAIN_NAME_SERVER: u8 = 6;
pub const DOMAIN_NAME: u8 = 15;
pub const BROADCAST_ADDRESS: u8 = 28;
pub const NTP_SERVERS: u8 = 42;
pub const LEASE_TIME: u8 = 51;
pub const MESSAGE_TYPE: u8 = 53;
pub const SERVER_IDENTIFIER: u8 = 54;
/// Private-use code conventionally carrying the WPAD URL.
pub const WPAD: u8 = 252;

/// Options requested in every DISCOVER, in request order.
pub const REQUESTED: &[u8] = &[
    SUBNET_MASK,
    ROUTER,
    DOMAIN_NAME_SERVER,
    DOMAIN_NAME,
    BROADCAST_ADDRESS,
    NTP_SERVERS,
    WPAD,
];

/// Name under which an option code is exposed in a [`super::DhcpResponse`].
pub fn name(code: u8) -> String {
    match code {
        SUBNET_MASK => "SubnetMask".to_string(),
        ROUTER => "Router".to_string(),
        DOMAIN_NAME_SERVER => "DNS".to_string(),
        DOMAIN_NAME => "Domain".to_string(),
        BROADCAST_ADDRESS => "BroadcastAddress".to_string(),
        NTP_SERVERS => "NTPServers".to_string(),
        LEASE_TIME => "LeaseTime".to_string(),
        MESSAGE_TYPE => "MessageType".to_string(),
        SERVER_IDENTIFIER => "ServerId".to_string(),
        WPAD => "WPAD".to_string(),
        other => format!("Option{}", other),
    }
}
