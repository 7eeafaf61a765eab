pub mod app;
pub mod common;
pub mod config;
pub mod dhcp;
pub mod dns;
pub mod iface;
pub mod wpad;

pub use app::{App, DiscoveryResult, Payload, Source, WpadDiscovery};
pub use common::{DiscoveryError, DiscoveryErrorKind};
