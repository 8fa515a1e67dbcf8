//! pwnix - network management for penetration testing
//!
//! Thin, checked wrappers around the system's network tools:
//! - Interface control: listing, MAC/IP/MTU, promiscuous mode, VLANs (`ip`)
//! - Wireless monitor mode (`iw`)
//! - Firewall rules and NAT (`iptables`)
//! - IPv4 forwarding (`sysctl`)
//! - DNS registration (`resolvconf`)
//! - QoS shaping (`tc`)
//!
//! Each subcommand is an [`Action`] run by the [`Dispatcher`], which checks
//! privileges and tool availability before spawning anything.

pub mod error;
pub mod config;
pub mod validation;
pub mod system;
pub mod interface;
pub mod wifi;
pub mod firewall;
pub mod routing;
pub mod dns;
pub mod qos;
pub mod dispatch;

// Re-export commonly used types
pub use error::{PwnixError, PwnixResult};
pub use config::PwnixConfig;
pub use system::{ExecutionResult, HostSystem, System};
pub use interface::{InterfaceController, MacAddress};
pub use wifi::{WifiController, WifiMode};
pub use firewall::FirewallController;
pub use routing::RoutingController;
pub use dns::DnsController;
pub use qos::QosController;
pub use dispatch::{Action, CommandSpec, Dispatcher, Report, Reporter, COMMAND_SPECS};
