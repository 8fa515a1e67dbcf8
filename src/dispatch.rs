//! Subcommand dispatch
//!
//! Every subcommand is described by a static [`CommandSpec`]: the external
//! tool it drives and whether it needs root. [`Dispatcher::dispatch`] checks
//! those preconditions before any argument vector is built, then hands the
//! typed [`Action`] to the matching controller.

use crate::config::PwnixConfig;
use crate::dns::DnsController;
use crate::error::{PwnixError, PwnixResult};
use crate::firewall::FirewallController;
use crate::interface::{vlan_interface_name, InterfaceController, MacAddress};
use crate::qos::QosController;
use crate::routing::RoutingController;
use crate::system::System;
use crate::wifi::WifiController;
use tracing::{debug, info};

/// Static description of one subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub tool: &'static str,
    pub requires_root: bool,
    pub about: &'static str,
}

const fn spec(
    name: &'static str,
    tool: &'static str,
    requires_root: bool,
    about: &'static str,
) -> CommandSpec {
    CommandSpec { name, tool, requires_root, about }
}

pub static COMMAND_SPECS: [CommandSpec; 16] = [
    spec("list", "ip", false, "List all network interfaces"),
    spec("monitor", "iw", true, "Enable or disable monitor mode on a wireless interface"),
    spec("set-mac", "ip", true, "Change the MAC address of an interface"),
    spec("set-mac-rnd", "ip", true, "Set a random MAC address for an interface"),
    spec("set-ip", "ip", true, "Set a specific IP address for an interface"),
    spec("block-protocol", "iptables", true, "Block a specific protocol on an interface"),
    spec("enable-forwarding", "sysctl", true, "Enable IP forwarding"),
    spec("disable-forwarding", "sysctl", true, "Disable IP forwarding"),
    spec("configure-dns", "resolvconf", true, "Configure DNS server for an interface"),
    spec("configure-nat", "iptables", true, "Configure NAT (Network Address Translation)"),
    spec("block-ip", "iptables", true, "Block a specific IP address on an interface"),
    spec("firewall-status", "iptables", false, "Show current firewall status"),
    spec("promisc", "ip", true, "Enable or disable promiscuous mode on an interface"),
    spec("configure-vlan", "ip", true, "Configure a VLAN on an interface"),
    spec("set-mtu", "ip", true, "Set the MTU for an interface"),
    spec("configure-qos", "tc", true, "Configure basic QoS on an interface"),
];

impl CommandSpec {
    pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
        COMMAND_SPECS.iter().find(|spec| spec.name == name)
    }
}

/// A parsed subcommand with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Monitor { interface: String, enable: bool },
    SetMac { interface: String, mac: String },
    SetMacRandom { interface: String },
    SetIp { interface: String, ip: String, netmask: Option<String> },
    BlockProtocol { interface: String, protocol: String },
    EnableForwarding,
    DisableForwarding,
    ConfigureDns { interface: String, server: String },
    ConfigureNat { interface: String },
    BlockIp { interface: String, ip: String },
    FirewallStatus,
    Promisc { interface: String, enable: bool },
    ConfigureVlan { interface: String, vlan_id: u16 },
    SetMtu { interface: String, mtu: u32 },
    ConfigureQos { interface: String, rate: String },
}

impl Action {
    /// Row of this action in [`COMMAND_SPECS`]
    fn index(&self) -> usize {
        match self {
            Action::List => 0,
            Action::Monitor { .. } => 1,
            Action::SetMac { .. } => 2,
            Action::SetMacRandom { .. } => 3,
            Action::SetIp { .. } => 4,
            Action::BlockProtocol { .. } => 5,
            Action::EnableForwarding => 6,
            Action::DisableForwarding => 7,
            Action::ConfigureDns { .. } => 8,
            Action::ConfigureNat { .. } => 9,
            Action::BlockIp { .. } => 10,
            Action::FirewallStatus => 11,
            Action::Promisc { .. } => 12,
            Action::ConfigureVlan { .. } => 13,
            Action::SetMtu { .. } => 14,
            Action::ConfigureQos { .. } => 15,
        }
    }

    pub fn spec(&self) -> &'static CommandSpec {
        &COMMAND_SPECS[self.index()]
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }
}

/// Receives a subcommand's user-facing lines as they are produced
pub trait Reporter {
    /// Progress line, printed with an `[INFO]` prefix
    fn info(&mut self, message: &str);

    /// Captured tool output, printed verbatim
    fn output(&mut self, text: &str);
}

/// Records every line in print order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub messages: Vec<String>,
}

impl Reporter for Report {
    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn output(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}

/// Log an `[INFO]` line and hand it to the reporter straight away
fn announce(out: &mut dyn Reporter, message: &str) {
    info!("{}", message);
    out.info(message);
}

pub struct Dispatcher<'a> {
    sys: &'a dyn System,
    config: &'a PwnixConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(sys: &'a dyn System, config: &'a PwnixConfig) -> Self {
        Self { sys, config }
    }

    /// Fail fast unless the caller may run `spec` and its tool is installed
    pub fn preflight(&self, spec: &CommandSpec) -> PwnixResult<()> {
        if spec.requires_root && !self.sys.is_root() {
            return Err(PwnixError::PermissionDenied);
        }

        match self.sys.find_tool(spec.tool) {
            Some(path) => {
                debug!("Using {} at {}", spec.tool, path.display());
                Ok(())
            }
            None => Err(PwnixError::ToolMissing(spec.tool.to_string())),
        }
    }

    /// Check preconditions, then run the action.
    ///
    /// Lines reach `out` as they are produced, so an intent line has already
    /// been delivered when a later step fails.
    pub async fn dispatch(&self, action: &Action, out: &mut dyn Reporter) -> PwnixResult<()> {
        self.preflight(action.spec())?;
        self.execute(action, out).await
    }

    async fn execute(&self, action: &Action, out: &mut dyn Reporter) -> PwnixResult<()> {
        let sys = self.sys;

        match action {
            Action::List => {
                let listing = InterfaceController::new(sys).list().await?;
                out.output(&listing);
            }
            Action::Monitor { interface, enable } => {
                let verb = if *enable { "Enabling" } else { "Disabling" };
                announce(out, &format!("{} monitor mode for interface {}", verb, interface));
                WifiController::new(sys).set_monitor_mode(interface, *enable).await?;
            }
            Action::SetMac { interface, mac } => {
                announce(out, &format!("Changing MAC address of {} to {}", interface, mac));
                InterfaceController::new(sys).set_mac(interface, mac).await?;
                announce(out, "MAC address changed successfully.");
            }
            Action::SetMacRandom { interface } => {
                let mac = MacAddress::random().to_string();
                announce(
                    out,
                    &format!("Changing MAC address of {} to {} (random)", interface, mac),
                );
                InterfaceController::new(sys).set_mac(interface, &mac).await?;
                announce(out, "Random MAC address set successfully.");
            }
            Action::SetIp { interface, ip, netmask } => {
                let netmask = netmask.as_deref().unwrap_or(&self.config.default_netmask);
                announce(
                    out,
                    &format!("Setting IP address {}/{} for interface {}", ip, netmask, interface),
                );
                InterfaceController::new(sys).set_ip(interface, ip, netmask).await?;
                announce(out, "IP address set successfully.");
            }
            Action::BlockProtocol { interface, protocol } => {
                announce(
                    out,
                    &format!("Blocking protocol {} on interface {}", protocol, interface),
                );
                FirewallController::new(sys).block_protocol(interface, protocol).await?;
                announce(out, "Protocol blocked successfully.");
            }
            Action::EnableForwarding => {
                announce(out, "Enabling IP forwarding...");
                RoutingController::new(sys).set_ip_forwarding(true).await?;
                announce(out, "IP forwarding enabled.");
            }
            Action::DisableForwarding => {
                announce(out, "Disabling IP forwarding...");
                RoutingController::new(sys).set_ip_forwarding(false).await?;
                announce(out, "IP forwarding disabled.");
            }
            Action::ConfigureDns { interface, server } => {
                announce(out, &format!("Configuring DNS to {}", server));
                DnsController::new(sys).set_nameserver(interface, server).await?;
                announce(out, &format!("DNS configured to {}", server));
            }
            Action::ConfigureNat { interface } => {
                announce(out, &format!("Configuring NAT with {}", interface));
                FirewallController::new(sys).enable_masquerade(interface).await?;
                announce(out, "NAT configuration completed.");
            }
            Action::BlockIp { interface, ip } => {
                announce(out, &format!("Blocking IP {} on interface {}", ip, interface));
                FirewallController::new(sys).block_ip(interface, ip).await?;
                announce(out, &format!("IP {} blocked.", ip));
            }
            Action::FirewallStatus => {
                let listing = FirewallController::new(sys).status().await?;
                out.info(&format!("Current firewall status:\n{}", listing));
            }
            Action::Promisc { interface, enable } => {
                let state = if *enable { "on" } else { "off" };
                announce(
                    out,
                    &format!("Setting promiscuous mode {} for interface {}", state, interface),
                );
                InterfaceController::new(sys).set_promisc(interface, *enable).await?;
                announce(out, &format!("Promiscuous mode {}.", state));
            }
            Action::ConfigureVlan { interface, vlan_id } => {
                let name = vlan_interface_name(interface, *vlan_id);
                announce(
                    out,
                    &format!("Configuring VLAN {} on interface {} as {}", vlan_id, interface, name),
                );
                InterfaceController::new(sys).add_vlan(interface, *vlan_id).await?;
                announce(out, "VLAN configured successfully.");
            }
            Action::SetMtu { interface, mtu } => {
                announce(out, &format!("Setting MTU for interface {} to {}", interface, mtu));
                InterfaceController::new(sys).set_mtu(interface, *mtu).await?;
                announce(out, "MTU set successfully.");
            }
            Action::ConfigureQos { interface, rate } => {
                announce(
                    out,
                    &format!("Configuring QoS on interface {} with rate limit {}", interface, rate),
                );
                QosController::new(sys).limit_rate(interface, rate).await?;
                announce(out, "QoS configured successfully.");
            }
        }

        Ok(())
    }
}
