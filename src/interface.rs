//! Network interface control
//!
//! Link, address, VLAN and MTU management through the `ip` command

use crate::error::{PwnixError, PwnixResult};
use crate::system::{run_checked, System};
use crate::validation;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A 48-bit hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Random locally administered unicast address
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut octets: [u8; 6] = rng.gen();
        // clear multicast (bit 0), set locally administered (bit 1)
        octets[0] = (octets[0] & 0xFC) | 0x02;
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}

impl FromStr for MacAddress {
    type Err = PwnixError;

    fn from_str(s: &str) -> PwnixResult<Self> {
        validation::validate_mac_address(s)?;

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(s.split(':')) {
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| {
                    PwnixError::InvalidParameter(format!(
                        "Invalid hex digit in MAC address: {}",
                        part
                    ))
                })?;
        }
        Ok(Self(octets))
    }
}

/// Name of the 802.1Q sub-interface `ip` creates for `parent` and `vlan_id`
pub fn vlan_interface_name(parent: &str, vlan_id: u16) -> String {
    format!("{}.{}", parent, vlan_id)
}

/// Interface controller
pub struct InterfaceController<'a> {
    sys: &'a dyn System,
}

impl<'a> InterfaceController<'a> {
    pub fn new(sys: &'a dyn System) -> Self {
        Self { sys }
    }

    /// `ip link show` output
    pub async fn list(&self) -> PwnixResult<String> {
        self.run_ip(&["link", "show"]).await
    }

    /// Bring interface up
    pub async fn up(&self, interface: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        self.run_ip(&["link", "set", "dev", interface, "up"]).await.map(|_| ())
    }

    /// Bring interface down
    pub async fn down(&self, interface: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        self.run_ip(&["link", "set", "dev", interface, "down"]).await.map(|_| ())
    }

    /// Set MAC address
    ///
    /// The link is taken down for the change. If the kernel rejects the
    /// address the link is brought back up before the error is returned.
    pub async fn set_mac(&self, interface: &str, mac: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        validation::validate_mac_address(mac)?;

        self.down(interface).await?;
        if let Err(e) = self.run_ip(&["link", "set", "dev", interface, "address", mac]).await {
            if let Err(restore) = self.up(interface).await {
                warn!("Could not bring {} back up: {}", interface, restore);
            }
            return Err(e);
        }
        self.up(interface).await
    }

    /// Replace every address on the interface with `address/netmask`
    pub async fn set_ip(
        &self,
        interface: &str,
        address: &str,
        netmask: &str,
    ) -> PwnixResult<String> {
        validation::validate_interface_name(interface)?;
        let ip = validation::validate_ip_address(address)?;
        validation::validate_netmask(netmask, ip.is_ipv6())?;

        let addr = format!("{}/{}", address, netmask);
        self.flush_addrs(interface).await?;
        self.run_ip(&["addr", "add", &addr, "dev", interface]).await?;
        Ok(addr)
    }

    /// Flush all IP addresses
    pub async fn flush_addrs(&self, interface: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        self.run_ip(&["addr", "flush", "dev", interface]).await.map(|_| ())
    }

    /// Set promiscuous mode
    pub async fn set_promisc(&self, interface: &str, enable: bool) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;

        let mode = if enable { "on" } else { "off" };
        self.run_ip(&["link", "set", "dev", interface, "promisc", mode]).await.map(|_| ())
    }

    /// Set MTU
    pub async fn set_mtu(&self, interface: &str, mtu: u32) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        validation::validate_mtu(mtu)?;

        let mtu_str = mtu.to_string();
        self.run_ip(&["link", "set", "dev", interface, "mtu", &mtu_str]).await.map(|_| ())
    }

    /// Create the `parent.id` VLAN interface and bring it up
    pub async fn add_vlan(&self, parent: &str, vlan_id: u16) -> PwnixResult<String> {
        validation::validate_interface_name(parent)?;
        validation::validate_vlan_id(vlan_id)?;

        let name = vlan_interface_name(parent, vlan_id);
        validation::validate_interface_name(&name)?;

        let id = vlan_id.to_string();
        self.run_ip(&["link", "add", "link", parent, "name", &name, "type", "vlan", "id", &id])
            .await?;
        self.run_ip(&["link", "set", &name, "up"]).await?;
        Ok(name)
    }

    async fn run_ip(&self, args: &[&str]) -> PwnixResult<String> {
        run_checked(self.sys, "ip", args).await
    }
}
