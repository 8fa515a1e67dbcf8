//! Input validation and sanitization
//!
//! Every argument that ends up in an external command line passes through here
//! first, so a value can never be mistaken for an option by the tool.

use crate::error::{PwnixError, PwnixResult};
use std::net::{IpAddr, Ipv4Addr};

/// Maximum length for interface names (Linux kernel limit is 15)
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Smallest MTU the kernel accepts for IPv4
const MIN_MTU: u32 = 68;

const MAX_MTU: u32 = 65535;

/// Validate interface name to prevent option injection
///
/// Interface names must be alphanumeric with optional dashes, underscores and
/// dots (VLAN sub-interfaces are named `parent.id`), and no longer than 15
/// characters.
pub fn validate_interface_name(name: &str) -> PwnixResult<()> {
    if name.is_empty() {
        return Err(PwnixError::InvalidParameter(
            "Interface name cannot be empty".to_string()
        ));
    }

    if name.len() > MAX_INTERFACE_NAME_LEN {
        return Err(PwnixError::InvalidParameter(
            format!("Interface name too long (max {} characters)", MAX_INTERFACE_NAME_LEN)
        ));
    }

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
            return Err(PwnixError::InvalidParameter(
                format!("Invalid interface name '{}': contains invalid character '{}'", name, c)
            ));
        }
    }

    // Don't allow names starting with dash (could be interpreted as option)
    if name.starts_with('-') {
        return Err(PwnixError::InvalidParameter(
            "Interface name cannot start with dash".to_string()
        ));
    }

    if name == "." || name == ".." {
        return Err(PwnixError::InvalidParameter(
            format!("Invalid interface name '{}'", name)
        ));
    }

    Ok(())
}

/// Validate IP address
pub fn validate_ip_address(addr: &str) -> PwnixResult<IpAddr> {
    addr.parse::<IpAddr>()
        .map_err(|_| PwnixError::InvalidParameter(
            format!("Invalid IP address: {}", addr)
        ))
}

/// Validate an address that iptables accepts as a source match: a plain IP
/// or an `address/prefix` network.
pub fn validate_ip_or_cidr(value: &str) -> PwnixResult<()> {
    match value.split_once('/') {
        Some((addr, mask)) => {
            let ip = validate_ip_address(addr)?;
            validate_netmask(mask, ip.is_ipv6())
        }
        None => validate_ip_address(value).map(|_| ()),
    }
}

/// Validate MAC address format
///
/// Accepts standard MAC format: XX:XX:XX:XX:XX:XX (hex digits)
pub fn validate_mac_address(mac: &str) -> PwnixResult<()> {
    if mac.len() != 17 {
        return Err(PwnixError::InvalidParameter(
            "MAC address must be in format XX:XX:XX:XX:XX:XX".to_string()
        ));
    }

    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return Err(PwnixError::InvalidParameter(
            "MAC address must have 6 octets separated by colons".to_string()
        ));
    }

    for part in parts {
        if part.len() != 2 {
            return Err(PwnixError::InvalidParameter(
                "Each MAC address octet must be 2 hex digits".to_string()
            ));
        }

        if !part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PwnixError::InvalidParameter(
                format!("Invalid hex digit in MAC address: {}", part)
            ));
        }
    }

    Ok(())
}

/// Validate prefix length for IPv4 or IPv6
pub fn validate_prefix_len(prefix: u8, is_ipv6: bool) -> PwnixResult<()> {
    let max = if is_ipv6 { 128 } else { 32 };
    if prefix > max {
        return Err(PwnixError::InvalidParameter(
            format!("Prefix length {} exceeds maximum {}", prefix, max)
        ));
    }
    Ok(())
}

/// Validate a netmask given either as a prefix length (`24`) or, for IPv4,
/// in dotted form (`255.255.255.0`). `ip addr add` accepts both.
pub fn validate_netmask(netmask: &str, is_ipv6: bool) -> PwnixResult<()> {
    if let Ok(prefix) = netmask.parse::<u8>() {
        return validate_prefix_len(prefix, is_ipv6);
    }

    if !is_ipv6 {
        if let Ok(mask) = netmask.parse::<Ipv4Addr>() {
            let bits = u32::from(mask);
            // contiguous ones followed by zeros
            if bits.leading_ones() + bits.trailing_zeros() == 32 {
                return Ok(());
            }
            return Err(PwnixError::InvalidParameter(
                format!("Netmask {} is not contiguous", netmask)
            ));
        }
    }

    Err(PwnixError::InvalidParameter(
        format!("Invalid netmask: {}", netmask)
    ))
}

/// Validate MTU value
pub fn validate_mtu(mtu: u32) -> PwnixResult<()> {
    if mtu < MIN_MTU {
        return Err(PwnixError::InvalidParameter(
            format!("MTU must be at least {} bytes", MIN_MTU)
        ));
    }
    if mtu > MAX_MTU {
        return Err(PwnixError::InvalidParameter(
            format!("MTU cannot exceed {} bytes", MAX_MTU)
        ));
    }
    Ok(())
}

/// Validate an 802.1Q VLAN id (0 and 4095 are reserved)
pub fn validate_vlan_id(vlan_id: u16) -> PwnixResult<()> {
    if !(1..=4094).contains(&vlan_id) {
        return Err(PwnixError::InvalidParameter(
            "VLAN id must be between 1 and 4094".to_string()
        ));
    }
    Ok(())
}

/// Validate a protocol name or number as understood by `iptables -p`
pub fn validate_protocol(protocol: &str) -> PwnixResult<()> {
    if protocol.is_empty() || protocol.len() > 32 {
        return Err(PwnixError::InvalidParameter(
            "Protocol must be 1 to 32 characters".to_string()
        ));
    }

    if !protocol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PwnixError::InvalidParameter(
            format!("Invalid protocol: {}", protocol)
        ));
    }

    Ok(())
}

/// Validate a tc rate such as `1mbit`, `512kbit` or `100000`
pub fn validate_rate(rate: &str) -> PwnixResult<()> {
    let digits = rate.chars().take_while(|c| c.is_ascii_digit() || *c == '.').count();
    let (number, unit) = rate.split_at(digits);

    if number.is_empty() || number.parse::<f64>().is_err() {
        return Err(PwnixError::InvalidParameter(
            format!("Invalid rate '{}': must start with a number", rate)
        ));
    }

    if !unit.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(PwnixError::InvalidParameter(
            format!("Invalid rate unit in '{}'", rate)
        ));
    }

    Ok(())
}
