//! Packet filtering and NAT via iptables

use crate::error::PwnixResult;
use crate::system::{run_checked, System};
use crate::validation;

pub struct FirewallController<'a> {
    sys: &'a dyn System,
}

impl<'a> FirewallController<'a> {
    pub fn new(sys: &'a dyn System) -> Self {
        Self { sys }
    }

    /// Drop inbound traffic of `protocol` arriving on `interface`
    pub async fn block_protocol(&self, interface: &str, protocol: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        validation::validate_protocol(protocol)?;
        self.run_iptables(&["-A", "INPUT", "-i", interface, "-p", protocol, "-j", "DROP"])
            .await
            .map(|_| ())
    }

    /// Drop inbound traffic from `source` arriving on `interface`
    pub async fn block_ip(&self, interface: &str, source: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        validation::validate_ip_or_cidr(source)?;
        self.run_iptables(&["-A", "INPUT", "-i", interface, "-s", source, "-j", "DROP"])
            .await
            .map(|_| ())
    }

    /// Masquerade everything leaving through `interface`
    pub async fn enable_masquerade(&self, interface: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        self.run_iptables(&["-t", "nat", "-A", "POSTROUTING", "-o", interface, "-j", "MASQUERADE"])
            .await
            .map(|_| ())
    }

    /// `iptables -L` output
    pub async fn status(&self) -> PwnixResult<String> {
        self.run_iptables(&["-L"]).await
    }

    async fn run_iptables(&self, args: &[&str]) -> PwnixResult<String> {
        run_checked(self.sys, "iptables", args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{ExecutionResult, MockSystem};

    fn expect_iptables(
        sys: &mut MockSystem,
        expected: &'static [&'static str],
        stdout: &'static str,
    ) {
        sys.expect_execute()
            .withf(move |program: &str, args: &[String]| program == "iptables" && args == expected)
            .times(1)
            .returning(move |_, _| Ok(ExecutionResult::ok(stdout)));
    }

    #[tokio::test]
    async fn test_block_protocol() {
        let mut sys = MockSystem::new();
        expect_iptables(&mut sys, &["-A", "INPUT", "-i", "eth0", "-p", "icmp", "-j", "DROP"], "");

        FirewallController::new(&sys).block_protocol("eth0", "icmp").await.unwrap();
    }

    #[tokio::test]
    async fn test_block_ip() {
        let mut sys = MockSystem::new();
        expect_iptables(
            &mut sys,
            &["-A", "INPUT", "-i", "eth0", "-s", "10.0.0.0/8", "-j", "DROP"],
            "",
        );

        FirewallController::new(&sys).block_ip("eth0", "10.0.0.0/8").await.unwrap();
    }

    #[tokio::test]
    async fn test_block_ip_rejects_garbage() {
        let mut sys = MockSystem::new();
        sys.expect_execute().never();

        assert!(FirewallController::new(&sys).block_ip("eth0", "-j ACCEPT").await.is_err());
    }

    #[tokio::test]
    async fn test_masquerade() {
        let mut sys = MockSystem::new();
        expect_iptables(
            &mut sys,
            &["-t", "nat", "-A", "POSTROUTING", "-o", "wlan0", "-j", "MASQUERADE"],
            "",
        );

        FirewallController::new(&sys).enable_masquerade("wlan0").await.unwrap();
    }

    #[tokio::test]
    async fn test_status_returns_listing() {
        let mut sys = MockSystem::new();
        expect_iptables(&mut sys, &["-L"], "Chain INPUT (policy ACCEPT)");

        let listing = FirewallController::new(&sys).status().await.unwrap();
        assert_eq!(listing, "Chain INPUT (policy ACCEPT)");
    }
}
