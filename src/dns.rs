//! Nameserver registration via resolvconf

use crate::error::PwnixResult;
use crate::system::{run_checked, System};
use crate::validation;

pub struct DnsController<'a> {
    sys: &'a dyn System,
}

impl<'a> DnsController<'a> {
    pub fn new(sys: &'a dyn System) -> Self {
        Self { sys }
    }

    /// Register `server` as the nameserver record for `interface` at metric 0
    pub async fn set_nameserver(&self, interface: &str, server: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        validation::validate_ip_address(server)?;
        run_checked(self.sys, "resolvconf", &["-a", interface, "-m", "0", "-n", server])
            .await
            .map(|_| ())
    }
}
