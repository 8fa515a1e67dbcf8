//! IPv4 forwarding control

use crate::error::PwnixResult;
use crate::system::{run_checked, System};

const IP_FORWARD_KEY: &str = "net.ipv4.ip_forward";

pub struct RoutingController<'a> {
    sys: &'a dyn System,
}

impl<'a> RoutingController<'a> {
    pub fn new(sys: &'a dyn System) -> Self {
        Self { sys }
    }

    pub async fn set_ip_forwarding(&self, enable: bool) -> PwnixResult<()> {
        let setting = format!("{}={}", IP_FORWARD_KEY, if enable { 1 } else { 0 });
        run_checked(self.sys, "sysctl", &["-w", &setting]).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{ExecutionResult, MockSystem};

    #[tokio::test]
    async fn test_forwarding_toggle() {
        let mut sys = MockSystem::new();
        sys.expect_execute()
            .withf(|program: &str, args: &[String]| {
                program == "sysctl" && args == ["-w", "net.ipv4.ip_forward=1"]
            })
            .times(1)
            .returning(|_, _| Ok(ExecutionResult::ok("net.ipv4.ip_forward = 1")));
        sys.expect_execute()
            .withf(|program: &str, args: &[String]| {
                program == "sysctl" && args == ["-w", "net.ipv4.ip_forward=0"]
            })
            .times(1)
            .returning(|_, _| Ok(ExecutionResult::ok("net.ipv4.ip_forward = 0")));

        let routing = RoutingController::new(&sys);
        routing.set_ip_forwarding(true).await.unwrap();
        routing.set_ip_forwarding(false).await.unwrap();
    }
}
