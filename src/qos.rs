//! Traffic shaping via tc
//!
//! Installs a single HTB root qdisc (`1:`) whose class `1:1` carries the
//! requested rate. Unclassified traffic goes to minor 30.

use crate::error::PwnixResult;
use crate::system::{run_checked, System};
use crate::validation;
use tracing::warn;

const ROOT_HANDLE: &str = "1:";
const CLASS_ID: &str = "1:1";
const DEFAULT_CLASS: &str = "30";

pub struct QosController<'a> {
    sys: &'a dyn System,
}

impl<'a> QosController<'a> {
    pub fn new(sys: &'a dyn System) -> Self {
        Self { sys }
    }

    /// Replace the root qdisc of `interface` with an HTB limited to `rate`
    pub async fn limit_rate(&self, interface: &str, rate: &str) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        validation::validate_rate(rate)?;

        // fails when only the kernel default qdisc is installed
        if let Err(e) = self.run_tc(&["qdisc", "del", "dev", interface, "root"]).await {
            warn!(
                "No root qdisc removed from {}: {}",
                interface,
                e.command_stderr().unwrap_or_default()
            );
        }

        self.run_tc(&[
            "qdisc", "add", "dev", interface, "root", "handle", ROOT_HANDLE, "htb", "default",
            DEFAULT_CLASS,
        ])
        .await?;
        self.run_tc(&[
            "class", "add", "dev", interface, "parent", ROOT_HANDLE, "classid", CLASS_ID, "htb",
            "rate", rate,
        ])
        .await?;
        Ok(())
    }

    async fn run_tc(&self, args: &[&str]) -> PwnixResult<String> {
        run_checked(self.sys, "tc", args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{ExecutionResult, MockSystem};
    use mockall::Sequence;

    const DEL_ROOT: &[&str] = &["qdisc", "del", "dev", "eth0", "root"];
    const ADD_ROOT: &[&str] =
        &["qdisc", "add", "dev", "eth0", "root", "handle", "1:", "htb", "default", "30"];

    fn expect_tc(
        sys: &mut MockSystem,
        seq: &mut Sequence,
        expected: &'static [&'static str],
        result: ExecutionResult,
    ) {
        sys.expect_execute()
            .withf(move |program: &str, args: &[String]| program == "tc" && args == expected)
            .times(1)
            .in_sequence(seq)
            .returning(move |_, _| Ok(result.clone()));
    }

    #[tokio::test]
    async fn test_limit_rate_sequence() {
        let mut sys = MockSystem::new();
        let mut seq = Sequence::new();
        expect_tc(&mut sys, &mut seq, DEL_ROOT, ExecutionResult::ok(""));
        expect_tc(&mut sys, &mut seq, ADD_ROOT, ExecutionResult::ok(""));
        expect_tc(
            &mut sys,
            &mut seq,
            &[
                "class", "add", "dev", "eth0", "parent", "1:", "classid", "1:1", "htb", "rate",
                "1mbit",
            ],
            ExecutionResult::ok(""),
        );

        QosController::new(&sys).limit_rate("eth0", "1mbit").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_root_qdisc_is_tolerated() {
        let mut sys = MockSystem::new();
        let mut seq = Sequence::new();
        expect_tc(
            &mut sys,
            &mut seq,
            DEL_ROOT,
            ExecutionResult::failed(2, "Error: Cannot delete qdisc with handle of zero."),
        );
        expect_tc(&mut sys, &mut seq, ADD_ROOT, ExecutionResult::ok(""));
        expect_tc(
            &mut sys,
            &mut seq,
            &[
                "class", "add", "dev", "eth0", "parent", "1:", "classid", "1:1", "htb", "rate",
                "512kbit",
            ],
            ExecutionResult::ok(""),
        );

        QosController::new(&sys).limit_rate("eth0", "512kbit").await.unwrap();
    }

    #[tokio::test]
    async fn test_add_failure_aborts() {
        let mut sys = MockSystem::new();
        let mut seq = Sequence::new();
        expect_tc(&mut sys, &mut seq, DEL_ROOT, ExecutionResult::ok(""));
        expect_tc(
            &mut sys,
            &mut seq,
            ADD_ROOT,
            ExecutionResult::failed(2, "Error: Exclusivity flag on, cannot modify."),
        );

        assert!(QosController::new(&sys).limit_rate("eth0", "1mbit").await.is_err());
    }
}
