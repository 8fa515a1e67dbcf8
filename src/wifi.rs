//! WiFi device control
//!
//! Interface mode switching using the iw command

use crate::error::PwnixResult;
use crate::system::{run_checked, System};
use crate::validation;

/// iw interface type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiMode {
    Monitor,
    Managed,
}

impl WifiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiMode::Monitor => "monitor",
            WifiMode::Managed => "managed",
        }
    }
}

/// WiFi controller
pub struct WifiController<'a> {
    sys: &'a dyn System,
}

impl<'a> WifiController<'a> {
    pub fn new(sys: &'a dyn System) -> Self {
        Self { sys }
    }

    /// Switch between monitor and managed mode
    pub async fn set_monitor_mode(&self, interface: &str, enable: bool) -> PwnixResult<WifiMode> {
        let mode = if enable { WifiMode::Monitor } else { WifiMode::Managed };
        self.set_type(interface, mode).await?;
        Ok(mode)
    }

    pub async fn set_type(&self, interface: &str, mode: WifiMode) -> PwnixResult<()> {
        validation::validate_interface_name(interface)?;
        self.run_iw(&["dev", interface, "set", "type", mode.as_str()]).await.map(|_| ())
    }

    async fn run_iw(&self, args: &[&str]) -> PwnixResult<String> {
        run_checked(self.sys, "iw", args).await
    }
}
