//! pwnix - network management CLI for penetration testing
//!
//! ```bash
//! pwnix list
//! sudo pwnix monitor wlan0 --enable
//! sudo pwnix set-ip eth0 192.168.1.5 --netmask 24
//! sudo pwnix configure-qos eth0 1mbit
//! ```

use clap::{Args, Parser, Subcommand};
use libpwnix::{Action, Dispatcher, HostSystem, PwnixConfig, PwnixError, Reporter};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pwnix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Network management tool with various features for penetration testing.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ~/.config/pwnix/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level written to the log file (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Required `--enable` / `--disable` pair
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Toggle {
    /// Enable the mode
    #[arg(long)]
    enable: bool,

    /// Disable the mode
    #[arg(long)]
    disable: bool,
}

impl Toggle {
    fn enabled(&self) -> bool {
        self.enable && !self.disable
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List all network interfaces
    List,

    /// Enable or disable monitor mode on a wireless interface
    Monitor {
        /// Wireless interface name (e.g., wlan0)
        interface: String,
        #[command(flatten)]
        toggle: Toggle,
    },

    /// Change the MAC address of an interface
    SetMac {
        /// Interface for which to change the MAC address
        interface: String,
        /// New MAC address (format: xx:xx:xx:xx:xx:xx)
        new_mac: String,
    },

    /// Set a random MAC address for an interface
    SetMacRnd {
        /// Interface for which to set a random MAC address
        interface: String,
    },

    /// Set a specific IP address for an interface
    SetIp {
        /// Interface for which the IP address will be set
        interface: String,
        /// IP address to set
        ip: String,
        /// Netmask (default: 24)
        #[arg(long)]
        netmask: Option<String>,
    },

    /// Block a specific protocol on an interface
    BlockProtocol {
        /// Interface on which to block the protocol
        interface: String,
        /// Protocol to block (e.g., icmp, tcp, udp)
        protocol: String,
    },

    /// Enable IP forwarding
    EnableForwarding,

    /// Disable IP forwarding
    DisableForwarding,

    /// Configure DNS server for an interface
    ConfigureDns {
        /// Interface name to configure DNS
        interface: String,
        /// DNS server IP address
        dns_server: String,
    },

    /// Configure NAT (Network Address Translation)
    ConfigureNat {
        /// Interface for NAT
        interface: String,
    },

    /// Block a specific IP address on an interface
    BlockIp {
        /// Interface on which to block the IP
        interface: String,
        /// IP address to block
        ip: String,
    },

    /// Show current firewall status
    FirewallStatus,

    /// Enable or disable promiscuous mode on an interface
    Promisc {
        /// Interface to set promiscuous mode
        interface: String,
        #[command(flatten)]
        toggle: Toggle,
    },

    /// Configure a VLAN on an interface
    ConfigureVlan {
        /// Base interface (e.g., eth0)
        interface: String,
        /// VLAN ID to configure
        vlan_id: u16,
    },

    /// Set the MTU for an interface
    SetMtu {
        /// Interface name
        interface: String,
        /// MTU value (e.g., 1500)
        mtu: u32,
    },

    /// Configure basic QoS on an interface
    ConfigureQos {
        /// Interface name
        interface: String,
        /// Rate limit (e.g., 1mbit)
        rate: String,
    },
}

impl From<Commands> for Action {
    fn from(command: Commands) -> Self {
        match command {
            Commands::List => Action::List,
            Commands::Monitor { interface, toggle } => {
                Action::Monitor { interface, enable: toggle.enabled() }
            }
            Commands::SetMac { interface, new_mac } => Action::SetMac { interface, mac: new_mac },
            Commands::SetMacRnd { interface } => Action::SetMacRandom { interface },
            Commands::SetIp { interface, ip, netmask } => Action::SetIp { interface, ip, netmask },
            Commands::BlockProtocol { interface, protocol } => {
                Action::BlockProtocol { interface, protocol }
            }
            Commands::EnableForwarding => Action::EnableForwarding,
            Commands::DisableForwarding => Action::DisableForwarding,
            Commands::ConfigureDns { interface, dns_server } => {
                Action::ConfigureDns { interface, server: dns_server }
            }
            Commands::ConfigureNat { interface } => Action::ConfigureNat { interface },
            Commands::BlockIp { interface, ip } => Action::BlockIp { interface, ip },
            Commands::FirewallStatus => Action::FirewallStatus,
            Commands::Promisc { interface, toggle } => {
                Action::Promisc { interface, enable: toggle.enabled() }
            }
            Commands::ConfigureVlan { interface, vlan_id } => {
                Action::ConfigureVlan { interface, vlan_id }
            }
            Commands::SetMtu { interface, mtu } => Action::SetMtu { interface, mtu },
            Commands::ConfigureQos { interface, rate } => Action::ConfigureQos { interface, rate },
        }
    }
}

/// Prints each line the moment the dispatcher produces it
struct Console;

impl Reporter for Console {
    fn info(&mut self, message: &str) {
        println!("[INFO] {}", message);
    }

    fn output(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// `2025-01-31 14:02:11,532` in local time
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"))
    }
}

/// Send log lines to the configured log file, appending
fn init_logging(config: &PwnixConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.log_level);
    let filter = EnvFilter::try_from_env("PWNIX_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    let writer = match OpenOptions::new().create(true).append(true).open(&config.log_file) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            eprintln!("[WARN] Cannot open log file {}: {}", config.log_file.display(), e);
            BoxMakeWriter::new(std::io::sink)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(false)
        .init();
}

/// Log the failure once, then show it on stderr
fn report_error(e: &PwnixError) {
    error!("{}", e);
    eprintln!("[ERROR] {}", e);
    if let Some(stderr) = e.command_stderr() {
        error!("Error output: {}", stderr);
        eprintln!("[ERROR] Error output: {}", stderr);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match PwnixConfig::discover(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            process::exit(1);
        }
    };
    init_logging(&config, cli.log_level.as_deref());

    let action = Action::from(cli.command);
    let sys = HostSystem::new();
    let dispatcher = Dispatcher::new(&sys, &config);

    if let Err(e) = dispatcher.dispatch(&action, &mut Console).await {
        report_error(&e);
        process::exit(1);
    }
}
