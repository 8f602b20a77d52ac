//! usb-uevent-monitor
//!
//! Listens on the kernel uevent channel and reports USB devices and
//! interfaces as they are added. Runs in the foreground until Ctrl+C or a
//! fatal channel error.

mod config;
mod netlink;
mod report;
mod worker;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use common::{UeventBridge, UeventEvent, create_uevent_bridge, setup_logging};
use config::MonitorConfig;
use netlink::UeventSocket;
use report::{OutputFormat, Reporter};
use std::io;
use std::thread::JoinHandle;
use tokio::signal;
use tracing::{error, info};
use worker::spawn_uevent_worker;

#[derive(Parser, Debug)]
#[command(name = "usb-uevent-monitor")]
#[command(author, version, about = "Report USB device additions from kernel uevents")]
#[command(long_about = "
Listens on the kernel's NETLINK_KOBJECT_UEVENT channel and prints a block
for every USB device or interface that is added. Joining the uevent
multicast group usually requires root.

EXAMPLES:
    # Watch with default settings
    sudo usb-uevent-monitor

    # Emit JSON lines for scripting
    sudo usb-uevent-monitor --format json

    # Trace every received uevent
    sudo usb-uevent-monitor --log-level trace

CONFIGURATION:
    The monitor looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usb-uevent-monitor/monitor.toml
    3. /etc/usb-uevent-monitor/monitor.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Receive buffer size in bytes (longer uevents are truncated)
    #[arg(short, long, value_name = "BYTES")]
    buffer_size: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(size) = self.buffer_size {
            config.monitor.buffer_size = size;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(level) = &self.log_level {
            config.monitor.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --save-config flag early (before loading config)
    if args.save_config {
        let config = MonitorConfig::default();
        let path = MonitorConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let mut config = if let Some(ref path) = args.config {
        MonitorConfig::load(&config::expand_path(path)).context("Failed to load configuration")?
    } else {
        MonitorConfig::load_or_default().context("Failed to load configuration")?
    };
    args.apply(&mut config);
    config.validate().context("Invalid command line option")?;

    setup_logging(&config.monitor.log_level).context("Failed to setup logging")?;

    info!("usb-uevent-monitor v{}", env!("CARGO_PKG_VERSION"));
    info!("Receive buffer: {} bytes", config.monitor.buffer_size);

    let socket = UeventSocket::open().context("Failed to open uevent channel")?;
    info!("Subscribed to uevent groups {:#x}", socket.groups());

    let (bridge, worker) = create_uevent_bridge();
    let worker_handle = spawn_uevent_worker(socket, config.monitor.buffer_size, worker)
        .context("Failed to spawn uevent receive thread")?;

    println!("Listening for USB uevents... (Ctrl+C to exit)");

    run(bridge, worker_handle, config.output.format).await
}

/// Report events until Ctrl+C or until the receive thread exits
async fn run(
    bridge: UeventBridge,
    worker_handle: JoinHandle<common::Result<()>>,
    format: OutputFormat,
) -> Result<()> {
    let mut reporter = Reporter::new(io::stdout(), format);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                match result {
                    Ok(()) => info!("Received Ctrl+C, shutting down"),
                    Err(e) => error!("Error waiting for Ctrl+C: {}", e),
                }
                // The receive thread stays blocked in the kernel; process exit releases it
                return Ok(());
            }
            event = bridge.recv_event() => match event {
                Ok(UeventEvent::UsbAdded(attrs)) => {
                    reporter.report(&attrs).context("Failed to write event")?;
                }
                Err(_) => return join_worker(worker_handle),
            },
        }
    }
}

/// Surface the reason the receive thread stopped
fn join_worker(handle: JoinHandle<common::Result<()>>) -> Result<()> {
    match handle.join() {
        Ok(Ok(())) => Err(anyhow!("Uevent receive thread exited unexpectedly")),
        Ok(Err(e)) => Err(e).context("Uevent receive loop failed"),
        Err(_) => Err(anyhow!("Uevent receive thread panicked")),
    }
}
