//! vportmgrd - VM Network Port Manager Daemon
//!
//! Entry point for the vportmgrd daemon. Loads the driver configuration,
//! constructs the provisioner over the real switch gateway, and waits
//! for port operations from the task-dispatch layer.

use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use ovsnet_vportmgrd::{DriverConfig, OvsSwitch, PortMgr};

/// Environment variable naming the JSON driver configuration file.
const CONFIG_ENV: &str = "VPORTMGRD_CONFIG";

/// Initializes tracing/logging subsystem
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Loads the driver configuration, falling back to defaults when no
/// config file is named.
fn load_config() -> anyhow::Result<DriverConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {path}"))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {path}"))
        }
        Err(_) => Ok(DriverConfig::default()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("--- Starting vportmgrd ---");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        emulated = config.emulated,
        native_attach = config.native_attach,
        backbone = %config.backbone_bridge,
        "Driver configuration loaded"
    );

    let _mgr = PortMgr::new(OvsSwitch::new(), config)
        .with_ready_hook(|port| info!(port, "Interface ready"));

    // Port operations arrive through the external task-dispatch layer,
    // which owns the transport and invokes create/delete on this manager.
    info!("vportmgrd initialization complete");

    ExitCode::SUCCESS
}
