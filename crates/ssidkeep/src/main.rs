//! ssidkeep - keeps a machine attached to the wireless network you choose.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ssidkeep::commands;
use ssidkeep::config::KeeperConfig;
use ssidkeep_core::Platform;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ssidkeep")]
#[command(about = "Keep this machine on one Wi-Fi network", long_about = None)]
#[command(version)]
struct Cli {
    /// Network stack to drive: windows, macos or linux. Defaults to the
    /// platform this binary was built for.
    #[arg(long, global = true)]
    platform: Option<String>,

    /// Alternate config file (default: ~/.config/ssidkeep/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the Wi-Fi networks currently in range
    Scan,

    /// Show radio power state and current association
    Status,

    /// Pin this machine to a network and keep it there
    Monitor {
        /// Target network; skips the interactive picker
        #[arg(long)]
        ssid: Option<String>,

        /// Seconds between checks
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Seconds to wait after radio and connect actions
        #[arg(long)]
        settle_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let platform = match &cli.platform {
        Some(raw) => raw
            .parse::<Platform>()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        None => Platform::detect(),
    };
    let config = KeeperConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan => commands::scan(platform, &config).await,
        Commands::Status => commands::status(platform, &config).await,
        Commands::Monitor {
            ssid,
            interval_secs,
            settle_secs,
        } => commands::monitor(platform, &config, ssid, interval_secs, settle_secs).await,
    }
}
