//! Subcommand handlers.

use crate::config::KeeperConfig;
use crate::select;
use anyhow::Result;
use owo_colors::OwoColorize;
use ssidkeep_core::{
    parse, CommandRunner, CommandSet, ConnectionEnforcer, EnforcementTarget, NetworkScanner,
    Platform, QueryKind, RadioController, RadioState, ShellRunner, StatusEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::warn;

fn shell_runner(platform: Platform, config: &KeeperConfig) -> Arc<ShellRunner> {
    let commands = CommandSet::new(platform, config.interface_names());
    Arc::new(ShellRunner::new(commands).with_timeout(config.command_timeout()))
}

/// `ssidkeep scan`: list networks currently in range.
pub async fn scan(platform: Platform, config: &KeeperConfig) -> Result<()> {
    let runner = shell_runner(platform, config);
    let scanner = NetworkScanner::new(runner, platform);
    let networks = scanner.scan().await;

    if networks.is_empty() {
        println!("{}", "No Wi-Fi networks visible.".yellow());
        return Ok(());
    }
    select::print_network_table(&networks);
    Ok(())
}

/// `ssidkeep status`: one-shot radio power and association report.
pub async fn status(platform: Platform, config: &KeeperConfig) -> Result<()> {
    let runner = shell_runner(platform, config);
    let radio = RadioController::new(Arc::clone(&runner), platform);

    print!("{:<12}", "Radio:");
    match radio.state().await {
        Ok(RadioState::Enabled) => println!("{}", "enabled".green()),
        Ok(RadioState::Disabled) => println!("{}", "disabled".red()),
        Ok(RadioState::Unknown) => println!("{}", "unknown".yellow()),
        Err(e) => println!("{} ({})", "query failed".red(), e),
    }

    print!("{:<12}", "Network:");
    match runner.query(QueryKind::CurrentConnection).await {
        Ok(raw) => match parse::connection_status(platform, &raw).ssid {
            Some(ssid) => println!("{}", ssid.bright_cyan()),
            None => println!("{}", "not connected".yellow()),
        },
        Err(e) => println!("{} ({})", "query failed".red(), e),
    }

    Ok(())
}

/// `ssidkeep monitor`: pin this machine to a network and keep it there
/// until Ctrl-C.
pub async fn monitor(
    platform: Platform,
    config: &KeeperConfig,
    ssid: Option<String>,
    interval_secs: Option<u64>,
    settle_secs: Option<u64>,
) -> Result<()> {
    let runner = shell_runner(platform, config);
    let poll_interval = Duration::from_secs(interval_secs.unwrap_or(config.poll_interval_secs));
    let settle = Duration::from_secs(settle_secs.unwrap_or(config.settle_secs));

    // Scans come back empty while the radio is off, so power up before any
    // target selection.
    let radio = RadioController::new(Arc::clone(&runner), platform).with_settle(settle);
    if radio.is_powered_down().await {
        println!("{}", "Wi-Fi radio is off, powering it up...".yellow());
        radio.power_up().await?;
    }

    let ssid = match ssid.or_else(|| config.target_ssid.clone()) {
        Some(s) => s,
        None => {
            let scanner = NetworkScanner::new(Arc::clone(&runner), platform);
            select::pick_network(&scanner).await?
        }
    };
    let target = EnforcementTarget::new(ssid)?;

    println!(
        "Keeping this machine on {}. Press Ctrl-C to stop.",
        target.ssid().bright_cyan().bold()
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = stop_tx.send(true);
            }
            Err(e) => warn!("could not install Ctrl-C handler: {}", e),
        }
    });

    let mut enforcer = ConnectionEnforcer::new(Arc::clone(&runner), platform, target)
        .with_poll_interval(poll_interval)
        .with_settle(settle);

    let mut events = enforcer.events();
    let printer = tokio::spawn(async move {
        while let Some(stamped) = events.recv().await {
            let line = format!("[{}] {}", stamped.at.format("%H:%M:%S"), stamped.event);
            match stamped.event {
                StatusEvent::AllGood { .. } => println!("{}", line.green()),
                StatusEvent::CycleError { .. } => println!("{}", line.red()),
                _ => println!("{}", line.yellow()),
            }
        }
    });

    enforcer.run(stop_rx).await;
    printer.abort();

    println!("{}", "Stopped.".dimmed());
    Ok(())
}
