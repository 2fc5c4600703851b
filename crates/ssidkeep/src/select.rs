//! Interactive network selection.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use ssidkeep_core::{CommandRunner, NetworkRecord, NetworkScanner};
use std::io::{self, Write};

/// Numbered table of visible networks.
pub fn print_network_table(networks: &[NetworkRecord]) {
    println!();
    println!(
        "  {}",
        format!("{:<5} {:<32} {}", "No", "Network", "BSSID").bold()
    );
    for (i, network) in networks.iter().enumerate() {
        let bssid = if network.bssid.is_empty() {
            "-".to_string()
        } else {
            network.bssid.clone()
        };
        println!("  {:<5} {:<32} {}", i + 1, network.ssid, bssid.dimmed());
    }
    println!();
}

/// Scan and let the user pick a network by number. `r` rescans, networks
/// come and go while the prompt is open. Loops until a valid choice is made
/// or stdin closes.
pub async fn pick_network<R: CommandRunner>(scanner: &NetworkScanner<R>) -> Result<String> {
    loop {
        println!("{}", "Scanning for networks...".dimmed());
        let networks = scanner.scan().await;

        if networks.is_empty() {
            println!(
                "{}",
                "No networks visible yet. Press Enter to rescan.".yellow()
            );
            read_line()?;
            continue;
        }

        print_network_table(&networks);

        loop {
            print!(
                "Pick a network [{}], or {} to rescan: ",
                format!("1-{}", networks.len()).bold(),
                "r".bold()
            );
            io::stdout().flush().context("flushing stdout")?;

            let line = read_line()?;
            let choice = line.trim();

            if choice.eq_ignore_ascii_case("r") {
                break;
            }
            match choice.parse::<usize>() {
                Ok(n) if n >= 1 && n <= networks.len() => {
                    return Ok(networks[n - 1].ssid.clone());
                }
                _ => {
                    println!("{}", "Not a valid choice.".red());
                }
            }
        }
    }
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    let bytes = io::stdin()
        .read_line(&mut line)
        .context("reading from stdin")?;
    if bytes == 0 {
        anyhow::bail!("stdin closed before a network was chosen");
    }
    Ok(line)
}
