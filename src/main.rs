//! Pairscout
//!
//! On-chain new pair discovery for BNB Smart Chain and Sui.
//! Runs one monitoring pass:
//! - scans every enabled network concurrently
//! - merges factory, liquidity and transfer signals (BNB) and Move events (Sui)
//! - stores pairs not seen before

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pairscout_chain::{AlloyEvmSource, SuiRpcClient};
use pairscout_core::{
    BnbScanSettings, BnbScanner, MemoryPairStore, Monitor, MonitorConfig, Network,
    NetworkScanner, SuiScanSettings, SuiScanner,
};

/// Environment variable names read by the binary itself.
mod env {
    pub const PRINT_JSON: &str = "PRINT_JSON";
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pairscout_core=debug,pairscout_chain=debug")),
        )
        .init();

    let config = MonitorConfig::load()?;
    config.log_config();

    let scanners = build_scanners(&config)?;
    let store = Arc::new(MemoryPairStore::new());
    let monitor = Monitor::new(scanners, store.clone(), config.admission.clone());

    info!("Starting monitoring pass");
    let report = monitor.run_once().await;

    for net in &report.networks {
        let network = net.network.map(|n| n.as_str()).unwrap_or("unknown");
        match &net.error {
            Some(error) => warn!(network = network, error = %error, "Network skipped"),
            None => info!(
                network = network,
                discovered = net.discovered,
                admitted = net.admitted,
                inserted = net.inserted,
                existing = net.skipped_existing,
                store_failures = net.store_failures,
                "Network summary"
            ),
        }
    }

    info!(
        discovered = report.total_discovered(),
        inserted = report.total_inserted(),
        stored = store.len(),
        "Monitoring pass complete"
    );

    if std::env::var(env::PRINT_JSON).map(|v| v == "1").unwrap_or(false) {
        println!("{}", serde_json::to_string_pretty(&report.inserted)?);
    }

    if !report.networks.is_empty() && report.failed_networks().count() == report.networks.len() {
        bail!("Every network scan failed");
    }

    Ok(())
}

/// Create the adapters and scanners for every enabled network.
fn build_scanners(config: &MonitorConfig) -> Result<Vec<Arc<dyn NetworkScanner>>> {
    let mut scanners: Vec<Arc<dyn NetworkScanner>> = Vec::new();

    for network in &config.networks {
        match network {
            Network::Bnb => {
                let source = AlloyEvmSource::new(&config.bnb.rpc_url, config.rpc_timeout())?;
                scanners.push(Arc::new(BnbScanner::new(
                    Arc::new(source),
                    config.bnb.signals(),
                    BnbScanSettings::from(&config.bnb),
                )));
            }
            Network::Sui => {
                let client = SuiRpcClient::new(config.sui.rpc_url.clone(), config.rpc_timeout())?;
                scanners.push(Arc::new(SuiScanner::new(
                    Arc::new(client),
                    config.sui.packages.clone(),
                    SuiScanSettings::from(&config.sui),
                )));
            }
        }
    }

    Ok(scanners)
}

fn print_banner() {
    println!(r#"
    ╔═╗┌─┐┬┬─┐┌─┐┌─┐┌─┐┬ ┬┌┬┐
    ╠═╝├─┤│├┬┘└─┐│  │ ││ │ │
    ╩  ┴ ┴┴┴└─└─┘└─┘└─┘└─┘ ┴
    New Pair Monitor v0.1.0
    "#);
}
