//! # Oracle Server
//!
//! Runs a flight-status oracle pool against the in-memory simulated
//! ledger: registers the pool, dispatches incoming requests, and fires
//! a periodic demo request as a stand-in for the dapp.
//!
//! ```text
//! request generator ──→ SimLedger ──OracleRequest──→ PoolSupervisor
//!                           ↑                              │
//!                           └────── oracle responses ──────┘
//! ```
//!
//! Configuration comes from `SURETY_*` environment variables; see
//! `config.rs`. Stop with Ctrl+C for a graceful drain.

mod config;

use anyhow::{Context, Result};
use ledger_sim::SimLedger;
use oracle_pool::{OraclePoolApi, PoolSupervisor, RandomFlightStatus};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use surety_types::{Address, FlightKey};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::ServerConfig;

/// Demo flights the request generator cycles through.
const DEMO_FLIGHTS: [&str; 3] = ["ND1309", "BA2490", "LH0400"];

fn generate_accounts(count: usize) -> Vec<Address> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let mut address = [0u8; 20];
            rng.fill(&mut address);
            address
        })
        .collect()
}

/// Fires a flight-status request every few seconds until signalled.
async fn request_generator(
    ledger: Arc<SimLedger>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let airline: Address = [0xA1; 20];
    let mut interval = tokio::time::interval(Duration::from_secs(5));
    let mut round = 0usize;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let number = DEMO_FLIGHTS[round % DEMO_FLIGHTS.len()];
                let timestamp = 1_700_000_000 + round as u64 * 3600;
                let offset = ledger.request_flight_status(FlightKey::new(airline, number, timestamp));
                info!(flight = number, offset, "Demo flight-status request published");
                round += 1;
            }
            _ = shutdown.changed() => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("SURETY_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install logging subscriber")?;

    let config = ServerConfig::from_env();
    info!(
        pool_size = config.pool.pool_size,
        concurrency = config.pool.concurrency_limit,
        "Starting oracle server"
    );

    let ledger = Arc::new(SimLedger::new());
    let accounts = generate_accounts(config.pool.pool_size);
    let supervisor = Arc::new(
        PoolSupervisor::new(config.pool, ledger.clone(), Arc::new(RandomFlightStatus))
            .context("Invalid pool configuration")?,
    );
    supervisor
        .start(&accounts)
        .await
        .context("Oracle pool failed to start")?;

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    let generator = tokio::spawn(request_generator(ledger.clone(), stop_rx));

    info!("Oracle server running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    let _ = stop_tx.send(true);
    let _ = generator.await;
    supervisor.stop().await;

    let status = supervisor.status();
    info!(
        registered = status.registered,
        failed = status.failed,
        requests = status.requests_processed,
        issued = status.submissions_issued,
        submission_failures = status.submissions_failed,
        abandoned = status.submissions_abandoned,
        "Oracle server stopped"
    );
    Ok(())
}
