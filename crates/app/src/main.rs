//! Entry point for `hamming-relay`.
//!
//! Parses arguments and either serves `POST /code` over HTTP or runs an
//! offline simulation. All codec and channel work is delegated to
//! `hamming-relay-core`; `main.rs` owns only process setup (logging,
//! argument parsing, wiring).

mod config;
mod input_gen;
mod relays;
mod server;

use config::{Command, Config};
use hamming_relay_core::metrics::Metrics;
use hamming_relay_core::relay::{InlineSpawner, RelayDispatcher, ThreadSpawner};
use hamming_relay_core::{RelayPipeline, RelayService};
use relays::{HttpRelay, LogRelay};
use server::AppState;
use std::sync::Arc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG to control verbosity.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args).map_err(anyhow::Error::msg)? {
        Command::Run(config) => config,
        Command::Help => {
            config::print_help();
            return Ok(());
        }
    };

    if config.print_config {
        config.print();
    }
    log::info!("random seed {}", config.seed);

    match config.simulate {
        Some(count) => simulate(&config, count),
        None => run_server(&config),
    }
}

fn run_server(config: &Config) -> anyhow::Result<()> {
    let metrics = Arc::new(Metrics::new());
    let relay = HttpRelay::new(
        config.relay_url.clone(),
        Duration::from_millis(config.relay_timeout_ms),
    );
    let dispatcher = RelayDispatcher::new(Arc::new(relay), Arc::new(ThreadSpawner), Arc::clone(&metrics));
    let service = RelayService::new(RelayPipeline::new(config.pipeline, metrics), dispatcher);

    server::serve(&config.listen, Arc::new(AppState::new(service, config.seed)))
}

fn simulate(config: &Config, count: usize) -> anyhow::Result<()> {
    let metrics = Arc::new(Metrics::new());
    let dispatcher = RelayDispatcher::new(Arc::new(LogRelay), Arc::new(InlineSpawner), Arc::clone(&metrics));
    let service = RelayService::new(RelayPipeline::new(config.pipeline, Arc::clone(&metrics)), dispatcher);
    let state = AppState::new(service, config.seed);

    for segment in input_gen::generate_segments(config.seed, count) {
        let body = serde_json::to_vec(&segment)?;
        let reply = state.handle_body(&body);
        log::debug!("segment {} -> {} {}", segment.segment_number, reply.status, reply.body);
    }

    metrics.snapshot().print_summary();
    Ok(())
}
