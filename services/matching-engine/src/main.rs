//! Matching engine process
//!
//! Serves the JSON line protocol on stdin/stdout. Logs go to stderr.
//! Usage: `matching-engine [config.json]`

use std::io::{self, BufRead, Write};

use anyhow::Context;
use matching_engine::{protocol, EngineConfig, MatchingEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("loading engine config from {path}"))?,
        None => EngineConfig::default(),
    };

    let engine = MatchingEngine::new(config)?;
    tracing::info!("Matching engine ready, reading requests from stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut served: u64 = 0;

    for line in stdin.lock().lines() {
        let line = line.context("reading request")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = protocol::handle_line(&engine, &line);
        writeln!(stdout, "{response}").context("writing response")?;
        stdout.flush()?;
        served += 1;
    }

    tracing::info!(requests = served, "Input closed, shutting down");
    Ok(())
}
