//! One-shot command-line caller for the `TripScout` library.
//!
//! Reads a single travel query from the arguments, processes it, and
//! prints the response.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tripscout::{TripPlanner, TripScoutConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripScoutConfig::load().with_context(|| "Failed to load configuration")?;
    init_tracing(&config);

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        eprintln!("Usage: tripscout <travel query>");
        eprintln!("Example: tripscout \"I'm going to go to Bangalore, what is the temperature there?\"");
        std::process::exit(2);
    }

    let planner =
        TripPlanner::from_config(&config).with_context(|| "Failed to build trip planner")?;

    let response = planner.process_request(&query).await;
    println!("{response}");

    Ok(())
}

fn init_tracing(config: &TripScoutConfig) {
    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
