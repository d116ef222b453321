//! PoE2 Ladder Rank Tracker.
//!
//! Entry point. Parses the command line, initialises structured logging,
//! performs the one-shot OAuth token exchange, then polls the configured
//! ladder on a fixed interval until a termination signal arrives.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use poe2_rank_tracker::auth::{self, Credentials};
use poe2_rank_tracker::config::Args;
use poe2_rank_tracker::ladder::LadderClient;
use poe2_rank_tracker::output::OutputWriter;
use poe2_rank_tracker::tracker::Tracker;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let args = Args::parse();
    anyhow::ensure!(args.update > 0, "--update must be a positive interval in milliseconds");

    init_logging(args.debug);

    println!("This product isn't affiliated with or endorsed by Grinding Gear Games in any way.");

    let query = args.query();
    info!(
        character = %query.character,
        gamemode = %args.gamemode,
        league = %query.league,
        update_ms = args.update,
        output = %args.output.display(),
        "Starting PoE2 ladder tracker"
    );

    // -- One-shot token exchange (fatal on failure) ----------------------

    let creds = Credentials {
        client_id: args.client_id.clone(),
        client_secret: args.client_secret.clone(),
    };
    let token = auth::acquire(&creds).await.context(
        "Could not obtain an OAuth token. Register an application at \
         https://www.pathofexile.com/developer/docs/authorization and pass \
         --client-id / --client-secret",
    )?;

    // -- Assemble the tracker context ------------------------------------

    let client = LadderClient::new(token, args.debug)?;
    let writer = OutputWriter::new(args.output.clone());
    let tracker = Tracker::new(Arc::new(client), query, writer);

    // -- Main loop --------------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_millis(args.update));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_ms = args.update,
        "Entering poll loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                tracker.run_cycle().await;
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("Tracker stopped.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if debug {
        "poe2_rank_tracker=debug"
    } else {
        "poe2_rank_tracker=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let json_logging = std::env::var("POE2_TRACKER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
