//! Command-line configuration.
//!
//! All runtime configuration comes from the command line; the OAuth
//! credentials can also be supplied via environment variables (and a
//! `.env` file, loaded at startup).

use clap::Parser;
use std::path::PathBuf;

use crate::types::{GameMode, LadderQuery, League};

/// Path of Exile 2 ladder rank tracker for stream overlays.
#[derive(Parser, Debug, Clone)]
#[command(name = "poe2-rank-tracker", version)]
pub struct Args {
    /// Character name to search for (case-sensitive).
    pub character: String,

    /// OAuth client id for the PoE API.
    #[arg(long, env = "POE_CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret for the PoE API.
    #[arg(long, env = "POE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Game mode to check.
    #[arg(long, value_enum, default_value_t = GameMode::Standard)]
    pub gamemode: GameMode,

    /// Track the Dawn of the Hunt event league instead of the permanent one.
    #[arg(long)]
    pub doth: bool,

    /// Update interval in milliseconds.
    #[arg(long, default_value_t = 60_000)]
    pub update: u64,

    /// Output file path.
    #[arg(long, default_value = "poe2_rank.txt")]
    pub output: PathBuf,

    /// Enable debug logging and raw response dumps.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// The league selected by `--gamemode` and `--doth`.
    pub fn league(&self) -> League {
        League {
            mode: self.gamemode,
            event: self.doth,
        }
    }

    /// The immutable ladder query for this run.
    pub fn query(&self) -> LadderQuery {
        LadderQuery {
            league: self.league(),
            character: self.character.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
