//! Shared types for the ladder tracker.
//!
//! These types form the data model used across all modules: the league
//! selector, ladder entries, per-cycle poll outcomes, and the domain
//! error enum.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// League selection
// ---------------------------------------------------------------------------

/// Game mode, as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Standard,
    #[value(name = "hc")]
    Hardcore,
    #[value(name = "ssf")]
    SoloSelfFound,
    #[value(name = "hcssf")]
    HardcoreSsf,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameMode::Standard => "standard",
            GameMode::Hardcore => "hc",
            GameMode::SoloSelfFound => "ssf",
            GameMode::HardcoreSsf => "hcssf",
        };
        write!(f, "{s}")
    }
}

/// A league selector: game mode plus whether the current event league
/// (Dawn of the Hunt) is tracked instead of the permanent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub mode: GameMode,
    pub event: bool,
}

impl League {
    /// The upstream display name for this league.
    pub fn name(&self) -> &'static str {
        match (self.event, self.mode) {
            (false, GameMode::Standard) => "Standard",
            (false, GameMode::Hardcore) => "Hardcore",
            (false, GameMode::SoloSelfFound) => "Solo Self-Found",
            (false, GameMode::HardcoreSsf) => "Hardcore SSF",
            (true, GameMode::Standard) => "Dawn of the Hunt",
            (true, GameMode::Hardcore) => "HC Dawn of the Hunt",
            (true, GameMode::SoloSelfFound) => "SSF Dawn of the Hunt",
            (true, GameMode::HardcoreSsf) => "HC SSF Dawn of the Hunt",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The immutable per-process query: which league to poll and which
/// character to look for. Name comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderQuery {
    pub league: League,
    pub character: String,
}

// ---------------------------------------------------------------------------
// Ladder entries
// ---------------------------------------------------------------------------

/// Hardcore death / retirement marker on a ladder entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterStatus {
    Dead,
    Retired,
}

impl fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterStatus::Dead => write!(f, "DEAD"),
            CharacterStatus::Retired => write!(f, "RETIRED"),
        }
    }
}

/// One character on the ladder. Transient: exists only within a poll
/// cycle and is discarded after the output record is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderEntry {
    pub rank: u32,
    pub name: String,
    pub level: u32,
    pub status: Option<CharacterStatus>,
}

// ---------------------------------------------------------------------------
// Poll outcomes
// ---------------------------------------------------------------------------

/// The result of one poll cycle. The output writer receives exactly one
/// of these per cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Found(LadderEntry),
    NotFound,
    Failed(TrackerError),
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Per-cycle errors. None of these are fatal: each is logged and written
/// into the output record, and the next cycle runs on schedule. Only the
/// startup token exchange escalates to process exit, and that path uses
/// `anyhow` directly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    #[error("network: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("authentication rejected (HTTP {status}), token may have expired")]
    TokenRejected { status: u16 },

    #[error("league '{0}' not found upstream")]
    LeagueNotFound(String),

    #[error("ladder returned no entries")]
    EmptyLadder,

    #[error("malformed ladder response: {0}")]
    Malformed(String),

    #[error("upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
