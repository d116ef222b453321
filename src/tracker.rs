//! Poll cycle: ladder scan and outcome classification.
//!
//! One cycle resolves the league, walks a bounded number of ladder pages
//! looking for the queried character, and hands the outcome to the output
//! writer. Every failure is contained in the cycle; the scheduler never
//! sees an error from here.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::ladder::{LadderSource, PAGE_LIMIT};
use crate::output::OutputWriter;
use crate::types::{LadderQuery, PollOutcome, TrackerError};

/// Upper bound on ladder pages walked per cycle.
const MAX_PAGES: u32 = 5;

/// Explicit per-process context: the data source, the immutable query,
/// and the output destination. Owned by the scheduler loop.
pub struct Tracker {
    source: Arc<dyn LadderSource>,
    query: LadderQuery,
    writer: OutputWriter,
}

impl Tracker {
    pub fn new(source: Arc<dyn LadderSource>, query: LadderQuery, writer: OutputWriter) -> Self {
        Self {
            source,
            query,
            writer,
        }
    }

    /// Run one poll cycle: scan the ladder, log the outcome, update the
    /// output file. A failed write is logged and retried implicitly on
    /// the next cycle.
    pub async fn run_cycle(&self) -> PollOutcome {
        let outcome = poll_once(self.source.as_ref(), &self.query).await;

        match &outcome {
            PollOutcome::Found(entry) => info!(
                character = %entry.name,
                rank = entry.rank,
                level = entry.level,
                status = ?entry.status,
                "Character found"
            ),
            PollOutcome::NotFound => warn!(
                character = %self.query.character,
                league = %self.query.league,
                "Character not found in ladder"
            ),
            PollOutcome::Failed(TrackerError::RateLimited { retry_after }) => warn!(
                retry_after_secs = retry_after,
                "Rate limited, keeping existing schedule"
            ),
            PollOutcome::Failed(err) => error!(error = %err, "Ladder poll failed"),
        }

        if let Err(err) = self.writer.write(&outcome) {
            error!(error = %err, "Failed to write output file");
        }

        outcome
    }
}

/// Walk the ladder pages for the queried league and locate the character.
///
/// Name comparison is exact and case-sensitive; the earliest returned
/// match wins. Paging stops on a short page, once the reported total is
/// covered, or at the page bound.
pub async fn poll_once(source: &dyn LadderSource, query: &LadderQuery) -> PollOutcome {
    info!(league = %query.league, "Checking ladder");

    let league_id = match source.resolve_league_id(&query.league).await {
        Ok(id) => id,
        Err(err) => return PollOutcome::Failed(err),
    };

    let mut offset = 0u32;
    for _ in 0..MAX_PAGES {
        let page = match source.fetch_page(&league_id, offset, PAGE_LIMIT).await {
            Ok(page) => page,
            Err(err) => return PollOutcome::Failed(err),
        };

        if offset == 0 && page.entries.is_empty() {
            return PollOutcome::Failed(TrackerError::EmptyLadder);
        }

        if let Some(entry) = page.entries.iter().find(|e| e.name == query.character) {
            return PollOutcome::Found(entry.clone());
        }

        let fetched = page.entries.len() as u32;
        offset += fetched;
        if fetched < PAGE_LIMIT {
            break;
        }
        if let Some(total) = page.total {
            if offset >= total {
                break;
            }
        }
    }

    PollOutcome::NotFound
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
