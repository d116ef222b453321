//! Multi-cycle poll scenarios against the mock ladder source.
//!
//! Cycles are driven directly (no interval timer), so many simulated
//! cycles run with no wall-clock delay.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use poe2_rank_tracker::ladder::PAGE_LIMIT;
use poe2_rank_tracker::output::OutputWriter;
use poe2_rank_tracker::tracker::Tracker;
use poe2_rank_tracker::types::{
    CharacterStatus, GameMode, LadderQuery, League, PollOutcome, TrackerError,
};

use crate::mock_source::{entry, entry_with_status, MockLadderSource};

fn query(character: &str) -> LadderQuery {
    LadderQuery {
        league: League {
            mode: GameMode::Standard,
            event: false,
        },
        character: character.to_string(),
    }
}

fn tracker_in(
    dir: &tempfile::TempDir,
    source: Arc<MockLadderSource>,
    character: &str,
) -> Tracker {
    let writer = OutputWriter::new(dir.path().join("poe2_rank.txt"));
    Tracker::new(source, query(character), writer)
}

fn read_output(dir: &tempfile::TempDir) -> String {
    std::fs::read_to_string(dir.path().join("poe2_rank.txt")).unwrap()
}

#[tokio::test]
async fn test_found_character_renders_rank_and_level() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(vec![
        entry("TopExile", 1, 100),
        entry("WibaBONK", 4, 92),
    ]));
    let tracker = tracker_in(&dir, source, "WibaBONK");

    let outcome = tracker.run_cycle().await;

    assert!(matches!(outcome, PollOutcome::Found(_)));
    assert_eq!(read_output(&dir), "Rank: 4 | Level: 92");
}

#[tokio::test]
async fn test_absent_character_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(vec![
        entry("TopExile", 1, 100),
        entry("WibaBONK", 4, 92),
    ]));
    let tracker = tracker_in(&dir, source, "Ghost");

    let outcome = tracker.run_cycle().await;

    assert_eq!(outcome, PollOutcome::NotFound);
    assert_eq!(read_output(&dir), "Character not found");
}

#[tokio::test]
async fn test_name_match_is_case_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(vec![entry("wiba", 3, 85)]));
    let tracker = tracker_in(&dir, source, "Wiba");

    let outcome = tracker.run_cycle().await;

    assert_eq!(outcome, PollOutcome::NotFound);
    assert_eq!(read_output(&dir), "Character not found");
}

#[tokio::test]
async fn test_dead_character_status_is_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(vec![entry_with_status(
        "RipVessel",
        7,
        31,
        CharacterStatus::Dead,
    )]));
    let tracker = tracker_in(&dir, source, "RipVessel");

    tracker.run_cycle().await;

    assert_eq!(read_output(&dir), "Rank: [DEAD] 7 | Level: 31");
}

#[tokio::test]
async fn test_rate_limit_does_not_stop_the_next_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(vec![entry("WibaBONK", 4, 92)]));
    let tracker = tracker_in(&dir, source.clone(), "WibaBONK");

    source.set_error(TrackerError::RateLimited { retry_after: 30 });
    let first = tracker.run_cycle().await;
    assert_eq!(
        first,
        PollOutcome::Failed(TrackerError::RateLimited { retry_after: 30 })
    );
    assert_eq!(read_output(&dir), "Error: rate limited, retry after 30s");

    // The next cycle runs normally once the upstream recovers.
    source.clear_error();
    let second = tracker.run_cycle().await;
    assert!(matches!(second, PollOutcome::Found(_)));
    assert_eq!(read_output(&dir), "Rank: 4 | Level: 92");
}

#[tokio::test]
async fn test_expired_token_is_a_soft_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(vec![entry("WibaBONK", 4, 92)]));
    let tracker = tracker_in(&dir, source.clone(), "WibaBONK");

    source.set_error(TrackerError::TokenRejected { status: 401 });
    let outcome = tracker.run_cycle().await;

    assert_eq!(
        outcome,
        PollOutcome::Failed(TrackerError::TokenRejected { status: 401 })
    );
    assert_eq!(
        read_output(&dir),
        "Error: authentication rejected (HTTP 401), token may have expired"
    );
}

#[tokio::test]
async fn test_output_always_holds_exactly_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(vec![entry("WibaBONK", 4, 92)]));
    let tracker = tracker_in(&dir, source.clone(), "WibaBONK");

    tracker.run_cycle().await;
    source.set_error(TrackerError::EmptyLadder);
    tracker.run_cycle().await;
    source.clear_error();
    tracker.run_cycle().await;

    let content = read_output(&dir);
    assert_eq!(content, "Rank: 4 | Level: 92");
    assert!(!content.contains('\n'));
}

#[tokio::test]
async fn test_character_on_second_page_is_found() {
    let mut entries: Vec<_> = (0..PAGE_LIMIT)
        .map(|i| entry(&format!("Exile{i}"), i + 1, 95))
        .collect();
    entries.push(entry("WibaBONK", PAGE_LIMIT + 6, 92));

    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(entries));
    let tracker = tracker_in(&dir, source.clone(), "WibaBONK");

    let outcome = tracker.run_cycle().await;

    match outcome {
        PollOutcome::Found(found) => {
            assert_eq!(found.rank, PAGE_LIMIT + 6);
            assert_eq!(found.level, 92);
        }
        other => panic!("expected a match, got {other:?}"),
    }
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_duplicate_names_earliest_wins() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(vec![
        entry("Twin", 2, 95),
        entry("Twin", 9, 80),
    ]));
    let tracker = tracker_in(&dir, source, "Twin");

    tracker.run_cycle().await;

    assert_eq!(read_output(&dir), "Rank: 2 | Level: 95");
}

#[tokio::test]
async fn test_empty_ladder_yields_error_record() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockLadderSource::new(Vec::new()));
    let tracker = tracker_in(&dir, source, "WibaBONK");

    let outcome = tracker.run_cycle().await;

    assert_eq!(outcome, PollOutcome::Failed(TrackerError::EmptyLadder));
    assert_eq!(read_output(&dir), "Error: ladder returned no entries");
}
