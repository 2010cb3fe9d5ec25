//! Suggestion state machine: pending is the only non-terminal state, and
//! terminal decisions survive both repeat validations and datastore merges.

use chrono::{TimeZone, Utc};

use jarvys_interface::suggestions::{SuggestionBoard, ValidateOutcome};
use jarvys_interface::types::{Suggestion, SuggestionStatus};

fn suggestion(id: &str, status: SuggestionStatus) -> Suggestion {
    Suggestion {
        id: id.to_string(),
        title: format!("title {id}"),
        description: "desc".to_string(),
        priority: 2,
        status,
        created_at: Utc.with_ymd_and_hms(2026, 8, 25, 9, 0, 0).unwrap(),
        estimated_effort: Some("2h".to_string()),
    }
}

#[tokio::test]
async fn approve_transitions_pending_and_applies_priority() {
    let board = SuggestionBoard::new();
    board.merge(vec![suggestion("s1", SuggestionStatus::Pending)]).await;

    match board.validate("s1", SuggestionStatus::Approved, Some(1)).await {
        ValidateOutcome::Applied(s) => {
            assert_eq!(s.status, SuggestionStatus::Approved);
            assert_eq!(s.priority, 1);
        }
        other => panic!("expected Applied, got {other:?}"),
    }
}

#[tokio::test]
async fn terminal_states_are_unaffected_by_later_validations() {
    let board = SuggestionBoard::new();
    board.merge(vec![suggestion("s1", SuggestionStatus::Pending)]).await;
    board.validate("s1", SuggestionStatus::Approved, None).await;

    // Opposite action: no-op that reports the unchanged state.
    match board.validate("s1", SuggestionStatus::Rejected, None).await {
        ValidateOutcome::Noop(s) => assert_eq!(s.status, SuggestionStatus::Approved),
        other => panic!("expected Noop, got {other:?}"),
    }
    // Same action again: also a no-op.
    match board.validate("s1", SuggestionStatus::Approved, None).await {
        ValidateOutcome::Noop(s) => assert_eq!(s.status, SuggestionStatus::Approved),
        other => panic!("expected Noop, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_id_is_reported_not_invented() {
    let board = SuggestionBoard::new();
    assert!(matches!(
        board.validate("ghost", SuggestionStatus::Rejected, None).await,
        ValidateOutcome::Unknown
    ));
}

#[tokio::test]
async fn merge_does_not_resurrect_decided_suggestions() {
    let board = SuggestionBoard::new();
    board.merge(vec![suggestion("s1", SuggestionStatus::Pending)]).await;
    board.validate("s1", SuggestionStatus::Rejected, None).await;

    // A stale datastore row still says pending.
    board.merge(vec![suggestion("s1", SuggestionStatus::Pending)]).await;
    let all = board.all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, SuggestionStatus::Rejected);
}

#[tokio::test]
async fn list_is_unfiltered_and_newest_first() {
    let board = SuggestionBoard::new();
    let mut older = suggestion("old", SuggestionStatus::Pending);
    older.created_at = Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap();
    board.merge(vec![older, suggestion("new", SuggestionStatus::Pending)]).await;
    board.validate("old", SuggestionStatus::Approved, None).await;

    let all = board.all().await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, "new");
    assert_eq!(all[1].id, "old");
    assert_eq!(all[1].status, SuggestionStatus::Approved);
}
