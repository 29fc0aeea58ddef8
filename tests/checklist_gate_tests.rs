//! Checklist gate tests
//!
//! Blocking decisions, blocking-index derivation, the toggle protocol with
//! conflict recovery, completion detection, and stale-document discard.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use chunkview::classify::{classify, ChunkMaps};
use chunkview::error::ChunkviewError;
use chunkview::gate::{ChecklistGate, GateNotice, ToggleApplied, ToggleResponse};
use chunkview::types::{Checklist, DocumentKey};
use common::{checklist, checklist_performed_by, html_chunks, revision_log};

fn document() -> DocumentKey {
    DocumentKey::new("binder-1", "publication-1")
}

/// Three chunks; chunk 1 carries checklist "a" via chunk id "c1".
fn maps_and_checklists() -> (ChunkMaps, Vec<Checklist>) {
    let chunks = html_chunks(3);
    let log = revision_log(&["c0", "c1", "c2"]);
    let checklists = vec![checklist("a", "c1", false)];
    let maps = classify(&chunks, Some(&log), Some(&checklists), &[]);
    (maps, checklists)
}

fn loaded_gate(blocking: bool) -> (ChecklistGate, ChunkMaps) {
    let (maps, checklists) = maps_and_checklists();
    let mut gate = ChecklistGate::new(document(), blocking);
    gate.load(checklists);
    (gate, maps)
}

// =============================================================================
// BLOCKING
// =============================================================================

#[test]
fn blocks_at_bottom_of_unperformed_checklist_chunk() {
    let (mut gate, maps) = loaded_gate(true);
    assert!(gate.should_block_scroll(&maps, 1, 3, true));
    assert_eq!(gate.blocking_chunk_index(&maps), Some(1));
    assert_eq!(gate.drain_notices(), vec![GateNotice::ProgressBlocked]);
}

#[test]
fn warning_raised_once_per_attempt() {
    let (mut gate, maps) = loaded_gate(true);
    assert!(gate.should_block_scroll(&maps, 1, 3, true));
    assert!(gate.should_block_scroll(&maps, 1, 3, true));
    assert_eq!(gate.drain_notices(), vec![GateNotice::ProgressBlocked]);
    assert!(gate.warning_shown());

    gate.hide_progress_warning();
    assert!(!gate.warning_shown());
    assert_eq!(gate.drain_notices(), vec![GateNotice::ProgressWarningCleared]);

    // A new attempt raises it again.
    assert!(gate.should_block_scroll(&maps, 1, 3, true));
    assert_eq!(gate.drain_notices(), vec![GateNotice::ProgressBlocked]);
}

#[test]
fn no_block_without_the_feature() {
    let (mut gate, maps) = loaded_gate(false);
    assert!(!gate.should_block_scroll(&maps, 1, 3, true));
}

#[test]
fn no_block_away_from_bottom() {
    let (mut gate, maps) = loaded_gate(true);
    assert!(!gate.should_block_scroll(&maps, 1, 3, false));
}

#[test]
fn no_block_on_last_chunk() {
    let chunks = html_chunks(2);
    let log = revision_log(&["c0", "c1"]);
    let checklists = vec![checklist("a", "c1", false)];
    let maps = classify(&chunks, Some(&log), Some(&checklists), &[]);
    let mut gate = ChecklistGate::new(document(), true);
    gate.load(checklists);
    // Chunk 1 is the last chunk; reading it to the bottom must stay free.
    assert!(!gate.should_block_scroll(&maps, 1, 2, true));
}

#[test]
fn no_block_on_performed_checklist() {
    let chunks = html_chunks(3);
    let log = revision_log(&["c0", "c1", "c2"]);
    let checklists = vec![checklist("a", "c1", true)];
    let maps = classify(&chunks, Some(&log), Some(&checklists), &[]);
    let mut gate = ChecklistGate::new(document(), true);
    gate.load(checklists);
    assert!(!gate.should_block_scroll(&maps, 1, 3, true));
    assert_eq!(gate.blocking_chunk_index(&maps), None);
}

#[test]
fn blocking_index_is_a_pure_scan() {
    let chunks = html_chunks(4);
    let log = revision_log(&["c0", "c1", "c2", "c3"]);
    let mut gate = ChecklistGate::new(document(), true);
    gate.load(vec![checklist("a", "c1", true), checklist("b", "c3", false)]);
    let maps = classify(
        &chunks,
        Some(&log),
        Some(&[checklist("a", "c1", true), checklist("b", "c3", false)]),
        &[],
    );
    assert_eq!(gate.blocking_chunk_index(&maps), Some(3));

    // A checklist behind the old blocking index flipping back to unperformed
    // (not reachable through this UI, but possible server-side) simply moves
    // the scan result backward without any cached state to invalidate.
    gate.load(vec![checklist("a", "c1", false), checklist("b", "c3", false)]);
    assert_eq!(gate.blocking_chunk_index(&maps), Some(1));
}

// =============================================================================
// TOGGLE PROTOCOL
// =============================================================================

#[test]
fn toggle_applies_server_truth() {
    let (mut gate, _maps) = loaded_gate(true);
    let pending = gate.begin_toggle("a", true).unwrap().unwrap();
    let applied = gate
        .resolve_toggle(pending, ToggleResponse::Updated(checklist("a", "c1", true)))
        .unwrap();
    assert!(matches!(
        applied,
        ToggleApplied::Applied {
            conflict_with: None,
            ..
        }
    ));
    assert!(gate.checklist_by_chunk_id("c1").unwrap().performed);
}

#[test]
fn conflict_merges_authoritative_state_and_names_the_performer() {
    let (mut gate, _maps) = loaded_gate(true);
    let pending = gate.begin_toggle("a", true).unwrap().unwrap();

    let authoritative = checklist_performed_by("a", "c1", true, "Alice");
    let applied = gate
        .resolve_toggle(pending, ToggleResponse::AlreadyInThatState(authoritative))
        .unwrap();

    let ToggleApplied::Applied {
        checklist,
        conflict_with,
    } = applied
    else {
        panic!("conflict must still apply");
    };
    assert!(checklist.performed);
    assert_eq!(conflict_with.as_deref(), Some("Alice"));

    // Mirror carries the authoritative state including history.
    let mirrored = gate.checklist_by_chunk_id("c1").unwrap();
    assert!(mirrored.performed);
    assert_eq!(mirrored.performed_history.len(), 1);

    let notices = gate.drain_notices();
    assert!(notices.iter().any(|n| matches!(
        n,
        GateNotice::ChecklistConflict { last_performer, performed: true }
            if last_performer == "Alice"
    )));
}

#[test]
fn other_failures_propagate() {
    let (mut gate, _maps) = loaded_gate(true);
    let pending = gate.begin_toggle("a", true).unwrap().unwrap();
    let err = gate
        .resolve_toggle(pending, ToggleResponse::Failed("boom".to_owned()))
        .unwrap_err();
    assert!(matches!(err, ChunkviewError::ToggleFailed(reason) if reason == "boom"));
    // The optimistic mirror was never touched.
    assert!(!gate.checklist_by_chunk_id("c1").unwrap().performed);
}

#[test]
fn duplicate_toggle_for_same_id_refused() {
    let (mut gate, _maps) = loaded_gate(true);
    let first = gate.begin_toggle("a", true).unwrap();
    assert!(first.is_some());
    let err = gate.begin_toggle("a", true).unwrap_err();
    assert!(matches!(err, ChunkviewError::ToggleInFlight(id) if id == "a"));
}

#[test]
fn distinct_ids_may_be_in_flight_concurrently() {
    let chunks = html_chunks(3);
    let log = revision_log(&["c0", "c1", "c2"]);
    let checklists = vec![checklist("a", "c1", false), checklist("b", "c2", false)];
    let _maps = classify(&chunks, Some(&log), Some(&checklists), &[]);
    let mut gate = ChecklistGate::new(document(), true);
    gate.load(checklists);

    let first = gate.begin_toggle("a", true).unwrap().unwrap();
    let second = gate.begin_toggle("b", true).unwrap().unwrap();

    // Responses apply in resolution order, not issue order.
    gate.resolve_toggle(second, ToggleResponse::Updated(checklist("b", "c2", true)))
        .unwrap();
    gate.resolve_toggle(first, ToggleResponse::Updated(checklist("a", "c1", true)))
        .unwrap();
    assert!(gate.checklists().iter().all(|c| c.performed));
}

#[test]
fn unknown_checklist_refused() {
    let (mut gate, _maps) = loaded_gate(true);
    let err = gate.begin_toggle("nope", true).unwrap_err();
    assert!(matches!(err, ChunkviewError::UnknownChecklist(id) if id == "nope"));
}

#[test]
fn fully_performed_collection_is_read_only() {
    let mut gate = ChecklistGate::new(document(), true);
    gate.load(vec![checklist("a", "c1", true)]);
    assert!(gate.is_reset());
    assert!(gate.begin_toggle("a", false).unwrap().is_none());
}

#[test]
fn stale_document_response_is_discarded() {
    let (mut gate, _maps) = loaded_gate(true);
    let pending = gate.begin_toggle("a", true).unwrap().unwrap();

    // The reader switched documents while the request was in flight.
    let mut replacement = ChecklistGate::new(DocumentKey::new("binder-2", "publication-2"), true);
    replacement.load(vec![checklist("a", "c1", false)]);
    let applied = replacement
        .resolve_toggle(pending, ToggleResponse::Updated(checklist("a", "c1", true)))
        .unwrap();
    assert!(matches!(applied, ToggleApplied::StaleDocument));
    assert!(!replacement.checklist_by_chunk_id("c1").unwrap().performed);
}

// =============================================================================
// COMPLETION
// =============================================================================

#[test]
fn performing_the_last_unperformed_checklist_records_completion() {
    let mut gate = ChecklistGate::new(document(), true);
    gate.load(vec![checklist("a", "c1", true), checklist("b", "c2", false)]);
    let _pending = gate.begin_toggle("b", true).unwrap().unwrap();
    assert!(gate
        .drain_notices()
        .contains(&GateNotice::ChecklistCompleted));
}

#[test]
fn no_completion_while_others_remain() {
    let mut gate = ChecklistGate::new(document(), true);
    gate.load(vec![checklist("a", "c1", false), checklist("b", "c2", false)]);
    let _pending = gate.begin_toggle("b", true).unwrap().unwrap();
    assert!(!gate
        .drain_notices()
        .contains(&GateNotice::ChecklistCompleted));
}

#[test]
fn unperforming_never_records_completion() {
    let mut gate = ChecklistGate::new(document(), true);
    gate.load(vec![checklist("a", "c1", true), checklist("b", "c2", false)]);
    let _pending = gate.begin_toggle("b", false).unwrap().unwrap();
    assert!(!gate
        .drain_notices()
        .contains(&GateNotice::ChecklistCompleted));
}
