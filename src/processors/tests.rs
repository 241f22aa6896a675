//! Tests for list and merge processors

use super::*;
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: u64,
    rev: u32,
}

impl Row {
    fn new(id: u64) -> Self {
        Self { id, rev: 0 }
    }

    fn rev(id: u64, rev: u32) -> Self {
        Self { id, rev }
    }
}

impl Identifiable for Row {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

struct Tracker {
    delta: i64,
}

impl LocalEditsTracker for Tracker {
    fn local_edits_delta(&self) -> i64 {
        self.delta
    }

    fn add_local_edits_delta(&mut self, amount: i64) {
        self.delta += amount;
    }
}

fn rows(ids: impl IntoIterator<Item = u64>) -> Vec<Row> {
    ids.into_iter().map(Row::new).collect()
}

fn ids(items: &[Row]) -> Vec<u64> {
    items.iter().map(|r| r.id).collect()
}

// ============================================================================
// Merge: append
// ============================================================================

#[test]
fn test_append_concatenates() {
    let mut tracker = Tracker { delta: 0 };
    let mut current = rows([1, 2, 3]);

    MergeProcessor::append().apply(&mut tracker, &mut current, rows([3, 4]));

    assert_eq!(ids(&current), vec![1, 2, 3, 3, 4]); // no dedup
    assert_eq!(tracker.delta, 0);
}

// ============================================================================
// Merge: drop_same_ids
// ============================================================================

#[test]
fn test_drop_same_ids_prioritize_new() {
    let mut tracker = Tracker { delta: 0 };
    let mut current = vec![Row::rev(1, 0), Row::rev(2, 0), Row::rev(3, 0)];

    let merge = MergeProcessor::drop_same_ids(true);
    merge.apply(
        &mut tracker,
        &mut current,
        vec![Row::rev(2, 1), Row::rev(4, 1)],
    );

    assert_eq!(ids(&current), vec![1, 3, 2, 4]);
    // the incoming version of the duplicated id wins
    assert_eq!(current[2], Row::rev(2, 1));
}

#[test]
fn test_drop_same_ids_prioritize_existing() {
    let mut tracker = Tracker { delta: 0 };
    let mut current = vec![Row::rev(1, 0), Row::rev(2, 0)];

    let merge = MergeProcessor::drop_same_ids(false);
    merge.apply(
        &mut tracker,
        &mut current,
        vec![Row::rev(2, 1), Row::rev(3, 1)],
    );

    assert_eq!(ids(&current), vec![1, 2, 3]);
    // the already loaded version of the duplicated id is kept
    assert_eq!(current[1], Row::rev(2, 0));
}

#[test]
fn test_drop_same_ids_is_idempotent() {
    let mut tracker = Tracker { delta: 0 };
    let mut current = Vec::new();
    let merge = MergeProcessor::drop_same_ids(true);

    merge.apply(&mut tracker, &mut current, rows([1, 2, 3, 4]));
    merge.apply(&mut tracker, &mut current, rows([1, 2, 3, 4]));

    assert_eq!(ids(&current), vec![1, 2, 3, 4]);
}

#[test]
fn test_drop_same_ids_preserves_relative_order() {
    let mut tracker = Tracker { delta: 0 };
    let mut current = rows([10, 20, 30, 40]);

    let merge = MergeProcessor::drop_same_ids(true);
    merge.apply(&mut tracker, &mut current, rows([40, 10, 50]));

    // surviving existing items keep their order, then incoming in its order
    assert_eq!(ids(&current), vec![20, 30, 40, 10, 50]);
}

// ============================================================================
// List: filter
// ============================================================================

#[test]
fn test_filter_drops_and_tracks_delta() {
    let mut tracker = Tracker { delta: 0 };
    let mut items = rows(0..30);

    let processor = ListProcessor::filter(|r: &Row| r.id % 3 != 0);
    processor.apply(&mut tracker, &mut items);

    assert_eq!(items.len(), 20);
    assert_eq!(tracker.delta, -10);

    // a pass that drops nothing leaves the delta alone
    processor.apply(&mut tracker, &mut items);
    assert_eq!(tracker.delta, -10);
}

// ============================================================================
// List: sort
// ============================================================================

#[test]
fn test_sort_by() {
    let mut tracker = Tracker { delta: 0 };
    let mut items = rows([3, 1, 2]);

    ListProcessor::sort_by(|a: &Row, b: &Row| b.id.cmp(&a.id)).apply(&mut tracker, &mut items);

    assert_eq!(ids(&items), vec![3, 2, 1]);
    assert_eq!(tracker.delta, 0);
}

#[test]
fn test_sort_by_key() {
    let mut tracker = Tracker { delta: 0 };
    let mut items = rows([5, 1, 4, 2]);

    ListProcessor::sort_by_key(|r: &Row| r.id).apply(&mut tracker, &mut items);

    assert_eq!(ids(&items), vec![1, 2, 4, 5]);
}

#[test]
fn test_custom_processor_sees_tracker() {
    let mut tracker = Tracker { delta: 0 };
    let mut items = rows([1, 2]);

    let processor = ListProcessor::new(|tracker, items: &mut Vec<Row>| {
        items.truncate(1);
        tracker.add_local_edits_delta(-1);
    });
    processor.apply(&mut tracker, &mut items);

    assert_eq!(items.len(), 1);
    assert_eq!(tracker.local_edits_delta(), -1);
}
