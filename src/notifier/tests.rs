//! Tests for the notifier module

use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: u64,
}

impl Identifiable for Row {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

// ============================================================================
// Operation Tests
// ============================================================================

#[test]
fn test_operation_scope_accessor() {
    let op = EditOperation::add(Row { id: 1 }, Some("chat-7".to_string()));
    assert_eq!(op.scope_id().map(String::as_str), Some("chat-7"));

    let op: EditOperation<Row> = EditOperation::delete(1, None);
    assert!(op.scope_id().is_none());

    let op: EditOperation<Row> = EditOperation::delete_many(vec![1, 2], Some("a".to_string()));
    assert_eq!(op.scope_id().map(String::as_str), Some("a"));

    let op = EditOperation::edit(Row { id: 3 }, true, None);
    assert!(op.scope_id().is_none());
}

// ============================================================================
// Channel Tests
// ============================================================================

#[test]
fn test_post_without_subscribers_is_fine() {
    let notifier: Notifier<Row> = Notifier::new();
    assert_eq!(notifier.subscriber_count(), 0);
    notifier.post(EditOperation::add(Row { id: 1 }, None));
}

#[tokio::test]
async fn test_subscribers_receive_in_order() {
    let notifier: Notifier<Row> = Notifier::new();
    let mut rx = notifier.subscribe();
    assert_eq!(notifier.subscriber_count(), 1);

    notifier.post(EditOperation::add(Row { id: 1 }, None));
    notifier.post(EditOperation::delete(1, None));

    match rx.recv().await.unwrap() {
        EditOperation::Add { item, .. } => assert_eq!(item.id, 1),
        other => panic!("expected Add, got {other:?}"),
    }
    match rx.recv().await.unwrap() {
        EditOperation::Delete { id, .. } => assert_eq!(id, 1),
        other => panic!("expected Delete, got {other:?}"),
    }
}

#[tokio::test]
async fn test_clone_shares_channel() {
    let notifier: Notifier<Row> = Notifier::new();
    let clone = notifier.clone();
    let mut rx = clone.subscribe();

    notifier.post(EditOperation::add(Row { id: 9 }, None));

    assert!(matches!(
        rx.recv().await.unwrap(),
        EditOperation::Add { item: Row { id: 9 }, .. }
    ));
}
