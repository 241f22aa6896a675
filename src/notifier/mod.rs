//! Scoped edit broadcast channel
//!
//! Synchronizes app-wide changes without a refetch or point-to-point wiring.
//! The common flow: some screen sends an "add item" request to the backend,
//! and on success posts [`EditOperation::add`] here; every pager subscribed to
//! the same notifier (and matching the operation's scope) applies the edit to
//! its own list.
//!
//! A notifier is constructed explicitly and handed to each pager — there is
//! no process-wide default, so tests stay isolated.

mod types;

pub use types::EditOperation;

use crate::types::Identifiable;
use tokio::sync::broadcast;
use tracing::trace;

#[cfg(test)]
mod tests;

/// Default capacity of the broadcast channel
const DEFAULT_CAPACITY: usize = 64;

/// A broadcast channel of edit operations shared by any number of pagers
#[derive(Debug)]
pub struct Notifier<Item: Identifiable> {
    tx: broadcast::Sender<EditOperation<Item>>,
}

impl<Item> Notifier<Item>
where
    Item: Identifiable + Clone + Send + 'static,
{
    /// Create a notifier with the default buffer capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a notifier buffering up to `capacity` undelivered operations
    /// per subscriber; slower subscribers skip what they miss
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an operation to all current subscribers.
    ///
    /// Fire-and-forget: posting with no subscribers is not an error.
    pub fn post(&self, operation: EditOperation<Item>) {
        let delivered = self.tx.send(operation).unwrap_or(0);
        trace!("edit operation posted to {delivered} subscriber(s)");
    }

    /// Subscribe to operations posted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EditOperation<Item>> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<Item> Default for Notifier<Item>
where
    Item: Identifiable + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Item: Identifiable> Clone for Notifier<Item> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}
