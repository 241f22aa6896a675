//! List and merge processors
//!
//! Pluggable policy objects operating on in-memory item lists. A
//! [`ListProcessor`] shapes one list in place (pre-merge filtering, post-merge
//! sorting); a [`MergeProcessor`] combines a freshly fetched page into the
//! already loaded list. Both are pure with respect to the pager: they see the
//! item list and the local-edits tracker, nothing else.

use crate::types::Identifiable;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

#[cfg(test)]
mod tests;

// ============================================================================
// Local Edits Tracking
// ============================================================================

/// Bookkeeping hook handed to every processor invocation.
///
/// The delta is added to the loaded item count when the next page index is
/// derived. A processor that drops items which still exist on the remote
/// source must decrement the delta by the number dropped, so page arithmetic
/// keeps pointing at the right remote offset. Edits that are mirrored
/// remotely (the pager's insert/update/delete operations) leave it untouched.
pub trait LocalEditsTracker {
    /// The current correction term
    fn local_edits_delta(&self) -> i64;

    /// Adjust the correction term by `amount` (may be negative)
    fn add_local_edits_delta(&mut self, amount: i64);
}

// ============================================================================
// List Processor
// ============================================================================

/// A pure in-place transform over an item list.
///
/// Used as `page_transform` (applied to the incoming page before merging) and
/// `result_transform` (applied to the combined list after merging).
pub struct ListProcessor<Item> {
    run: Box<dyn Fn(&mut dyn LocalEditsTracker, &mut Vec<Item>) + Send + Sync>,
}

impl<Item> ListProcessor<Item> {
    /// Create a processor from an arbitrary transform function
    pub fn new(
        run: impl Fn(&mut dyn LocalEditsTracker, &mut Vec<Item>) + Send + Sync + 'static,
    ) -> Self {
        Self { run: Box::new(run) }
    }

    /// Sort the list with a comparator
    pub fn sort_by(
        comparator: impl Fn(&Item, &Item) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |_, items| items.sort_by(&comparator))
    }

    /// Sort the list by a key extracted from each item
    pub fn sort_by_key<K: Ord>(key: impl Fn(&Item) -> K + Send + Sync + 'static) -> Self {
        Self::new(move |_, items| items.sort_by_key(&key))
    }

    /// Keep only items matching the predicate.
    ///
    /// Dropped items are assumed to still exist remotely, so the local-edits
    /// delta is decremented by the number removed.
    pub fn filter(predicate: impl Fn(&Item) -> bool + Send + Sync + 'static) -> Self {
        Self::new(move |tracker, items| {
            let before = items.len();
            items.retain(&predicate);
            let dropped = before - items.len();
            if dropped > 0 {
                tracker.add_local_edits_delta(-(dropped as i64));
            }
        })
    }

    /// Apply the processor to `items`
    pub fn apply(&self, tracker: &mut dyn LocalEditsTracker, items: &mut Vec<Item>) {
        (self.run)(tracker, items);
    }
}

impl<Item> fmt::Debug for ListProcessor<Item> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ListProcessor")
    }
}

// ============================================================================
// Merge Processor
// ============================================================================

/// A pure function combining a newly fetched page into the existing list
pub struct MergeProcessor<Item> {
    run: Box<dyn Fn(&mut dyn LocalEditsTracker, &mut Vec<Item>, Vec<Item>) + Send + Sync>,
}

impl<Item> MergeProcessor<Item> {
    /// Create a merge processor from an arbitrary combine function
    pub fn new(
        run: impl Fn(&mut dyn LocalEditsTracker, &mut Vec<Item>, Vec<Item>) + Send + Sync + 'static,
    ) -> Self {
        Self { run: Box::new(run) }
    }

    /// Concatenate the incoming page to the end, unconditionally.
    ///
    /// Use when the provider is known never to re-deliver already-seen ids.
    pub fn append() -> Self {
        Self::new(|_, current, incoming| current.extend(incoming))
    }

    /// Remove id collisions between the two sides, then append the incoming
    /// remainder. Relative order within each surviving side is preserved.
    ///
    /// With `prioritize_newly_fetched` the incoming version of a duplicated
    /// id wins (re-fetching already-loaded items becomes idempotent and picks
    /// up field changes); otherwise the already-loaded version wins.
    pub fn drop_same_ids(prioritize_newly_fetched: bool) -> Self
    where
        Item: Identifiable,
    {
        Self::new(move |_, current, mut incoming| {
            if prioritize_newly_fetched {
                let incoming_ids: HashSet<Item::Id> = incoming.iter().map(Identifiable::id).collect();
                current.retain(|item| !incoming_ids.contains(&item.id()));
                current.append(&mut incoming);
            } else {
                let current_ids: HashSet<Item::Id> = current.iter().map(Identifiable::id).collect();
                incoming.retain(|item| !current_ids.contains(&item.id()));
                current.append(&mut incoming);
            }
        })
    }

    /// Apply the merge, combining `incoming` into `current`
    pub fn apply(
        &self,
        tracker: &mut dyn LocalEditsTracker,
        current: &mut Vec<Item>,
        incoming: Vec<Item>,
    ) {
        (self.run)(tracker, current, incoming);
    }
}

impl<Item: Identifiable> Default for MergeProcessor<Item> {
    fn default() -> Self {
        Self::append()
    }
}

impl<Item> fmt::Debug for MergeProcessor<Item> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MergeProcessor")
    }
}
