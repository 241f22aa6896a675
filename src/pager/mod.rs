//! The core pagination engine
//!
//! [`Pager`] owns the item list, the state machine, and the derived page
//! bookkeeping, and orchestrates fetch/merge/cancel/edit operations against
//! the configured provider and processors.
//!
//! # Concurrency model
//!
//! One outstanding provider call at a time per pager. Concurrent fetch
//! requests collapse into the in-flight one (silent no-op) unless forced, in
//! which case the in-flight call is cancelled and awaited before the new one
//! claims the slot. The provider invocation is the only suspension point;
//! merges and edits are synchronous and atomic with respect to observers of
//! the item list.

use crate::config::PagerConfig;
use crate::error::{Error, Result};
use crate::notifier::{EditOperation, Notifier};
use crate::processors::{ListProcessor, LocalEditsTracker, MergeProcessor};
use crate::provider::{FnPageProvider, PageProvider};
use crate::state::{FetchType, PagerState};
use crate::types::{Identifiable, Page, ScopeId};
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};


// ============================================================================
// Internal State
// ============================================================================

/// Page-index bookkeeping that is not part of the observable surface
struct Meta {
    /// Correction term for the derived page index (see `LocalEditsTracker`)
    local_edits_delta: i64,
    /// Whether the last frontier fetch came back shorter than the page size
    reached_end: bool,
}

/// Handle to the in-flight fetch, held in the single-flight slot
struct Flight {
    /// Signals the in-flight fetch to stop
    cancel_tx: watch::Sender<bool>,
    /// Resolves when the in-flight fetch has fully wound down
    done_rx: watch::Receiver<bool>,
}

/// Tracker instance threaded through one merge pipeline run
struct DeltaTracker {
    delta: i64,
}

impl LocalEditsTracker for DeltaTracker {
    fn local_edits_delta(&self) -> i64 {
        self.delta
    }

    fn add_local_edits_delta(&mut self, amount: i64) {
        self.delta += amount;
    }
}

struct PagerInner<Item, F> {
    provider: Arc<dyn PageProvider<Item = Item, Filter = F>>,
    config: Mutex<PagerConfig<Item>>,
    filter: Mutex<Option<F>>,
    items_tx: watch::Sender<Vec<Item>>,
    state_tx: watch::Sender<PagerState>,
    total_tx: watch::Sender<Option<usize>>,
    meta: Mutex<Meta>,
    /// Single-flight slot. Lock order: `flight` before `config`; never held
    /// across an await.
    flight: Mutex<Option<Flight>>,
    notifier_task: Mutex<Option<JoinHandle<()>>>,
}

/// Frees the flight slot when a fetch winds down, however it winds down.
///
/// If the state is still `Active` at that point the fetch never recorded an
/// outcome (cancelled, or its future was dropped), so `Cancelled` is recorded
/// here. Slot clearing and the completion signal happen under the flight lock
/// so a forced fetch cannot observe a half-released slot.
struct FlightGuard<Item, F> {
    inner: Arc<PagerInner<Item, F>>,
    done_tx: watch::Sender<bool>,
}

impl<Item, F> Drop for FlightGuard<Item, F> {
    fn drop(&mut self) {
        let mut flight = self.inner.flight.lock().unwrap();
        self.inner.state_tx.send_if_modified(|state| {
            if state.fetch_in_progress() {
                *state = PagerState::Cancelled;
                true
            } else {
                false
            }
        });
        *flight = None;
        let _ = self.done_tx.send(true);
    }
}

// ============================================================================
// Pager
// ============================================================================

/// Incrementally loads, merges, and edits an ordered, deduplicated collection
/// of items fetched page-by-page from a [`PageProvider`].
///
/// Cheap to clone; clones share the same underlying engine.
pub struct Pager<Item, F = ()> {
    inner: Arc<PagerInner<Item, F>>,
}

impl<Item, F> Pager<Item, F>
where
    Item: Identifiable + Clone + Send + Sync + 'static,
    F: Clone + Send + Sync + 'static,
{
    /// Create a pager over the given provider
    pub fn new(
        config: PagerConfig<Item>,
        provider: Arc<dyn PageProvider<Item = Item, Filter = F>>,
    ) -> Result<Self> {
        config.validate()?;
        let (items_tx, _) = watch::channel(Vec::new());
        let (state_tx, _) = watch::channel(PagerState::Initial);
        let (total_tx, _) = watch::channel(None);

        Ok(Self {
            inner: Arc::new(PagerInner {
                provider,
                config: Mutex::new(config),
                filter: Mutex::new(None),
                items_tx,
                state_tx,
                total_tx,
                meta: Mutex::new(Meta {
                    local_edits_delta: 0,
                    reached_end: false,
                }),
                flight: Mutex::new(None),
                notifier_task: Mutex::new(None),
            }),
        })
    }

    /// Create a pager subscribed to an edit bus.
    ///
    /// Must be called from within a tokio runtime; the subscription runs as a
    /// background task that ends when the pager is dropped.
    pub fn with_notifier(
        config: PagerConfig<Item>,
        provider: Arc<dyn PageProvider<Item = Item, Filter = F>>,
        notifier: &Notifier<Item>,
    ) -> Result<Self> {
        let pager = Self::new(config, provider)?;
        pager.attach_notifier(notifier);
        Ok(pager)
    }

    /// Create a pager from a plain async fetch closure
    pub fn from_fn<Func>(config: PagerConfig<Item>, fetch: Func) -> Result<Self>
    where
        Func: Fn(usize, usize, Option<F>) -> BoxFuture<'static, Result<Page<Item>>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(config, Arc::new(FnPageProvider::new(fetch)))
    }

    /// Subscribe this pager to an edit bus, replacing any previous
    /// subscription. Operations are applied in publication order; a lagging
    /// subscriber skips what it missed.
    pub fn attach_notifier(&self, notifier: &Notifier<Item>) {
        let mut rx = notifier.subscribe();
        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(operation) => {
                        let Some(inner) = weak.upgrade() else { break };
                        inner.apply_external(operation);
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("edit bus subscriber lagged, skipped {missed} operation(s)");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        if let Some(previous) = self.inner.notifier_task.lock().unwrap().replace(task) {
            previous.abort();
        }
    }

    // ========================================================================
    // Fetch Orchestration
    // ========================================================================

    /// Fetch a page; a no-op if a fetch is already in flight
    pub async fn fetch(&self, fetch_type: FetchType) -> Result<()> {
        self.fetch_with(fetch_type, false).await
    }

    /// Fetch a page.
    ///
    /// With `force`, an in-flight fetch is cancelled and awaited before this
    /// one starts; without it, this call silently collapses into the
    /// in-flight one.
    ///
    /// Provider failures are recorded in the observable state, not returned;
    /// `Err` here means an invariant violation (a programming fault).
    pub async fn fetch_with(&self, fetch_type: FetchType, force: bool) -> Result<()> {
        // Claim the single-flight slot, cancelling the current occupant if
        // forced. The claim and the Active transition are atomic under the
        // flight lock.
        let (mut cancel_rx, done_tx) = loop {
            let pending = {
                let mut flight = self.inner.flight.lock().unwrap();
                if let Some(active) = flight.as_ref() {
                    if !force {
                        debug!("fetch({fetch_type}) ignored: a fetch is already in flight");
                        return Ok(());
                    }
                    let _ = active.cancel_tx.send(true);
                    Some(active.done_rx.clone())
                } else {
                    self.inner.transition(PagerState::Active(fetch_type))?;
                    let (cancel_tx, cancel_rx) = watch::channel(false);
                    let (done_tx, done_rx) = watch::channel(false);
                    *flight = Some(Flight { cancel_tx, done_rx });
                    drop(flight);
                    break (cancel_rx, done_tx);
                }
            };
            if let Some(mut done) = pending {
                let _ = done.wait_for(|finished| *finished).await;
            }
        };

        let _guard = FlightGuard {
            inner: Arc::clone(&self.inner),
            done_tx,
        };

        // The page index is always derived from the current list size, so it
        // self-corrects after in-place edits.
        let (page_size, page_index) = {
            let config = self.inner.config.lock().unwrap();
            let effective = self.inner.effective_count();
            let index = match fetch_type {
                FetchType::Refresh | FetchType::RefetchFirst => config.first_page_index,
                FetchType::NextPage => config.first_page_index + effective / config.page_size,
                // The page holding the last loaded item, which may be partial.
                FetchType::RefetchLast => {
                    config.first_page_index + effective.saturating_sub(1) / config.page_size
                }
            };
            (config.page_size, index)
        };
        let filter = self.inner.filter.lock().unwrap().clone();

        let outcome = tokio::select! {
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => None,
            result = self.inner.provider.fetch_page(page_index, page_size, filter) => Some(result),
        };

        let result = match outcome {
            Some(result) => result,
            None => {
                debug!("fetch({fetch_type}) cancelled before the provider returned");
                return Ok(()); // the guard records Cancelled
            }
        };

        // The cancel signal may race the provider's completion; a cancelled
        // fetch must not merge.
        if *cancel_rx.borrow() {
            debug!("fetch({fetch_type}) cancelled while the provider was completing");
            return Ok(());
        }

        let page = match result {
            Ok(page) => page,
            Err(error) => {
                warn!("fetch({fetch_type}) failed: {error}");
                self.inner.transition(PagerState::Error(Arc::new(error)))?;
                return Ok(());
            }
        };

        self.inner.apply_page(fetch_type, page, page_size);
        self.inner.transition(PagerState::Finished)
    }

    /// Cancel the in-flight fetch, if any, and wait for it to wind down
    pub async fn cancel(&self) {
        let pending = {
            let flight = self.inner.flight.lock().unwrap();
            flight.as_ref().map(|active| {
                let _ = active.cancel_tx.send(true);
                active.done_rx.clone()
            })
        };
        if let Some(mut done) = pending {
            let _ = done.wait_for(|finished| *finished).await;
        }
    }

    // ========================================================================
    // In-place Edits
    // ========================================================================

    /// Insert an item at the top of the list.
    ///
    /// A silent no-op if an item with the same id already exists. Increments
    /// `total` when known. Intended for edits already reflected remotely, so
    /// the derived page index shifts with the list size.
    pub fn insert(&self, item: Item) {
        self.inner.insert_at(item, 0);
    }

    /// Insert an item at the given position (clamped to the list length)
    pub fn insert_at(&self, item: Item, index: usize) {
        self.inner.insert_at(item, index);
    }

    /// Replace the item with the same id, optionally relocating it to the
    /// top. A silent no-op if no such item exists.
    pub fn update(&self, item: Item, move_to_top: bool) {
        self.inner.update(item, move_to_top);
    }

    /// Remove the item with this id; decrements `total` if something was
    /// actually removed
    pub fn delete(&self, id: &Item::Id) {
        self.inner.delete_many(std::slice::from_ref(id));
    }

    /// Remove every item whose id is in `ids`; decrements `total` by the
    /// number actually removed
    pub fn delete_many(&self, ids: &[Item::Id]) {
        self.inner.delete_many(ids);
    }

    // ========================================================================
    // Read Surface
    // ========================================================================

    /// Snapshot of the current item list
    pub fn items(&self) -> Vec<Item> {
        self.inner.items_tx.borrow().clone()
    }

    /// The current state machine value
    pub fn state(&self) -> PagerState {
        self.inner.state_tx.borrow().clone()
    }

    /// The remote total item count, if the provider has reported one
    pub fn total(&self) -> Option<usize> {
        *self.inner.total_tx.borrow()
    }

    /// True exactly while a fetch is in flight
    pub fn fetch_in_progress(&self) -> bool {
        self.inner.state_tx.borrow().fetch_in_progress()
    }

    /// The page index the next `NextPage` fetch will request, derived from
    /// the current list size
    pub fn next_page(&self) -> usize {
        let (page_size, first) = {
            let config = self.inner.config.lock().unwrap();
            (config.page_size, config.first_page_index)
        };
        first + self.inner.effective_count() / page_size
    }

    /// Whether the last frontier fetch came back shorter than the page size.
    ///
    /// Advisory: predicts that another `NextPage` fetch will yield nothing
    /// new until a refresh. Fetching is not gated on it.
    pub fn reached_end(&self) -> bool {
        self.inner.meta.lock().unwrap().reached_end
    }

    /// The current local-edits correction term
    pub fn local_edits_delta(&self) -> i64 {
        self.inner.meta.lock().unwrap().local_edits_delta
    }

    /// Observe the item list
    pub fn watch_items(&self) -> watch::Receiver<Vec<Item>> {
        self.inner.items_tx.subscribe()
    }

    /// Observe the state machine
    pub fn watch_state(&self) -> watch::Receiver<PagerState> {
        self.inner.state_tx.subscribe()
    }

    /// Observe the remote total
    pub fn watch_total(&self) -> watch::Receiver<Option<usize>> {
        self.inner.total_tx.subscribe()
    }

    /// Wait until the state matches the predicate, returning the matching
    /// state. Resolves immediately if the current state already matches.
    pub async fn wait_for_state(&self, predicate: impl Fn(&PagerState) -> bool) -> PagerState {
        let mut rx = self.inner.state_tx.subscribe();
        let state = match rx.wait_for(|state| predicate(state)).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    // ========================================================================
    // Configuration & Filter
    // ========================================================================

    /// Set the filter forwarded to the provider on each fetch
    pub fn set_filter(&self, filter: Option<F>) {
        *self.inner.filter.lock().unwrap() = filter;
    }

    /// The current filter
    pub fn filter(&self) -> Option<F> {
        self.inner.filter.lock().unwrap().clone()
    }

    /// The configured page size
    pub fn page_size(&self) -> usize {
        self.inner.config.lock().unwrap().page_size
    }

    /// The configured first page index
    pub fn first_page_index(&self) -> usize {
        self.inner.config.lock().unwrap().first_page_index
    }

    /// The configured scope id
    pub fn scope_id(&self) -> Option<ScopeId> {
        self.inner.config.lock().unwrap().scope_id.clone()
    }

    /// Change the scope id used to filter edit-bus operations
    pub fn set_scope_id(&self, scope_id: Option<ScopeId>) {
        self.inner.config.lock().unwrap().scope_id = scope_id;
    }

    /// Change the merge processor
    pub fn set_merge(&self, merge: MergeProcessor<Item>) {
        self.inner.config.lock().unwrap().merge = merge;
    }

    /// Change the pre-merge page transform
    pub fn set_page_transform(&self, transform: Option<ListProcessor<Item>>) {
        self.inner.config.lock().unwrap().page_transform = transform;
    }

    /// Change the post-merge result transform
    pub fn set_result_transform(&self, transform: Option<ListProcessor<Item>>) {
        self.inner.config.lock().unwrap().result_transform = transform;
    }

    /// Replace the whole configuration.
    ///
    /// Rejected while a fetch is in flight: the pipeline snapshot for an
    /// active fetch must stay coherent.
    pub fn replace_config(&self, config: PagerConfig<Item>) -> Result<()> {
        config.validate()?;
        let flight = self.inner.flight.lock().unwrap();
        if flight.is_some() {
            return Err(Error::config(
                "configuration cannot be replaced while a fetch is in flight",
            ));
        }
        *self.inner.config.lock().unwrap() = config;
        Ok(())
    }
}

impl<Item, F> Clone for Pager<Item, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Item, F> fmt::Debug for Pager<Item, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("state", &self.inner.state_tx.borrow().to_string())
            .field("items", &self.inner.items_tx.borrow().len())
            .field("total", &*self.inner.total_tx.borrow())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Inner Implementation
// ============================================================================

impl<Item, F> PagerInner<Item, F>
where
    Item: Identifiable + Clone + Send + Sync + 'static,
    F: Clone + Send + Sync + 'static,
{
    /// Guarded state transition; rejects anything outside the transition
    /// table
    fn transition(&self, to: PagerState) -> Result<()> {
        let to_repr = to.to_string();
        let mut rejected_from = None;
        self.state_tx.send_if_modified(|current| {
            if PagerState::transition_valid(current, &to) {
                *current = to;
                true
            } else {
                rejected_from = Some(current.to_string());
                false
            }
        });
        match rejected_from {
            None => Ok(()),
            Some(from) => Err(Error::invalid_transition(from, to_repr)),
        }
    }

    /// Current list size corrected for local-only edits; page indices are
    /// derived from it
    fn effective_count(&self) -> usize {
        let delta = self.meta.lock().unwrap().local_edits_delta;
        let count = self.items_tx.borrow().len() as i64;
        (count - delta).max(0) as usize
    }

    /// Run the merge pipeline for a successfully fetched page.
    ///
    /// Synchronous; observers never see a partially merged list.
    fn apply_page(&self, fetch_type: FetchType, mut page: Page<Item>, page_size: usize) {
        let config = self.config.lock().unwrap();
        let mut meta = self.meta.lock().unwrap();
        let incoming_len = page.items.len();

        let mut tracker = DeltaTracker {
            // A refresh discards the edits the delta was correcting for.
            delta: if fetch_type == FetchType::Refresh {
                0
            } else {
                meta.local_edits_delta
            },
        };

        self.items_tx.send_modify(|items| {
            if fetch_type == FetchType::Refresh {
                items.clear();
            }
            if let Some(transform) = &config.page_transform {
                transform.apply(&mut tracker, &mut page.items);
            }
            let incoming = std::mem::take(&mut page.items);
            config.merge.apply(&mut tracker, items, incoming);
            if let Some(transform) = &config.result_transform {
                transform.apply(&mut tracker, items);
            }
        });

        meta.local_edits_delta = tracker.delta;
        // Only a fetch at the frontier says anything about the end of the
        // remote collection.
        if matches!(
            fetch_type,
            FetchType::NextPage | FetchType::Refresh | FetchType::RefetchLast
        ) {
            meta.reached_end = incoming_len < page_size;
        }

        if let Some(total) = page.total_items {
            self.total_tx.send_replace(Some(total));
        }
    }

    fn insert_at(&self, item: Item, index: usize) {
        let id = item.id();
        let inserted = self.items_tx.send_if_modified(|items| {
            if items.iter().any(|existing| existing.id() == id) {
                return false;
            }
            items.insert(index.min(items.len()), item);
            true
        });
        if inserted {
            self.total_tx.send_if_modified(|total| {
                if let Some(total) = total.as_mut() {
                    *total += 1;
                    true
                } else {
                    false
                }
            });
        } else {
            debug!("insert ignored: an item with id {id:?} already exists");
        }
    }

    fn update(&self, item: Item, move_to_top: bool) {
        let id = item.id();
        let updated = self.items_tx.send_if_modified(|items| {
            let Some(position) = items.iter().position(|existing| existing.id() == id) else {
                return false;
            };
            if move_to_top {
                items.remove(position);
                items.insert(0, item);
            } else {
                items[position] = item;
            }
            true
        });
        if !updated {
            debug!("update ignored: no item with id {id:?}");
        }
    }

    fn delete_many(&self, ids: &[Item::Id]) {
        let id_set: HashSet<&Item::Id> = ids.iter().collect();
        let mut removed = 0;
        self.items_tx.send_if_modified(|items| {
            let before = items.len();
            items.retain(|item| !id_set.contains(&item.id()));
            removed = before - items.len();
            removed > 0
        });
        if removed > 0 {
            self.total_tx.send_if_modified(|total| {
                if let Some(total) = total.as_mut() {
                    *total = total.saturating_sub(removed);
                    true
                } else {
                    false
                }
            });
        } else {
            debug!("delete ignored: no items matched {ids:?}");
        }
    }

    /// Apply an edit-bus operation if its scope matches this pager's
    fn apply_external(&self, operation: EditOperation<Item>) {
        let applies = {
            let config = self.config.lock().unwrap();
            match (&config.scope_id, operation.scope_id()) {
                (None, _) => true,
                (Some(own), Some(scope)) => own == scope,
                (Some(_), None) => false,
            }
        };
        if !applies {
            debug!("edit operation skipped: scope mismatch");
            return;
        }
        match operation {
            EditOperation::Add { item, .. } => self.insert_at(item, 0),
            EditOperation::Edit {
                item, move_to_top, ..
            } => self.update(item, move_to_top),
            EditOperation::Delete { id, .. } => self.delete_many(std::slice::from_ref(&id)),
            EditOperation::DeleteMany { ids, .. } => self.delete_many(&ids),
        }
    }
}

impl<Item, F> Drop for PagerInner<Item, F> {
    fn drop(&mut self) {
        if let Ok(task) = self.notifier_task.get_mut() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}
