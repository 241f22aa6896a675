//! Fetch provider trait and adapters
//!
//! The provider is the engine's only external collaborator: an async function
//! from `(page_index, page_size, filter)` to a [`Page`] of items. How it
//! talks to a backend (HTTP, database, fixture data) is its own business; it
//! must be safe to cancel mid-flight and must not reach into the pager's
//! state.

use crate::error::Result;
use crate::types::Page;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// Supplies pages of items to a [`Pager`](crate::Pager)
#[async_trait]
pub trait PageProvider: Send + Sync {
    /// The item type of the pages
    type Item;

    /// An opaque filter forwarded from the pager, if one is set
    type Filter;

    /// Fetch one page.
    ///
    /// `page_index` starts at the pager's configured first page index.
    /// Implementations may fail with any error convertible into
    /// [`Error::Provider`](crate::Error::Provider).
    async fn fetch_page(
        &self,
        page_index: usize,
        page_size: usize,
        filter: Option<Self::Filter>,
    ) -> Result<Page<Self::Item>>;
}

// ============================================================================
// Closure Adapter
// ============================================================================

/// Adapts a plain async closure into a [`PageProvider`].
///
/// The closure receives `(page_index, page_size, filter)` and returns a boxed
/// future resolving to a page.
pub struct FnPageProvider<Item, Filter, F>
where
    F: Fn(usize, usize, Option<Filter>) -> BoxFuture<'static, Result<Page<Item>>>,
{
    fetch: F,
    _marker: std::marker::PhantomData<fn() -> (Item, Filter)>,
}

impl<Item, Filter, F> FnPageProvider<Item, Filter, F>
where
    F: Fn(usize, usize, Option<Filter>) -> BoxFuture<'static, Result<Page<Item>>>,
{
    /// Wrap a fetch closure
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            _marker: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<Item, Filter, F> PageProvider for FnPageProvider<Item, Filter, F>
where
    Item: Send + Sync + 'static,
    Filter: Send + Sync + 'static,
    F: Fn(usize, usize, Option<Filter>) -> BoxFuture<'static, Result<Page<Item>>> + Send + Sync,
{
    type Item = Item;
    type Filter = Filter;

    async fn fetch_page(
        &self,
        page_index: usize,
        page_size: usize,
        filter: Option<Filter>,
    ) -> Result<Page<Item>> {
        (self.fetch)(page_index, page_size, filter).await
    }
}
