//! Pager configuration
//!
//! Bundles page size, first page index, the scope identifier used for
//! filtering external edits, and the three list processors.

use crate::error::{Error, Result};
use crate::processors::{ListProcessor, MergeProcessor};
use crate::types::{Identifiable, ScopeId};
use std::fmt;

/// Default page size
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Configuration for a [`Pager`](crate::Pager).
///
/// Owned by the pager and mutable at runtime through its setters; wholesale
/// replacement is rejected while a fetch is in flight.
pub struct PagerConfig<Item> {
    /// Page size to request (must be greater than zero)
    pub page_size: usize,

    /// The first page index; some backends start counting at 1 instead of 0
    pub first_page_index: usize,

    /// Used to filter which edit-bus operations this pager applies.
    /// `None` accepts every operation.
    pub scope_id: Option<ScopeId>,

    /// Applied to the newly fetched page content before merging
    pub page_transform: Option<ListProcessor<Item>>,

    /// Combines the fetched page into the already loaded list
    pub merge: MergeProcessor<Item>,

    /// Applied to the combined list after merging (e.g. a sort).
    ///
    /// In nearly every practical case `page_transform` or `merge` is the
    /// cheaper place for the same work.
    pub result_transform: Option<ListProcessor<Item>>,
}

impl<Item: Identifiable> PagerConfig<Item> {
    /// Create a configuration with the given page size and defaults for
    /// everything else (first page 0, no scope, append merge, no transforms)
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            first_page_index: 0,
            scope_id: None,
            page_transform: None,
            merge: MergeProcessor::append(),
            result_transform: None,
        }
    }

    /// Set the first page index
    #[must_use]
    pub fn with_first_page_index(mut self, index: usize) -> Self {
        self.first_page_index = index;
        self
    }

    /// Set the scope id
    #[must_use]
    pub fn with_scope_id(mut self, scope_id: impl Into<ScopeId>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    /// Set the merge processor
    #[must_use]
    pub fn with_merge(mut self, merge: MergeProcessor<Item>) -> Self {
        self.merge = merge;
        self
    }

    /// Set the pre-merge page transform
    #[must_use]
    pub fn with_page_transform(mut self, transform: ListProcessor<Item>) -> Self {
        self.page_transform = Some(transform);
        self
    }

    /// Set the post-merge result transform
    #[must_use]
    pub fn with_result_transform(mut self, transform: ListProcessor<Item>) -> Self {
        self.result_transform = Some(transform);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::config("page_size must be greater than zero"));
        }
        Ok(())
    }
}

impl<Item: Identifiable> Default for PagerConfig<Item> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<Item> fmt::Debug for PagerConfig<Item> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerConfig")
            .field("page_size", &self.page_size)
            .field("first_page_index", &self.first_page_index)
            .field("scope_id", &self.scope_id)
            .field("page_transform", &self.page_transform.is_some())
            .field("result_transform", &self.result_transform.is_some())
            .finish_non_exhaustive()
    }
}
