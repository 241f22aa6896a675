//! Common types used throughout pagekit
//!
//! Item identity, the page envelope returned by fetch providers, and shared
//! aliases.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

// ============================================================================
// Type Aliases
// ============================================================================

/// Opaque identifier limiting which edit-bus operations a pager applies
pub type ScopeId = String;

// ============================================================================
// Item Identity
// ============================================================================

/// An entity with a stable unique identifier.
///
/// The engine imposes no other structural constraint on items; ordering and
/// comparison only matter if the caller installs a sort-based processor.
pub trait Identifiable {
    /// The identifier type. Cheap to clone (numeric id, short string).
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// The stable unique identifier of this item
    fn id(&self) -> Self::Id;
}

// ============================================================================
// Page Envelope
// ============================================================================

/// One fetch response: a slice of items plus optional totals metadata.
///
/// Produced once per provider call, consumed by the merge pipeline, and
/// discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<Item> {
    /// The items of this page, in remote order
    pub items: Vec<Item>,

    /// Total number of items on the remote source, if the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<usize>,

    /// Total number of pages on the remote source, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,

    /// The index of this page as reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<usize>,
}

impl<Item> Page<Item> {
    /// Create a page with items only
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            total_items: None,
            total_pages: None,
            current_page: None,
        }
    }

    /// Set the remote total item count
    #[must_use]
    pub fn with_total_items(mut self, total: usize) -> Self {
        self.total_items = Some(total);
        self
    }

    /// Set the remote total page count
    #[must_use]
    pub fn with_total_pages(mut self, total: usize) -> Self {
        self.total_pages = Some(total);
        self
    }

    /// Set the remote index of this page
    #[must_use]
    pub fn with_current_page(mut self, page: usize) -> Self {
        self.current_page = Some(page);
        self
    }

    /// Number of items in this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<Item> Default for Page<Item> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
