//! Edit operation types

use crate::types::{Identifiable, ScopeId};

/// An edit that happened elsewhere and should be reflected by subscribed
/// pagers.
///
/// Each operation optionally carries a scope id: an unscoped pager applies
/// everything, a scoped pager applies only operations with the same scope.
#[derive(Debug, Clone)]
pub enum EditOperation<Item: Identifiable> {
    /// Insert the item at the top of the list
    Add {
        /// The item to insert
        item: Item,
        /// Scope limiting which pagers apply this operation
        scope_id: Option<ScopeId>,
    },
    /// Replace the item with the same id, optionally relocating it to the top
    Edit {
        /// The new version of the item
        item: Item,
        /// Relocate the item to index 0
        move_to_top: bool,
        /// Scope limiting which pagers apply this operation
        scope_id: Option<ScopeId>,
    },
    /// Remove the item with this id
    Delete {
        /// Id of the item to remove
        id: Item::Id,
        /// Scope limiting which pagers apply this operation
        scope_id: Option<ScopeId>,
    },
    /// Remove every item whose id is in the set
    DeleteMany {
        /// Ids of the items to remove
        ids: Vec<Item::Id>,
        /// Scope limiting which pagers apply this operation
        scope_id: Option<ScopeId>,
    },
}

impl<Item: Identifiable> EditOperation<Item> {
    /// Create an add operation
    pub fn add(item: Item, scope_id: Option<ScopeId>) -> Self {
        Self::Add { item, scope_id }
    }

    /// Create an edit operation
    pub fn edit(item: Item, move_to_top: bool, scope_id: Option<ScopeId>) -> Self {
        Self::Edit {
            item,
            move_to_top,
            scope_id,
        }
    }

    /// Create a delete operation
    pub fn delete(id: Item::Id, scope_id: Option<ScopeId>) -> Self {
        Self::Delete { id, scope_id }
    }

    /// Create a bulk delete operation
    pub fn delete_many(ids: Vec<Item::Id>, scope_id: Option<ScopeId>) -> Self {
        Self::DeleteMany { ids, scope_id }
    }

    /// The operation's scope, if any
    pub fn scope_id(&self) -> Option<&ScopeId> {
        match self {
            Self::Add { scope_id, .. }
            | Self::Edit { scope_id, .. }
            | Self::Delete { scope_id, .. }
            | Self::DeleteMany { scope_id, .. } => scope_id.as_ref(),
        }
    }
}
