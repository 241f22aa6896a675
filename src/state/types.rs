//! State machine types

use crate::error::Error;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Fetch Type
// ============================================================================

/// The kind of fetch operation being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchType {
    /// Fetch the page after the last loaded one (or the last loaded page
    /// again, if it came back shorter than the page size)
    NextPage,
    /// Discard everything and fetch the first page from scratch
    Refresh,
    /// Re-validate the first page without discarding loaded data
    RefetchFirst,
    /// Re-validate the last loaded page without discarding loaded data
    RefetchLast,
}

impl fmt::Display for FetchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NextPage => write!(f, "NextPage"),
            Self::Refresh => write!(f, "Refresh"),
            Self::RefetchFirst => write!(f, "RefetchFirst"),
            Self::RefetchLast => write!(f, "RefetchLast"),
        }
    }
}

// ============================================================================
// Pager State
// ============================================================================

/// The state machine value observed by consumers.
///
/// Only the pager itself moves between states; every change goes through
/// [`PagerState::transition_valid`].
#[derive(Debug, Clone)]
pub enum PagerState {
    /// Before any fetching has started
    Initial,
    /// A fetch of the given type is in flight
    Active(FetchType),
    /// The last fetch completed normally
    Finished,
    /// The last fetch was cancelled before completion
    Cancelled,
    /// The last fetch failed; the cause is retained for the UI layer
    Error(Arc<Error>),
}

impl PagerState {
    /// True exactly while a fetch is in flight
    pub fn fetch_in_progress(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error cause, if this is an error state
    pub fn error(&self) -> Option<&Arc<Error>> {
        match self {
            Self::Error(cause) => Some(cause),
            _ => None,
        }
    }

    /// Whether moving from `from` to `to` is a legal transition.
    ///
    /// Starting a fetch is legal from any non-active state; an active fetch
    /// may only complete, cancel, or fail; recording an error is always
    /// legal. `Active -> Active` is rejected (single-flight).
    pub fn transition_valid(from: &Self, to: &Self) -> bool {
        match (from, to) {
            (Self::Active(_), Self::Finished | Self::Cancelled) => true,

            (
                Self::Initial | Self::Finished | Self::Cancelled | Self::Error(_),
                Self::Active(_),
            ) => true,

            (_, Self::Error(_)) => true,

            _ => false,
        }
    }
}

/// Error states compare equal regardless of cause; the cause is carried for
/// display, not identity.
impl PartialEq for PagerState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Initial, Self::Initial)
            | (Self::Finished, Self::Finished)
            | (Self::Cancelled, Self::Cancelled)
            | (Self::Error(_), Self::Error(_)) => true,
            (Self::Active(a), Self::Active(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for PagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "Initial"),
            Self::Active(fetch_type) => write!(f, "Active({fetch_type})"),
            Self::Finished => write!(f, "Finished"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Error(cause) => write!(f, "Error({cause})"),
        }
    }
}

impl Default for PagerState {
    fn default() -> Self {
        Self::Initial
    }
}
