//! Pager state machine
//!
//! Defines the fetch types, the pager state enum, and the transition table
//! that the engine enforces on every state change.

mod types;

pub use types::{FetchType, PagerState};
