//! # pagekit
//!
//! A client-side engine for incrementally loading, merging, and editing a
//! growing, deduplicated, ordered collection of items fetched page-by-page
//! from a remote paged source.
//!
//! ## Features
//!
//! - **Single-flight fetching**: concurrent fetch requests collapse into one
//!   in-flight provider call; `force` cancels and replaces it
//! - **Derived page index**: the next page is computed from the current list
//!   size, so local edits never desynchronize page boundaries
//! - **Pluggable list processors**: pre-merge, merge, and post-merge
//!   transforms supplied as plain functions
//! - **In-place edits**: insert/update/delete already-fetched items without a
//!   refetch
//! - **Scoped edit bus**: broadcast local mutations to every pager that cares
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagekit::{FetchType, Identifiable, Page, Pager, PagerConfig, Result};
//!
//! #[derive(Clone)]
//! struct Post { id: u64, title: String }
//!
//! impl Identifiable for Post {
//!     type Id = u64;
//!     fn id(&self) -> u64 { self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let pager = Pager::from_fn(PagerConfig::new(30), |page, size, _filter: Option<()>| {
//!         Box::pin(async move {
//!             // call your backend here
//!             Ok(Page::new(Vec::<Post>::new()))
//!         })
//!     })?;
//!
//!     pager.fetch(FetchType::NextPage).await?;
//!     println!("loaded {} items", pager.items().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! UI event ──► Pager::fetch ──► PageProvider ──► Page<Item>
//!                 │                                  │
//!                 │          page_transform ── merge ── result_transform
//!                 │                                  │
//!                 └── state / items / total  ◄───────┘
//!                        (watch channels, observed by the view layer)
//!
//! Notifier::post(EditOperation) ──► every subscribed Pager with a
//!                                   matching (or absent) scope id
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for pagekit
pub mod error;

/// Common types: item identity and the page envelope
pub mod types;

/// Pager state machine definitions
pub mod state;

/// List and merge processors
pub mod processors;

/// Pager configuration
pub mod config;

/// The fetch provider trait and adapters
pub mod provider;

/// Scoped edit broadcast channel
pub mod notifier;

/// The core pagination engine
pub mod pager;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::PagerConfig;
pub use error::{Error, Result};
pub use notifier::{EditOperation, Notifier};
pub use pager::Pager;
pub use processors::{ListProcessor, LocalEditsTracker, MergeProcessor};
pub use provider::{FnPageProvider, PageProvider};
pub use state::{FetchType, PagerState};
pub use types::{Identifiable, Page, ScopeId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
