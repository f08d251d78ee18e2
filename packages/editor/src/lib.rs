//! # Folio Editor
//!
//! Core editing engine for case-study pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: rows → canonical block tree         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: PageDocument lifecycle + mutations  │
//! │  - Local key assignment and preservation    │
//! │  - Mutation algebra (move/duplicate/resize) │
//! │  - Selection/focus/hover resolution         │
//! │  - Drop gesture → mutation resolution       │
//! │  - Dirty tracking + save reconciliation     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ workspace: store round trips + sessions     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Drafts are source of truth**: panes render projections of one tree
//! 2. **Mutations are total**: stale references resolve to no-ops, never
//!    errors - drop targets routinely vanish under an in-flight drag
//! 3. **Identity is explicit**: persisted `id` for storage, `local_key` for
//!    the session; duplication always regenerates every nested key
//! 4. **Order is positional**: `sort_order` is rewritten wholesale on save
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Mutation, PageDocument};
//!
//! // Load a page
//! let rows = store.fetch_blocks("case-1").await?;
//! let mut doc = PageDocument::from_rows("case-1", &rows);
//!
//! // Apply an edit
//! let block = doc.blocks()[0].local_key.clone();
//! doc.apply(&Mutation::SetColumns { block, columns: 2 });
//!
//! // Save
//! store.save_blocks("case-1", doc.rows()).await?;
//! ```

mod document;
mod draft;
mod drag;
mod keys;
mod mutations;
mod reconcile;
mod selection;

pub use document::PageDocument;
pub use draft::BlockDraft;
pub use drag::{resolve_drop, DragSource, DropAnchor, PaletteToken};
pub use keys::{case_seed, clone_with_fresh_keys, ensure_item_keys, fresh_item_key, KeyGenerator};
pub use mutations::{
    count_items_beyond, ItemDest, ItemSource, Mutation, MutationOutcome,
};
pub use reconcile::{compute_diff, fingerprint, SavePlan};
pub use selection::{ItemPath, Selection, Target};

// Re-export the schema for convenience
pub use folio_schema as schema;
