//! # Folio Workspace
//!
//! Async orchestration over the editor core: store round trips, the one
//! in-flight-save guard, and session event broadcast.
//!
//! Everything above this layer (HTTP surface, auth, the generic CRUD
//! screens) and everything below it (the real database) are external
//! collaborators - this crate only owns the seam between the synchronous
//! [`folio_editor::PageDocument`] and the [`BlockStore`] contract.

pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use config::{WorkspaceConfig, DEFAULT_CONFIG_NAME};
pub use error::{SessionError, StoreError};
pub use session::{CaseEvent, CaseSession};
pub use store::{BlockStore, FileStore, MemoryStore};
