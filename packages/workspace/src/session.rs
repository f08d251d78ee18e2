//! # Case Session
//!
//! One editing session over one case's page, bridging the synchronous editor
//! core and the asynchronous store.
//!
//! Only two operations ever suspend: the initial fetch and the save round
//! trip. Both are all-or-nothing - there is no partial or streaming read, no
//! cancellation of an in-flight save, and no retry machinery. A failed save
//! leaves the drafts and the dirty flag exactly as they were, so the user
//! retries explicitly with nothing lost.
//!
//! A compare-and-swap on an atomic flag rejects a second save while one is in
//! flight (`SessionError::SaveInFlight`). That guard protects a single
//! session against itself only: concurrency across sessions is optimistic
//! last-write-wins - two editors saving the same case silently overwrite each
//! other, a known limitation of the persistence contract, not something this
//! layer can detect.

use crate::config::WorkspaceConfig;
use crate::error::SessionError;
use crate::store::BlockStore;
use folio_editor::{
    DragSource, DropAnchor, Mutation, MutationOutcome, PageDocument, Selection,
};
use folio_schema::BlockRow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock, RwLockReadGuard};

/// Session lifecycle notifications for interested panes.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseEvent {
    Loaded { case_id: String, blocks: usize },
    Saved { case_id: String, version: u64 },
    SaveFailed { case_id: String, reason: String },
}

pub struct CaseSession<S: BlockStore> {
    case_id: String,
    store: S,

    /// The draft tree; all panes share this one value.
    document: Arc<RwLock<PageDocument>>,

    /// Rows as last seen in the store, for diffing at save time.
    persisted: Arc<RwLock<Vec<BlockRow>>>,

    /// In-flight save guard.
    saving: Arc<AtomicBool>,

    /// Event subscribers
    subscribers: Arc<RwLock<Vec<mpsc::Sender<CaseEvent>>>>,
    event_capacity: usize,
}

impl<S: BlockStore + Clone> Clone for CaseSession<S> {
    fn clone(&self) -> Self {
        Self {
            case_id: self.case_id.clone(),
            store: self.store.clone(),
            document: Arc::clone(&self.document),
            persisted: Arc::clone(&self.persisted),
            saving: Arc::clone(&self.saving),
            subscribers: Arc::clone(&self.subscribers),
            event_capacity: self.event_capacity,
        }
    }
}

impl<S: BlockStore> CaseSession<S> {
    /// Fetch a case's rows and open a session over them.
    pub async fn open(store: S, case_id: &str) -> Result<Self, SessionError> {
        Self::open_with_config(store, case_id, &WorkspaceConfig::default()).await
    }

    pub async fn open_with_config(
        store: S,
        case_id: &str,
        config: &WorkspaceConfig,
    ) -> Result<Self, SessionError> {
        let rows = store.fetch_blocks(case_id).await?;
        tracing::info!(case_id, blocks = rows.len(), "loaded case blocks");

        let document = PageDocument::from_rows(case_id, &rows);
        let session = Self {
            case_id: case_id.to_string(),
            store,
            document: Arc::new(RwLock::new(document)),
            persisted: Arc::new(RwLock::new(rows)),
            saving: Arc::new(AtomicBool::new(false)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            event_capacity: config.event_capacity,
        };

        let blocks = session.document.read().await.blocks().len();
        session
            .broadcast(CaseEvent::Loaded {
                case_id: case_id.to_string(),
                blocks,
            })
            .await;
        Ok(session)
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Subscribe to session events
    pub async fn subscribe(&self) -> mpsc::Receiver<CaseEvent> {
        let (tx, rx) = mpsc::channel(self.event_capacity);
        self.subscribers.write().await.push(tx);
        rx
    }

    /// Broadcast an event to all subscribers
    async fn broadcast(&self, event: CaseEvent) {
        let subscribers = self.subscribers.read().await;
        for tx in subscribers.iter() {
            let _ = tx.send(event.clone()).await;
        }
    }

    /// Read access to the document for rendering.
    pub async fn document(&self) -> RwLockReadGuard<'_, PageDocument> {
        self.document.read().await
    }

    /// Apply one mutation. Purely local - nothing reaches the store until
    /// an explicit [`save`](Self::save).
    pub async fn apply(&self, mutation: &Mutation) -> MutationOutcome {
        self.document.write().await.apply(mutation)
    }

    /// Resolve and apply a drop gesture. Local, like [`apply`](Self::apply).
    pub async fn apply_drop(&self, source: &DragSource, anchor: &DropAnchor) -> MutationOutcome {
        self.document.write().await.apply_drop(source, anchor)
    }

    /// Steer selection/focus/hover from a pane.
    pub async fn update_selection(&self, update: impl FnOnce(&mut Selection)) {
        update(&mut self.document.write().await.selection);
    }

    pub async fn is_dirty(&self) -> bool {
        self.document.read().await.is_dirty()
    }

    /// Persist the drafts: write the full row set, re-fetch, adopt assigned
    /// ids, take a fresh clean snapshot. Returns the document version that
    /// was saved.
    pub async fn save(&self) -> Result<u64, SessionError> {
        if self.saving.swap(true, Ordering::SeqCst) {
            tracing::warn!(case_id = %self.case_id, "save rejected: one already in flight");
            return Err(SessionError::SaveInFlight);
        }

        let result = self.save_inner().await;
        self.saving.store(false, Ordering::SeqCst);

        match &result {
            Ok(version) => {
                tracing::info!(case_id = %self.case_id, version = *version, "saved case blocks");
                self.broadcast(CaseEvent::Saved {
                    case_id: self.case_id.clone(),
                    version: *version,
                })
                .await;
            }
            Err(err) => {
                tracing::error!(case_id = %self.case_id, error = %err, "save failed");
                self.broadcast(CaseEvent::SaveFailed {
                    case_id: self.case_id.clone(),
                    reason: err.to_string(),
                })
                .await;
            }
        }

        result
    }

    async fn save_inner(&self) -> Result<u64, SessionError> {
        let (rows, plan, version) = {
            let document = self.document.read().await;
            let persisted = self.persisted.read().await;
            (
                document.rows(),
                document.save_plan(&persisted),
                document.version(),
            )
        };
        tracing::debug!(
            case_id = %self.case_id,
            inserts = plan.to_insert.len(),
            updates = plan.to_update.len(),
            deletes = plan.to_delete.len(),
            "computed save plan"
        );

        // The write and the re-fetch are the only suspension points; a
        // failure in either leaves drafts and snapshot untouched.
        self.store.save_blocks(&self.case_id, rows).await?;
        let fresh = self.store.fetch_blocks(&self.case_id).await?;

        let mut document = self.document.write().await;
        document.adopt_saved(&fresh);
        *self.persisted.write().await = fresh;

        Ok(version)
    }
}
