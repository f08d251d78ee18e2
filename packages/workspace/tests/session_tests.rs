//! Session lifecycle tests: load, edit, save, guard, failure paths.

use folio_editor::schema::{BlockRow, BlockType, ItemType};
use folio_editor::{DragSource, DropAnchor, Mutation, MutationOutcome, PaletteToken};
use folio_workspace::{
    BlockStore, CaseEvent, CaseSession, MemoryStore, SessionError, StoreError,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;

fn init_logs() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn seeded_rows() -> Vec<BlockRow> {
    vec![
        BlockRow {
            id: Some("a".to_string()),
            block_type: BlockType::Container,
            content: json!({
                "columns": 1,
                "slots": [[ { "type": "text", "content": { "body": "hello" } } ]]
            }),
            sort_order: 0,
        },
        BlockRow {
            id: Some("b".to_string()),
            block_type: BlockType::Spacer,
            content: json!({ "height": "lg" }),
            sort_order: 1,
        },
    ]
}

#[tokio::test]
async fn test_open_builds_clean_document() {
    init_logs();
    let store = MemoryStore::new();
    store.seed("case-1", seeded_rows()).await;

    let session = CaseSession::open(store, "case-1").await.unwrap();

    assert!(!session.is_dirty().await);
    let first_key = {
        let document = session.document().await;
        assert_eq!(document.blocks().len(), 2);
        assert_eq!(document.blocks()[0].id.as_deref(), Some("a"));
        document.blocks()[0].local_key.clone()
    };

    // Selection is part of the session state, not a pane-local detail.
    session
        .update_selection(|selection| selection.select_block(&first_key))
        .await;
    assert_eq!(
        session.document().await.selection.selected_block(),
        Some(first_key.as_str())
    );
}

#[tokio::test]
async fn test_edit_save_adopts_assigned_ids() {
    init_logs();
    let store = MemoryStore::new();
    let session = CaseSession::open(store.clone(), "case-new").await.unwrap();

    // Build a small page from palette gestures.
    session
        .apply_drop(
            &DragSource::Palette(PaletteToken::Block(BlockType::Container)),
            &DropAnchor::End,
        )
        .await;
    let block = session.document().await.blocks()[0].local_key.clone();
    session
        .apply(&Mutation::AddItem {
            block,
            column: 0,
            item_type: ItemType::Image,
        })
        .await;
    assert!(session.is_dirty().await);

    let saved_version = session.save().await.unwrap();
    assert_eq!(saved_version, 2);
    assert!(!session.is_dirty().await);

    let document = session.document().await;
    assert!(document.blocks().iter().all(|b| b.id.is_some()));

    // The store saw the full row set with rewritten order.
    let rows = store.fetch_blocks("case-new").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sort_order, 0);
}

#[tokio::test]
async fn test_save_rewrites_order_and_deletes() {
    init_logs();
    let store = MemoryStore::new();
    store.seed("case-1", seeded_rows()).await;
    let session = CaseSession::open(store.clone(), "case-1").await.unwrap();

    // Delete the container; the spacer becomes the whole page.
    let container_key = session.document().await.blocks()[0].local_key.clone();
    session
        .apply(&Mutation::DeleteBlock {
            block: container_key,
        })
        .await;
    session.save().await.unwrap();

    let rows = store.fetch_blocks("case-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.as_deref(), Some("b"));
    assert_eq!(rows[0].sort_order, 0);
}

#[tokio::test]
async fn test_local_keys_survive_save() {
    init_logs();
    let store = MemoryStore::new();
    store.seed("case-1", seeded_rows()).await;
    let session = CaseSession::open(store, "case-1").await.unwrap();

    session
        .apply_drop(
            &DragSource::Palette(PaletteToken::Block(BlockType::Spacer)),
            &DropAnchor::End,
        )
        .await;
    let keys_before: Vec<String> = session
        .document()
        .await
        .blocks()
        .iter()
        .map(|b| b.local_key.clone())
        .collect();

    session.save().await.unwrap();

    let keys_after: Vec<String> = session
        .document()
        .await
        .blocks()
        .iter()
        .map(|b| b.local_key.clone())
        .collect();
    assert_eq!(keys_before, keys_after);
}

/// Store whose save always fails after the fetch path works.
#[derive(Clone)]
struct FailingStore {
    inner: MemoryStore,
}

impl BlockStore for FailingStore {
    async fn fetch_blocks(&self, case_id: &str) -> Result<Vec<BlockRow>, StoreError> {
        self.inner.fetch_blocks(case_id).await
    }

    async fn save_blocks(&self, _case_id: &str, _rows: Vec<BlockRow>) -> Result<(), StoreError> {
        Err(StoreError::Backend("write refused".to_string()))
    }
}

#[tokio::test]
async fn test_failed_save_preserves_drafts_and_emits_event() {
    init_logs();
    let inner = MemoryStore::new();
    inner.seed("case-1", seeded_rows()).await;
    let session = CaseSession::open(FailingStore { inner }, "case-1")
        .await
        .unwrap();
    let mut events = session.subscribe().await;

    let spacer_key = session.document().await.blocks()[1].local_key.clone();
    session
        .apply(&Mutation::DeleteBlock { block: spacer_key })
        .await;
    let version_before = session.document().await.version();

    let result = session.save().await;
    assert!(matches!(result, Err(SessionError::Store(_))));

    // Nothing was lost: drafts, version, and the dirty flag are untouched.
    assert!(session.is_dirty().await);
    let document = session.document().await;
    assert_eq!(document.version(), version_before);
    assert_eq!(document.blocks().len(), 1);
    drop(document);

    match events.recv().await {
        Some(CaseEvent::SaveFailed { case_id, reason }) => {
            assert_eq!(case_id, "case-1");
            assert!(reason.contains("write refused"));
        }
        other => panic!("expected SaveFailed, got {:?}", other),
    }

    // An explicit retry is allowed immediately.
    assert!(matches!(
        session.save().await,
        Err(SessionError::Store(_))
    ));
}

/// Store that parks every save until released, to hold one in flight.
#[derive(Clone)]
struct GatedStore {
    inner: MemoryStore,
    started: Arc<Notify>,
    proceed: Arc<Notify>,
}

impl BlockStore for GatedStore {
    async fn fetch_blocks(&self, case_id: &str) -> Result<Vec<BlockRow>, StoreError> {
        self.inner.fetch_blocks(case_id).await
    }

    async fn save_blocks(&self, case_id: &str, rows: Vec<BlockRow>) -> Result<(), StoreError> {
        self.started.notify_one();
        self.proceed.notified().await;
        self.inner.save_blocks(case_id, rows).await
    }
}

#[tokio::test]
async fn test_second_save_rejected_while_first_in_flight() {
    init_logs();
    let store = GatedStore {
        inner: MemoryStore::new(),
        started: Arc::new(Notify::new()),
        proceed: Arc::new(Notify::new()),
    };
    let session = CaseSession::open(store.clone(), "case-1").await.unwrap();
    session
        .apply_drop(
            &DragSource::Palette(PaletteToken::Block(BlockType::Container)),
            &DropAnchor::End,
        )
        .await;
    let mut events = session.subscribe().await;

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.save().await })
    };
    // Wait until the first save is inside the store call.
    store.started.notified().await;

    let second = session.save().await;
    assert!(matches!(second, Err(SessionError::SaveInFlight)));

    // Release the first save; it completes normally.
    store.proceed.notify_one();
    let first = first.await.unwrap();
    assert!(first.is_ok());
    assert!(!session.is_dirty().await);

    match events.recv().await {
        Some(CaseEvent::Saved { case_id, .. }) => assert_eq!(case_id, "case-1"),
        other => panic!("expected Saved, got {:?}", other),
    }

    // The guard clears once the save lands; pre-arm the gate for the retry.
    store.proceed.notify_one();
    assert!(session.save().await.is_ok());
}

#[tokio::test]
async fn test_noop_gestures_never_touch_the_store() {
    init_logs();
    let store = MemoryStore::new();
    store.seed("case-1", seeded_rows()).await;
    let session = CaseSession::open(store.clone(), "case-1").await.unwrap();

    // A stale drop resolves to nothing and stays local.
    let outcome = session
        .apply_drop(
            &DragSource::Item {
                block: "gone".to_string(),
                column: 0,
                item: "gone-too".to_string(),
            },
            &DropAnchor::Column {
                block: "also-gone".to_string(),
                column: 0,
            },
        )
        .await;
    assert_eq!(outcome, MutationOutcome::Noop);
    assert!(!session.is_dirty().await);

    // The store never heard about any of it.
    let rows = store.fetch_blocks("case-1").await.unwrap();
    assert_eq!(rows.len(), 2);
}
