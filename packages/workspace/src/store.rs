//! # Block Stores
//!
//! The persistence collaborator, seen only through its interface: fetch the
//! rows of a case, save a full replacement row set. Saving must delete rows
//! whose id is absent from the new set, then upsert the rest by id, assigning
//! ids to rows that lack one. Nothing here is incremental - the editor always
//! writes the whole page.
//!
//! Two backends ship with the workspace: an in-memory map for tests and
//! previews, and a one-JSON-file-per-case store for local development. A real
//! deployment plugs a database behind the same trait.

use crate::error::StoreError;
use folio_schema::BlockRow;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Row-store contract required by the editing session.
pub trait BlockStore: Send + Sync {
    /// All rows of a case, ordered by `sort_order` ascending.
    fn fetch_blocks(
        &self,
        case_id: &str,
    ) -> impl Future<Output = Result<Vec<BlockRow>, StoreError>> + Send;

    /// Replace a case's rows: delete absent ids, upsert the rest.
    fn save_blocks(
        &self,
        case_id: &str,
        rows: Vec<BlockRow>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Delete-then-upsert over one case's existing rows. Shared by every backend
/// so the save contract cannot drift between them.
fn apply_save(
    existing: &mut Vec<BlockRow>,
    incoming: Vec<BlockRow>,
    mut next_id: impl FnMut() -> String,
) {
    let keep: HashSet<&str> = incoming.iter().filter_map(|r| r.id.as_deref()).collect();
    existing.retain(|row| {
        row.id
            .as_deref()
            .is_some_and(|id| keep.contains(id))
    });

    for mut row in incoming {
        if row.id.is_none() {
            row.id = Some(next_id());
        }
        match existing.iter_mut().find(|r| r.id == row.id) {
            Some(slot) => *slot = row,
            None => existing.push(row),
        }
    }

    existing.sort_by_key(|row| row.sort_order);
}

/// In-memory store for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    cases: Arc<RwLock<HashMap<String, Vec<BlockRow>>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a case with rows (test setup).
    pub async fn seed(&self, case_id: &str, rows: Vec<BlockRow>) {
        self.cases
            .write()
            .await
            .insert(case_id.to_string(), rows);
    }
}

impl BlockStore for MemoryStore {
    async fn fetch_blocks(&self, case_id: &str) -> Result<Vec<BlockRow>, StoreError> {
        let cases = self.cases.read().await;
        let mut rows = cases.get(case_id).cloned().unwrap_or_default();
        rows.sort_by_key(|row| row.sort_order);
        Ok(rows)
    }

    async fn save_blocks(&self, case_id: &str, rows: Vec<BlockRow>) -> Result<(), StoreError> {
        let mut cases = self.cases.write().await;
        let existing = cases.entry(case_id.to_string()).or_default();
        let next_id = &self.next_id;
        apply_save(existing, rows, || {
            format!("blk-{}", next_id.fetch_add(1, Ordering::Relaxed) + 1)
        });
        Ok(())
    }
}

/// One JSON document of rows per case under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCase {
    next_id: u64,
    blocks: Vec<BlockRow>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn case_path(&self, case_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", case_id))
    }

    async fn read_case(&self, case_id: &str) -> Result<StoredCase, StoreError> {
        let path = self.case_path(case_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoredCase::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_case(&self, case_id: &str, case: &StoredCase) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let raw = serde_json::to_string_pretty(case)?;
        tokio::fs::write(self.case_path(case_id), raw).await?;
        Ok(())
    }
}

impl BlockStore for FileStore {
    async fn fetch_blocks(&self, case_id: &str) -> Result<Vec<BlockRow>, StoreError> {
        let mut case = self.read_case(case_id).await?;
        case.blocks.sort_by_key(|row| row.sort_order);
        Ok(case.blocks)
    }

    async fn save_blocks(&self, case_id: &str, rows: Vec<BlockRow>) -> Result<(), StoreError> {
        let mut case = self.read_case(case_id).await?;
        let mut counter = case.next_id;
        apply_save(&mut case.blocks, rows, || {
            counter += 1;
            format!("blk-{}", counter)
        });
        case.next_id = counter;
        self.write_case(case_id, &case).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_schema::BlockType;
    use serde_json::json;

    fn row(id: Option<&str>, sort_order: i64) -> BlockRow {
        BlockRow {
            id: id.map(str::to_string),
            block_type: BlockType::Spacer,
            content: json!({ "height": "md" }),
            sort_order,
        }
    }

    #[tokio::test]
    async fn test_memory_store_deletes_then_upserts() {
        let store = MemoryStore::new();
        store
            .seed("case-1", vec![row(Some("a"), 0), row(Some("b"), 1)])
            .await;

        // Keep b first, add one new row.
        store
            .save_blocks("case-1", vec![row(Some("b"), 0), row(None, 1)])
            .await
            .unwrap();

        let rows = store.fetch_blocks("case-1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_deref(), Some("b"));
        assert!(rows[1].id.is_some(), "insert was not assigned an id");
        assert!(rows.iter().all(|r| r.id.as_deref() != Some("a")));
    }

    #[tokio::test]
    async fn test_memory_store_never_reuses_assigned_ids() {
        let store = MemoryStore::new();
        store.save_blocks("case-1", vec![row(None, 0)]).await.unwrap();
        let first = store.fetch_blocks("case-1").await.unwrap()[0].id.clone();

        store.save_blocks("case-1", vec![row(None, 0)]).await.unwrap();
        let second = store.fetch_blocks("case-1").await.unwrap()[0].id.clone();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store
            .save_blocks("case-7", vec![row(None, 0), row(None, 1)])
            .await
            .unwrap();

        let rows = store.fetch_blocks("case-7").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.id.is_some()));

        // Replace with only the first row: the second is deleted on disk.
        let keep = rows[0].clone();
        store.save_blocks("case-7", vec![keep.clone()]).await.unwrap();
        let rows = store.fetch_blocks("case-7").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_file_store_missing_case_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let rows = store.fetch_blocks("nope").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_orders_by_sort_order() {
        let store = MemoryStore::new();
        store
            .seed("case-1", vec![row(Some("z"), 5), row(Some("a"), 1)])
            .await;

        let rows = store.fetch_blocks("case-1").await.unwrap();
        assert_eq!(rows[0].id.as_deref(), Some("a"));
        assert_eq!(rows[1].id.as_deref(), Some("z"));
    }
}
