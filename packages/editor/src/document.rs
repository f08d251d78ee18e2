//! # Page Document
//!
//! The one mutable value behind an editing session.
//!
//! ## Lifecycle
//!
//! ```text
//! Fetch → Normalize → Edit → Diff → Save → Adopt ids
//!   ↓        ↓          ↓      ↓      ↓        ↓
//! Rows    Drafts    Mutations Plan  Store   Clean snapshot
//! ```
//!
//! Rows come in ordered by `sort_order`, are normalized into typed drafts,
//! and get local keys assigned (blocks always, items where the stored blob
//! lacked them). From then on the tree changes only through
//! [`Mutation::apply`] routed via [`PageDocument::apply`], which also bumps
//! the version and repairs selection - callers never reach into the tree.
//!
//! Dirty state is a fingerprint comparison against the snapshot taken at the
//! last load or save, so reverting an edit by hand really does flip the page
//! back to clean.

use crate::drag::{resolve_drop, DragSource, DropAnchor};
use crate::draft::BlockDraft;
use crate::keys::{ensure_item_keys, KeyGenerator};
use crate::mutations::{Mutation, MutationOutcome};
use crate::reconcile::{compute_diff, fingerprint, SavePlan};
use crate::selection::Selection;
use folio_schema::BlockRow;

#[derive(Debug, Clone)]
pub struct PageDocument {
    case_id: String,
    blocks: Vec<BlockDraft>,
    keys: KeyGenerator,
    /// Selection is public: panes read and steer it directly; pruning after
    /// mutations is this document's job.
    pub selection: Selection,
    version: u64,
    clean_fingerprint: String,
}

impl PageDocument {
    /// Build a document from persisted rows (the load path).
    pub fn from_rows(case_id: &str, rows: &[BlockRow]) -> Self {
        let mut keys = KeyGenerator::new(case_id);

        let mut sorted: Vec<&BlockRow> = rows.iter().collect();
        sorted.sort_by_key(|row| row.sort_order);

        let mut blocks: Vec<BlockDraft> = sorted
            .iter()
            .map(|row| BlockDraft::from_row(row, &mut keys))
            .collect();
        ensure_item_keys(&mut blocks, &mut keys);

        let clean_fingerprint = fingerprint(&blocks);
        Self {
            case_id: case_id.to_string(),
            blocks,
            keys,
            selection: Selection::default(),
            version: 0,
            clean_fingerprint,
        }
    }

    /// Fresh empty page (a case with no saved blocks yet).
    pub fn empty(case_id: &str) -> Self {
        Self::from_rows(case_id, &[])
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn blocks(&self) -> &[BlockDraft] {
        &self.blocks
    }

    /// Version bumps once per applied mutation; `Noop`s don't count.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply a mutation, then repair selection so nothing dangles.
    pub fn apply(&mut self, mutation: &Mutation) -> MutationOutcome {
        let outcome = mutation.apply(&mut self.blocks, &mut self.keys);
        if outcome.changed() {
            self.version += 1;
            self.selection.prune(&self.blocks);
        }
        outcome
    }

    /// Resolve a drop gesture against the current tree.
    pub fn resolve_drop(&self, source: &DragSource, anchor: &DropAnchor) -> Option<Mutation> {
        resolve_drop(&self.blocks, source, anchor)
    }

    /// Resolve and apply in one step; unresolvable gestures are `Noop`s.
    pub fn apply_drop(&mut self, source: &DragSource, anchor: &DropAnchor) -> MutationOutcome {
        match self.resolve_drop(source, anchor) {
            Some(mutation) => self.apply(&mutation),
            None => MutationOutcome::Noop,
        }
    }

    /// Whether the drafts diverged from the last clean snapshot.
    pub fn is_dirty(&self) -> bool {
        fingerprint(&self.blocks) != self.clean_fingerprint
    }

    /// The full row set for a save, `sort_order` rewritten from position.
    pub fn rows(&self) -> Vec<BlockRow> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, draft)| draft.to_row(index as i64))
            .collect()
    }

    /// Row-level effect of saving now against `persisted`.
    pub fn save_plan(&self, persisted: &[BlockRow]) -> SavePlan {
        compute_diff(persisted, &self.blocks)
    }

    /// Adopt store-assigned ids after a successful save and mark clean.
    ///
    /// Rows are matched to drafts by position (`sort_order` was just
    /// rewritten from those positions, so they agree). Local keys are
    /// untouched - identity survives the save.
    pub fn adopt_saved(&mut self, rows: &[BlockRow]) {
        let mut sorted: Vec<&BlockRow> = rows.iter().collect();
        sorted.sort_by_key(|row| row.sort_order);

        for (draft, row) in self.blocks.iter_mut().zip(sorted) {
            draft.id = row.id.clone();
        }
        self.mark_clean();
    }

    /// Take a new clean snapshot of the current drafts.
    pub fn mark_clean(&mut self) {
        self.clean_fingerprint = fingerprint(&self.blocks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_schema::{BlockType, ItemType};
    use serde_json::json;

    fn container_row(id: &str, sort_order: i64) -> BlockRow {
        BlockRow {
            id: Some(id.to_string()),
            block_type: BlockType::Container,
            content: json!({
                "columns": 1,
                "slots": [[ { "type": "text", "content": { "body": id } } ]]
            }),
            sort_order,
        }
    }

    #[test]
    fn test_load_orders_by_sort_order() {
        let rows = vec![container_row("second", 5), container_row("first", 1)];
        let doc = PageDocument::from_rows("case-1", &rows);

        assert_eq!(doc.blocks()[0].id.as_deref(), Some("first"));
        assert_eq!(doc.blocks()[1].id.as_deref(), Some("second"));
    }

    #[test]
    fn test_load_is_clean_and_assigns_item_keys() {
        let rows = vec![container_row("a", 0)];
        let doc = PageDocument::from_rows("case-1", &rows);

        assert!(!doc.is_dirty());
        assert_eq!(doc.version(), 0);

        let container = doc.blocks()[0].container().unwrap();
        assert!(!container.slots[0][0].local_key.is_empty());
    }

    #[test]
    fn test_mutation_flips_dirty_and_bumps_version() {
        let rows = vec![container_row("a", 0)];
        let mut doc = PageDocument::from_rows("case-1", &rows);
        let block = doc.blocks()[0].local_key.clone();

        let outcome = doc.apply(&Mutation::AddItem {
            block,
            column: 0,
            item_type: ItemType::Image,
        });

        assert_eq!(outcome, MutationOutcome::Applied);
        assert!(doc.is_dirty());
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_noop_mutation_leaves_document_alone() {
        let rows = vec![container_row("a", 0)];
        let mut doc = PageDocument::from_rows("case-1", &rows);

        let outcome = doc.apply(&Mutation::DeleteBlock {
            block: "stale".to_string(),
        });

        assert_eq!(outcome, MutationOutcome::Noop);
        assert!(!doc.is_dirty());
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_reverting_edit_returns_to_clean() {
        let rows = vec![container_row("a", 0)];
        let mut doc = PageDocument::from_rows("case-1", &rows);
        let block = doc.blocks()[0].local_key.clone();

        doc.apply(&Mutation::RenameBlock {
            block: block.clone(),
            name: Some("Hero".to_string()),
        });
        assert!(doc.is_dirty());

        doc.apply(&Mutation::RenameBlock { block, name: None });
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_adopt_saved_assigns_ids_and_keeps_keys() {
        let mut doc = PageDocument::empty("case-1");
        doc.apply(&Mutation::InsertBlock {
            index: 0,
            content: folio_schema::BlockContent::starter(BlockType::Container),
        });
        let key_before = doc.blocks()[0].local_key.clone();
        assert!(doc.is_dirty());
        assert_eq!(doc.blocks()[0].id, None);

        let mut saved = doc.rows();
        saved[0].id = Some("fresh-id".to_string());
        doc.adopt_saved(&saved);

        assert_eq!(doc.blocks()[0].id.as_deref(), Some("fresh-id"));
        assert_eq!(doc.blocks()[0].local_key, key_before);
        assert!(!doc.is_dirty());
    }
}
