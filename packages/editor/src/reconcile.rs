//! # Save Reconciliation
//!
//! Diffs the draft list against the persisted row collection.
//!
//! The rules are deliberately blunt:
//!
//! - a persisted id absent from the drafts is a delete
//! - every draft is an upsert - insert when it has no id yet, update
//!   otherwise
//! - `sort_order` is always rewritten from the draft's array index; order is
//!   never incrementally patched
//!
//! Dirty detection serializes `{type, content}` per draft - the block's
//! `local_key` and `sort_order` are volatile and excluded - and compares
//! against the fingerprint taken at the last load/save.

use crate::draft::BlockDraft;
use folio_schema::BlockRow;
use std::collections::HashSet;

/// The row-level effect of saving the current drafts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavePlan {
    pub to_insert: Vec<BlockRow>,
    pub to_update: Vec<BlockRow>,
    pub to_delete: Vec<String>,
}

impl SavePlan {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Compute the insert/update/delete sets for one save.
pub fn compute_diff(persisted: &[BlockRow], drafts: &[BlockDraft]) -> SavePlan {
    let draft_ids: HashSet<&str> = drafts.iter().filter_map(|d| d.id.as_deref()).collect();

    let to_delete = persisted
        .iter()
        .filter_map(|row| row.id.as_deref())
        .filter(|id| !draft_ids.contains(id))
        .map(str::to_string)
        .collect();

    let mut to_insert = Vec::new();
    let mut to_update = Vec::new();
    for (index, draft) in drafts.iter().enumerate() {
        let row = draft.to_row(index as i64);
        if draft.id.is_some() {
            to_update.push(row);
        } else {
            to_insert.push(row);
        }
    }

    SavePlan {
        to_insert,
        to_update,
        to_delete,
    }
}

/// Structural fingerprint of the drafts for dirty detection.
///
/// Deterministic: the draft list is positional and every content struct
/// serializes its fields in declaration order.
pub fn fingerprint(drafts: &[BlockDraft]) -> String {
    let shape: Vec<serde_json::Value> = drafts
        .iter()
        .map(|draft| {
            serde_json::json!({
                "type": draft.content.block_type(),
                "content": draft.content.to_value(),
            })
        })
        .collect();

    serde_json::to_string(&shape).expect("fingerprint document serializes")
}
