//! In-memory draft of a persisted block.

use crate::keys::KeyGenerator;
use folio_schema::{normalize_block, BlockContent, BlockRow, Container};

/// A block as the editor holds it: typed content plus two identities.
///
/// `id` is the store-assigned identity, `None` until the first successful
/// save. `local_key` is assigned once when the draft enters the session and
/// never changes afterwards - render lists and drag targeting key off it, so
/// it must stay stable across saves.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDraft {
    pub id: Option<String>,
    pub local_key: String,
    pub content: BlockContent,
}

impl BlockDraft {
    /// Build a draft from a persisted row, normalizing the content blob.
    pub fn from_row(row: &BlockRow, keys: &mut KeyGenerator) -> Self {
        Self {
            id: row.id.clone(),
            local_key: keys.next_key(),
            content: normalize_block(row.block_type, &row.content),
        }
    }

    /// Serialize back to a row at the given position. `sort_order` is always
    /// the draft's current array index - never carried over.
    pub fn to_row(&self, sort_order: i64) -> BlockRow {
        BlockRow {
            id: self.id.clone(),
            block_type: self.content.block_type(),
            content: self.content.to_value(),
            sort_order,
        }
    }

    pub fn container(&self) -> Option<&Container> {
        self.content.as_container()
    }

    pub fn container_mut(&mut self) -> Option<&mut Container> {
        self.content.as_container_mut()
    }

    /// Total item count (zero for spacers).
    pub fn item_count(&self) -> usize {
        self.container().map_or(0, Container::item_count)
    }
}
