//! # Draft Mutations
//!
//! High-level semantic operations on the draft block list.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation represents one editor gesture
//! 2. **Total**: applying never fails - a mutation that cannot be resolved
//!    (stale key, vanished column) reports [`MutationOutcome::Noop`]
//! 3. **Identity-safe**: moves carry items by value, keys travel with them;
//!    duplication always goes through the fresh-key clone primitive
//!
//! ## Mutation Semantics
//!
//! ### MoveItem
//! - Source is located by local key; a miss is a no-op, never an error
//!   (drop targets routinely vanish under an in-flight drag)
//! - Destination index is located by the `before` key; `None` or a miss
//!   appends at the end of the column
//! - Dropping an item directly onto itself is a guarded no-op
//!
//! ### SetColumns
//! - Shrinking discards every item in the dropped columns. The outcome
//!   reports the discarded count so a caller can confirm the gesture first
//!   (see [`count_items_beyond`]).
//!
//! ### DeleteBlock / RemoveItem
//! - Selection repair is the document's job, not the algebra's - the
//!   algebra only reshapes the tree.

use crate::draft::BlockDraft;
use crate::keys::{clone_with_fresh_keys, fresh_item_key, KeyGenerator};
use folio_schema::{
    BlockContent, Container, ContentItem, ItemContent, ItemType, MAX_COLUMNS, MIN_COLUMNS,
};
use serde::{Deserialize, Serialize};

/// Source half of a move: an item addressed by key inside a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSource {
    pub block: String,
    pub column: usize,
    pub item: String,
}

/// Destination half of a move. `before: None` appends at the column's end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDest {
    pub block: String,
    pub column: usize,
    pub before: Option<String>,
}

/// What applying a mutation did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// State changed.
    Applied,
    /// State changed and `discarded` items were permanently dropped
    /// (column-count shrink only).
    Destructive { discarded: usize },
    /// Nothing resolved or nothing differed; the tree is untouched.
    Noop,
}

impl MutationOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, MutationOutcome::Noop)
    }
}

/// Semantic mutations over the draft block list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Resize a container to `columns`, padding with empty columns or
    /// discarding trailing ones.
    SetColumns { block: String, columns: u8 },

    /// Append a default item of `item_type` to a column.
    AddItem {
        block: String,
        column: usize,
        item_type: ItemType,
    },

    /// Clone the item at `item`, inserting the copy right after it.
    DuplicateItem {
        block: String,
        column: usize,
        item: usize,
    },

    /// Remove the item at `item`.
    RemoveItem {
        block: String,
        column: usize,
        item: usize,
    },

    /// Replace the payload of the item at `item`, keeping its key.
    UpdateItem {
        block: String,
        column: usize,
        item: usize,
        content: ItemContent,
    },

    /// Move an item within or across containers.
    MoveItem { from: ItemSource, to: ItemDest },

    /// Insert a new block at `index` (palette drop). Nested keys are
    /// regenerated, so palette content may be a shared template.
    InsertBlock { index: usize, content: BlockContent },

    /// Clone a whole block, fresh keys throughout, right after the original.
    DuplicateBlock { block: String },

    /// Array-move a block to another block's position.
    ReorderBlocks { from: String, to: String },

    /// Set or clear a block's display name.
    RenameBlock {
        block: String,
        name: Option<String>,
    },

    /// Set or clear a container's background color. Noop on spacers.
    SetBackground {
        block: String,
        color: Option<String>,
    },

    /// Remove a block entirely.
    DeleteBlock { block: String },
}

impl Mutation {
    /// Apply to the draft list. Total: resolution misses are `Noop`s.
    pub fn apply(&self, blocks: &mut Vec<BlockDraft>, keys: &mut KeyGenerator) -> MutationOutcome {
        match self {
            Mutation::SetColumns { block, columns } => apply_set_columns(blocks, block, *columns),

            Mutation::AddItem {
                block,
                column,
                item_type,
            } => apply_add_item(blocks, keys, block, *column, *item_type),

            Mutation::DuplicateItem {
                block,
                column,
                item,
            } => apply_duplicate_item(blocks, keys, block, *column, *item),

            Mutation::RemoveItem {
                block,
                column,
                item,
            } => apply_remove_item(blocks, block, *column, *item),

            Mutation::UpdateItem {
                block,
                column,
                item,
                content,
            } => apply_update_item(blocks, block, *column, *item, content),

            Mutation::MoveItem { from, to } => apply_move_item(blocks, from, to),

            Mutation::InsertBlock { index, content } => {
                apply_insert_block(blocks, keys, *index, content)
            }

            Mutation::DuplicateBlock { block } => apply_duplicate_block(blocks, keys, block),

            Mutation::ReorderBlocks { from, to } => apply_reorder_blocks(blocks, from, to),

            Mutation::RenameBlock { block, name } => apply_rename_block(blocks, block, name),

            Mutation::SetBackground { block, color } => {
                apply_set_background(blocks, block, color)
            }

            Mutation::DeleteBlock { block } => apply_delete_block(blocks, block),
        }
    }
}

/// Items that `SetColumns { columns }` would discard - lets a front end ask
/// for confirmation before applying the destructive shrink.
pub fn count_items_beyond(container: &Container, columns: u8) -> usize {
    let keep = columns.clamp(MIN_COLUMNS, MAX_COLUMNS) as usize;
    container.slots.iter().skip(keep).map(Vec::len).sum()
}

fn block_position(blocks: &[BlockDraft], key: &str) -> Option<usize> {
    blocks.iter().position(|b| b.local_key == key)
}

fn container_mut<'a>(blocks: &'a mut [BlockDraft], key: &str) -> Option<&'a mut Container> {
    blocks
        .iter_mut()
        .find(|b| b.local_key == key)?
        .container_mut()
}

fn apply_set_columns(blocks: &mut [BlockDraft], block: &str, columns: u8) -> MutationOutcome {
    let Some(container) = container_mut(blocks, block) else {
        return MutationOutcome::Noop;
    };

    let target = columns.clamp(MIN_COLUMNS, MAX_COLUMNS);
    if target == container.columns && container.slots.len() == target as usize {
        return MutationOutcome::Noop;
    }

    let discarded = count_items_beyond(container, target);
    container.columns = target;
    container.slots.resize_with(target as usize, Vec::new);

    if discarded > 0 {
        MutationOutcome::Destructive { discarded }
    } else {
        MutationOutcome::Applied
    }
}

fn apply_add_item(
    blocks: &mut [BlockDraft],
    keys: &mut KeyGenerator,
    block: &str,
    column: usize,
    item_type: ItemType,
) -> MutationOutcome {
    let Some(container) = container_mut(blocks, block) else {
        return MutationOutcome::Noop;
    };
    if column >= container.slots.len() {
        return MutationOutcome::Noop;
    }

    let key = fresh_item_key(container, keys);
    container.slots[column].push(ContentItem::new(key, ItemContent::default_for(item_type)));
    MutationOutcome::Applied
}

fn apply_duplicate_item(
    blocks: &mut [BlockDraft],
    keys: &mut KeyGenerator,
    block: &str,
    column: usize,
    item: usize,
) -> MutationOutcome {
    let Some(container) = container_mut(blocks, block) else {
        return MutationOutcome::Noop;
    };

    let key = fresh_item_key(container, keys);
    let Some(slot) = container.slots.get_mut(column) else {
        return MutationOutcome::Noop;
    };
    let Some(original) = slot.get(item) else {
        return MutationOutcome::Noop;
    };

    let copy = ContentItem::new(key, original.content.clone());
    slot.insert(item + 1, copy);
    MutationOutcome::Applied
}

fn apply_remove_item(
    blocks: &mut [BlockDraft],
    block: &str,
    column: usize,
    item: usize,
) -> MutationOutcome {
    let Some(container) = container_mut(blocks, block) else {
        return MutationOutcome::Noop;
    };
    let Some(slot) = container.slots.get_mut(column) else {
        return MutationOutcome::Noop;
    };
    if item >= slot.len() {
        return MutationOutcome::Noop;
    }

    slot.remove(item);
    MutationOutcome::Applied
}

fn apply_update_item(
    blocks: &mut [BlockDraft],
    block: &str,
    column: usize,
    item: usize,
    content: &ItemContent,
) -> MutationOutcome {
    let Some(container) = container_mut(blocks, block) else {
        return MutationOutcome::Noop;
    };
    let Some(existing) = container
        .slots
        .get_mut(column)
        .and_then(|slot| slot.get_mut(item))
    else {
        return MutationOutcome::Noop;
    };

    if existing.content == *content {
        return MutationOutcome::Noop;
    }
    existing.content = content.clone();
    MutationOutcome::Applied
}

fn apply_move_item(
    blocks: &mut [BlockDraft],
    from: &ItemSource,
    to: &ItemDest,
) -> MutationOutcome {
    // Drop-on-self guard: dragging an item onto its own position would
    // otherwise remove and re-insert it on every pointer jitter.
    if from.block == to.block
        && from.column == to.column
        && to.before.as_deref() == Some(from.item.as_str())
    {
        return MutationOutcome::Noop;
    }

    let Some(src) = block_position(blocks, &from.block) else {
        return MutationOutcome::Noop;
    };
    let Some(dst) = block_position(blocks, &to.block) else {
        return MutationOutcome::Noop;
    };

    if src == dst {
        let Some(container) = blocks[src].container_mut() else {
            return MutationOutcome::Noop;
        };
        return move_within(container, from, to);
    }

    // Disjoint containers: split the slice so both sides borrow cleanly.
    let (src_block, dst_block) = if src < dst {
        let (head, tail) = blocks.split_at_mut(dst);
        (&mut head[src], &mut tail[0])
    } else {
        let (head, tail) = blocks.split_at_mut(src);
        (&mut tail[0], &mut head[dst])
    };

    let Some(src_container) = src_block.container_mut() else {
        return MutationOutcome::Noop;
    };
    let Some(dst_container) = dst_block.container_mut() else {
        return MutationOutcome::Noop;
    };
    if to.column >= dst_container.slots.len() {
        return MutationOutcome::Noop;
    }

    let Some(slot) = src_container.slots.get_mut(from.column) else {
        return MutationOutcome::Noop;
    };
    let Some(pos) = slot.iter().position(|i| i.local_key == from.item) else {
        return MutationOutcome::Noop;
    };
    let item = slot.remove(pos);

    let column = &mut dst_container.slots[to.column];
    let at = resolve_before(column, to.before.as_deref());
    column.insert(at, item);
    MutationOutcome::Applied
}

fn move_within(container: &mut Container, from: &ItemSource, to: &ItemDest) -> MutationOutcome {
    if to.column >= container.slots.len() {
        return MutationOutcome::Noop;
    }
    let Some(slot) = container.slots.get_mut(from.column) else {
        return MutationOutcome::Noop;
    };
    let Some(pos) = slot.iter().position(|i| i.local_key == from.item) else {
        return MutationOutcome::Noop;
    };
    let item = slot.remove(pos);

    let column = &mut container.slots[to.column];
    let at = resolve_before(column, to.before.as_deref());
    column.insert(at, item);
    MutationOutcome::Applied
}

/// Destination index for a `before` key: its position, or the end when the
/// key is absent or stale.
fn resolve_before(column: &[ContentItem], before: Option<&str>) -> usize {
    before
        .and_then(|key| column.iter().position(|i| i.local_key == key))
        .unwrap_or(column.len())
}

fn apply_insert_block(
    blocks: &mut Vec<BlockDraft>,
    keys: &mut KeyGenerator,
    index: usize,
    content: &BlockContent,
) -> MutationOutcome {
    let template = BlockDraft {
        id: None,
        local_key: String::new(),
        content: content.clone(),
    };
    let draft = clone_with_fresh_keys(&template, keys);

    let at = index.min(blocks.len());
    blocks.insert(at, draft);
    MutationOutcome::Applied
}

fn apply_duplicate_block(
    blocks: &mut Vec<BlockDraft>,
    keys: &mut KeyGenerator,
    block: &str,
) -> MutationOutcome {
    let Some(pos) = block_position(blocks, block) else {
        return MutationOutcome::Noop;
    };

    let clone = clone_with_fresh_keys(&blocks[pos], keys);
    blocks.insert(pos + 1, clone);
    MutationOutcome::Applied
}

fn apply_reorder_blocks(blocks: &mut Vec<BlockDraft>, from: &str, to: &str) -> MutationOutcome {
    let Some(src) = block_position(blocks, from) else {
        return MutationOutcome::Noop;
    };
    let Some(dst) = block_position(blocks, to) else {
        return MutationOutcome::Noop;
    };
    if src == dst {
        return MutationOutcome::Noop;
    }

    let block = blocks.remove(src);
    blocks.insert(dst, block);
    MutationOutcome::Applied
}

fn apply_rename_block(
    blocks: &mut [BlockDraft],
    block: &str,
    name: &Option<String>,
) -> MutationOutcome {
    let Some(pos) = block_position(blocks, block) else {
        return MutationOutcome::Noop;
    };

    let next = name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if blocks[pos].content.name() == next.as_deref() {
        return MutationOutcome::Noop;
    }
    blocks[pos].content.set_name(next);
    MutationOutcome::Applied
}

fn apply_set_background(
    blocks: &mut [BlockDraft],
    block: &str,
    color: &Option<String>,
) -> MutationOutcome {
    let Some(container) = container_mut(blocks, block) else {
        return MutationOutcome::Noop;
    };

    if container.background_color == *color {
        return MutationOutcome::Noop;
    }
    container.background_color = color.clone();
    MutationOutcome::Applied
}

fn apply_delete_block(blocks: &mut Vec<BlockDraft>, block: &str) -> MutationOutcome {
    let Some(pos) = block_position(blocks, block) else {
        return MutationOutcome::Noop;
    };

    blocks.remove(pos);
    MutationOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::MoveItem {
            from: ItemSource {
                block: "b-1".to_string(),
                column: 0,
                item: "k-3".to_string(),
            },
            to: ItemDest {
                block: "b-2".to_string(),
                column: 1,
                before: None,
            },
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_stale_key_is_noop() {
        let mut blocks = Vec::new();
        let mut keys = KeyGenerator::new("case-1");

        let mutation = Mutation::DeleteBlock {
            block: "gone".to_string(),
        };
        assert_eq!(mutation.apply(&mut blocks, &mut keys), MutationOutcome::Noop);
    }

    #[test]
    fn test_count_items_beyond() {
        let mut container = Container::with_columns(3);
        let mut keys = KeyGenerator::new("case-1");
        for column in 0..3 {
            let key = fresh_item_key(&container, &mut keys);
            container.slots[column].push(ContentItem::new(
                key,
                ItemContent::default_for(ItemType::Text),
            ));
        }

        assert_eq!(count_items_beyond(&container, 3), 0);
        assert_eq!(count_items_beyond(&container, 2), 1);
        assert_eq!(count_items_beyond(&container, 1), 2);
    }
}
