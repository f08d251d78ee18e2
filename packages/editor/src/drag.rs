//! # Drop Resolver
//!
//! Turns a raw drop gesture into at most one [`Mutation`].
//!
//! A drag carries a source (an existing block, an existing item, or a palette
//! token naming a brand-new block/item type) onto an anchor (a block, a
//! column's append zone, or an item). Only the combinations below mean
//! anything; everything else - including a drop onto itself and any anchor
//! that went stale mid-drag - resolves to `None` and is silently ignored.
//!
//! Palette drops are insertions, not moves: they mint new content at the
//! anchor instead of relocating existing content.

use crate::draft::BlockDraft;
use crate::mutations::{ItemDest, ItemSource, Mutation};
use folio_schema::{BlockContent, BlockType, ItemType};
use serde::{Deserialize, Serialize};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragSource {
    Block {
        block: String,
    },
    Item {
        block: String,
        column: usize,
        item: String,
    },
    Palette(PaletteToken),
}

/// A new-content token from the palette strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteToken {
    Block(BlockType),
    Item(ItemType),
}

/// Where the drop landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DropAnchor {
    Block {
        block: String,
    },
    Column {
        block: String,
        column: usize,
    },
    Item {
        block: String,
        column: usize,
        item: String,
    },
    /// The append zone below the last block.
    End,
}

/// Resolve a drop to a mutation, or `None` when the gesture means nothing.
pub fn resolve_drop(
    blocks: &[BlockDraft],
    source: &DragSource,
    anchor: &DropAnchor,
) -> Option<Mutation> {
    match (source, anchor) {
        // Existing item onto another item: insert before it.
        (
            DragSource::Item {
                block,
                column,
                item,
            },
            DropAnchor::Item {
                block: anchor_block,
                column: anchor_column,
                item: anchor_item,
            },
        ) => {
            if block == anchor_block && column == anchor_column && item == anchor_item {
                return None;
            }
            Some(Mutation::MoveItem {
                from: ItemSource {
                    block: block.clone(),
                    column: *column,
                    item: item.clone(),
                },
                to: ItemDest {
                    block: anchor_block.clone(),
                    column: *anchor_column,
                    before: Some(anchor_item.clone()),
                },
            })
        }

        // Existing item onto a column's append zone.
        (
            DragSource::Item {
                block,
                column,
                item,
            },
            DropAnchor::Column {
                block: anchor_block,
                column: anchor_column,
            },
        ) => Some(Mutation::MoveItem {
            from: ItemSource {
                block: block.clone(),
                column: *column,
                item: item.clone(),
            },
            to: ItemDest {
                block: anchor_block.clone(),
                column: *anchor_column,
                before: None,
            },
        }),

        // Whole block onto another block: reorder.
        (
            DragSource::Block { block },
            DropAnchor::Block {
                block: anchor_block,
            },
        ) => {
            if block == anchor_block {
                return None;
            }
            Some(Mutation::ReorderBlocks {
                from: block.clone(),
                to: anchor_block.clone(),
            })
        }

        // Palette block token: insert after the anchor block / at the end.
        (
            DragSource::Palette(PaletteToken::Block(block_type)),
            DropAnchor::Block {
                block: anchor_block,
            },
        ) => {
            let index = blocks.iter().position(|b| b.local_key == *anchor_block)?;
            Some(Mutation::InsertBlock {
                index: index + 1,
                content: BlockContent::starter(*block_type),
            })
        }
        (DragSource::Palette(PaletteToken::Block(block_type)), DropAnchor::End) => {
            Some(Mutation::InsertBlock {
                index: blocks.len(),
                content: BlockContent::starter(*block_type),
            })
        }

        // Palette item token onto a column or an item: append to that column.
        (
            DragSource::Palette(PaletteToken::Item(item_type)),
            DropAnchor::Column { block, column },
        )
        | (
            DragSource::Palette(PaletteToken::Item(item_type)),
            DropAnchor::Item { block, column, .. },
        ) => Some(Mutation::AddItem {
            block: block.clone(),
            column: *column,
            item_type: *item_type,
        }),

        _ => None,
    }
}
