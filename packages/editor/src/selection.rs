//! # Selection / Focus / Hover
//!
//! Three independent signals, one authoritative highlight.
//!
//! The editor shows three panes over the same tree: the block list, the
//! canvas preview, and the inspector. Each reads the same resolved target so
//! they can never disagree about what is highlighted:
//!
//! - `selected_block` - whose inspector is open
//! - `focused_item` - which leaf's inspector is open; always belongs to the
//!   selected block
//! - `hovered` - transient pointer feedback, cleared on pointer leave, never
//!   persisted
//!
//! Resolution: `hovered`, else `focused_item`, else `selected_block`.
//!
//! After every applied mutation the document calls [`Selection::prune`] so no
//! signal can keep pointing at a removed node - a dangling selection is a
//! correctness bug, not a cosmetic one (the inspector would edit a node the
//! canvas no longer shows).

use crate::draft::BlockDraft;
use serde::{Deserialize, Serialize};

/// Index path to a leaf item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPath {
    pub block: String,
    pub column: usize,
    pub item: usize,
}

/// A highlightable node in any pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
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
        item: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    selected_block: Option<String>,
    focused_item: Option<ItemPath>,
    hovered: Option<Target>,
}

impl Selection {
    pub fn selected_block(&self) -> Option<&str> {
        self.selected_block.as_deref()
    }

    pub fn focused_item(&self) -> Option<&ItemPath> {
        self.focused_item.as_ref()
    }

    pub fn hovered(&self) -> Option<&Target> {
        self.hovered.as_ref()
    }

    /// Select a block for the inspector. Clears item focus - selecting a
    /// block and focusing one of its leaves are distinct gestures.
    pub fn select_block(&mut self, block: &str) {
        self.selected_block = Some(block.to_string());
        self.focused_item = None;
    }

    /// Focus a leaf item, selecting its block atomically (clicking a leaf on
    /// the canvas must never leave selection and focus pointing at different
    /// blocks).
    pub fn focus_item(&mut self, path: ItemPath) {
        self.selected_block = Some(path.block.clone());
        self.focused_item = Some(path);
    }

    pub fn clear_focus(&mut self) {
        self.focused_item = None;
    }

    pub fn clear(&mut self) {
        self.selected_block = None;
        self.focused_item = None;
    }

    pub fn hover(&mut self, target: Target) {
        self.hovered = Some(target);
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    /// The one highlight all panes render: hover wins, then item focus, then
    /// block selection.
    pub fn active(&self) -> Option<Target> {
        if let Some(target) = &self.hovered {
            return Some(target.clone());
        }
        if let Some(path) = &self.focused_item {
            return Some(Target::Item {
                block: path.block.clone(),
                column: path.column,
                item: path.item,
            });
        }
        self.selected_block
            .as_ref()
            .map(|block| Target::Block {
                block: block.clone(),
            })
    }

    /// Drop or repair any signal that no longer resolves against `blocks`.
    ///
    /// A focused item whose index fell off the end of its column shifts to
    /// the column's new last item (the neighbor that slid into its place);
    /// an emptied column or a vanished block clears the focus. A vanished
    /// selected block clears both selection and focus.
    pub fn prune(&mut self, blocks: &[BlockDraft]) {
        if let Some(path) = &mut self.focused_item {
            match column_len(blocks, &path.block, path.column) {
                Some(len) if len > 0 => {
                    if path.item >= len {
                        path.item = len - 1;
                    }
                }
                _ => self.focused_item = None,
            }
        }

        if let Some(block) = &self.selected_block {
            if find_block(blocks, block).is_none() {
                self.selected_block = None;
                self.focused_item = None;
            }
        }

        if let Some(target) = &self.hovered {
            if !resolves(blocks, target) {
                self.hovered = None;
            }
        }
    }
}

fn find_block<'a>(blocks: &'a [BlockDraft], key: &str) -> Option<&'a BlockDraft> {
    blocks.iter().find(|b| b.local_key == key)
}

fn column_len(blocks: &[BlockDraft], block: &str, column: usize) -> Option<usize> {
    find_block(blocks, block)?
        .container()?
        .slots
        .get(column)
        .map(Vec::len)
}

fn resolves(blocks: &[BlockDraft], target: &Target) -> bool {
    match target {
        Target::Block { block } => find_block(blocks, block).is_some(),
        Target::Column { block, column } => column_len(blocks, block, *column).is_some(),
        Target::Item {
            block,
            column,
            item,
        } => column_len(blocks, block, *column).is_some_and(|len| *item < len),
    }
}
