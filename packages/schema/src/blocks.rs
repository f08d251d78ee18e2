use crate::content::ItemContent;
use serde::{Deserialize, Serialize};

/// Persisted block row, as handed over by the row store.
///
/// `id` is `None` until the store has assigned one. `content` stays an
/// untyped JSON blob here - [`crate::normalize::normalize_block`] turns it
/// into a [`BlockContent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: serde_json::Value,
    pub sort_order: i64,
}

/// Top-level block discriminator (the `type` column of a row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Container,
    Spacer,
}

/// Typed content of a block, keyed by [`BlockType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockContent {
    Container(Container),
    Spacer(Spacer),
}

impl BlockContent {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Container(_) => BlockType::Container,
            BlockContent::Spacer(_) => BlockType::Spacer,
        }
    }

    /// Canonical JSON blob for the row store.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            BlockContent::Container(c) => {
                serde_json::to_value(c).expect("container content serializes")
            }
            BlockContent::Spacer(s) => serde_json::to_value(s).expect("spacer content serializes"),
        }
    }

    /// Empty starter content for a freshly inserted block (palette drop).
    pub fn starter(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Container => BlockContent::Container(Container::with_columns(1)),
            BlockType::Spacer => BlockContent::Spacer(Spacer::default()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            BlockContent::Container(c) => c.name.as_deref(),
            BlockContent::Spacer(s) => s.name.as_deref(),
        }
    }

    pub fn set_name(&mut self, name: Option<String>) {
        match self {
            BlockContent::Container(c) => c.name = name,
            BlockContent::Spacer(s) => s.name = name,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            BlockContent::Container(c) => Some(c),
            BlockContent::Spacer(_) => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            BlockContent::Container(c) => Some(c),
            BlockContent::Spacer(_) => None,
        }
    }
}

/// Multi-column block. `slots.len()` always equals `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub columns: u8,
    pub slots: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One of a container's ordered item lists. The index within `slots` is the
/// column's identity - there is no separate column id.
pub type Column = Vec<ContentItem>;

impl Container {
    pub fn with_columns(columns: u8) -> Self {
        Self {
            columns,
            slots: (0..columns).map(|_| Vec::new()).collect(),
            background_color: None,
            name: None,
        }
    }

    /// Total item count across all columns.
    pub fn item_count(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }
}

/// Fixed-height vertical gap between blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacer {
    pub height: SpacerHeight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for Spacer {
    fn default() -> Self {
        Self {
            height: SpacerHeight::Md,
            name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacerHeight {
    Sm,
    Md,
    Lg,
}

/// Leaf item inside a column.
///
/// `local_key` is stable for the item's life inside its container and is
/// serialized with the content blob so identity survives reloads. Rows
/// written before keys existed load with an empty key; the editor repairs
/// those on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "localKey", default, skip_serializing_if = "String::is_empty")]
    pub local_key: String,
    #[serde(flatten)]
    pub content: ItemContent,
}

impl ContentItem {
    pub fn new(local_key: String, content: ItemContent) -> Self {
        Self { local_key, content }
    }
}
