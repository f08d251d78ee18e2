//! # Normalizer
//!
//! Repairs persisted content blobs into the canonical shape.
//!
//! The store has carried several generations of this data. The repairs this
//! module must absorb, without ever failing a page load:
//!
//! - the legacy column shape, where a slot held one nullable item instead of
//!   an item list
//! - missing or invalid `columns` counts (default 1, clamp to 1..=4)
//! - slot arrays that disagree with `columns` (pad with empty columns, drop
//!   trailing extras)
//! - items with an unknown `type` (dropped) or a partial payload (missing
//!   fields fall back to defaults; a payload that does not deserialize at all
//!   falls back to the type's default payload)
//! - unknown block types (fall back to an empty one-column container)
//!
//! Everything here is pure. Callers persist the normalized result themselves;
//! nothing is written back from this module. Round-trip invariant:
//! `normalize(serialize(normalize(x))) == normalize(x)` for any input `x`.

use crate::blocks::{BlockContent, BlockType, Column, Container, ContentItem, Spacer, SpacerHeight};
use crate::content::{ItemContent, ItemType};
use serde_json::Value;

pub const MIN_COLUMNS: u8 = 1;
pub const MAX_COLUMNS: u8 = 4;

/// Normalize a persisted row's content blob according to its `type` column.
pub fn normalize_block(block_type: BlockType, content: &Value) -> BlockContent {
    match block_type {
        BlockType::Container => BlockContent::Container(normalize_container(content)),
        BlockType::Spacer => BlockContent::Spacer(normalize_spacer(content)),
    }
}

/// Repair an arbitrary JSON value into a canonical [`Container`].
///
/// Guarantees `slots.len() == columns` and `columns` in 1..=4 on the result.
pub fn normalize_container(input: &Value) -> Container {
    let columns = read_columns(input);

    let mut slots: Vec<Column> = match input.get("slots") {
        Some(Value::Array(raw)) => raw.iter().map(normalize_column).collect(),
        _ => Vec::new(),
    };
    slots.resize_with(columns as usize, Vec::new);

    Container {
        columns,
        slots,
        background_color: non_empty_string(input.get("backgroundColor")),
        name: non_empty_string(input.get("name")),
    }
}

fn normalize_spacer(input: &Value) -> Spacer {
    let height = match input.get("height").and_then(Value::as_str) {
        Some("sm") => SpacerHeight::Sm,
        Some("lg") => SpacerHeight::Lg,
        _ => SpacerHeight::Md,
    };

    Spacer {
        height,
        name: non_empty_string(input.get("name")),
    }
}

fn read_columns(input: &Value) -> u8 {
    let raw = match input.get("columns") {
        Some(Value::Number(n)) => n.as_u64(),
        // Some very old rows stored the count as a string.
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match raw {
        Some(n) => n.clamp(MIN_COLUMNS as u64, MAX_COLUMNS as u64) as u8,
        None => MIN_COLUMNS,
    }
}

/// A slot is canonically an item list, but legacy rows held a single nullable
/// item per column.
fn normalize_column(input: &Value) -> Column {
    match input {
        Value::Array(items) => items.iter().filter_map(normalize_item).collect(),
        Value::Null => Vec::new(),
        Value::Object(_) => normalize_item(input).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn normalize_item(input: &Value) -> Option<ContentItem> {
    let item_type = match input.get("type").and_then(Value::as_str) {
        Some("image") => ItemType::Image,
        Some("text") => ItemType::Text,
        Some("video") => ItemType::Video,
        _ => return None,
    };

    let payload = input.get("content").cloned().unwrap_or(Value::Null);
    let content = match item_type {
        ItemType::Image => ItemContent::Image(serde_json::from_value(payload).unwrap_or_default()),
        ItemType::Text => ItemContent::Text(serde_json::from_value(payload).unwrap_or_default()),
        ItemType::Video => ItemContent::Video(serde_json::from_value(payload).unwrap_or_default()),
    };

    let local_key = input
        .get("localKey")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(ContentItem { local_key, content })
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_container_passes_through() {
        let input = json!({
            "columns": 2,
            "slots": [
                [{ "localKey": "k-1", "type": "text", "content": { "body": "hi" } }],
                []
            ],
            "backgroundColor": "#fff"
        });

        let container = normalize_container(&input);
        assert_eq!(container.columns, 2);
        assert_eq!(container.slots.len(), 2);
        assert_eq!(container.slots[0].len(), 1);
        assert_eq!(container.slots[0][0].local_key, "k-1");
        assert_eq!(container.background_color.as_deref(), Some("#fff"));
    }

    #[test]
    fn test_legacy_single_item_column_becomes_list() {
        let input = json!({
            "columns": 2,
            "slots": [
                { "type": "image", "content": { "url": "/a.png" } },
                null
            ]
        });

        let container = normalize_container(&input);
        assert_eq!(container.slots[0].len(), 1);
        assert!(container.slots[1].is_empty());
        match &container.slots[0][0].content {
            ItemContent::Image(image) => assert_eq!(image.url, "/a.png"),
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_defaults_to_one() {
        let container = normalize_container(&json!({}));
        assert_eq!(container.columns, 1);
        assert_eq!(container.slots.len(), 1);
    }

    #[test]
    fn test_invalid_columns_clamped() {
        assert_eq!(normalize_container(&json!({ "columns": 0 })).columns, 1);
        assert_eq!(normalize_container(&json!({ "columns": 9 })).columns, 4);
        assert_eq!(normalize_container(&json!({ "columns": "3" })).columns, 3);
        assert_eq!(normalize_container(&json!({ "columns": "lots" })).columns, 1);
    }

    #[test]
    fn test_slot_count_mismatch_is_repaired() {
        // Too few slots: pad.
        let padded = normalize_container(&json!({ "columns": 3, "slots": [[]] }));
        assert_eq!(padded.slots.len(), 3);

        // Too many slots: drop trailing.
        let trimmed = normalize_container(&json!({
            "columns": 1,
            "slots": [
                [{ "type": "text", "content": { "body": "keep" } }],
                [{ "type": "text", "content": { "body": "drop" } }]
            ]
        }));
        assert_eq!(trimmed.slots.len(), 1);
        assert_eq!(trimmed.slots[0].len(), 1);
    }

    #[test]
    fn test_unknown_item_type_dropped() {
        let input = json!({
            "columns": 1,
            "slots": [[
                { "type": "text", "content": { "body": "ok" } },
                { "type": "embed", "content": {} },
                { "body": "no type at all" }
            ]]
        });

        let container = normalize_container(&input);
        assert_eq!(container.slots[0].len(), 1);
    }

    #[test]
    fn test_broken_payload_falls_back_to_defaults() {
        let input = json!({
            "columns": 1,
            "slots": [[ { "type": "video", "content": { "url": 42 } } ]]
        });

        let container = normalize_container(&input);
        match &container.slots[0][0].content {
            ItemContent::Video(video) => {
                assert_eq!(video.url, "");
                assert!(video.controls);
            }
            other => panic!("expected video, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_spacer_height_defaults_to_md() {
        let spacer = normalize_block(BlockType::Spacer, &json!({ "height": "huge" }));
        assert_eq!(
            spacer,
            BlockContent::Spacer(Spacer {
                height: SpacerHeight::Md,
                name: None
            })
        );
    }

    #[test]
    fn test_empty_name_treated_as_absent() {
        let container = normalize_container(&json!({ "columns": 1, "name": "  " }));
        assert_eq!(container.name, None);
    }

    #[test]
    fn test_normalize_is_idempotent_over_serialization() {
        let fixtures = vec![
            json!({}),
            json!({ "columns": "2", "slots": [{ "type": "image", "content": { "url": "/x" } }] }),
            json!({ "columns": 3, "slots": [null, [], [
                { "localKey": "k-9", "type": "text", "content": { "body": "t", "format": "rich", "html": "<b>t</b>" } },
                { "type": "video", "content": { "provider": "mux", "muxPlaybackId": "abc", "loop": true } }
            ]] }),
            json!({ "columns": 4, "slots": "garbage", "backgroundColor": "" }),
        ];

        for fixture in fixtures {
            let once = normalize_container(&fixture);
            let serialized = serde_json::to_value(&once).unwrap();
            let twice = normalize_container(&serialized);
            assert_eq!(once, twice, "round-trip diverged for {:?}", fixture);
        }
    }
}
