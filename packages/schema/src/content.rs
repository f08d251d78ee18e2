//! Leaf content payloads (image / text / video).
//!
//! These are plain value objects with no cross-references. Media URLs and
//! provider identifiers are opaque strings - presence is the only check this
//! layer performs. Every payload implements `Default` so partial legacy JSON
//! deserializes without failing the page load.

use serde::{Deserialize, Serialize};

/// Leaf item discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Image,
    Text,
    Video,
}

/// Tagged payload union. Serializes as `{"type": ..., "content": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ItemContent {
    Image(ImageContent),
    Text(TextContent),
    Video(VideoContent),
}

impl ItemContent {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemContent::Image(_) => ItemType::Image,
            ItemContent::Text(_) => ItemType::Text,
            ItemContent::Video(_) => ItemType::Video,
        }
    }

    /// Default payload for a freshly added item of the given type.
    pub fn default_for(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Image => ItemContent::Image(ImageContent::default()),
            ItemType::Text => ItemContent::Text(TextContent::default()),
            ItemType::Video => ItemContent::Video(VideoContent::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    #[default]
    Auto,
    Square,
    Wide,
    Portrait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WidthMode {
    Full,
    Wide,
    #[default]
    Normal,
    Narrow,
}

/// Shared four-step scale for corner radius and padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EdgeScale {
    #[default]
    None,
    Sm,
    Md,
    Lg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Plain,
    Rich,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    Youtube,
    Vimeo,
    #[default]
    File,
    Mux,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageContent {
    pub url: String,
    pub alt: String,
    /// A column whose only item is a cover image renders that image as the
    /// column's full-bleed background.
    pub cover: bool,
    pub aspect: Aspect,
    pub width: WidthMode,
    pub border: bool,
    pub radius: EdgeScale,
    pub padding: EdgeScale,
    pub zoom: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TextContent {
    pub body: String,
    /// Sanitized HTML passthrough, only meaningful when `format` is `rich`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub format: TextFormat,
    pub align: TextAlign,
    pub width: WidthMode,
    pub size: TextSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub padding: EdgeScale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoContent {
    pub url: String,
    pub provider: VideoProvider,
    /// Opaque playback id, only meaningful when `provider` is `mux`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mux_playback_id: Option<String>,
    pub aspect: Aspect,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub controls: bool,
    pub width: WidthMode,
    pub border: bool,
    pub padding: EdgeScale,
}

impl Default for VideoContent {
    fn default() -> Self {
        Self {
            url: String::new(),
            provider: VideoProvider::default(),
            mux_playback_id: None,
            aspect: Aspect::Wide,
            autoplay: false,
            looping: false,
            controls: true,
            width: WidthMode::Normal,
            border: false,
            padding: EdgeScale::None,
        }
    }
}
