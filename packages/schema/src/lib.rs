//! # Folio Schema
//!
//! Canonical content model for case-study pages.
//!
//! A page is an ordered list of **blocks**: multi-column containers holding
//! image/text/video items, or fixed-height spacers. The editor and the public
//! renderer both consume exactly this shape - there is no separate render
//! model.
//!
//! The row store persists one JSON `content` blob per block
//! ([`BlockRow`]); [`normalize`] is the single entry point that repairs
//! legacy or malformed blobs into the canonical shape on every read, so shape
//! drift can never accumulate.

pub mod blocks;
pub mod content;
pub mod normalize;

pub use blocks::*;
pub use content::*;
pub use normalize::{normalize_block, normalize_container, MAX_COLUMNS, MIN_COLUMNS};
