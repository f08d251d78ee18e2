//! Local key management.
//!
//! Items have no persisted identity of their own - they live inside their
//! container's content blob - so the editor assigns each one a `local_key`:
//! stable for the item's life in the session, serialized with the blob so a
//! reload keeps it. Keys are never derived from content (editing content must
//! not change identity) and the generator never rewinds, so a removed item's
//! key is never handed out again - an in-flight drag holding a stale key can
//! only miss, never hit the wrong item.

use crate::draft::BlockDraft;
use crc32fast::Hasher;
use folio_schema::Container;
use std::collections::HashSet;

/// Derive the per-case key seed with CRC32.
pub fn case_seed(case_id: &str) -> String {
    let mut buff = String::from(case_id);
    if !case_id.starts_with("case://") {
        buff = format!("case://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential key generator for one editing session.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    seed: String, // Case seed (CRC32)
    count: u32,   // Sequential counter
}

impl KeyGenerator {
    pub fn new(case_id: &str) -> Self {
        Self {
            seed: case_seed(case_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next sequential key.
    pub fn next_key(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

/// Generate a key that is unused within `container`.
///
/// Generated keys are unique per session by construction; the loop only
/// matters when persisted data already contains a key shaped like ours.
pub fn fresh_item_key(container: &Container, keys: &mut KeyGenerator) -> String {
    let used: HashSet<&str> = container
        .slots
        .iter()
        .flatten()
        .map(|item| item.local_key.as_str())
        .collect();

    loop {
        let key = keys.next_key();
        if !used.contains(key.as_str()) {
            return key;
        }
    }
}

/// Assign keys to items that lack one.
///
/// Covers rows written before item keys existed, and repairs duplicated keys
/// within a container (the second occurrence is treated as missing).
/// Idempotent: a fully keyed tree is left untouched.
pub fn ensure_item_keys(blocks: &mut [BlockDraft], keys: &mut KeyGenerator) {
    for block in blocks.iter_mut() {
        let Some(container) = block.container_mut() else {
            continue;
        };

        let mut used: HashSet<String> = HashSet::new();
        for slot in container.slots.iter_mut() {
            for item in slot.iter_mut() {
                if item.local_key.is_empty() || used.contains(&item.local_key) {
                    let mut key = keys.next_key();
                    while used.contains(&key) {
                        key = keys.next_key();
                    }
                    item.local_key = key;
                }
                used.insert(item.local_key.clone());
            }
        }
    }
}

/// Deep-clone a block with a completely fresh identity.
///
/// The single primitive behind every duplication path: new block key, `id`
/// cleared, and a regenerated key for every nested item. Reusing item keys
/// across sibling containers breaks drag targeting and list reconciliation,
/// so no caller is allowed to clone a subtree any other way.
pub fn clone_with_fresh_keys(source: &BlockDraft, keys: &mut KeyGenerator) -> BlockDraft {
    let mut clone = BlockDraft {
        id: None,
        local_key: keys.next_key(),
        content: source.content.clone(),
    };

    if let Some(container) = clone.container_mut() {
        for slot in container.slots.iter_mut() {
            for item in slot.iter_mut() {
                item.local_key = keys.next_key();
            }
        }
    }

    clone
}
