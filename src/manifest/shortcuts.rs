//! Quick-launch link and startup indices

use crate::manifest::node::ContentNode;
use crate::tree::path::strip_served_extension;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Metadata field that declares a quick-launch link key.
pub const LINK_FIELD: &str = "link";
/// Metadata field that declares a startup key.
pub const STARTUP_FIELD: &str = "startup";

/// Link and startup registrations, keyed by declared key.
///
/// Keys are global across the tree; a later registration replaces an earlier
/// one with the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortcuts {
    link: BTreeMap<String, String>,
    startup: BTreeMap<String, String>,
}

impl Shortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register whatever shortcuts `node` declares.
    pub fn register(&mut self, node: &ContentNode) {
        if let Some(key) = node.shortcut_key(LINK_FIELD) {
            info!("Link: {}", node.path);
            insert_last_wins(&mut self.link, LINK_FIELD, key, &node.path);
        }
        if let Some(key) = node.shortcut_key(STARTUP_FIELD) {
            info!("Startup: {}", node.path);
            insert_last_wins(&mut self.startup, STARTUP_FIELD, key, &node.path);
        }
    }

    /// Fold registrations made later in iteration order into `self`.
    pub fn merge(&mut self, later: Shortcuts) {
        for (key, path) in later.link {
            insert_resolved(&mut self.link, LINK_FIELD, key, path);
        }
        for (key, path) in later.startup {
            insert_resolved(&mut self.startup, STARTUP_FIELD, key, path);
        }
    }

    /// Link paths sorted by ascending key.
    pub fn link_paths(&self) -> Vec<String> {
        self.link.values().cloned().collect()
    }

    /// Startup paths sorted by ascending key.
    pub fn startup_paths(&self) -> Vec<String> {
        self.startup.values().cloned().collect()
    }

    pub fn link_count(&self) -> usize {
        self.link.len()
    }

    pub fn startup_count(&self) -> usize {
        self.startup.len()
    }
}

fn insert_last_wins(index: &mut BTreeMap<String, String>, field: &str, key: String, path: &str) {
    let resolved = strip_served_extension(path).to_string();
    insert_resolved(index, field, key, resolved);
}

fn insert_resolved(index: &mut BTreeMap<String, String>, field: &str, key: String, path: String) {
    if let Some(previous) = index.insert(key.clone(), path) {
        debug!(field, key = %key, replaced = %previous, "Shortcut key collision");
    }
}
