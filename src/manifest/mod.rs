//! Site manifest
//!
//! The manifest is the single JSON document the desktop client loads: the
//! content tree (`fs`) plus the quick-launch (`link`) and auto-launch
//! (`startup`) path lists.

pub mod node;
pub mod shortcuts;

pub use node::{ContentNode, NodeMap, NodeType};
pub use shortcuts::{Shortcuts, LINK_FIELD, STARTUP_FIELD};

use serde::{Deserialize, Serialize};

/// Root manifest object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub fs: NodeMap,
    pub link: Vec<String>,
    pub startup: Vec<String>,
}

impl Manifest {
    /// Assemble the manifest from a walked tree and its shortcut registrations.
    pub fn assemble(fs: NodeMap, shortcuts: &Shortcuts) -> Self {
        Self {
            fs,
            link: shortcuts.link_paths(),
            startup: shortcuts.startup_paths(),
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Look up a node by name segments, descending through `contents`.
    pub fn node(&self, names: &[&str]) -> Option<&ContentNode> {
        let (first, rest) = names.split_first()?;
        let mut node = self.fs.get(first)?;
        for name in rest {
            node = node.contents.as_ref()?.get(name)?;
        }
        Some(node)
    }
}
