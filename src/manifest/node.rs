//! Manifest nodes

use crate::metadata::Metadata;
use crate::types::OrderedMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Children of a folder node, keyed by name in filesystem iteration order.
pub type NodeMap = OrderedMap<ContentNode>;

/// Display type of a node. Metadata may supply types beyond the built-in three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Folder,
    Html,
    Iframe,
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Folder => "folder",
            NodeType::Html => "html",
            NodeType::Iframe => "iframe",
            NodeType::Other(other) => other,
        }
    }

    /// Default `(icon, style)` display hints.
    pub fn defaults(&self) -> (&'static str, &'static str) {
        match self {
            NodeType::Folder => ("folder", "medium"),
            NodeType::Html => ("text", "large"),
            NodeType::Iframe | NodeType::Other(_) => ("exe", "large"),
        }
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "folder" => NodeType::Folder,
            "html" => NodeType::Html,
            "iframe" => NodeType::Iframe,
            _ => NodeType::Other(value),
        }
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        value.as_str().to_string()
    }
}

/// One entry in the manifest tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<NodeMap>,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub icon: String,
    pub style: String,
    /// Metadata fields without a dedicated slot, in file order.
    #[serde(flatten)]
    pub extra: Metadata,
}

impl ContentNode {
    fn with_defaults(name: impl Into<String>, path: impl Into<String>, kind: NodeType) -> Self {
        let (icon, style) = kind.defaults();
        Self {
            name: name.into(),
            path: path.into(),
            contents: None,
            kind,
            icon: icon.to_string(),
            style: style.to_string(),
            extra: Metadata::new(),
        }
    }

    /// Folder node holding `contents`.
    pub fn folder(name: impl Into<String>, path: impl Into<String>, contents: NodeMap) -> Self {
        let mut node = Self::with_defaults(name, path, NodeType::Folder);
        node.contents = Some(contents);
        node
    }

    /// Rendered document node.
    pub fn document(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_defaults(name, path, NodeType::Html)
    }

    /// Standalone app node.
    pub fn app(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_defaults(name, path, NodeType::Iframe)
    }

    /// Layer metadata over the defaults. Metadata wins every collision except
    /// `contents`, which always stays the walked subtree.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        for (key, value) in metadata {
            match key.as_str() {
                "name" => self.name = value.joined(),
                "path" => self.path = value.joined(),
                "type" => self.kind = NodeType::from(value.joined()),
                "icon" => self.icon = value.joined(),
                "style" => self.style = value.joined(),
                "contents" => {
                    debug!(node = %self.path, "Ignoring `contents` metadata key");
                }
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
        self
    }

    pub fn is_container(&self) -> bool {
        self.contents.is_some()
    }

    /// Declared value of a shortcut key such as `link` or `startup`.
    pub fn shortcut_key(&self, field: &str) -> Option<String> {
        self.extra.get(field).map(|value| value.joined())
    }
}
