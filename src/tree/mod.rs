//! Content tree traversal
//!
//! Walks the content root, classifies each entry, and produces the manifest
//! subtree together with its shortcut registrations.

pub mod path;
pub mod walker;
