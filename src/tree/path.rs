//! Public path resolution for served artifacts

use std::path::{Component, Path};

/// Extension every document is served under.
pub const SERVED_EXTENSION: &str = ".html";

/// Root-relative public address of a content-relative path.
///
/// Always `/`-separated regardless of platform.
pub fn public_path(relative: &Path) -> String {
    let mut out = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            out.push('/');
            out.push_str(&part.to_string_lossy());
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Public address of a document once rendered: extension normalized to `.html`.
pub fn served_path(relative: &Path) -> String {
    public_path(&relative.with_extension(SERVED_EXTENSION.trim_start_matches('.')))
}

/// Strip the served document extension, if present.
pub fn strip_served_extension(path: &str) -> &str {
    path.strip_suffix(SERVED_EXTENSION).unwrap_or(path)
}

/// Extension of a file name with its leading dot, e.g. `.md`. Empty if none.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Node name for a directory entry: the file name without its extension.
pub fn node_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
