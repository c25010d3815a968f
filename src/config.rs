//! Configuration System
//!
//! Layered configuration for the site builder, the counter service and the
//! preview server. Sources are merged by the `config` crate with environment
//! variable overrides; relative paths are resolved against the site root.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

mod facade;
mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod site_file;
}

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtosConfig {
    /// Manifest build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Visit counter settings
    #[serde(default)]
    pub counter: CounterConfig,

    /// Preview server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Manifest build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Content root walked into the manifest
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Output root; cleared at the start of every build
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Desktop shell sources (asset directory and entry page). None skips them.
    #[serde(default = "default_shell_dir")]
    pub shell_dir: Option<PathBuf>,

    /// Asset directory name inside the shell, copied to the same name in the output
    #[serde(default = "default_shell_assets")]
    pub shell_assets: String,

    /// Shell entry page, copied to the output root
    #[serde(default = "default_entry_document")]
    pub shell_entry: String,

    /// Extra files or directories copied to the output root
    #[serde(default = "default_extra_copies")]
    pub extra_copies: Vec<PathBuf>,

    /// File name of the emitted manifest
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// A directory holding this file is a standalone app
    #[serde(default = "default_entry_document")]
    pub entry_document: String,

    /// Sidecar file holding a folder's metadata
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// Extensions served as documents
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,

    /// Document extensions converted from markdown
    #[serde(default = "default_markdown_extensions")]
    pub markdown_extensions: Vec<String>,

    /// Extensions copied verbatim without a manifest node
    #[serde(default = "default_asset_extensions")]
    pub asset_extensions: Vec<String>,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_shell_dir() -> Option<PathBuf> {
    Some(PathBuf::from("ctos"))
}

fn default_shell_assets() -> String {
    "ctos".to_string()
}

fn default_entry_document() -> String {
    "index.html".to_string()
}

fn default_extra_copies() -> Vec<PathBuf> {
    vec![PathBuf::from("favicon.png")]
}

fn default_manifest_name() -> String {
    "init.json".to_string()
}

fn default_metadata_file() -> String {
    "metadata".to_string()
}

fn default_document_extensions() -> Vec<String> {
    vec![".html".to_string(), ".md".to_string()]
}

fn default_markdown_extensions() -> Vec<String> {
    vec![".md".to_string()]
}

fn default_asset_extensions() -> Vec<String> {
    vec![".jpg".to_string(), ".png".to_string()]
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
            shell_dir: default_shell_dir(),
            shell_assets: default_shell_assets(),
            shell_entry: default_entry_document(),
            extra_copies: default_extra_copies(),
            manifest_name: default_manifest_name(),
            entry_document: default_entry_document(),
            metadata_file: default_metadata_file(),
            document_extensions: default_document_extensions(),
            markdown_extensions: default_markdown_extensions(),
            asset_extensions: default_asset_extensions(),
        }
    }
}

impl BuildConfig {
    /// Resolve relative directories against `site_root`.
    pub fn resolve(mut self, site_root: &Path) -> Self {
        self.content_dir = site_root.join(&self.content_dir);
        self.output_dir = site_root.join(&self.output_dir);
        self.shell_dir = self
            .shell_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| site_root.join(dir));
        self.extra_copies = self
            .extra_copies
            .into_iter()
            .map(|path| site_root.join(path))
            .collect();
        self
    }

    /// Full path of the emitted manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_name)
    }

    /// Validate build settings
    pub fn validate(&self) -> Result<(), String> {
        if self.content_dir.as_os_str().is_empty() {
            return Err("Content directory cannot be empty".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }
        if self.content_dir == self.output_dir {
            return Err("Content and output directories must differ".to_string());
        }
        if self.manifest_name.is_empty() || self.entry_document.is_empty() {
            return Err("Manifest and entry document names cannot be empty".to_string());
        }
        let extensions = self
            .document_extensions
            .iter()
            .chain(&self.markdown_extensions)
            .chain(&self.asset_extensions);
        for ext in extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(format!("Extension '{}' must start with '.'", ext));
            }
        }
        for ext in &self.markdown_extensions {
            if !self.document_extensions.contains(ext) {
                return Err(format!(
                    "Markdown extension '{}' is not a document extension",
                    ext
                ));
            }
        }
        Ok(())
    }

    /// Check that the output root, which is wiped on every build, cannot
    /// reach any input. Paths must already be resolved.
    ///
    /// Rejected: an output root that is, or contains, the site root, the
    /// content root, the shell directory or an extra copy; and an output
    /// root inside the content root.
    pub fn validate_layout(&self, site_root: Option<&Path>) -> Result<(), String> {
        let output = normalize(&self.output_dir);
        let content = normalize(&self.content_dir);

        if let Some(site_root) = site_root {
            if normalize(site_root).starts_with(&output) {
                return Err(format!(
                    "Output directory {} would remove the site root",
                    self.output_dir.display()
                ));
            }
        }
        if content.starts_with(&output) {
            return Err(format!(
                "Output directory {} contains the content directory",
                self.output_dir.display()
            ));
        }
        if output.starts_with(&content) {
            return Err(format!(
                "Output directory {} is inside the content directory",
                self.output_dir.display()
            ));
        }
        let inputs = self.shell_dir.iter().chain(&self.extra_copies);
        for input in inputs {
            if normalize(input).starts_with(&output) {
                return Err(format!(
                    "Output directory {} contains input {}",
                    self.output_dir.display(),
                    input.display()
                ));
            }
        }
        Ok(())
    }
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Visit counter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Serve the counter endpoint from a persistent store
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Counter database location
    #[serde(default = "default_counter_store")]
    pub store_path: PathBuf,

    /// A client counts at most once per window
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Header carrying the client's network origin
    #[serde(default = "default_client_header")]
    pub client_header: String,
}

fn default_true() -> bool {
    true
}

fn default_counter_store() -> PathBuf {
    PathBuf::from(".ctos/counter")
}

fn default_window_secs() -> u64 {
    24 * 60 * 60
}

fn default_client_header() -> String {
    "CF-Connecting-IP".to_string()
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            store_path: default_counter_store(),
            window_secs: default_window_secs(),
            client_header: default_client_header(),
        }
    }
}

/// Preview server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Build(String),
    Counter(String),
    Server(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Build(msg) => write!(f, "Build: {}", msg),
            ValidationError::Counter(msg) => write!(f, "Counter: {}", msg),
            ValidationError::Server(msg) => write!(f, "Server: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CtosConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.build.validate() {
            errors.push(ValidationError::Build(e));
        }

        if self.counter.window_secs == 0 {
            errors.push(ValidationError::Counter(
                "window_secs must be greater than zero".to_string(),
            ));
        }
        if self.counter.client_header.trim().is_empty() {
            errors.push(ValidationError::Counter(
                "client_header cannot be empty".to_string(),
            ));
        }

        if self.server.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::Server(format!(
                "Invalid listen address: {}",
                self.server.listen_addr
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every failure into one error.
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}
