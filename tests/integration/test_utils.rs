//! Shared test utilities for integration tests

use ctos::config::BuildConfig;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes environment variable access across tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// A site root in a temp dir with `content/` and a minimal shell.
pub struct TestSite {
    pub dir: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("content")).unwrap();
        std::fs::create_dir_all(dir.path().join("ctos/ctos")).unwrap();
        std::fs::write(dir.path().join("ctos/index.html"), "<html>shell</html>").unwrap();
        std::fs::write(dir.path().join("ctos/ctos/desktop.js"), "boot();").unwrap();
        std::fs::write(dir.path().join("favicon.png"), [0x89, b'P', b'N', b'G']).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative` under the content root.
    pub fn content_file(&self, relative: &str, contents: &str) {
        let path = self.root().join("content").join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn build_config(&self) -> BuildConfig {
        BuildConfig::default().resolve(self.root())
    }

    pub fn output(&self, relative: &str) -> std::path::PathBuf {
        self.root().join("public").join(relative)
    }
}

/// Run `f` with the given environment variables set, restoring them afterwards.
pub fn with_env<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
        .collect();

    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = f();

    for (key, original) in saved {
        match original {
            Some(value) => std::env::set_var(&key, value),
            None => std::env::remove_var(&key),
        }
    }

    result
}
