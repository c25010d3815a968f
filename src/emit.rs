//! Output tree emission
//!
//! Owns the output root for the duration of a build: clears it, lays down the
//! desktop shell, and finally writes the manifest.

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::manifest::Manifest;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Writes everything that is not derived from the content tree.
#[derive(Debug, Clone)]
pub struct Emitter {
    config: BuildConfig,
}

impl Emitter {
    /// `config` must already be resolved against the site root.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Clear and recreate the output root, then copy the fixed shell assets.
    pub async fn prepare(&self) -> Result<(), BuildError> {
        let out = &self.config.output_dir;
        match fs::remove_dir_all(out).await {
            Ok(()) => debug!(path = %out.display(), "Cleared output directory"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(BuildError::io(out, e)),
        }
        fs::create_dir_all(out)
            .await
            .map_err(|e| BuildError::io(out, e))?;

        if let Some(shell_dir) = &self.config.shell_dir {
            let assets = shell_dir.join(&self.config.shell_assets);
            copy_tree(&assets, &out.join(&self.config.shell_assets)).await?;
            let entry = shell_dir.join(&self.config.shell_entry);
            copy_file(&entry, &out.join(&self.config.shell_entry)).await?;
            info!("Shell: {}", shell_dir.display());
        }

        for extra in &self.config.extra_copies {
            self.copy_extra(extra).await?;
        }

        Ok(())
    }

    async fn copy_extra(&self, source: &Path) -> Result<(), BuildError> {
        let Some(file_name) = source.file_name() else {
            return Err(BuildError::InvalidPath(format!(
                "Extra copy has no file name: {}",
                source.display()
            )));
        };
        let target = self.config.output_dir.join(file_name);

        let metadata = match fs::metadata(source).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %source.display(), "Extra copy not found, skipping");
                return Ok(());
            }
            Err(e) => return Err(BuildError::io(source, e)),
        };

        if metadata.is_dir() {
            info!("CopyFolder: {}", source.display());
            copy_tree(source, &target).await?;
        } else {
            info!("Copy: {}", source.display());
            copy_file(source, &target).await?;
        }
        Ok(())
    }

    /// Serialize the manifest to its well-known path.
    pub async fn write_manifest(&self, manifest: &Manifest) -> Result<PathBuf, BuildError> {
        let path = self.config.manifest_path();
        let json = manifest.to_json_pretty()?;
        fs::write(&path, json)
            .await
            .map_err(|e| BuildError::io(&path, e))?;
        info!(path = %path.display(), "Manifest written");
        Ok(path)
    }
}

/// Copy one file, creating missing parent directories.
pub async fn copy_file(source: &Path, target: &Path) -> Result<(), BuildError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| BuildError::io(parent, e))?;
    }
    fs::copy(source, target)
        .await
        .map_err(|e| BuildError::io(source, e))?;
    Ok(())
}

/// Recursively copy `source` to `target` byte for byte.
///
/// Returns the number of files and links copied. Symlinks are recreated as
/// links, never followed. The walk runs on the blocking pool.
pub async fn copy_tree(source: &Path, target: &Path) -> Result<usize, BuildError> {
    let (source, target) = (source.to_path_buf(), target.to_path_buf());
    let joined = tokio::task::spawn_blocking(move || copy_tree_blocking(&source, &target));
    joined.await.map_err(|e| {
        BuildError::io(
            PathBuf::new(),
            std::io::Error::new(ErrorKind::Other, format!("copy task failed: {}", e)),
        )
    })?
}

fn copy_tree_blocking(source: &Path, target: &Path) -> Result<usize, BuildError> {
    let metadata = std::fs::metadata(source).map_err(|e| BuildError::io(source, e))?;
    if !metadata.is_dir() {
        return Err(BuildError::io(
            source,
            std::io::Error::new(ErrorKind::NotFound, "source directory not found"),
        ));
    }
    std::fs::create_dir_all(target).map_err(|e| BuildError::io(target, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf());
            BuildError::io(
                path,
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(ErrorKind::Other, "directory walk failed")),
            )
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| BuildError::InvalidPath(e.to_string()))?;
        let destination = target.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&destination).map_err(|e| BuildError::io(&destination, e))?;
        } else if file_type.is_symlink() {
            let link = std::fs::read_link(entry.path()).map_err(|e| BuildError::io(entry.path(), e))?;
            copy_symlink(&link, &destination)?;
            copied += 1;
        } else if file_type.is_file() {
            std::fs::copy(entry.path(), &destination).map_err(|e| BuildError::io(entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(link: &Path, destination: &Path) -> Result<(), BuildError> {
    std::os::unix::fs::symlink(link, destination).map_err(|e| BuildError::io(destination, e))
}

#[cfg(windows)]
fn copy_symlink(link: &Path, destination: &Path) -> Result<(), BuildError> {
    let resolved = destination
        .parent()
        .map(|parent| parent.join(link))
        .unwrap_or_else(|| link.to_path_buf());
    let result = if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(link, destination)
    } else {
        std::os::windows::fs::symlink_file(link, destination)
    };
    result.map_err(|e| BuildError::io(destination, e))
}
