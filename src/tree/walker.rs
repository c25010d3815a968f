//! Content tree walker
//!
//! Classifies every entry under the content root, mirrors it into the output
//! root, and returns the manifest subtree together with the shortcuts it
//! declared. Each recursive call owns its subtree; callers merge child results
//! in filesystem iteration order.

use crate::config::BuildConfig;
use crate::emit::{copy_file, copy_tree};
use crate::error::BuildError;
use crate::manifest::{ContentNode, NodeMap, Shortcuts};
use crate::metadata::{Metadata, MetadataExtractor};
use crate::render::markdown_to_html;
use crate::tree::path::{dotted_extension, node_name, public_path, served_path, SERVED_EXTENSION};
use futures::future::{try_join_all, BoxFuture};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// How a directory entry is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory holding the entry document; copied wholesale, never enumerated
    App,
    /// Plain directory; recursed into
    Folder,
    /// Document rendered to HTML
    Document,
    /// Binary asset copied without a manifest node
    Asset,
    /// Anything else; ignored
    Unrecognized,
}

/// Entry counts for one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub folders: usize,
    pub documents: usize,
    pub apps: usize,
    pub assets: usize,
    pub skipped: usize,
}

impl WalkStats {
    fn add(&mut self, other: WalkStats) {
        self.folders += other.folders;
        self.documents += other.documents;
        self.apps += other.apps;
        self.assets += other.assets;
        self.skipped += other.skipped;
    }

    fn count(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::App => self.apps += 1,
            EntryKind::Folder => self.folders += 1,
            EntryKind::Document => self.documents += 1,
            EntryKind::Asset => self.assets += 1,
            EntryKind::Unrecognized => self.skipped += 1,
        }
    }
}

/// Result of walking one directory
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    pub contents: NodeMap,
    pub shortcuts: Shortcuts,
    pub stats: WalkStats,
}

impl WalkOutput {
    /// Fold one visited child in. Registrations from inside a folder land
    /// before the folder's own.
    fn absorb(&mut self, visited: Visited) {
        self.shortcuts.merge(visited.nested.shortcuts);
        self.stats.add(visited.nested.stats);
        self.stats.count(visited.kind);
        if let Some((name, node)) = visited.node {
            self.shortcuts.register(&node);
            self.contents.insert(name, node);
        }
    }
}

/// An entry whose kind and metadata are known but which has not been emitted
struct Inspected {
    relative: PathBuf,
    name: String,
    kind: EntryKind,
    metadata: Metadata,
}

struct Visited {
    kind: EntryKind,
    node: Option<(String, ContentNode)>,
    nested: WalkOutput,
}

impl Visited {
    fn leaf(kind: EntryKind, node: Option<(String, ContentNode)>) -> Self {
        Self {
            kind,
            node,
            nested: WalkOutput::default(),
        }
    }
}

/// Walker over the content root
#[derive(Debug, Clone)]
pub struct ContentWalker {
    content_root: PathBuf,
    output_root: PathBuf,
    entry_document: String,
    metadata_file: String,
    document_extensions: Vec<String>,
    markdown_extensions: Vec<String>,
    asset_extensions: Vec<String>,
    extractor: MetadataExtractor,
    write_output: bool,
}

impl ContentWalker {
    /// `config` must already be resolved against the site root.
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            content_root: config.content_dir.clone(),
            output_root: config.output_dir.clone(),
            entry_document: config.entry_document.clone(),
            metadata_file: config.metadata_file.clone(),
            document_extensions: config.document_extensions.clone(),
            markdown_extensions: config.markdown_extensions.clone(),
            asset_extensions: config.asset_extensions.clone(),
            extractor: MetadataExtractor::new(config.document_extensions.clone()),
            write_output: true,
        }
    }

    /// Build the manifest tree only; nothing is rendered, copied or created.
    pub fn manifest_only(mut self) -> Self {
        self.write_output = false;
        self
    }

    /// Walk the whole content root.
    #[instrument(skip(self), fields(content = %self.content_root.display()))]
    pub async fn walk(&self) -> Result<WalkOutput, BuildError> {
        let output = self.walk_dir(PathBuf::new()).await?;
        debug!(
            nodes = output.contents.len(),
            links = output.shortcuts.link_count(),
            startup = output.shortcuts.startup_count(),
            "Content walk completed"
        );
        Ok(output)
    }

    /// Classify a content entry by its on-disk shape and name.
    pub async fn classify(&self, path: &Path) -> Result<EntryKind, BuildError> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| BuildError::io(path, e))?;

        if metadata.is_dir() {
            let entry = path.join(&self.entry_document);
            let is_app = fs::try_exists(&entry)
                .await
                .map_err(|e| BuildError::io(&entry, e))?;
            return Ok(if is_app {
                EntryKind::App
            } else {
                EntryKind::Folder
            });
        }

        let ext = dotted_extension(path);
        if self.document_extensions.contains(&ext) {
            Ok(EntryKind::Document)
        } else if self.asset_extensions.contains(&ext) {
            Ok(EntryKind::Asset)
        } else {
            Ok(EntryKind::Unrecognized)
        }
    }

    fn walk_dir(&self, relative: PathBuf) -> BoxFuture<'_, Result<WalkOutput, BuildError>> {
        Box::pin(async move {
            let input_dir = self.content_root.join(&relative);
            let mut read_dir = fs::read_dir(&input_dir)
                .await
                .map_err(|e| BuildError::io(&input_dir, e))?;

            let mut children = Vec::new();
            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| BuildError::io(&input_dir, e))?
            {
                children.push(relative.join(entry.file_name()));
            }

            // Reads overlap across siblings; writes happen one entry at a time in
            // iteration order, so a later same-stem sibling owns both node and file.
            let inspected =
                try_join_all(children.into_iter().map(|child| self.inspect(child))).await?;

            let mut output = WalkOutput::default();
            for entry in inspected {
                output.absorb(self.visit(entry).await?);
            }
            Ok(output)
        })
    }

    /// Classify an entry and read its metadata. Touches nothing in the output root.
    async fn inspect(&self, relative: PathBuf) -> Result<Inspected, BuildError> {
        let input = self.content_root.join(&relative);
        let kind = self.classify(&input).await?;
        let metadata = match kind {
            EntryKind::App => {
                self.extractor
                    .extract(&input.join(&self.entry_document))
                    .await?
            }
            EntryKind::Folder => self.extractor.extract(&input.join(&self.metadata_file)).await?,
            EntryKind::Document => self.extractor.extract(&input).await?,
            EntryKind::Asset | EntryKind::Unrecognized => Metadata::new(),
        };
        Ok(Inspected {
            name: node_name(&relative),
            relative,
            kind,
            metadata,
        })
    }

    async fn visit(&self, entry: Inspected) -> Result<Visited, BuildError> {
        let Inspected {
            relative,
            name,
            kind,
            metadata,
        } = entry;
        let input = self.content_root.join(&relative);

        match kind {
            EntryKind::App => {
                info!("Iframe: {}", relative.display());
                let node = ContentNode::app(&name, public_path(&relative)).with_metadata(metadata);
                if self.write_output {
                    copy_tree(&input, &self.output_root.join(&relative)).await?;
                }
                Ok(Visited::leaf(kind, Some((name, node))))
            }
            EntryKind::Folder => {
                info!("Folder: {}", relative.display());
                if self.write_output {
                    let output_dir = self.output_root.join(&relative);
                    fs::create_dir_all(&output_dir)
                        .await
                        .map_err(|e| BuildError::io(&output_dir, e))?;
                }
                let mut nested = self.walk_dir(relative.clone()).await?;
                let contents = std::mem::take(&mut nested.contents);
                let node = ContentNode::folder(&name, public_path(&relative), contents)
                    .with_metadata(metadata);
                Ok(Visited {
                    kind,
                    node: Some((name, node)),
                    nested,
                })
            }
            EntryKind::Document => {
                info!("Html: {}", relative.display());
                let node =
                    ContentNode::document(&name, served_path(&relative)).with_metadata(metadata);
                if self.write_output {
                    self.render_document(&input, &relative).await?;
                }
                Ok(Visited::leaf(kind, Some((name, node))))
            }
            EntryKind::Asset => {
                info!("Copy: {}", relative.display());
                if self.write_output {
                    copy_file(&input, &self.output_root.join(&relative)).await?;
                }
                Ok(Visited::leaf(kind, None))
            }
            EntryKind::Unrecognized => {
                debug!("Skipping: {}", relative.display());
                Ok(Visited::leaf(kind, None))
            }
        }
    }

    /// Write a document body: markdown is converted, markup is copied as-is.
    async fn render_document(&self, input: &Path, relative: &Path) -> Result<(), BuildError> {
        let ext = dotted_extension(relative);
        if self.markdown_extensions.contains(&ext) {
            let source = fs::read_to_string(input)
                .await
                .map_err(|e| BuildError::io(input, e))?;
            let target = self
                .output_root
                .join(relative.with_extension(SERVED_EXTENSION.trim_start_matches('.')));
            fs::write(&target, markdown_to_html(&source))
                .await
                .map_err(|e| BuildError::io(&target, e))?;
        } else {
            copy_file(input, &self.output_root.join(relative)).await?;
        }
        Ok(())
    }
}
