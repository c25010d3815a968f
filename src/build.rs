//! Build orchestration: prepare output, walk content, emit manifest.

use crate::config::BuildConfig;
use crate::emit::Emitter;
use crate::error::BuildError;
use crate::manifest::Manifest;
use crate::tree::walker::{ContentWalker, WalkStats};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

/// Summary of a completed build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub manifest_path: PathBuf,
    pub folders: usize,
    pub documents: usize,
    pub apps: usize,
    pub assets: usize,
    pub skipped: usize,
    pub links: usize,
    pub startup: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(duration.as_millis())
}

impl BuildReport {
    fn new(manifest_path: PathBuf, manifest: &Manifest, stats: WalkStats, duration: Duration) -> Self {
        Self {
            manifest_path,
            folders: stats.folders,
            documents: stats.documents,
            apps: stats.apps,
            assets: stats.assets,
            skipped: stats.skipped,
            links: manifest.link.len(),
            startup: manifest.startup.len(),
            duration,
        }
    }
}

/// One-shot site build
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    /// `config` must already be resolved against the site root.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run the full build. Any filesystem failure aborts it; the output root is
    /// then left in whatever partial state it reached.
    #[instrument(skip(self), fields(content = %self.config.content_dir.display()))]
    pub async fn run(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        info!("Starting site build");
        self.config.validate_layout(None).map_err(BuildError::Config)?;

        let emitter = Emitter::new(self.config.clone());
        emitter.prepare().await?;

        let walked = match ContentWalker::new(&self.config).walk().await {
            Ok(walked) => walked,
            Err(e) => {
                error!("Content walk failed: {}", e);
                return Err(e);
            }
        };

        let manifest = Manifest::assemble(walked.contents, &walked.shortcuts);
        let manifest_path = emitter.write_manifest(&manifest).await?;

        let report = BuildReport::new(manifest_path, &manifest, walked.stats, start.elapsed());
        info!(
            folders = report.folders,
            documents = report.documents,
            apps = report.apps,
            assets = report.assets,
            links = report.links,
            startup = report.startup,
            duration_ms = report.duration.as_millis(),
            "Site build completed"
        );
        Ok(report)
    }

    /// Walk the content root and assemble the manifest without touching the
    /// output root.
    pub async fn manifest(&self) -> Result<Manifest, BuildError> {
        let walked = ContentWalker::new(&self.config)
            .manifest_only()
            .walk()
            .await?;
        Ok(Manifest::assemble(walked.contents, &walked.shortcuts))
    }
}
