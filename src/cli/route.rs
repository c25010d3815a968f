//! CLI route: single route table and run context. Dispatches to the build and server.

use crate::build::SiteBuilder;
use crate::config::{BuildConfig, ConfigLoader, CtosConfig};
use crate::error::{ApiError, BuildError};
use crate::server;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::output::format_build_report;
use crate::cli::parse::Commands;

/// Runtime context for CLI execution: site root and loaded configuration.
pub struct RunContext {
    site_root: PathBuf,
    config: CtosConfig,
}

impl RunContext {
    /// Create run context from site root and optional config path. Uses ConfigLoader only.
    pub fn new(site_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&site_root)?
        };
        Ok(Self { site_root, config })
    }

    /// Run context over an already-loaded configuration.
    pub fn with_config(site_root: PathBuf, config: CtosConfig) -> Self {
        Self { site_root, config }
    }

    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    pub fn config(&self) -> &CtosConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Build {
                content,
                output,
                shell,
                format,
            } => {
                let config = self.effective_config(content, output, shell, None)?;
                let builder = SiteBuilder::new(self.resolved_build(config)?);
                let report = block_on(builder.run())??;
                if format == "json" {
                    serde_json::to_string_pretty(&report)
                        .map_err(|e| ApiError::Build(BuildError::Manifest(e)))
                } else {
                    Ok(format_build_report(&report))
                }
            }
            Commands::Manifest { content } => {
                let config = self.effective_config(content, &None, &None, None)?;
                let builder = SiteBuilder::new(self.resolved_build(config)?);
                let manifest = block_on(builder.manifest())??;
                Ok(manifest.to_json_pretty().map_err(BuildError::from)?)
            }
            Commands::Serve { addr, build } => {
                let config = self.effective_config(&None, &None, &None, addr.as_deref())?;
                self.serve(config, *build)
            }
        }
    }

    fn serve(&self, config: CtosConfig, build_first: bool) -> Result<String, ApiError> {
        let build = self.resolved_build(config.clone())?;
        let output_dir = build.output_dir.clone();
        let state = server::counter_state(&config.counter, &self.site_root)?;
        let listen_addr = config.server.listen_addr;

        block_on(async move {
            if build_first {
                let report = SiteBuilder::new(build).run().await?;
                info!(manifest = %report.manifest_path.display(), "Built before serving");
            }
            server::run(&listen_addr, server::app(output_dir, state)).await
        })??;

        Ok("Server stopped".to_string())
    }

    /// Build settings resolved against the site root, with a layout that
    /// cannot wipe any input.
    fn resolved_build(&self, config: CtosConfig) -> Result<BuildConfig, ApiError> {
        let site_root = std::path::absolute(&self.site_root).map_err(|e| {
            ApiError::ConfigError(format!(
                "Cannot resolve site root {}: {}",
                self.site_root.display(),
                e
            ))
        })?;
        let build = config.build.resolve(&site_root);
        build
            .validate_layout(Some(&site_root))
            .map_err(ApiError::ConfigError)?;
        Ok(build)
    }

    /// Loaded configuration with CLI overrides applied, validated.
    fn effective_config(
        &self,
        content: &Option<PathBuf>,
        output: &Option<PathBuf>,
        shell: &Option<PathBuf>,
        addr: Option<&str>,
    ) -> Result<CtosConfig, ApiError> {
        let mut config = self.config.clone();
        if let Some(content) = content {
            config.build.content_dir = content.clone();
        }
        if let Some(output) = output {
            config.build.output_dir = output.clone();
        }
        if let Some(shell) = shell {
            config.build.shell_dir = Some(shell.clone());
        }
        if let Some(addr) = addr {
            config.server.listen_addr = addr.to_string();
        }
        config.validated()
    }
}

fn block_on<F: Future>(future: F) -> Result<F::Output, ApiError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ApiError::Server(format!("Failed to start async runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}
