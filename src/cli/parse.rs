//! CLI parse: clap types for ctos. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ctos - static builder for a browser desktop
#[derive(Parser)]
#[command(name = "ctos")]
#[command(about = "Build a browser desktop from a content tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    pub site: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the site: copy the shell, convert content, write the manifest
    Build {
        /// Content root (relative to the site root)
        #[arg(long)]
        content: Option<PathBuf>,
        /// Output root (relative to the site root)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Shell directory (relative to the site root)
        #[arg(long)]
        shell: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the manifest to stdout without writing anything
    Manifest {
        /// Content root (relative to the site root)
        #[arg(long)]
        content: Option<PathBuf>,
    },
    /// Serve the output directory and the counter endpoint
    Serve {
        /// Listen address, e.g. 127.0.0.1:8787
        #[arg(long)]
        addr: Option<String>,
        /// Build before serving
        #[arg(long)]
        build: bool,
    },
}
