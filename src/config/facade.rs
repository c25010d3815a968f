//! Config loading facade: one entry point over defaults, files and environment.

use crate::config::merge::merge_policy;
use crate::config::sources::{global_file, site_file};
use crate::config::CtosConfig;
use config::{ConfigError, Environment, File};
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `CTOS_BUILD__OUTPUT_DIR`.
pub const ENV_PREFIX: &str = "CTOS";

/// Loads `CtosConfig` from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a site.
    ///
    /// Precedence (lowest to highest): defaults, global file, `ctos.toml`,
    /// `config/{CTOS_ENV}.toml`, `CTOS_*` environment variables.
    pub fn load(site_root: &Path) -> Result<CtosConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = site_file::add_to_builder(builder, site_root)?;
        let builder = builder.add_source(Self::environment());

        builder.build()?.try_deserialize()
    }

    /// Load configuration from an explicit file over defaults, ignoring other sources.
    pub fn load_from_file(path: &Path) -> Result<CtosConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?
            .try_deserialize()
    }

    /// Path of the user-level config file, if one can be located.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}
