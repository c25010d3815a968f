//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("build.content_dir", "content")?
        .set_default("build.output_dir", "public")?
        .set_default("build.manifest_name", "init.json")?
        .set_default("counter.window_secs", 86_400_i64)?
        .set_default("server.listen_addr", "127.0.0.1:8787")
}
