//! Merge rules: defaults applied beneath every source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("verify.backend", "fdtget")?
        .set_default("verify.image_pattern", "kernel")?
        .set_default("verify.hash_marker", "hash-")?
        .set_default("scenario.template_dir", "templates")
}
