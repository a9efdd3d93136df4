//! Environment variable source: FITCHECK__* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `FITCHECK__TOOLS__MKIMAGE=/opt/mkimage` sets `tools.mkimage`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix("FITCHECK")
            .separator("__")
            .try_parsing(true),
    ))
}
