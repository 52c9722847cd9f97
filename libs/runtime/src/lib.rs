//! Process-level plumbing for console clients: layered configuration and
//! `tracing` initialisation.

pub mod config;
pub mod logging;

pub use config::{default_logging_config, ApiConfig, AppConfig, LoggingConfig, Section};
pub use logging::init_logging_from_config;

/// Load the config (or defaults) and install logging from it.
pub fn bootstrap<P: AsRef<std::path::Path>>(config_path: Option<P>) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load_or_default(config_path)?;
    let base_dir = config.base_dir()?;
    init_logging_from_config(&config.logging_or_default(), &base_dir);
    tracing::info!(base_url = %config.api.base_url, "console runtime configured");
    Ok(config)
}
