use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Console client configuration: REST API access plus logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base directory for relative log file paths. Empty => current directory.
    #[serde(default)]
    pub home_dir: String,
    /// REST API access.
    pub api: ApiConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout in seconds; 0 disables the timeout.
    #[serde(default)]
    pub timeout_sec: u64,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Per-endpoint page size overrides, e.g. `/exam-sessions: 50`.
    #[serde(default)]
    pub page_sizes: HashMap<String, u32>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Logging configuration - maps target names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit targets.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/console.log"
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

const fn default_page_size() -> u32 {
    20
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/".to_string(),
            timeout_sec: 30,
            default_page_size: default_page_size(),
            page_sizes: HashMap::new(),
            user_agent: None,
        }
    }
}

impl ApiConfig {
    /// Page size for a list endpoint; overrides win over the default.
    pub fn page_size_for(&self, endpoint: &str) -> u32 {
        let trimmed = endpoint.trim_end_matches('/');
        self.page_sizes
            .get(endpoint)
            .or_else(|| self.page_sizes.get(trimmed))
            .copied()
            .unwrap_or(self.default_page_size)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_sec > 0).then(|| Duration::from_secs(self.timeout_sec))
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .with_context(|| format!("api.base_url is not a valid URL: {}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api.base_url must be http(s), got scheme '{}'", url.scheme());
        }
        paging_core::validate_page_size(self.default_page_size)
            .context("api.default_page_size")?;
        for (endpoint, size) in &self.page_sizes {
            paging_core::validate_page_size(*size)
                .with_context(|| format!("api.page_sizes[{endpoint}]"))?;
        }
        Ok(())
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/console.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            api: ApiConfig::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Logging stays None unless YAML/ENV provide it.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path.as_ref()))
            // Example: CONSOLE__API__BASE_URL=https://uni.example/api maps to api.base_url
            .merge(Env::prefixed("CONSOLE__").split("__"));

        let config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;

        config.api.validate()?;
        Ok(config)
    }

    /// Load configuration from file or fall back to defaults.
    ///
    /// Without a path nothing is layered: `CONSOLE__*` variables are only
    /// read together with a config file.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Absolute base directory for log files.
    pub fn base_dir(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir().context("current directory is not accessible")?;
        let home = self.home_dir.trim();
        if home.is_empty() {
            return Ok(cwd);
        }
        let p = PathBuf::from(home);
        Ok(if p.is_absolute() { p } else { cwd.join(p) })
    }

    pub fn logging_or_default(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_else(default_logging_config)
    }
}
