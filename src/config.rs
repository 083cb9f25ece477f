use homedir::my_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";
const CONFIG_ENV: &str = "SAUCE_CONFIG";

const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";
/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default number of attempts per request
const DEFAULT_MAX_RETRIES: u32 = 5;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("invalid config: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("couldn't find home dir")]
    NoHomeDir,
}

impl ConfigError {
    fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Configuration for outbound page fetching
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScrapeConfig {
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,

    #[serde(default)]
    pub blocked_hosts: Vec<String>,

    /// Refuse hosts that resolve to loopback/private addresses
    #[serde(default = "default_true")]
    pub block_private_ips: bool,

    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Proxy used after a failed attempt, e.g. "socks5://127.0.0.1:9050"
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            allowed_schemes: default_allowed_schemes(),
            blocked_hosts: Vec::new(),
            block_private_ips: true,
            accept_invalid_certs: false,
            proxy: None,
        }
    }
}

fn default_user_agent() -> String {
    USER_AGENT_DEFAULT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_allowed_schemes() -> Vec<String> {
    vec!["http".to_string(), "https".to_string()]
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(skip_serializing, skip_deserializing)]
    path: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scrape = &self.scrape;

        if scrape.timeout_secs == 0 {
            return Err(ConfigError::validation(
                "scrape.timeout_secs",
                "must be greater than 0",
            ));
        }

        if scrape.max_retries == 0 {
            return Err(ConfigError::validation(
                "scrape.max_retries",
                "must be greater than 0",
            ));
        }

        if scrape.allowed_schemes.is_empty() {
            return Err(ConfigError::validation(
                "scrape.allowed_schemes",
                "at least one scheme is required",
            ));
        }

        Ok(())
    }

    /// Default location: `$SAUCE_CONFIG`, else `~/.config/sauce/config.yaml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let home = my_home()
            .map_err(|_| ConfigError::NoHomeDir)?
            .ok_or(ConfigError::NoHomeDir)?;

        Ok(home.join(".config").join("sauce").join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&Self::default_path()?)
    }

    pub fn load_with(path: &Path) -> Result<Self, ConfigError> {
        // create new if does not exist
        if !path.exists() {
            let config = Self {
                path: path.to_path_buf(),
                ..Default::default()
            };
            config.save()?;
        }

        let config_str = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.path = path.to_path_buf();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(&self.path, config_str)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
