use anyhow::{bail, Result};
use dotenvy::dotenv;
use serde::Deserialize;

/// Prefix shared by every environment variable the tracker reads
pub const ENV_PREFIX: &str = "TRACKER_";

/// Which data source backs the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Decide from the site URL host once, when the service is built
    #[default]
    Auto,
    SharePoint,
    Mock,
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Absolute URL of the SharePoint site hosting the list
    #[serde(default)]
    pub site_url: String,

    /// Title of the list holding project records
    #[serde(default = "default_list_name")]
    pub list_name: String,

    /// Bearer token sent with every SharePoint request
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub backend: BackendMode,

    /// File to write logs to; the terminal UI never logs to the screen
    #[serde(default)]
    pub log_file: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_list_name() -> String {
    "RevlonProjects".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            list_name: default_list_name(),
            access_token: None,
            backend: BackendMode::default(),
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize `TRACKER_*` environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        Self::from_pairs(std::env::vars())
    }

    /// Build a config from explicit key/value pairs, using the same prefix rules as `load`
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(pairs)?;
        Ok(config)
    }

    /// Site URL without a trailing slash
    pub fn site_url(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    /// Apply command line overrides on top of the environment
    pub fn apply_overrides(
        &mut self,
        site_url: Option<String>,
        list_name: Option<String>,
        force_mock: bool,
    ) {
        if let Some(site_url) = site_url {
            self.site_url = site_url;
        }
        if let Some(list_name) = list_name {
            self.list_name = list_name;
        }
        if force_mock {
            self.backend = BackendMode::Mock;
        }
    }

    /// Reject combinations that cannot reach a backend
    pub fn validate(&self) -> Result<()> {
        if self.list_name.trim().is_empty() {
            bail!("{}LIST_NAME must not be empty", ENV_PREFIX);
        }
        if self.backend == BackendMode::SharePoint && self.site_url().is_empty() {
            bail!(
                "{}SITE_URL is required when the SharePoint backend is selected",
                ENV_PREFIX
            );
        }
        Ok(())
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    Config::load()
}
