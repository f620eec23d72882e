/// Demo configuration
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use zero_gallery_client::GalleryConfig;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "zerogallery.toml";

/// Environment variable prefix, e.g. `ZEROGALLERY_SERVER__URL`.
pub const ENV_PREFIX: &str = "ZEROGALLERY";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_demo")]
    pub demo: DemoSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoSettings {
    /// Scratch directory for generated and downloaded files
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    #[serde(default = "default_album_name")]
    pub album_name: String,

    /// Delete the created album and its data at the end
    #[serde(default)]
    pub cleanup: bool,
}

impl DemoConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `config_path` must exist; otherwise `zerogallery.toml` is
    /// read if present.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => Some(config::File::from(path.to_path_buf()).required(true)),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then(|| config::File::from(path))
            }
        };

        Self::from_sources(file, environment())
    }

    fn from_sources(
        file: Option<config::File<config::FileSourceFile, config::FileFormat>>,
        env: config::Environment,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(file) = file {
            settings = settings.add_source(file);
        }

        // Environment overrides the file
        settings = settings.add_source(env);

        settings
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            bail!("Server URL is required (set ZEROGALLERY_SERVER__URL)");
        }

        if self.server.timeout_secs == 0 {
            bail!("Request timeout must be at least one second");
        }

        Ok(())
    }

    /// Client settings derived from the `[server]` section.
    pub fn gallery_config(&self) -> GalleryConfig {
        GalleryConfig {
            base_url: self.server.url.clone(),
            access_token: self
                .server
                .access_token
                .clone()
                .filter(|token| !token.is_empty()),
            timeout: Duration::from_secs(self.server.timeout_secs),
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: default_url(),
        access_token: None,
        timeout_secs: default_timeout_secs(),
    }
}

fn default_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_demo() -> DemoSettings {
    DemoSettings {
        work_dir: default_work_dir(),
        album_name: default_album_name(),
        cleanup: false,
    }
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("zero-gallery-demo")
}

fn default_album_name() -> String {
    "Test Album from Rust".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            demo: default_demo(),
        }
    }
}
