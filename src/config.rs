use crate::error::BridgeError;
use crate::onedrive_service::onedrive_models::{UploadSessionConfig, CHUNK_ALIGNMENT};
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

static CONFIG_FILE_NAME: &str = "bridge.json";

pub const DEFAULT_API_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Everything a bridge instance needs from its host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Root of the bridge inside the drive (or inside the shared folder)
    pub root: String,
    /// Bearer token, obtained and refreshed by the host
    pub access_token: String,
    /// Name of a folder shared by another account to root the bridge in
    pub shared_folder: Option<String>,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub upload: UploadSessionConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            access_token: String::new(),
            shared_folder: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 300,
            connect_timeout_secs: 30,
            upload: UploadSessionConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn new(root: &str, access_token: &str) -> Self {
        Self {
            root: root.to_string(),
            access_token: access_token.to_string(),
            ..Default::default()
        }
    }

    pub fn with_shared_folder(mut self, shared_folder: &str) -> Self {
        self.shared_folder = Some(shared_folder.to_string());
        self
    }

    /// Build from the settings blob the host runtime hands to the provider:
    /// `{"onedrive_connection": {"onedrive_credentials": "<token>"}, "shared_folder": "<name>"}`
    pub fn from_plugin_config(root: &str, config: &Value) -> Result<Self> {
        let access_token = config
            .get("onedrive_connection")
            .and_then(|c| c.get("onedrive_credentials"))
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Missing onedrive_connection.onedrive_credentials"))?;

        let mut bridge_config = Self::new(root, access_token);
        bridge_config.shared_folder = config
            .get("shared_folder")
            .and_then(Value::as_str)
            .map(|s| s.trim_matches('/').to_string())
            .filter(|s| !s.is_empty());
        Ok(bridge_config)
    }

    /// Default location of the config file for this user
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "onedrive-fs-bridge", "onedrive-fs-bridge")
            .ok_or_else(|| anyhow!("Could not determine project directories"))?;
        Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load_from_file(config_file_path: &Path) -> Result<Self> {
        if !config_file_path.exists() {
            return Err(anyhow!(
                "Config file not found: {}",
                config_file_path.display()
            ));
        }
        let data = fs::read_to_string(config_file_path).context("Failed to read config file")?;
        let config: Self = serde_json::from_str(&data).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), BridgeError> {
        if self.access_token.trim().is_empty() {
            return Err(BridgeError::Config("access token is empty".to_string()));
        }
        if self.upload.chunk_size == 0 || self.upload.chunk_size % CHUNK_ALIGNMENT != 0 {
            return Err(BridgeError::Config(format!(
                "chunk size {} is not a positive multiple of {}",
                self.upload.chunk_size, CHUNK_ALIGNMENT
            )));
        }
        Ok(())
    }

    /// Shared folder name without surrounding slashes, empty when unset
    pub fn shared_folder_root(&self) -> &str {
        self.shared_folder
            .as_deref()
            .map(|s| s.trim_matches('/'))
            .unwrap_or("")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
