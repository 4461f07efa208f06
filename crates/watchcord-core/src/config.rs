use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use watchcord_catalog::CatalogConfig;
use watchcord_models::ImageFormat;

use crate::error::BridgeError;

/// Operator configuration, frozen at startup. The guided config flow that
/// produces it lives with the host platform; the engine only reads it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    pub access_token: String,
    #[serde(default)]
    pub image_format: ImageFormat,
    /// Member identifiers: numeric snowflakes or `name#discriminator` /
    /// bare-username keys.
    #[serde(default)]
    pub members: Vec<String>,
    /// Channel identifiers: numeric snowflakes.
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,
    /// Base URL the game platform serves promotional app images from.
    #[serde(default = "default_game_cdn_base")]
    pub game_cdn_base: String,
    #[serde(default = "default_game_catalog_url")]
    pub game_catalog_url: String,
    #[serde(default = "default_app_directory_url")]
    pub app_directory_url: String,
    #[serde(default = "default_catalog_refresh_secs")]
    pub catalog_refresh_secs: u64,
}

impl BridgeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, BridgeError> {
        toml::from_str(raw).map_err(|e| BridgeError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let raw = fs::read_to_string(path).map_err(|e| BridgeError::Config(e.to_string()))?;
        Self::from_toml_str(&raw)
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            game_catalog_url: self.game_catalog_url.clone(),
            app_directory_url: self.app_directory_url.clone(),
        }
    }
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_cdn_base() -> String {
    "https://cdn.discordapp.com".to_string()
}

fn default_game_cdn_base() -> String {
    "https://cdn.cloudflare.steamstatic.com/steam/apps".to_string()
}

fn default_game_catalog_url() -> String {
    CatalogConfig::default().game_catalog_url
}

fn default_app_directory_url() -> String {
    CatalogConfig::default().app_directory_url
}

fn default_catalog_refresh_secs() -> u64 {
    watchcord_catalog::DEFAULT_REFRESH_INTERVAL.as_secs()
}
