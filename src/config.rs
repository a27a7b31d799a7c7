use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/overbot/config.toml";

/// Written when no configuration exists yet, so the operator has something
/// to fill in rather than a bare error.
const CONFIG_TEMPLATE: &str = r#"# overbot configuration

[general]
# Bot token from the Discord developer portal
discord_token = "your-discord-bot-token"

[overseerr]
# Base URL of the Overseerr instance, without a trailing slash
base_url = "http://localhost:5055"
# API key from Overseerr's settings page
api_key = "your-overseerr-api-key"
# Seconds between polls for pending requests
poll_interval_seconds = 60

[webhook]
# Accept pushed Overseerr notifications in addition to polling
enabled = false
bind_address = "0.0.0.0:8090"
"#;

/// Bot configuration
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub general: General,
    pub overseerr: Overseerr,
    #[serde(default)]
    pub webhook: Webhook,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct General {
    pub discord_token: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct Overseerr {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Webhook {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for Webhook {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: default_bind_address(),
        }
    }
}

fn default_poll_interval() -> u64 {
    60
}

fn default_bind_address() -> String {
    "0.0.0.0:8090".to_string()
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::scaffold(&path).await?;
            return Err(anyhow!(
                "No configuration found. A template was written to `{}`; \
                 fill in your Discord token and Overseerr API key, then restart.",
                path.to_string_lossy()
            ));
        }

        let mut file = tokio::fs::File::open(&path).await.map_err(|e| {
            anyhow!(
                "Could not open configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).await.map_err(|e| {
            anyhow!(
                "Could not read configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })?;

        config.validate()?;

        Ok(config)
    }

    async fn scaffold(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow!(
                    "Could not create directory `{}`: {}",
                    parent.to_string_lossy(),
                    e
                )
            })?;
        }

        tokio::fs::write(path, CONFIG_TEMPLATE).await.map_err(|e| {
            anyhow!(
                "Could not write configuration template to `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })
    }

    /// Refuse to serve with missing or still-placeholder credentials.
    fn validate(&self) -> Result<()> {
        if self.general.discord_token.is_empty()
            || self.general.discord_token == "your-discord-bot-token"
        {
            return Err(anyhow!(
                "`general.discord_token` is missing or still the template placeholder"
            ));
        }

        if self.overseerr.api_key.is_empty() || self.overseerr.api_key == "your-overseerr-api-key"
        {
            return Err(anyhow!(
                "`overseerr.api_key` is missing or still the template placeholder"
            ));
        }

        if self.overseerr.base_url.is_empty() {
            return Err(anyhow!("`overseerr.base_url` is missing"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_but_fails_validation() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn filled_in_config_validates() {
        let config: Config = toml::from_str(
            r#"
            [general]
            discord_token = "abc.def.ghi"

            [overseerr]
            base_url = "http://localhost:5055"
            api_key = "k3y"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.overseerr.poll_interval_seconds, 60);
        assert!(!config.webhook.enabled);
    }
}
