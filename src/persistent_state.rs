use anyhow::{anyhow, Result};
use serenity::all::ChannelId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const STATE_PATH_REL_HOME: &str = ".config/overbot/state.json";

/// State which persists across sessions.  Currently a single record: the
/// channel that receives request notifications, written by `/setchannel`.
#[derive(Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersistentState {
    #[serde(
        rename = "DISCORD_CHANNEL_ID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub discord_channel_id: Option<u64>,
}

impl PersistentState {
    fn state_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(STATE_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    pub fn notification_channel(&self) -> Option<ChannelId> {
        self.discord_channel_id
            .filter(|id| *id != 0)
            .map(ChannelId::new)
    }

    pub fn set_notification_channel(&mut self, channel_id: ChannelId) {
        self.discord_channel_id = Some(channel_id.get());
    }

    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::state_path()?).await
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(&Self::state_path()?).await
    }

    /// Missing file means no channel configured yet, not an error.
    async fn load_from(path: &Path) -> Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(anyhow!(
                    "Could not read state at `{}`: {}",
                    path.to_string_lossy(),
                    e
                ))
            }
        };

        serde_json::from_str(&contents).map_err(|e| {
            anyhow!(
                "Could not parse state at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })
    }

    async fn save_to(&self, path: &Path) -> Result<()> {
        let state_str = serde_json::to_string_pretty(&self)
            .map_err(|e| anyhow!("Could not serialize state: {}", e))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow!(
                    "Could not create directory `{}`: {}",
                    parent.to_string_lossy(),
                    e
                )
            })?;
        }

        // Create a temporary file in the same directory.
        let tmp_path = path.with_extension("json.new");

        tokio::fs::write(&tmp_path, state_str).await.map_err(|e| {
            anyhow!(
                "Could not write state to temporary file `{}`: {}",
                tmp_path.to_string_lossy(),
                e
            )
        })?;

        // Atomically rename the temporary file over the target file.
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            anyhow!(
                "Could not rename temporary file `{}` to `{}`: {}",
                tmp_path.to_string_lossy(),
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_state_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("overbot-test-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn save_load_round_trip() {
        let path = temp_state_path("round-trip");
        let state = PersistentState {
            discord_channel_id: Some(123456789),
        };

        state.save_to(&path).await.unwrap();
        let loaded = PersistentState::load_from(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(state, loaded);
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let path = temp_state_path("missing");
        let loaded = PersistentState::load_from(&path).await.unwrap();
        assert_eq!(loaded, PersistentState::default());
        assert_eq!(loaded.notification_channel(), None);
    }

    #[test]
    fn persists_under_the_legacy_key() {
        let state = PersistentState {
            discord_channel_id: Some(42),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({ "DISCORD_CHANNEL_ID": 42 }));
    }
}
