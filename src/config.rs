use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{GhosthandError, GhosthandResult};

/// Gemini API keys start with this prefix; anything else is rejected before
/// a session starts.
pub const KEY_PREFIX: &str = "AI";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    api_key: String,
}

/// Single-secret credential store backed by a JSON file in the platform
/// config directory. Absence of the file means no saved credential.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn open() -> GhosthandResult<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| GhosthandError::Config("no config directory available".into()))?
            .join("ghosthand");
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join("config.json"),
        })
    }

    /// Store rooted at an explicit path instead of the platform config dir.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> GhosthandResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let stored: StoredCredential = serde_json::from_str(&raw)?;
        tracing::debug!(path = %self.path.display(), "credential loaded");
        Ok(Some(stored.api_key))
    }

    pub fn save(&self, key: &str) -> GhosthandResult<()> {
        let stored = StoredCredential {
            api_key: key.to_string(),
        };
        std::fs::write(&self.path, serde_json::to_string(&stored)?)?;
        tracing::info!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    pub fn clear(&self) -> GhosthandResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::info!(path = %self.path.display(), "credential cleared");
        }
        Ok(())
    }
}

pub fn validate_key(key: &str) -> GhosthandResult<()> {
    if key.starts_with(KEY_PREFIX) {
        Ok(())
    } else {
        Err(GhosthandError::CredentialInvalid(format!(
            "API key must start with \"{KEY_PREFIX}\""
        )))
    }
}
