use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::CliError;

/// Local state of the command-line client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub username: String,
    /// Session token from the last login or refresh.
    #[serde(default)]
    pub token: String,
    /// Token placed here by hand; it wins over the session token and is
    /// replaced by `refresh` when it was the one sent.
    #[serde(default)]
    pub api_token: String,
}

impl CliConfig {
    pub fn default_path() -> Result<PathBuf, CliError> {
        dirs::config_dir()
            .map(|dir| dir.join("notebox").join("config.json"))
            .ok_or(CliError::NoConfigDir)
    }

    /// A missing file yields an empty configuration.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Self::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn credential(&self) -> Option<&str> {
        [self.api_token.as_str(), self.token.as_str()]
            .into_iter()
            .find(|token| !token.is_empty())
    }

    /// Stores a refreshed token in place of the credential that was sent.
    pub fn replace_credential(&mut self, token: String) {
        if self.api_token.is_empty() {
            self.token = token;
        } else {
            self.api_token = token;
        }
    }

    pub fn clear_session(&mut self) {
        self.username.clear();
        self.token.clear();
    }
}
