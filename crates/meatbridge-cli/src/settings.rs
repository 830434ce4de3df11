//! Connection settings stored between runs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use meatbridge_core::config::session;
use meatbridge_core::protocol::server_url;
use serde::{Deserialize, Serialize};

use crate::cli::ConnectionArgs;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: Option<String>,
    pub slot: Option<String>,
    pub password: Option<String>,
}

/// Settings with every required field present
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub url: String,
    pub slot: String,
    pub password: String,
}

impl Settings {
    /// `<config dir>/meatbridge/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("meatbridge").join("config.toml"))
    }

    /// Load settings; a missing file yields empty settings
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Overlay values given on the command line or in the environment
    pub fn merge(mut self, args: &ConnectionArgs) -> Self {
        if args.server.is_some() {
            self.server.clone_from(&args.server);
        }
        if args.slot.is_some() {
            self.slot.clone_from(&args.slot);
        }
        if args.password.is_some() {
            self.password.clone_from(&args.password);
        }
        self
    }

    pub fn target(&self) -> Result<Target> {
        let Some(slot) = self.slot.clone().filter(|s| !s.trim().is_empty()) else {
            bail!("No slot name given; pass --slot or set MEATBRIDGE_SLOT");
        };
        let server = self.server.as_deref().unwrap_or(session::DEFAULT_SERVER);
        Ok(Target {
            url: server_url(server),
            slot,
            password: self.password.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let settings = Settings {
            server: Some("localhost:38281".into()),
            slot: Some("Meaty".into()),
            password: None,
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "slot = [").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_arguments_override_file() {
        let stored = Settings {
            server: Some("localhost:38281".into()),
            slot: Some("Stored".into()),
            password: Some("old".into()),
        };
        let args = ConnectionArgs {
            slot: Some("Meaty".into()),
            ..Default::default()
        };
        let merged = stored.merge(&args);
        assert_eq!(merged.server.as_deref(), Some("localhost:38281"));
        assert_eq!(merged.slot.as_deref(), Some("Meaty"));
        assert_eq!(merged.password.as_deref(), Some("old"));
    }

    #[test]
    fn test_target_defaults() {
        let settings = Settings {
            slot: Some("Meaty".into()),
            ..Default::default()
        };
        let target = settings.target().unwrap();
        assert_eq!(target.url, "wss://archipelago.gg:38281");
        assert_eq!(target.password, "");
    }

    #[test]
    fn test_target_requires_slot() {
        assert!(Settings::default().target().is_err());
        let blank = Settings {
            slot: Some("  ".into()),
            ..Default::default()
        };
        assert!(blank.target().is_err());
    }
}
