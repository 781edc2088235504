//! Application configuration.

use crate::consts::cli_consts::{network, storage};
use crate::profile::BackendProfile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the analysis backend.
    pub backend_url: String,

    /// Route and field conventions of the backend deployment.
    #[serde(default)]
    pub profile: BackendProfile,

    /// Where downloaded spreadsheets go. The working directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: network::DEFAULT_BACKEND_URL.to_string(),
            profile: BackendProfile::default(),
            download_dir: None,
        }
    }
}

impl Config {
    pub fn new(backend_url: String, profile: BackendProfile, download_dir: Option<String>) -> Self {
        Config {
            backend_url,
            profile,
            download_dir,
        }
    }

    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Like [`Config::load_from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, std::io::Error> {
        match Self::load_from_file(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if writing to file fails or serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Picks the backend URL: explicit flag, then environment, then this config.
    pub fn resolve_backend_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        flag.or(env)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.backend_url.clone())
    }
}

/// `~/.market-dashboard`, holding config, preferences and the TUI log.
pub fn get_state_dir() -> Result<PathBuf, std::io::Error> {
    let home = home::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine the home directory",
        )
    })?;
    Ok(home.join(storage::STATE_DIR))
}

pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    Ok(get_state_dir()?.join(storage::CONFIG_FILE))
}

pub fn get_preferences_path() -> Result<PathBuf, std::io::Error> {
    Ok(get_state_dir()?.join(storage::PREFERENCES_FILE))
}

pub fn get_log_path() -> Result<PathBuf, std::io::Error> {
    Ok(get_state_dir()?.join(storage::LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn config(url: &str) -> Config {
        Config::new(url.to_string(), BackendProfile::Legacy, Some("/tmp/x".to_string()))
    }

    #[test]
    // Loading a saved configuration file should return the same configuration.
    fn test_load_recovers_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = config("http://10.0.0.2:8000");
        config.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    // Saving a configuration should create directories if they don't exist.
    fn test_save_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent_dir").join("config.json");

        let result = Config::default().save(&path);

        assert!(result.is_ok(), "Failed to save config");
        assert!(
            path.parent().unwrap().exists(),
            "Parent directory does not exist"
        );
    }

    #[test]
    // Saving a configuration should overwrite an existing file.
    fn test_save_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        config("http://first").save(&path).unwrap();
        let config2 = config("http://second");
        config2.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config2, loaded_config);
    }

    #[test]
    // Loading an invalid JSON file should return an error.
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid_config.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, "invalid json").unwrap();

        assert!(Config::load_from_file(&path).is_err());
        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    // A missing file means defaults, not an error.
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.backend_url, "http://127.0.0.1:5000");
        assert_eq!(config.profile, BackendProfile::Standard);
        assert_eq!(config.download_dir(), PathBuf::from("."));
    }

    #[test]
    // Older files without a profile fall back to the standard one.
    fn test_profile_defaults_when_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"backend_url": "http://host:5000"}"#).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.profile, BackendProfile::Standard);
        assert_eq!(config.download_dir, None);
    }

    #[test]
    fn test_backend_url_resolution_order() {
        let config = config("http://from-config");
        assert_eq!(
            config.resolve_backend_url(Some("http://flag"), Some("http://env")),
            "http://flag"
        );
        assert_eq!(
            config.resolve_backend_url(None, Some("http://env")),
            "http://env"
        );
        assert_eq!(config.resolve_backend_url(None, None), "http://from-config");
        assert_eq!(config.resolve_backend_url(None, Some("  ")), "http://from-config");
    }
}
