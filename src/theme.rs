//! Theme preference and the key-value store that persists it.

use crate::consts::cli_consts::storage::THEME_KEY;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    /// Plotly layout template matching the theme.
    pub fn plotly_template(self) -> &'static str {
        match self {
            ThemePreference::Light => "plotly_white",
            ThemePreference::Dark => "plotly_dark",
        }
    }
}

/// String preferences addressed by key, surviving restarts.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Preferences kept as a flat JSON object in a file.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    /// Opens the store. A missing file is an empty store; invalid JSON is an error.
    pub fn open(path: &Path) -> io::Result<Self> {
        let values = match fs::read(path) {
            Ok(buf) => serde_json::from_slice(&buf)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Preferences that live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Holds the active theme. The stored value is read once, at construction.
pub struct ThemeController {
    store: Box<dyn PreferenceStore>,
    current: ThemePreference,
}

impl ThemeController {
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let current = match store.get(THEME_KEY) {
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!("Ignoring unknown theme preference {:?}", value);
                ThemePreference::default()
            }),
            None => ThemePreference::default(),
        };
        Self { store, current }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    /// Flips the theme and persists it. On a write failure nothing changes.
    pub fn toggle(&mut self) -> io::Result<ThemePreference> {
        let next = self.current.toggled();
        self.store.set(THEME_KEY, &next.to_string())?;
        self.current = next;
        Ok(next)
    }
}
