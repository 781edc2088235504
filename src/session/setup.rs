//! Session setup and initialization

use crate::backend::{Backend, BackendClient};
use crate::config::{Config, get_config_path, get_preferences_path};
use crate::consts::cli_consts::network::BACKEND_URL_ENV;
use crate::dashboard::{DashboardClient, Notifier};
use crate::download::DirectorySink;
use crate::profile::BackendProfile;
use crate::surface::ChartSurface;
use crate::theme::{FilePreferenceStore, ThemeController};
use log::{debug, info};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Settings shared by the TUI and the headless commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub backend_url: String,
    pub profile: BackendProfile,
    pub download_dir: PathBuf,
}

impl SessionSettings {
    /// Merges command-line overrides, the environment and the config file.
    pub fn resolve(
        config: &Config,
        backend_url: Option<&str>,
        profile: Option<BackendProfile>,
        env_backend_url: Option<&str>,
    ) -> Self {
        Self {
            backend_url: config.resolve_backend_url(backend_url, env_backend_url),
            profile: profile.unwrap_or(config.profile),
            download_dir: config.download_dir(),
        }
    }

    /// Reads `~/.market-dashboard/config.json` and applies overrides.
    pub fn load(
        backend_url: Option<&str>,
        profile: Option<BackendProfile>,
    ) -> Result<Self, Box<dyn Error>> {
        let config_path = get_config_path()?;
        let config = Config::load_or_default(&config_path)
            .map_err(|e| format!("Failed to load config {}: {}", config_path.display(), e))?;
        let env_url = std::env::var(BACKEND_URL_ENV).ok();
        let settings = Self::resolve(&config, backend_url, profile, env_url.as_deref());
        debug!("Resolved session settings: {:?}", settings);
        Ok(settings)
    }
}

/// Opens the persisted theme preference.
pub fn open_theme() -> Result<ThemeController, Box<dyn Error>> {
    let path = get_preferences_path()?;
    let store = FilePreferenceStore::open(&path)
        .map_err(|e| format!("Failed to read preferences {}: {}", path.display(), e))?;
    Ok(ThemeController::load(Box::new(store)))
}

/// Builds the dashboard client for a session.
pub fn build_client(
    settings: &SessionSettings,
    surface: Arc<dyn ChartSurface>,
    notifier: Arc<dyn Notifier>,
    download_dir: Option<PathBuf>,
) -> Result<DashboardClient, Box<dyn Error>> {
    let backend: Arc<dyn Backend> =
        Arc::new(BackendClient::new(&settings.backend_url, settings.profile)?);
    info!(
        "Using backend {} ({} profile)",
        backend.base_url(),
        backend.profile()
    );
    let sink = DirectorySink::new(download_dir.unwrap_or_else(|| settings.download_dir.clone()));

    Ok(DashboardClient::new(
        backend,
        surface,
        notifier,
        Arc::new(sink),
        open_theme()?,
    ))
}
