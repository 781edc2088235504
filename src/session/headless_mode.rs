//! Headless mode execution
//!
//! One-shot commands: fetch to Plotly files, download a spreadsheet, theme changes.

use super::messages::print_session_starting;
use super::setup::{SessionSettings, build_client, open_theme};
use crate::cli_messages::ConsoleNotifier;
use crate::consts::cli_consts::messages::PREFERENCE_FAILED;
use crate::dashboard::{DashboardError, DownloadOutcome, FetchOutcome};
use crate::model::QueryInput;
use crate::surface::{PlotlyFileSurface, TerminalSurface};
use crate::theme::ThemePreference;
use crate::{print_cmd_info, print_cmd_success};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// A failure the console notifier has already shown; callers only set the exit status.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AlreadyReported(#[source] pub DashboardError);

/// Fetches once and writes every chart as a Plotly figure under `out_dir`.
///
/// # Returns
/// * `Ok(())` - Charts were written
/// * `Err` - Validation, backend or rendering failed; the user was already told why
pub async fn run_fetch(
    settings: &SessionSettings,
    input: &QueryInput,
    out_dir: PathBuf,
) -> Result<(), Box<dyn Error>> {
    print_session_starting("headless", &settings.backend_url);

    let surface = Arc::new(PlotlyFileSurface::new(out_dir)?);
    let client = build_client(settings, surface.clone(), Arc::new(ConsoleNotifier), None)?;

    match client.submit_fetch(input).await {
        FetchOutcome::Rendered { charts, .. } => {
            print_cmd_success!(
                "Charts written",
                "{} charts, open {}",
                charts.len(),
                surface.index_path().display()
            );
            Ok(())
        }
        FetchOutcome::Superseded { sequence } => {
            Err(format!("Request #{} was superseded", sequence).into())
        }
        FetchOutcome::Failed(e) => Err(Box::new(AlreadyReported(e))),
    }
}

/// Downloads the spreadsheet export into `out_dir`, or the configured directory.
pub async fn run_download(
    settings: &SessionSettings,
    input: &QueryInput,
    out_dir: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn Error>> {
    print_session_starting("headless", &settings.backend_url);

    // Downloads never draw; the in-memory surface just satisfies the client.
    let client = build_client(
        settings,
        Arc::new(TerminalSurface::new()),
        Arc::new(ConsoleNotifier),
        out_dir,
    )?;

    match client.submit_download(input).await {
        DownloadOutcome::Saved { path } => Ok(path),
        DownloadOutcome::Failed(e) => Err(Box::new(AlreadyReported(e))),
    }
}

pub fn run_theme_toggle() -> Result<ThemePreference, Box<dyn Error>> {
    let mut theme = open_theme()?;
    let next = theme
        .toggle()
        .map_err(|e| format!("{}: {}", PREFERENCE_FAILED, e))?;
    print_cmd_success!("Theme updated", "now using the {} theme", next);
    Ok(next)
}

pub fn run_theme_show() -> Result<ThemePreference, Box<dyn Error>> {
    let current = open_theme()?.current();
    print_cmd_info!("Current theme", "{}", current);
    Ok(current)
}
