//! TUI mode execution

use super::messages::{print_session_exit_success, print_session_starting};
use super::setup::{SessionSettings, build_client};
use crate::surface::TerminalSurface;
use crate::ui::dashboard::DashboardState;
use crate::ui::{self, ChannelNotifier};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::sync::Arc;
use std::{error::Error, io};
use tokio::sync::mpsc;

/// Capacity of the notice channel feeding the activity log.
const EVENT_QUEUE_SIZE: usize = 100;

/// Runs the interactive dashboard
///
/// This function handles:
/// 1. Terminal setup and cleanup
/// 2. Wiring the dashboard client to the terminal surface
/// 3. Proper shutdown handling
pub async fn run_tui_mode(settings: SessionSettings) -> Result<(), Box<dyn Error>> {
    print_session_starting("TUI", &settings.backend_url);

    let surface = TerminalSurface::new();
    let (event_sender, event_receiver) = mpsc::channel(EVENT_QUEUE_SIZE);
    let client = Arc::new(build_client(
        &settings,
        Arc::new(surface.clone()),
        Arc::new(ChannelNotifier::new(event_sender)),
        None,
    )?);

    let state = DashboardState::new(
        settings.backend_url.clone(),
        settings.profile,
        client.theme(),
        surface,
    );
    let app = ui::App::new(client, state, event_receiver);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Initialize the terminal with Crossterm backend
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run(&mut terminal, app).await;

    // Clean up the terminal after running the application
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    print_session_exit_success();

    Ok(())
}
