//! Main application state and UI loop
//!
//! Contains the App struct and main UI event handling logic

use crate::dashboard::{DashboardClient, Notice, Notifier};
use crate::events::Event as DashboardEvent;
use crate::ui::dashboard::{DashboardState, Field, render_dashboard};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use ratatui::{Terminal, backend::Backend};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Forwards notices to the activity log.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<DashboardEvent>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::Sender<DashboardEvent>) -> Self {
        Self { sender }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if let Err(e) = self.sender.try_send(DashboardEvent::from(notice)) {
            debug!("Dropping notice: {}", e);
        }
    }
}

/// What a key press asks the app to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Fetch,
    Download,
    ToggleTheme,
}

/// Applies form edits to `state` and returns anything that needs the client.
pub fn handle_key(key: KeyEvent, state: &mut DashboardState) -> Action {
    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Enter => Action::Fetch,
        KeyCode::F(2) => Action::Download,
        KeyCode::F(3) => Action::ToggleTheme,
        KeyCode::Tab => {
            state.focus = state.focus.next();
            Action::None
        }
        KeyCode::BackTab => {
            state.focus = state.focus.previous();
            Action::None
        }
        KeyCode::Backspace => {
            state.backspace();
            Action::None
        }
        KeyCode::Char(c) if state.focus == Field::Indicators => {
            if let Some(n) = c.to_digit(10) {
                state.toggle_indicator(n as usize);
            }
            Action::None
        }
        KeyCode::Char(c) => {
            state.type_char(c);
            Action::None
        }
        _ => Action::None,
    }
}

/// Application state
pub struct App {
    client: Arc<DashboardClient>,
    state: DashboardState,
    /// Receives notices from the dashboard client.
    event_receiver: mpsc::Receiver<DashboardEvent>,
    /// Fetches and downloads still running.
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(
        client: Arc<DashboardClient>,
        state: DashboardState,
        event_receiver: mpsc::Receiver<DashboardEvent>,
    ) -> Self {
        Self {
            client,
            state,
            event_receiver,
            tasks: Vec::new(),
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::None | Action::Quit => {}
            Action::Fetch => {
                let client = self.client.clone();
                let input = self.state.input.clone();
                self.tasks.push(tokio::spawn(async move {
                    client.submit_fetch(&input).await;
                }));
            }
            Action::Download => {
                let client = self.client.clone();
                let input = self.state.input.clone();
                self.tasks.push(tokio::spawn(async move {
                    client.submit_download(&input).await;
                }));
            }
            Action::ToggleTheme => match self.client.toggle_theme() {
                Ok(theme) => self.state.theme = theme,
                Err(e) => warn!("Theme toggle failed: {}", e),
            },
        }
    }

    fn update(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.add_to_activity_log(event);
        }
        self.tasks.retain(|task| !task.is_finished());
        self.state.in_flight = self.tasks.len();
        self.state.update();
    }
}

/// Runs the UI loop until the user quits.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    loop {
        app.update();
        terminal.draw(|f| render_dashboard(f, &app.state))?;

        // Poll for key events
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Skip events that are not KeyEventKind::Press
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match handle_key(key, &mut app.state) {
                    Action::Quit => break,
                    action => app.perform(action),
                }
            }
        }
        // Let spawned requests make progress between frames.
        tokio::task::yield_now().await;
    }

    for task in app.tasks {
        task.abort();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Indicator;
    use crate::profile::BackendProfile;
    use crate::surface::TerminalSurface;
    use crate::theme::ThemePreference;
    use crossterm::event::KeyModifiers;

    fn state() -> DashboardState {
        DashboardState::new(
            "http://127.0.0.1:5000".to_string(),
            BackendProfile::Standard,
            ThemePreference::Dark,
            TerminalSurface::new(),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_actions() {
        let mut state = state();
        assert_eq!(handle_key(press(KeyCode::Enter), &mut state), Action::Fetch);
        assert_eq!(handle_key(press(KeyCode::F(2)), &mut state), Action::Download);
        assert_eq!(
            handle_key(press(KeyCode::F(3)), &mut state),
            Action::ToggleTheme
        );
        assert_eq!(handle_key(press(KeyCode::Esc), &mut state), Action::Quit);
    }

    #[test]
    fn digits_toggle_indicators_only_when_focused() {
        let mut state = state();
        state.focus = Field::Start;
        handle_key(press(KeyCode::Char('2')), &mut state);
        assert_eq!(state.input.start, "2");
        assert!(state.input.indicators.is_empty());

        handle_key(press(KeyCode::BackTab), &mut state);
        handle_key(press(KeyCode::BackTab), &mut state);
        assert_eq!(state.focus, Field::Indicators);
        handle_key(press(KeyCode::Char('2')), &mut state);
        assert!(state.input.indicators.contains(&Indicator::Ema));
    }

    #[tokio::test]
    async fn channel_notifier_feeds_activity_log() {
        let (sender, mut receiver) = mpsc::channel(4);
        let notifier = ChannelNotifier::new(sender);
        notifier.notify(Notice::error("ticker not found"));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.msg, "ticker not found");
    }
}
