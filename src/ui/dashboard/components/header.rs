//! Dashboard header component
//!
//! Renders the title and the request gauge

use super::super::state::DashboardState;
use super::super::utils::palette;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

/// Render header with title and request progress.
pub fn render_header(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let colors = palette(state.theme);
    let header_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let title_text = format!(
        "MARKET DASHBOARD v{}  |  {} ({})  |  {} theme",
        env!("CARGO_PKG_VERSION"),
        state.backend_url,
        state.profile,
        state.theme
    );

    let title = Paragraph::new(title_text)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BorderType::Thick),
        );
    f.render_widget(title, header_chunks[0]);

    let (progress_text, gauge_color, progress_percent) = if state.in_flight > 0 {
        // Loops every 20 ticks
        let progress = ((state.tick % 20) as f64 / 20.0 * 100.0) as u16;
        (
            format!("LOADING - {} request(s) in flight", state.in_flight),
            Color::LightGreen,
            progress,
        )
    } else {
        ("READY".to_string(), Color::LightBlue, 100)
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors.muted)),
        )
        .gauge_style(
            Style::default()
                .fg(gauge_color)
                .add_modifier(Modifier::BOLD),
        )
        .percent(progress_percent)
        .label(progress_text);

    f.render_widget(gauge, header_chunks[1]);
}
