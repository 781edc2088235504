//! Dashboard main renderer

use super::components::{charts, footer, form, header, logs};
use super::state::DashboardState;
use super::utils::palette;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::Style;
use ratatui::widgets::Block;

pub fn render_dashboard(f: &mut Frame, state: &DashboardState) {
    f.render_widget(
        Block::default().style(Style::default().bg(palette(state.theme).background)),
        f.area(),
    );

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Percentage(30),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(f.area());

    header::render_header(f, main_chunks[0], state);
    form::render_form(f, main_chunks[1], state);

    // Price on top, the three indicator charts below it.
    let chart_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_chunks[2]);
    let indicator_cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chart_rows[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(25),
            Constraint::Percentage(30),
        ])
        .split(main_chunks[3]);

    charts::render_charts(
        f,
        &[
            chart_rows[0],
            indicator_cells[0],
            indicator_cells[1],
            indicator_cells[2],
            bottom[0],
        ],
        state,
    );
    charts::render_statistics(f, bottom[1], state);
    logs::render_logs_panel(f, bottom[2], state);
    footer::render_footer(f, main_chunks[4], state.theme);
}
