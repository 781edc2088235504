//! Dashboard footer component
//!
//! Renders the key bindings

use crate::theme::ThemePreference;
use crate::ui::dashboard::utils::palette;
use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::prelude::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub const KEY_HELP: &str =
    "[Tab] Next field | [1-4] Indicators | [Enter] Fetch | [F2] Download | [F3] Theme | [Esc] Quit";

pub fn render_footer(f: &mut Frame, area: ratatui::layout::Rect, theme: ThemePreference) {
    let footer = Paragraph::new(KEY_HELP)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(palette(theme).accent)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Thick),
        );
    f.render_widget(footer, area);
}
