//! Query form component

use super::super::state::{DashboardState, Field};
use super::super::utils::palette;
use crate::model::Indicator;
use ratatui::Frame;
use ratatui::prelude::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use strum::IntoEnumIterator;

pub fn render_form(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let colors = palette(state.theme);
    let label = Style::default().fg(colors.muted);
    let value = |field: Field| {
        if state.focus == field {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors.text)
        }
    };
    let cursor = |field: Field| if state.focus == field { "_" } else { "" };

    let mut spans = Vec::new();
    let text_fields = [
        (Field::Ticker, "Ticker", &state.input.ticker, ""),
        (Field::Start, "Start", &state.input.start, "YYYY-MM-DD"),
        (Field::End, "End", &state.input.end, "today"),
        (Field::Horizon, "Horizon", &state.input.horizon, "30"),
    ];
    for (field, name, text, placeholder) in text_fields {
        spans.push(Span::styled(format!("{}: ", name), label));
        let shown = if text.is_empty() && state.focus != field {
            placeholder.to_string()
        } else {
            format!("{}{}", text, cursor(field))
        };
        spans.push(Span::styled(format!("[{}]", shown), value(field)));
        spans.push(Span::raw("  "));
    }

    spans.push(Span::styled("Indicators: ", label));
    for (i, indicator) in Indicator::iter().enumerate() {
        let mark = if state.input.indicators.contains(&indicator) {
            "x"
        } else {
            " "
        };
        spans.push(Span::styled(
            format!("{}[{}] {} ", i + 1, mark, indicator.to_string().to_uppercase()),
            value(Field::Indicators),
        ));
    }

    let form = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title("QUERY")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors.border)),
    );
    f.render_widget(form, area);
}
