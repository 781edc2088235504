//! Dashboard state management
//!
//! The query form being edited, the activity log and what the header shows

use crate::consts::cli_consts::MAX_ACTIVITY_LOGS;
use crate::events::Event;
use crate::model::{Indicator, QueryInput};
use crate::profile::BackendProfile;
use crate::surface::TerminalSurface;
use crate::theme::ThemePreference;
use std::collections::VecDeque;
use strum::IntoEnumIterator;

/// Form fields in tab order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Field {
    Ticker,
    Start,
    End,
    Horizon,
    Indicators,
}

impl Field {
    pub fn next(self) -> Self {
        let fields: Vec<Field> = Field::iter().collect();
        let i = fields.iter().position(|f| *f == self).unwrap_or(0);
        fields[(i + 1) % fields.len()]
    }

    pub fn previous(self) -> Self {
        let fields: Vec<Field> = Field::iter().collect();
        let i = fields.iter().position(|f| *f == self).unwrap_or(0);
        fields[(i + fields.len() - 1) % fields.len()]
    }
}

#[derive(Debug)]
pub struct DashboardState {
    /// Values typed into the form.
    pub input: QueryInput,
    /// Field receiving keystrokes.
    pub focus: Field,
    /// Activity logs for display
    pub activity_logs: VecDeque<Event>,
    pub theme: ThemePreference,
    pub backend_url: String,
    pub profile: BackendProfile,
    /// Charts drawn by the dashboard client.
    pub surface: TerminalSurface,
    /// Animation tick counter
    pub tick: usize,
    /// Requests started but not yet answered.
    pub in_flight: usize,
}

impl DashboardState {
    pub fn new(
        backend_url: String,
        profile: BackendProfile,
        theme: ThemePreference,
        surface: TerminalSurface,
    ) -> Self {
        Self {
            input: QueryInput::default(),
            focus: Field::Ticker,
            activity_logs: VecDeque::new(),
            theme,
            backend_url,
            profile,
            surface,
            tick: 0,
            in_flight: 0,
        }
    }

    /// Add an event to activity logs with size limit
    pub fn add_to_activity_log(&mut self, event: Event) {
        if self.activity_logs.len() >= MAX_ACTIVITY_LOGS {
            self.activity_logs.pop_front();
        }
        self.activity_logs.push_back(event);
    }

    pub fn update(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Ticker => Some(&mut self.input.ticker),
            Field::Start => Some(&mut self.input.start),
            Field::End => Some(&mut self.input.end),
            Field::Horizon => Some(&mut self.input.horizon),
            Field::Indicators => None,
        }
    }

    pub fn type_char(&mut self, c: char) {
        let focus = self.focus;
        if let Some(text) = self.focused_text() {
            let accepted = match focus {
                Field::Ticker => !c.is_whitespace(),
                Field::Start | Field::End => c.is_ascii_digit() || c == '-',
                Field::Horizon => c.is_ascii_digit(),
                Field::Indicators => false,
            };
            if accepted {
                text.push(if focus == Field::Ticker {
                    c.to_ascii_uppercase()
                } else {
                    c
                });
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// Toggles the n-th indicator (1-based, in display order).
    pub fn toggle_indicator(&mut self, n: usize) {
        let Some(indicator) = n.checked_sub(1).and_then(|i| Indicator::iter().nth(i)) else {
            return;
        };
        if !self.input.indicators.remove(&indicator) {
            self.input.indicators.insert(indicator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DashboardState {
        DashboardState::new(
            "http://127.0.0.1:5000".to_string(),
            BackendProfile::Standard,
            ThemePreference::Dark,
            TerminalSurface::new(),
        )
    }

    #[test]
    fn tab_order_wraps_both_ways() {
        assert_eq!(Field::Ticker.next(), Field::Start);
        assert_eq!(Field::Indicators.next(), Field::Ticker);
        assert_eq!(Field::Ticker.previous(), Field::Indicators);
    }

    #[test]
    fn typing_filters_by_field() {
        let mut state = state();
        for c in "aapl ".chars() {
            state.type_char(c);
        }
        assert_eq!(state.input.ticker, "AAPL");

        state.focus = Field::Horizon;
        for c in "3x0".chars() {
            state.type_char(c);
        }
        assert_eq!(state.input.horizon, "30");
        state.backspace();
        assert_eq!(state.input.horizon, "3");
    }

    #[test]
    fn indicators_toggle_by_number() {
        let mut state = state();
        state.toggle_indicator(1);
        state.toggle_indicator(4);
        assert!(state.input.indicators.contains(&Indicator::Sma));
        assert!(state.input.indicators.contains(&Indicator::Rsi));

        state.toggle_indicator(1);
        state.toggle_indicator(9);
        assert_eq!(state.input.indicators.len(), 1);
    }

    #[test]
    fn activity_log_is_bounded() {
        let mut state = state();
        for i in 0..MAX_ACTIVITY_LOGS + 5 {
            state.add_to_activity_log(Event::from(crate::dashboard::Notice::info(i.to_string())));
        }
        assert_eq!(state.activity_logs.len(), MAX_ACTIVITY_LOGS);
        assert_eq!(state.activity_logs.front().unwrap().msg, "5");
    }
}
