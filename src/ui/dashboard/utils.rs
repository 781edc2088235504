//! Dashboard utility functions
//!
//! Contains helper functions used across dashboard components

use crate::theme::ThemePreference;
use ratatui::prelude::Color;

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
}

pub fn palette(theme: ThemePreference) -> Palette {
    match theme {
        ThemePreference::Dark => Palette {
            background: Color::Rgb(16, 20, 24),
            text: Color::Gray,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            border: Color::Cyan,
        },
        ThemePreference::Light => Palette {
            background: Color::Rgb(245, 246, 248),
            text: Color::Black,
            muted: Color::Gray,
            accent: Color::Blue,
            border: Color::Blue,
        },
    }
}

/// Parses `#rrggbb`; anything else falls back.
pub fn parse_hex_color(value: &str, fallback: Color) -> Color {
    let Some(hex) = value.strip_prefix('#') else {
        return fallback;
    };
    if hex.len() != 6 || !hex.is_ascii() {
        return fallback;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => fallback,
    }
}

/// Format compact timestamp with date and time from full timestamp
pub fn format_compact_timestamp(timestamp: &str) -> String {
    // Extract from "YYYY-MM-DD HH:MM:SS" format
    if let Some(date_part) = timestamp.split(' ').next() {
        if let Some(time_part) = timestamp.split(' ').nth(1) {
            // Extract MM-DD from date and HH:MM from time
            if let Some(month_day) = date_part.get(5..10) {
                if let Some(hour_min) = time_part.get(0..5) {
                    return format!("{} {}", month_day, hour_min);
                }
            }
        }
    }
    // Fallback to original timestamp if parsing fails
    timestamp.to_string()
}
