//! Chart panes
//!
//! Draws what the dashboard client rendered onto the terminal surface with ratatui
//! `Chart` widgets. Dates become x positions in label order.

use super::super::state::DashboardState;
use super::super::utils::{Palette, palette, parse_hex_color};
use crate::charts::trace::Colors;
use crate::charts::{ChartId, Trace};
use crate::surface::RenderedChart;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::prelude::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{
    Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph,
};
use std::collections::{BTreeMap, BTreeSet};

/// Panes shown in the terminal, in layout order.
pub const PANES: [ChartId; 5] = [
    ChartId::Price,
    ChartId::Volume,
    ChartId::Rsi,
    ChartId::Macd,
    ChartId::Forecast,
];

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    pub color: Color,
    pub graph: GraphType,
}

/// Everything needed to draw one chart pane.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneData {
    pub title: String,
    pub series: Vec<Series>,
    pub labels: Vec<String>,
    pub y_bounds: [f64; 2],
}

fn trace_color(trace: &Trace, fallback: Color) -> Color {
    let hex = match trace {
        Trace::Scatter(t) => t.line.color.as_deref(),
        Trace::Bar(t) => match &t.marker.color {
            Colors::Single(c) => Some(c.as_str()),
            Colors::PerPoint(c) => c.first().map(String::as_str),
        },
        Trace::Candlestick(_) | Trace::Heatmap(_) => None,
    };
    hex.map(|h| parse_hex_color(h, fallback))
        .unwrap_or(fallback)
}

fn y_bounds(series: &[Series]) -> [f64; 2] {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.1))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((max - min) * 0.05).max(f64::EPSILON.max(max.abs() * 0.01));
    [min - pad, max + pad]
}

pub fn pane_data(chart: &RenderedChart, colors: &Palette) -> PaneData {
    // Date labels sort chronologically as strings.
    let labels: Vec<String> = chart
        .traces
        .iter()
        .flat_map(|t| t.x().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let position: BTreeMap<&str, f64> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i as f64))
        .collect();

    let mut series: Vec<Series> = chart
        .traces
        .iter()
        .filter(|t| !matches!(t, Trace::Heatmap(_)))
        .map(|trace| Series {
            name: trace.name().to_string(),
            points: trace
                .x()
                .iter()
                .zip(trace.y_values())
                .filter_map(|(x, y)| Some((*position.get(x.as_str())?, y?)))
                .collect(),
            color: trace_color(trace, colors.accent),
            graph: match trace {
                Trace::Bar(_) => GraphType::Bar,
                _ => GraphType::Line,
            },
        })
        .collect();

    let last_x = labels.len().saturating_sub(1) as f64;
    for shape in &chart.layout.shapes {
        series.push(Series {
            name: String::new(),
            points: vec![(0.0, shape.y0), (last_x, shape.y1)],
            color: shape
                .line
                .color
                .as_deref()
                .map(|c| parse_hex_color(c, colors.muted))
                .unwrap_or(colors.muted),
            graph: GraphType::Line,
        });
    }

    let y_bounds = chart.layout.yaxis.range.unwrap_or_else(|| y_bounds(&series));
    PaneData {
        title: chart.layout.title.clone(),
        series,
        labels,
        y_bounds,
    }
}

fn format_y(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

fn render_pane(f: &mut Frame, area: Rect, id: ChartId, state: &DashboardState) {
    let colors = palette(state.theme);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors.border));

    let Some(chart) = state.surface.get(id) else {
        let empty = Paragraph::new("No data")
            .alignment(Alignment::Center)
            .style(Style::default().fg(colors.muted))
            .block(block.title(id.to_string().to_uppercase()));
        f.render_widget(empty, area);
        return;
    };

    let data = pane_data(&chart, &colors);
    let datasets: Vec<Dataset> = data
        .series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.name.clone())
                .marker(Marker::Braille)
                .graph_type(s.graph)
                .style(Style::default().fg(s.color))
                .data(&s.points)
        })
        .collect();

    let x_max = data.labels.len().saturating_sub(1).max(1) as f64;
    let x_labels = match (data.labels.first(), data.labels.last()) {
        (Some(first), Some(last)) => vec![first.clone(), last.clone()],
        _ => Vec::new(),
    };
    let [y_min, y_max] = data.y_bounds;

    let widget = Chart::new(datasets)
        .block(block.title(data.title))
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(colors.muted))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(colors.muted))
                .bounds([y_min, y_max])
                .labels(vec![format_y(y_min), format_y(y_max)]),
        );
    f.render_widget(widget, area);
}

pub fn render_charts(f: &mut Frame, areas: &[Rect], state: &DashboardState) {
    for (id, area) in PANES.iter().zip(areas) {
        render_pane(f, *area, *id, state);
    }
}

/// Text rendition of the statistics heatmap: the summary title, then one row per
/// matrix row with two-decimal correlations.
pub fn statistics_lines(chart: &RenderedChart) -> Vec<String> {
    let mut lines = vec![chart.layout.title.clone()];
    for trace in &chart.traces {
        let Trace::Heatmap(heatmap) = trace else {
            continue;
        };
        let width = heatmap.x.iter().map(|l| l.len()).max().unwrap_or(0).max(6);
        lines.push(format!(
            "{:width$} {}",
            "",
            heatmap
                .x
                .iter()
                .map(|l| format!("{:>width$}", l))
                .collect::<Vec<_>>()
                .join(" ")
        ));
        for (label, row) in heatmap.y.iter().zip(&heatmap.z) {
            lines.push(format!(
                "{:width$} {}",
                label,
                row.iter()
                    .map(|v| format!("{:>width$.2}", v))
                    .collect::<Vec<_>>()
                    .join(" ")
            ));
        }
    }
    lines
}

pub fn render_statistics(f: &mut Frame, area: Rect, state: &DashboardState) {
    let colors = palette(state.theme);
    let text = match state.surface.get(ChartId::Statistics) {
        Some(chart) => statistics_lines(&chart).join("\n"),
        None => "No statistics".to_string(),
    };
    let widget = Paragraph::new(text)
        .style(Style::default().fg(colors.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors.border))
                .title("STATISTICS"),
        );
    f.render_widget(widget, area);
}
