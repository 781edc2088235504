//! Turns a response payload into one chart per indicator family.

use super::trace::{
    Axis, BarTrace, CandlestickTrace, Colors, Dash, HeatmapTrace, Layout, Line, Marker, Mode,
    ScatterTrace, Shape, Trace,
};
use super::{Chart, ChartId};
use crate::consts::cli_consts::query::DATE_FORMAT;
use crate::model::{Indicator, PricePoint, ResponsePayload, Statistics};
use crate::theme::ThemePreference;
use chrono::NaiveDate;
use std::collections::BTreeSet;

const UP: &str = "#10b981";
const DOWN: &str = "#ef4444";
const PRICE: &str = "#6366f1";
const PREDICTION: &str = "#f59e0b";
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;

/// Builds every chart for a payload, in display order.
pub fn build_charts(
    payload: &ResponsePayload,
    selected: &BTreeSet<Indicator>,
    theme: ThemePreference,
) -> Vec<Chart> {
    let mut charts = vec![
        price_chart(payload, selected, theme),
        volume_chart(payload, theme),
        rsi_chart(payload, selected, theme),
        macd_chart(payload, theme),
        forecast_chart(payload, theme),
    ];
    if let Some(chart) = payload
        .statistics
        .as_ref()
        .and_then(|stats| statistics_chart(stats, theme))
    {
        charts.push(chart);
    }
    charts
}

fn labels(dates: impl IntoIterator<Item = NaiveDate>) -> Vec<String> {
    dates
        .into_iter()
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect()
}

fn column(series: &[PricePoint], field: impl Fn(&PricePoint) -> Option<f64>) -> Vec<Option<f64>> {
    series.iter().map(field).collect()
}

fn line_trace(name: &str, x: Vec<String>, y: Vec<Option<f64>>, line: Line) -> Trace {
    Trace::Scatter(ScatterTrace {
        name: name.to_string(),
        x,
        y,
        mode: Mode::Lines,
        line,
        marker: None,
    })
}

fn layout(title: String, y_title: &str, theme: ThemePreference, height: u32) -> Layout {
    Layout {
        title,
        template: theme.plotly_template(),
        yaxis: Axis {
            title: y_title.to_string(),
            range: None,
        },
        shapes: Vec::new(),
        height,
    }
}

fn price_chart(
    payload: &ResponsePayload,
    selected: &BTreeSet<Indicator>,
    theme: ThemePreference,
) -> Chart {
    let series = &payload.series;
    let x = labels(payload.dates());

    let mut traces = vec![
        Trace::Candlestick(CandlestickTrace {
            name: payload.meta.symbol.clone(),
            x: x.clone(),
            open: series.iter().map(|p| p.open).collect(),
            high: series.iter().map(|p| p.high).collect(),
            low: series.iter().map(|p| p.low).collect(),
            close: payload.closes(),
        }),
        line_trace(
            "Model fit",
            x.clone(),
            column(series, |p| p.predicted_close),
            Line::new(PREDICTION, Dash::Dot),
        ),
    ];

    if selected.contains(&Indicator::Sma) {
        traces.push(line_trace(
            "SMA20",
            x.clone(),
            column(series, |p| p.sma20),
            Line::new("#3b82f6", Dash::Solid),
        ));
        traces.push(line_trace(
            "SMA50",
            x.clone(),
            column(series, |p| p.sma50),
            Line::new("#8b5cf6", Dash::Solid),
        ));
    }
    if selected.contains(&Indicator::Ema) {
        traces.push(line_trace(
            "EMA12",
            x.clone(),
            column(series, |p| p.ema12),
            Line::new("#06b6d4", Dash::Solid),
        ));
        traces.push(line_trace(
            "EMA26",
            x.clone(),
            column(series, |p| p.ema26),
            Line::new("#ec4899", Dash::Solid),
        ));
    }
    if selected.contains(&Indicator::Boll) {
        traces.push(line_trace(
            "Upper Band",
            x.clone(),
            column(series, |p| p.upper_band),
            Line::new("#a1a1aa", Dash::Dot),
        ));
        traces.push(line_trace(
            "Lower Band",
            x,
            column(series, |p| p.lower_band),
            Line::new("#a1a1aa", Dash::Dot),
        ));
    }

    Chart {
        id: ChartId::Price,
        traces,
        layout: layout(
            format!("{} - Price", payload.meta.symbol),
            "Price",
            theme,
            450,
        ),
    }
}

/// Green when the close did not fall versus the previous day, red otherwise.
fn volume_colors(series: &[PricePoint]) -> Vec<String> {
    series
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let up = i == 0 || p.close >= series[i - 1].close;
            if up { UP } else { DOWN }.to_string()
        })
        .collect()
}

fn volume_chart(payload: &ResponsePayload, theme: ThemePreference) -> Chart {
    let series = &payload.series;
    Chart {
        id: ChartId::Volume,
        traces: vec![Trace::Bar(BarTrace {
            name: "Volume".to_string(),
            x: labels(payload.dates()),
            y: series.iter().map(|p| Some(p.volume as f64)).collect(),
            marker: Marker {
                color: Colors::PerPoint(volume_colors(series)),
            },
        })],
        layout: layout("Trading Volume".to_string(), "Volume", theme, 400),
    }
}

/// Always rendered; the title says whether the user asked for it.
fn rsi_chart(
    payload: &ResponsePayload,
    selected: &BTreeSet<Indicator>,
    theme: ThemePreference,
) -> Chart {
    let title = if selected.contains(&Indicator::Rsi) {
        "RSI"
    } else {
        "RSI (not selected)"
    };

    let mut chart_layout = layout(title.to_string(), "RSI", theme, 400);
    chart_layout.yaxis.range = Some([0.0, 100.0]);
    chart_layout.shapes = vec![
        Shape::horizontal(RSI_OVERBOUGHT, Line::new(DOWN, Dash::Dash).width(2.0)),
        Shape::horizontal(RSI_OVERSOLD, Line::new(UP, Dash::Dash).width(2.0)),
    ];

    Chart {
        id: ChartId::Rsi,
        traces: vec![line_trace(
            "RSI",
            labels(payload.dates()),
            column(&payload.series, |p| p.rsi),
            Line::new("#8b5cf6", Dash::Solid).width(2.0),
        )],
        layout: chart_layout,
    }
}

fn macd_chart(payload: &ResponsePayload, theme: ThemePreference) -> Chart {
    let series = &payload.series;
    let x = labels(payload.dates());

    // Gaps count as zero so the histogram keeps one bar per day.
    let histogram: Vec<f64> = series
        .iter()
        .map(|p| p.macd.unwrap_or(0.0) - p.macd_signal.unwrap_or(0.0))
        .collect();
    let colors = histogram
        .iter()
        .map(|v| if *v >= 0.0 { UP } else { DOWN }.to_string())
        .collect();

    Chart {
        id: ChartId::Macd,
        traces: vec![
            Trace::Bar(BarTrace {
                name: "Histogram".to_string(),
                x: x.clone(),
                y: histogram.into_iter().map(Some).collect(),
                marker: Marker {
                    color: Colors::PerPoint(colors),
                },
            }),
            line_trace(
                "MACD",
                x.clone(),
                column(series, |p| p.macd),
                Line::new("#3b82f6", Dash::Solid).width(2.0),
            ),
            line_trace(
                "Signal",
                x,
                column(series, |p| p.macd_signal),
                Line::new(PREDICTION, Dash::Solid).width(2.0),
            ),
        ],
        layout: layout("MACD".to_string(), "MACD", theme, 400),
    }
}

/// In-sample predictions followed by future predictions, as one continuous curve.
pub fn continuous_prediction(payload: &ResponsePayload) -> (Vec<String>, Vec<Option<f64>>) {
    let x = labels(
        payload
            .series
            .iter()
            .map(|p| p.date)
            .chain(payload.forecast.iter().map(|f| f.date)),
    );
    let y = payload
        .series
        .iter()
        .map(|p| p.predicted_close)
        .chain(payload.forecast.iter().map(|f| Some(f.predicted_close)))
        .collect();
    (x, y)
}

fn forecast_chart(payload: &ResponsePayload, theme: ThemePreference) -> Chart {
    let (prediction_x, prediction_y) = continuous_prediction(payload);

    Chart {
        id: ChartId::Forecast,
        traces: vec![
            line_trace(
                "Real",
                labels(payload.dates()),
                payload.closes().into_iter().map(Some).collect(),
                Line::new(PRICE, Dash::Solid).width(3.0),
            ),
            line_trace(
                "Prediction (in-sample + future)",
                prediction_x,
                prediction_y,
                Line::new(UP, Dash::Solid).width(2.0),
            ),
            Trace::Scatter(ScatterTrace {
                name: "Future prediction".to_string(),
                x: labels(payload.forecast.iter().map(|f| f.date)),
                y: payload
                    .forecast
                    .iter()
                    .map(|f| Some(f.predicted_close))
                    .collect(),
                mode: Mode::LinesMarkers,
                line: Line::new(DOWN, Dash::Dot).width(3.0),
                marker: Some(Marker {
                    color: Colors::Single(DOWN.to_string()),
                }),
            }),
        ],
        layout: layout(
            format!("Forecast for {} days", payload.meta.horizon),
            "Price",
            theme,
            450,
        ),
    }
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Only drawn when the backend sent a correlation matrix.
fn statistics_chart(stats: &Statistics, theme: ThemePreference) -> Option<Chart> {
    let matrix = stats.correlation_matrix.as_ref()?;
    Some(Chart {
        id: ChartId::Statistics,
        traces: vec![Trace::Heatmap(HeatmapTrace {
            name: "Correlation".to_string(),
            x: matrix.labels.clone(),
            y: matrix.labels.clone(),
            z: matrix.values.clone(),
            zmin: -1.0,
            zmax: 1.0,
        })],
        layout: layout(
            format!(
                "Correlation - volatility {} / annualized return {}",
                percent(stats.volatility),
                percent(stats.annualized_return)
            ),
            "",
            theme,
            450,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrelationMatrix, ForecastPoint, Meta};
    use chrono::Duration;

    fn payload(days: usize, future: usize) -> ResponsePayload {
        let first = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let series: Vec<PricePoint> = (0..days)
            .map(|i| PricePoint {
                date: first + Duration::days(i as i64),
                open: 100.0,
                high: 102.0,
                low: 99.0,
                close: 100.0 + (i % 3) as f64 - 1.0,
                volume: 1_000 + i as u64,
                rsi: Some(40.0 + i as f64),
                macd: if i == 0 { None } else { Some(0.5) },
                macd_signal: Some(0.2),
                predicted_close: Some(100.5 + i as f64),
                ..PricePoint::default()
            })
            .collect();
        let last = series.last().map(|p| p.date).unwrap_or(first);
        let forecast = (1..=future)
            .map(|i| ForecastPoint {
                date: last + Duration::days(i as i64),
                predicted_close: 200.0 + i as f64,
            })
            .collect();
        ResponsePayload {
            meta: Meta {
                symbol: "AAPL".to_string(),
                name: None,
                horizon: future as u32,
            },
            series,
            forecast,
            statistics: None,
        }
    }

    fn chart(charts: &[Chart], id: ChartId) -> &Chart {
        charts.iter().find(|c| c.id == id).expect("chart present")
    }

    fn trace<'a>(chart: &'a Chart, name: &str) -> &'a Trace {
        chart
            .traces
            .iter()
            .find(|t| t.name() == name)
            .expect("trace present")
    }

    #[test]
    fn scenario_ten_days_thirty_forecast() {
        let payload = payload(10, 30);
        let charts = build_charts(&payload, &BTreeSet::new(), ThemePreference::Dark);

        let forecast = chart(&charts, ChartId::Forecast);
        assert_eq!(trace(forecast, "Prediction (in-sample + future)").len(), 40);
        assert_eq!(trace(forecast, "Future prediction").len(), 30);
        assert_eq!(forecast.layout.title, "Forecast for 30 days");

        let volume = chart(&charts, ChartId::Volume);
        assert_eq!(volume.traces.len(), 1);
        assert_eq!(volume.traces[0].len(), 10);

        assert!(charts.iter().any(|c| c.id == ChartId::Rsi));
    }

    #[test]
    fn continuous_prediction_keeps_order_and_sources() {
        let payload = payload(4, 3);
        let (x, y) = continuous_prediction(&payload);

        assert_eq!(x.len(), 7);
        assert_eq!(y.len(), 7);
        for (i, point) in payload.series.iter().enumerate() {
            assert_eq!(y[i], point.predicted_close);
        }
        for (j, point) in payload.forecast.iter().enumerate() {
            assert_eq!(y[4 + j], Some(point.predicted_close));
        }
        let mut sorted = x.clone();
        sorted.sort();
        assert_eq!(x, sorted);
    }

    #[test]
    fn overlays_follow_the_selection() {
        let payload = payload(5, 1);

        let none = build_charts(&payload, &BTreeSet::new(), ThemePreference::Dark);
        let price = chart(&none, ChartId::Price);
        let names: Vec<&str> = price.traces.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["AAPL", "Model fit"]);

        let all = BTreeSet::from([Indicator::Sma, Indicator::Ema, Indicator::Boll]);
        let charts = build_charts(&payload, &all, ThemePreference::Dark);
        let names: Vec<&str> = chart(&charts, ChartId::Price)
            .traces
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "AAPL",
                "Model fit",
                "SMA20",
                "SMA50",
                "EMA12",
                "EMA26",
                "Upper Band",
                "Lower Band"
            ]
        );
    }

    #[test]
    fn rsi_is_retitled_when_not_selected() {
        let payload = payload(5, 1);

        let hidden = build_charts(&payload, &BTreeSet::new(), ThemePreference::Dark);
        let rsi = chart(&hidden, ChartId::Rsi);
        assert_eq!(rsi.layout.title, "RSI (not selected)");
        assert_eq!(rsi.layout.yaxis.range, Some([0.0, 100.0]));
        assert_eq!(rsi.traces[0].len(), 5);

        let shown = build_charts(
            &payload,
            &BTreeSet::from([Indicator::Rsi]),
            ThemePreference::Dark,
        );
        assert_eq!(chart(&shown, ChartId::Rsi).layout.title, "RSI");
    }

    #[test]
    fn macd_histogram_treats_gaps_as_zero() {
        let payload = payload(3, 1);
        let charts = build_charts(&payload, &BTreeSet::new(), ThemePreference::Dark);
        let histogram = trace(chart(&charts, ChartId::Macd), "Histogram");
        let values = histogram.y_values();
        assert_eq!(values[0], Some(-0.2));
        assert!((values[1].unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn volume_bars_colored_against_previous_close() {
        let payload = payload(3, 0);
        // closes: 99, 100, 101
        assert_eq!(volume_colors(&payload.series), vec![UP, UP, UP]);

        let mut falling = payload.series.clone();
        falling[1].close = 90.0;
        assert_eq!(volume_colors(&falling), vec![UP, DOWN, UP]);
    }

    #[test]
    fn statistics_chart_only_with_matrix() {
        let mut payload = payload(3, 1);
        payload.statistics = Some(Statistics {
            volatility: Some(0.2),
            annualized_return: None,
            correlation_matrix: None,
        });
        let charts = build_charts(&payload, &BTreeSet::new(), ThemePreference::Light);
        assert!(!charts.iter().any(|c| c.id == ChartId::Statistics));

        payload.statistics = Some(Statistics {
            volatility: Some(0.2),
            annualized_return: Some(0.1),
            correlation_matrix: Some(CorrelationMatrix {
                labels: vec!["Close".to_string(), "Volume".to_string()],
                values: vec![vec![1.0, -0.4], vec![-0.4, 1.0]],
            }),
        });
        let charts = build_charts(&payload, &BTreeSet::new(), ThemePreference::Light);
        let stats = chart(&charts, ChartId::Statistics);
        assert_eq!(
            stats.layout.title,
            "Correlation - volatility 20.00% / annualized return 10.00%"
        );
        assert_eq!(stats.layout.template, "plotly_white");
    }

    #[test]
    fn empty_payload_still_builds_every_chart() {
        let payload = payload(0, 0);
        let charts = build_charts(&payload, &BTreeSet::new(), ThemePreference::Dark);
        assert_eq!(charts.len(), 5);
        assert!(charts.iter().all(|c| c.traces.iter().all(|t| t.is_empty())));
    }
}
