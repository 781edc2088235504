//! Plotly-shaped trace and layout types.
//!
//! These serialize to the JSON Plotly.js expects, so a headless surface can write them
//! out as-is, and the terminal surface reads the same values back.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Bar(BarTrace),
    Candlestick(CandlestickTrace),
    Heatmap(HeatmapTrace),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Scatter(t) => &t.name,
            Trace::Bar(t) => &t.name,
            Trace::Candlestick(t) => &t.name,
            Trace::Heatmap(t) => &t.name,
        }
    }

    /// The x labels of the trace, one per point.
    pub fn x(&self) -> &[String] {
        match self {
            Trace::Scatter(t) => &t.x,
            Trace::Bar(t) => &t.x,
            Trace::Candlestick(t) => &t.x,
            Trace::Heatmap(t) => &t.x,
        }
    }

    /// One y value per x label; candlesticks report their close.
    pub fn y_values(&self) -> Vec<Option<f64>> {
        match self {
            Trace::Scatter(t) => t.y.clone(),
            Trace::Bar(t) => t.y.clone(),
            Trace::Candlestick(t) => t.close.iter().copied().map(Some).collect(),
            Trace::Heatmap(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.x().len()
    }

    pub fn is_empty(&self) -> bool {
        self.x().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dot,
    Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    pub dash: Dash,
}

impl Line {
    pub fn new(color: &str, dash: Dash) -> Self {
        Self {
            color: Some(color.to_string()),
            width: None,
            dash,
        }
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colors {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: Colors,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub mode: Mode,
    pub line: Line,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickTrace {
    pub name: String,
    pub x: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub z: Vec<Vec<f64>>,
    pub zmin: f64,
    pub zmax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

/// A horizontal guide line across the whole x range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: Line,
}

impl Shape {
    pub fn horizontal(y: f64, line: Line) -> Self {
        Self {
            kind: "line",
            xref: "paper",
            x0: 0.0,
            x1: 1.0,
            y0: y,
            y1: y,
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub template: &'static str,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    pub height: u32,
}
