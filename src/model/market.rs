//! Canonical market data model.
//!
//! Everything past the wire boundary works with these types; field names here never
//! follow the backend's JSON conventions.

use chrono::NaiveDate;

/// One trading day with the indicator values the backend computed for it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    /// In-sample model output for this day.
    pub predicted_close: Option<f64>,
}

/// Model output for a day after the last historical point.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub symbol: String,
    pub name: Option<String>,
    pub horizon: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    pub volatility: Option<f64>,
    pub annualized_return: Option<f64>,
    pub correlation_matrix: Option<CorrelationMatrix>,
}

/// Square matrix with one label per row/column.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// A complete, validated backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePayload {
    pub meta: Meta,
    /// Historical points, strictly ascending by date.
    pub series: Vec<PricePoint>,
    /// Future points, strictly ascending and after the last historical date.
    pub forecast: Vec<ForecastPoint>,
    pub statistics: Option<Statistics>,
}

impl ResponsePayload {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series.iter().map(|p| p.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.series.iter().map(|p| p.close).collect()
    }
}
