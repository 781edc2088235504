//! Backend JSON shapes and their conversion into the canonical model.
//!
//! Day-level fields are PascalCase (`Close`, `SMA_20`, ...) while envelope and metadata
//! keys are snake_case. Both conventions stop here.

use super::market::{
    CorrelationMatrix, ForecastPoint, Meta, PricePoint, ResponsePayload, Statistics,
};
use super::query::QueryParams;
use crate::consts::cli_consts::query::DATE_FORMAT;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("response has no historical series")]
    MissingSeries,

    #[error("response metadata has no symbol")]
    MissingSymbol,

    #[error("invalid date {0:?}")]
    InvalidDate(String),

    #[error("series is not in ascending date order ({previous} then {next})")]
    Unordered { previous: NaiveDate, next: NaiveDate },

    #[error("forecast starts at {first}, not after the last historical date {last}")]
    ForecastOverlap { last: NaiveDate, first: NaiveDate },

    #[error("correlation matrix is not square")]
    NonSquareMatrix,
}

#[derive(Debug, Deserialize)]
pub struct WireResponse {
    pub meta: WireMeta,
    // Some deployments send the series twice, under both keys.
    #[serde(default)]
    pub data: Option<Vec<WireDay>>,
    #[serde(default)]
    pub candles: Option<Vec<WireDay>>,
    #[serde(default)]
    pub future: Vec<WireForecast>,
    #[serde(default)]
    pub statistics: Option<WireStatistics>,
}

#[derive(Debug, Deserialize)]
pub struct WireMeta {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub horizon: u32,
}

#[derive(Debug, Deserialize)]
pub struct WireDay {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
    #[serde(rename = "SMA_20", default)]
    pub sma_20: Option<f64>,
    #[serde(rename = "SMA_50", default)]
    pub sma_50: Option<f64>,
    #[serde(rename = "EMA_12", default)]
    pub ema_12: Option<f64>,
    #[serde(rename = "EMA_26", default)]
    pub ema_26: Option<f64>,
    #[serde(rename = "Upper_Band", default)]
    pub upper_band: Option<f64>,
    #[serde(rename = "Lower_Band", default)]
    pub lower_band: Option<f64>,
    #[serde(rename = "RSI", default)]
    pub rsi: Option<f64>,
    #[serde(rename = "MACD", default)]
    pub macd: Option<f64>,
    #[serde(rename = "MACD_Signal", default)]
    pub macd_signal: Option<f64>,
    #[serde(rename = "Pred", default)]
    pub pred: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct WireForecast {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Pred")]
    pub pred: f64,
}

#[derive(Debug, Deserialize)]
pub struct WireStatistics {
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default, alias = "annualizedReturn")]
    pub annualized_return: Option<f64>,
    #[serde(default, alias = "correlationMatrix")]
    pub correlation_matrix: Option<WireCorrelation>,
}

#[derive(Debug, Deserialize)]
pub struct WireCorrelation {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: Option<String>,
}

/// Extracts the `error` field from a JSON error body, if there is one.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<WireError>(body)
        .ok()
        .and_then(|e| e.error)
}

/// Builds the JSON request body. `symbol_field` is the deployment's name for the ticker.
pub fn request_body(params: &QueryParams, symbol_field: &str) -> Value {
    let mut body = Map::new();
    body.insert(symbol_field.to_string(), json!(params.symbol));
    body.insert(
        "start".to_string(),
        json!(params.start.format(DATE_FORMAT).to_string()),
    );
    body.insert(
        "end".to_string(),
        json!(params.end.format(DATE_FORMAT).to_string()),
    );
    body.insert("horizon".to_string(), json!(params.horizon));
    if !params.indicators.is_empty() {
        let names: Vec<String> = params.indicators.iter().map(|i| i.to_string()).collect();
        body.insert("indicators".to_string(), json!(names));
    }
    Value::Object(body)
}

fn parse_date(value: &str) -> Result<NaiveDate, PayloadError> {
    // Some backends send full timestamps; only the day matters.
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|_| PayloadError::InvalidDate(value.to_string()))
}

impl TryFrom<WireDay> for PricePoint {
    type Error = PayloadError;

    fn try_from(day: WireDay) -> Result<Self, Self::Error> {
        Ok(PricePoint {
            date: parse_date(&day.date)?,
            open: day.open,
            high: day.high,
            low: day.low,
            close: day.close,
            volume: day.volume,
            sma20: day.sma_20,
            sma50: day.sma_50,
            ema12: day.ema_12,
            ema26: day.ema_26,
            upper_band: day.upper_band,
            lower_band: day.lower_band,
            rsi: day.rsi,
            macd: day.macd,
            macd_signal: day.macd_signal,
            predicted_close: day.pred,
        })
    }
}

impl TryFrom<WireForecast> for ForecastPoint {
    type Error = PayloadError;

    fn try_from(point: WireForecast) -> Result<Self, Self::Error> {
        Ok(ForecastPoint {
            date: parse_date(&point.date)?,
            predicted_close: point.pred,
        })
    }
}

impl TryFrom<WireStatistics> for Statistics {
    type Error = PayloadError;

    fn try_from(stats: WireStatistics) -> Result<Self, Self::Error> {
        let correlation_matrix = match stats.correlation_matrix {
            Some(matrix) => {
                let n = matrix.labels.len();
                if matrix.values.len() != n || matrix.values.iter().any(|row| row.len() != n) {
                    return Err(PayloadError::NonSquareMatrix);
                }
                Some(CorrelationMatrix {
                    labels: matrix.labels,
                    values: matrix.values,
                })
            }
            None => None,
        };
        Ok(Statistics {
            volatility: stats.volatility,
            annualized_return: stats.annualized_return,
            correlation_matrix,
        })
    }
}

fn ensure_ascending<'a>(dates: impl Iterator<Item = &'a NaiveDate>) -> Result<(), PayloadError> {
    let mut previous: Option<NaiveDate> = None;
    for &date in dates {
        if let Some(prev) = previous {
            if date <= prev {
                return Err(PayloadError::Unordered {
                    previous: prev,
                    next: date,
                });
            }
        }
        previous = Some(date);
    }
    Ok(())
}

impl TryFrom<WireResponse> for ResponsePayload {
    type Error = PayloadError;

    fn try_from(wire: WireResponse) -> Result<Self, Self::Error> {
        let days = wire
            .data
            .or(wire.candles)
            .ok_or(PayloadError::MissingSeries)?;
        let symbol = wire
            .meta
            .symbol
            .or(wire.meta.ticker)
            .ok_or(PayloadError::MissingSymbol)?;

        let series = days
            .into_iter()
            .map(PricePoint::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_ascending(series.iter().map(|p| &p.date))?;

        let forecast = wire
            .future
            .into_iter()
            .map(ForecastPoint::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_ascending(forecast.iter().map(|p| &p.date))?;

        if let (Some(last), Some(first)) = (series.last(), forecast.first()) {
            if first.date <= last.date {
                return Err(PayloadError::ForecastOverlap {
                    last: last.date,
                    first: first.date,
                });
            }
        }

        let statistics = wire.statistics.map(Statistics::try_from).transpose()?;

        Ok(ResponsePayload {
            meta: Meta {
                symbol,
                name: wire.meta.name,
                horizon: wire.meta.horizon,
            },
            series,
            forecast,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::query::Indicator;
    use std::collections::BTreeSet;

    fn parse(body: Value) -> Result<ResponsePayload, PayloadError> {
        let wire: WireResponse = serde_json::from_value(body).expect("wire shape");
        ResponsePayload::try_from(wire)
    }

    fn day(date: &str, close: f64) -> Value {
        json!({
            "Date": date, "Open": close, "High": close + 1.0, "Low": close - 1.0,
            "Close": close, "Volume": 1000, "SMA_20": null, "RSI": 55.5, "Pred": close + 0.5
        })
    }

    #[test]
    fn converts_wire_fields_into_canonical_points() {
        let payload = parse(json!({
            "status": "ok",
            "meta": {"symbol": "AAPL", "name": "AAPL Stock", "horizon": 2},
            "data": [day("2023-01-02", 10.0), day("2023-01-03", 11.0)],
            "future": [{"Date": "2023-01-04", "Pred": 12.0}, {"Date": "2023-01-05", "Pred": 13.0}]
        }))
        .unwrap();

        assert_eq!(payload.meta.symbol, "AAPL");
        assert_eq!(payload.series.len(), 2);
        assert_eq!(payload.series[0].rsi, Some(55.5));
        assert_eq!(payload.series[0].sma20, None);
        assert_eq!(payload.series[1].predicted_close, Some(11.5));
        assert_eq!(payload.forecast[1].predicted_close, 13.0);
        assert!(payload.statistics.is_none());
    }

    #[test]
    fn accepts_legacy_keys_and_duplicated_series() {
        let payload = parse(json!({
            "meta": {"ticker": "PETR4.SA", "horizon": 1},
            "candles": [day("2023-01-02", 10.0)],
            "data": [day("2023-01-02", 10.0)],
            "future": []
        }))
        .unwrap();
        assert_eq!(payload.meta.symbol, "PETR4.SA");
        assert_eq!(payload.series.len(), 1);
    }

    #[test]
    fn rejects_unordered_series() {
        let result = parse(json!({
            "meta": {"symbol": "AAPL", "horizon": 1},
            "data": [day("2023-01-03", 10.0), day("2023-01-02", 11.0)]
        }));
        assert!(matches!(result, Err(PayloadError::Unordered { .. })));
    }

    #[test]
    fn rejects_forecast_inside_history() {
        let result = parse(json!({
            "meta": {"symbol": "AAPL", "horizon": 1},
            "data": [day("2023-01-02", 10.0), day("2023-01-03", 11.0)],
            "future": [{"Date": "2023-01-03", "Pred": 12.0}]
        }));
        assert!(matches!(result, Err(PayloadError::ForecastOverlap { .. })));
    }

    #[test]
    fn rejects_missing_series_and_bad_dates() {
        let missing = parse(json!({"meta": {"symbol": "AAPL", "horizon": 1}}));
        assert_eq!(missing, Err(PayloadError::MissingSeries));

        let bad = parse(json!({
            "meta": {"symbol": "AAPL", "horizon": 1},
            "data": [day("yesterday", 10.0)]
        }));
        assert_eq!(bad, Err(PayloadError::InvalidDate("yesterday".to_string())));
    }

    #[test]
    fn parses_statistics_with_either_key_style() {
        let payload = parse(json!({
            "meta": {"symbol": "AAPL", "horizon": 1},
            "data": [day("2023-01-02T00:00:00", 10.0)],
            "statistics": {
                "volatility": 0.25,
                "annualizedReturn": 0.12,
                "correlation_matrix": {"labels": ["Close", "Volume"], "values": [[1.0, 0.3], [0.3, 1.0]]}
            }
        }))
        .unwrap();
        let stats = payload.statistics.unwrap();
        assert_eq!(stats.volatility, Some(0.25));
        assert_eq!(stats.annualized_return, Some(0.12));
        assert_eq!(stats.correlation_matrix.unwrap().labels.len(), 2);
    }

    #[test]
    fn rejects_ragged_correlation_matrix() {
        let result = parse(json!({
            "meta": {"symbol": "AAPL", "horizon": 1},
            "data": [day("2023-01-02", 10.0)],
            "statistics": {"correlation_matrix": {"labels": ["a", "b"], "values": [[1.0], [0.3, 1.0]]}}
        }));
        assert_eq!(result, Err(PayloadError::NonSquareMatrix));
    }

    #[test]
    fn request_body_uses_deployment_symbol_field() {
        let params = QueryParams {
            symbol: "AAPL".to_string(),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            horizon: 30,
            indicators: BTreeSet::from([Indicator::Rsi, Indicator::Sma]),
        };

        let body = request_body(&params, "ticker");
        assert_eq!(
            body,
            json!({
                "ticker": "AAPL",
                "start": "2023-01-01",
                "end": "2023-06-01",
                "horizon": 30,
                "indicators": ["sma", "rsi"]
            })
        );
    }

    #[test]
    fn request_body_omits_empty_indicator_list() {
        let params = QueryParams {
            symbol: "AAPL".to_string(),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            horizon: 30,
            indicators: BTreeSet::new(),
        };
        let body = request_body(&params, "symbol");
        assert!(body.get("indicators").is_none());
        assert_eq!(body["symbol"], "AAPL");
    }

    #[test]
    fn error_message_reads_error_field_only_from_json() {
        assert_eq!(
            error_message(r#"{"error": "ticker not found"}"#),
            Some("ticker not found".to_string())
        );
        assert_eq!(error_message(r#"{"status": "failed"}"#), None);
        assert_eq!(error_message("<html>502 Bad Gateway</html>"), None);
    }
}
