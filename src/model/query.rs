//! Query parameters collected from the form and their validation.

use crate::consts::cli_consts::query;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;

/// Indicator families the user can overlay on the charts.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    clap::ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
pub enum Indicator {
    /// Simple moving averages (20 and 50 days).
    Sma,
    /// Exponential moving averages (12 and 26 days).
    Ema,
    /// Bollinger bands.
    Boll,
    /// Relative strength index.
    Rsi,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a ticker")]
    EmptySymbol,

    #[error("Please enter a valid start date")]
    InvalidStart,

    #[error("Please enter a valid end date")]
    InvalidEnd,

    #[error("Start date must not be after end date")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error(
        "Forecast horizon must be between {min} and {max} days",
        min = query::MIN_HORIZON,
        max = query::MAX_HORIZON
    )]
    InvalidHorizon,
}

/// Raw, unvalidated form values as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInput {
    pub ticker: String,
    pub start: String,
    pub end: String,
    pub horizon: String,
    pub indicators: BTreeSet<Indicator>,
}

/// A validated request for market data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub horizon: u32,
    pub indicators: BTreeSet<Indicator>,
}

impl QueryParams {
    /// Validates form input. An empty end date means `today`.
    pub fn parse(input: &QueryInput, today: NaiveDate) -> Result<Self, ValidationError> {
        let symbol = input.ticker.trim();
        if symbol.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let start = parse_date(&input.start).ok_or(ValidationError::InvalidStart)?;
        let end = if input.end.trim().is_empty() {
            today
        } else {
            parse_date(&input.end).ok_or(ValidationError::InvalidEnd)?
        };
        if start > end {
            return Err(ValidationError::InvertedRange { start, end });
        }

        let horizon = if input.horizon.trim().is_empty() {
            query::DEFAULT_HORIZON
        } else {
            input
                .horizon
                .trim()
                .parse::<u32>()
                .map_err(|_| ValidationError::InvalidHorizon)?
        };
        if !(query::MIN_HORIZON..=query::MAX_HORIZON).contains(&horizon) {
            return Err(ValidationError::InvalidHorizon);
        }

        Ok(Self {
            symbol: symbol.to_string(),
            start,
            end,
            horizon,
            indicators: input.indicators.clone(),
        })
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), query::DATE_FORMAT).ok()
}
