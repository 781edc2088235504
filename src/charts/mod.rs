//! Chart construction, independent of where the charts are drawn.

mod builder;
pub mod trace;

pub use builder::{build_charts, continuous_prediction};
pub use trace::{Layout, Trace};

/// Display containers, one per chart.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ChartId {
    Price,
    Volume,
    Rsi,
    Macd,
    Forecast,
    Statistics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub id: ChartId,
    pub traces: Vec<Trace>,
    pub layout: Layout,
}
