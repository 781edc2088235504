//! Request and response data for the analysis backend.

pub mod market;
pub mod query;
pub mod wire;

pub use market::{CorrelationMatrix, ForecastPoint, Meta, PricePoint, ResponsePayload, Statistics};
pub use query::{Indicator, QueryInput, QueryParams, ValidationError};
pub use wire::PayloadError;
