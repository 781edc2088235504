use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Endpoint and field-name conventions of a backend deployment.
///
/// Deployments agree on the payload shape but not on route names or on what the
/// ticker field is called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendProfile {
    /// `POST /data` with a `symbol` field.
    #[default]
    Standard,
    /// `POST /get_data` with a `ticker` field.
    Legacy,
}

impl BackendProfile {
    /// Path of the market data endpoint.
    pub fn data_path(&self) -> &'static str {
        match self {
            BackendProfile::Standard => "/data",
            BackendProfile::Legacy => "/get_data",
        }
    }

    /// Name of the ticker field in data requests.
    pub fn data_symbol_field(&self) -> &'static str {
        match self {
            BackendProfile::Standard => "symbol",
            BackendProfile::Legacy => "ticker",
        }
    }

    /// Path of the spreadsheet endpoint.
    pub fn download_path(&self) -> &'static str {
        "/download"
    }

    /// The download route reads `ticker` on every deployment.
    pub fn download_symbol_field(&self) -> &'static str {
        "ticker"
    }
}

impl FromStr for BackendProfile {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(BackendProfile::Standard),
            "legacy" => Ok(BackendProfile::Legacy),
            _ => Err(()),
        }
    }
}

impl Display for BackendProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendProfile::Standard => write!(f, "standard"),
            BackendProfile::Legacy => write!(f, "legacy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_differ_only_in_data_route_conventions() {
        assert_eq!(BackendProfile::Standard.data_path(), "/data");
        assert_eq!(BackendProfile::Legacy.data_path(), "/get_data");
        assert_eq!(BackendProfile::Standard.data_symbol_field(), "symbol");
        assert_eq!(BackendProfile::Legacy.data_symbol_field(), "ticker");
        assert_eq!(
            BackendProfile::Standard.download_path(),
            BackendProfile::Legacy.download_path()
        );
        assert_eq!(BackendProfile::Standard.download_symbol_field(), "ticker");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("LEGACY".parse(), Ok(BackendProfile::Legacy));
        assert_eq!("standard".parse(), Ok(BackendProfile::Standard));
        assert_eq!("beta".parse::<BackendProfile>(), Err(()));
    }
}
