use crate::backend::error::BackendError;
use crate::dashboard::DashboardError;
use log::Level;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::Trace,
            LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warn,
            LogLevel::Error => Level::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_backend_error(&self, error: &BackendError) -> LogLevel {
        match error {
            // The user asked for something the backend can't serve
            BackendError::Http { status, .. } if (400..=499).contains(status) => LogLevel::Warn,

            // Backend is broken
            BackendError::Http { .. } => LogLevel::Error,

            // Malformed responses
            BackendError::Decode(_) | BackendError::Payload(_) => LogLevel::Error,

            // Network issues - usually temporary
            BackendError::Reqwest(_) => LogLevel::Warn,
        }
    }

    pub fn classify_dashboard_error(&self, error: &DashboardError) -> LogLevel {
        match error {
            DashboardError::Validation(_) => LogLevel::Debug,
            DashboardError::Backend { source, .. } => self.classify_backend_error(source),
            DashboardError::Surface(_)
            | DashboardError::Download(_)
            | DashboardError::Preferences(_) => LogLevel::Error,
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Operation;
    use crate::model::{PayloadError, ValidationError};

    fn http(status: u16) -> BackendError {
        BackendError::Http {
            status,
            message: None,
        }
    }

    #[test]
    fn test_http_statuses() {
        let classifier = ErrorClassifier::new();
        assert_eq!(classifier.classify_backend_error(&http(404)), LogLevel::Warn);
        assert_eq!(classifier.classify_backend_error(&http(400)), LogLevel::Warn);
        assert_eq!(classifier.classify_backend_error(&http(500)), LogLevel::Error);
        assert_eq!(classifier.classify_backend_error(&http(503)), LogLevel::Error);
    }

    #[test]
    fn test_decode_errors_are_critical() {
        let classifier = ErrorClassifier::new();
        let decode = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        assert_eq!(
            classifier.classify_backend_error(&BackendError::Decode(decode)),
            LogLevel::Error
        );
        assert_eq!(
            classifier.classify_backend_error(&BackendError::Payload(PayloadError::MissingSeries)),
            LogLevel::Error
        );
    }

    #[test]
    fn test_dashboard_errors() {
        let classifier = ErrorClassifier::new();
        assert_eq!(
            classifier
                .classify_dashboard_error(&DashboardError::Validation(ValidationError::EmptySymbol)),
            LogLevel::Debug
        );
        assert_eq!(
            classifier.classify_dashboard_error(&DashboardError::Backend {
                operation: Operation::Fetch,
                source: http(404),
            }),
            LogLevel::Warn
        );
        assert_eq!(
            classifier.classify_dashboard_error(&DashboardError::Download(std::io::Error::other(
                "disk full"
            ))),
            LogLevel::Error
        );
    }

    #[test]
    fn test_classified_levels_map_onto_log_macros() {
        let classifier = ErrorClassifier::new();
        let level: Level = classifier.classify_backend_error(&http(503)).into();
        assert_eq!(level, Level::Error);
        assert_eq!(Level::from(LogLevel::Trace), Level::Trace);
        assert_eq!(Level::from(LogLevel::Warn), Level::Warn);
    }
}
