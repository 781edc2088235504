pub mod cli_consts {
    //! Client Configuration Constants
    //!
    //! This module contains all configuration constants for the dashboard client,
    //! organized by functional area for clarity and maintainability.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// The maximum number of events to keep in the activity logs.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    // =============================================================================
    // QUERY CONFIGURATION
    // =============================================================================

    /// Form defaults and limits
    pub mod query {
        /// Date format used by the form and on the wire
        pub const DATE_FORMAT: &str = "%Y-%m-%d";

        /// Forecast horizon used when the form leaves it empty (days)
        pub const DEFAULT_HORIZON: u32 = 30;

        /// Smallest forecast horizon the backend accepts (days)
        pub const MIN_HORIZON: u32 = 1;

        /// Largest forecast horizon the backend accepts (days)
        pub const MAX_HORIZON: u32 = 365;
    }

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// Backend connection settings
    pub mod network {
        use std::time::Duration;

        /// Backend used when nothing else is configured (Flask default port)
        pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

        /// Environment variable that overrides the configured backend URL
        pub const BACKEND_URL_ENV: &str = "MARKET_DASHBOARD_BACKEND_URL";

        /// Time allowed to establish a connection (seconds)
        pub const CONNECT_TIMEOUT_SECS: u64 = 10;

        /// Time allowed for a whole request; forecasts can take a while server-side (seconds)
        pub const REQUEST_TIMEOUT_SECS: u64 = 60;

        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    // =============================================================================
    // STORAGE CONFIGURATION
    // =============================================================================

    /// Files kept under the user's home directory
    pub mod storage {
        /// Directory under $HOME holding all client state
        pub const STATE_DIR: &str = ".market-dashboard";

        pub const CONFIG_FILE: &str = "config.json";

        pub const PREFERENCES_FILE: &str = "preferences.json";

        /// Log destination while the TUI owns the terminal
        pub const LOG_FILE: &str = "dashboard.log";

        /// Preference key recording the theme choice
        pub const THEME_KEY: &str = "theme";
    }

    // =============================================================================
    // USER-FACING MESSAGES
    // =============================================================================

    /// Fallback texts shown when the backend gives nothing better
    pub mod messages {
        pub const FETCH_FAILED: &str = "Failed to fetch data from the server";

        pub const DOWNLOAD_FAILED: &str = "Failed to generate the spreadsheet";

        pub const COMMUNICATION_ERROR: &str = "Communication error with the server";

        pub const UNREADABLE_RESPONSE: &str = "The server returned data that could not be read";

        pub const RENDER_FAILED: &str = "Could not display the charts";

        pub const SAVE_FAILED: &str = "Could not save the spreadsheet";

        pub const PREFERENCE_FAILED: &str = "Could not save the theme preference";
    }
}
