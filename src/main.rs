mod backend;
mod charts;
mod cli_messages;
mod config;
mod consts;
mod dashboard;
mod download;
mod error_classifier;
mod events;
mod logging;
mod model;
mod profile;
mod session;
mod surface;
mod theme;
mod ui;

use crate::config::{Config, get_config_path, get_log_path};
use crate::model::{Indicator, QueryInput};
use crate::profile::BackendProfile;
use crate::session::SessionSettings;
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Market analysis dashboard: price, indicators and forecasts from an analysis backend
struct Args {
    /// Backend base URL. Overrides MARKET_DASHBOARD_BACKEND_URL and the config file
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,

    /// Route and field conventions of the backend
    #[arg(long, global = true, value_enum)]
    profile: Option<BackendProfile>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

/// Form values shared by `fetch` and `download`.
#[derive(clap::Args)]
struct QueryArgs {
    /// Ticker symbol, e.g. AAPL
    #[arg(long)]
    ticker: String,

    /// First day, YYYY-MM-DD
    #[arg(long)]
    start: String,

    /// Last day, YYYY-MM-DD. Defaults to today
    #[arg(long)]
    end: Option<String>,

    /// Forecast horizon in days
    #[arg(long)]
    horizon: Option<u32>,

    /// Indicator overlay; repeat for several
    #[arg(long = "indicator", value_enum)]
    indicators: Vec<Indicator>,
}

impl From<QueryArgs> for QueryInput {
    fn from(args: QueryArgs) -> Self {
        QueryInput {
            ticker: args.ticker,
            start: args.start,
            end: args.end.unwrap_or_default(),
            horizon: args.horizon.map(|h| h.to_string()).unwrap_or_default(),
            indicators: args.indicators.into_iter().collect(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive dashboard
    Dashboard,
    /// Fetch once and write the charts as Plotly figures
    Fetch {
        #[command(flatten)]
        query: QueryArgs,

        /// Directory receiving the figures and index.html
        #[arg(long, value_name = "DIR", default_value = "charts")]
        out_dir: PathBuf,
    },
    /// Download the spreadsheet export
    Download {
        #[command(flatten)]
        query: QueryArgs,

        /// Directory receiving the spreadsheet. Defaults to the configured one
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Show or switch the chart theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Save backend settings to the config file
    Configure {
        /// Default directory for downloaded spreadsheets
        #[arg(long, value_name = "DIR")]
        download_dir: Option<String>,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Switch between the light and dark theme
    Toggle,
    /// Print the current theme
    Show,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // The TUI owns the terminal, so its log goes to a file.
    let logger = match args.command {
        Command::Dashboard => get_log_path().and_then(|path| logging::init_file_logger(&path)),
        _ => {
            logging::init_console_logger();
            Ok(())
        }
    };
    if let Err(e) = logger {
        eprintln!("Could not set up logging: {}", e);
    }

    if let Err(e) = run(args).await {
        if !e.is::<session::AlreadyReported>() {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let backend_url = args.backend_url.as_deref();
    match args.command {
        Command::Dashboard => {
            let settings = SessionSettings::load(backend_url, args.profile)?;
            session::run_tui_mode(settings).await
        }
        Command::Fetch { query, out_dir } => {
            let settings = SessionSettings::load(backend_url, args.profile)?;
            session::run_fetch(&settings, &query.into(), out_dir).await
        }
        Command::Download { query, out_dir } => {
            let settings = SessionSettings::load(backend_url, args.profile)?;
            session::run_download(&settings, &query.into(), out_dir)
                .await
                .map(|_| ())
        }
        Command::Theme { action } => match action {
            ThemeAction::Toggle => session::run_theme_toggle().map(|_| ()),
            ThemeAction::Show => session::run_theme_show().map(|_| ()),
        },
        Command::Configure { download_dir } => {
            let config_path = get_config_path()?;
            let mut config = Config::load_or_default(&config_path)
                .map_err(|e| format!("Failed to load config: {}", e))?;
            if let Some(url) = args.backend_url {
                config.backend_url = url;
            }
            if let Some(profile) = args.profile {
                config.profile = profile;
            }
            if download_dir.is_some() {
                config.download_dir = download_dir;
            }
            config
                .save(&config_path)
                .map_err(|e| format!("Failed to save config: {}", e))?;
            print_cmd_success!(
                "Configuration saved",
                "{} ({} profile) -> {}",
                config.backend_url,
                config.profile,
                config_path.display()
            );
            Ok(())
        }
    }
}
