//! Dashboard Client
//!
//! Ties the backend, the chart builders, a [`ChartSurface`] and a [`Notifier`] together.
//! Every fetch takes a ticket from a [`RequestSequencer`]; only the response holding the
//! latest ticket is allowed to reach the surface.

use crate::backend::Backend;
use crate::backend::error::BackendError;
use crate::charts::{Chart, ChartId, build_charts};
use crate::consts::cli_consts::messages;
use crate::download::{DownloadSink, spreadsheet_file_name};
use crate::error_classifier::ErrorClassifier;
use crate::model::{Indicator, QueryInput, QueryParams, ResponsePayload, ValidationError};
use crate::surface::{ChartSurface, SurfaceError};
use crate::theme::{ThemeController, ThemePreference};
use chrono::{Local, NaiveDate};
use log::{Level, debug, info, log};
use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A message meant for the user, as opposed to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Hands out request tickets: 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recent ticket handed out, 0 before the first.
    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest() == ticket
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
pub enum Operation {
    #[strum(to_string = "fetch")]
    Fetch,
    #[strum(to_string = "download")]
    Download,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{operation} request failed: {source}")]
    Backend {
        operation: Operation,
        #[source]
        source: BackendError,
    },

    #[error("Rendering failed: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Saving the spreadsheet failed: {0}")]
    Download(#[source] io::Error),

    #[error("Saving the preference failed: {0}")]
    Preferences(#[source] io::Error),
}

impl DashboardError {
    /// The text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Validation(e) => e.to_string(),
            DashboardError::Backend { operation, source } => match source {
                BackendError::Http {
                    message: Some(message),
                    ..
                } if !message.trim().is_empty() => message.clone(),
                BackendError::Http { .. } => match operation {
                    Operation::Fetch => messages::FETCH_FAILED.to_string(),
                    Operation::Download => messages::DOWNLOAD_FAILED.to_string(),
                },
                BackendError::Reqwest(_) => messages::COMMUNICATION_ERROR.to_string(),
                BackendError::Decode(_) | BackendError::Payload(_) => {
                    messages::UNREADABLE_RESPONSE.to_string()
                }
            },
            DashboardError::Surface(_) => messages::RENDER_FAILED.to_string(),
            DashboardError::Download(_) => messages::SAVE_FAILED.to_string(),
            DashboardError::Preferences(_) => messages::PREFERENCE_FAILED.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// The response was current and every chart in `charts` was drawn.
    Rendered { sequence: u64, charts: Vec<ChartId> },
    /// A newer request was issued before this one finished.
    Superseded { sequence: u64 },
    Failed(DashboardError),
}

impl FetchOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, FetchOutcome::Rendered { .. })
    }
}

#[derive(Debug)]
pub enum DownloadOutcome {
    Saved { path: PathBuf },
    Failed(DashboardError),
}

/// What was last drawn, kept so a theme change can redraw it.
struct LastRender {
    payload: ResponsePayload,
    indicators: BTreeSet<Indicator>,
}

pub struct DashboardClient {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn ChartSurface>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn DownloadSink>,
    theme: Mutex<ThemeController>,
    sequencer: RequestSequencer,
    // Held across the latest-check and the whole render pass.
    render: Mutex<Option<LastRender>>,
    classifier: ErrorClassifier,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DashboardClient {
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn ChartSurface>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn DownloadSink>,
        theme: ThemeController,
    ) -> Self {
        Self {
            backend,
            surface,
            notifier,
            sink,
            theme: Mutex::new(theme),
            sequencer: RequestSequencer::new(),
            render: Mutex::new(None),
            classifier: ErrorClassifier::new(),
        }
    }

    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    pub fn theme(&self) -> ThemePreference {
        lock(&self.theme).current()
    }

    /// Validates the form and fetches only when it is valid.
    pub async fn submit_fetch(&self, input: &QueryInput) -> FetchOutcome {
        match self.validate(input) {
            Ok(params) => self.fetch_and_render(params).await,
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    pub async fn submit_download(&self, input: &QueryInput) -> DownloadOutcome {
        match self.validate(input) {
            Ok(params) => self.download_spreadsheet(params).await,
            Err(e) => DownloadOutcome::Failed(e),
        }
    }

    fn validate(&self, input: &QueryInput) -> Result<QueryParams, DashboardError> {
        QueryParams::parse(input, today()).map_err(|e| {
            let e = DashboardError::from(e);
            self.report(&e);
            e
        })
    }

    pub async fn fetch_and_render(&self, params: QueryParams) -> FetchOutcome {
        let sequence = self.sequencer.next_ticket();
        self.notifier.notify(Notice::info(format!(
            "Fetching {} from {} to {}...",
            params.symbol, params.start, params.end
        )));

        let result = self.backend.fetch_data(&params).await;

        let mut last = lock(&self.render);
        if !self.sequencer.is_latest(sequence) {
            debug!(
                "fetch_and_render | discarding response #{} (latest is #{})",
                sequence,
                self.sequencer.latest()
            );
            return FetchOutcome::Superseded { sequence };
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(source) => {
                let e = DashboardError::Backend {
                    operation: Operation::Fetch,
                    source,
                };
                self.report(&e);
                return FetchOutcome::Failed(e);
            }
        };

        let charts = build_charts(&payload, &params.indicators, self.theme());
        if let Err(e) = self.draw(&charts) {
            let e = DashboardError::from(e);
            self.report(&e);
            return FetchOutcome::Failed(e);
        }

        info!(
            "fetch_and_render | #{} rendered {} charts for {}",
            sequence,
            charts.len(),
            payload.meta.symbol
        );
        self.notifier.notify(Notice::success(format!(
            "Loaded {} days and a {}-day forecast for {}",
            payload.series.len(),
            payload.forecast.len(),
            payload.meta.symbol
        )));
        *last = Some(LastRender {
            payload,
            indicators: params.indicators,
        });

        FetchOutcome::Rendered {
            sequence,
            charts: charts.iter().map(|c| c.id).collect(),
        }
    }

    /// Draws every chart, then clears the containers this pass did not produce.
    fn draw(&self, charts: &[Chart]) -> Result<(), SurfaceError> {
        for chart in charts {
            self.surface
                .render(chart.id, &chart.traces, &chart.layout)?;
        }
        for id in ChartId::iter().filter(|id| !charts.iter().any(|c| c.id == *id)) {
            self.surface.clear(id)?;
        }
        Ok(())
    }

    pub async fn download_spreadsheet(&self, params: QueryParams) -> DownloadOutcome {
        self.notifier.notify(Notice::info(format!(
            "Generating spreadsheet for {}...",
            params.symbol
        )));

        let bytes = match self.backend.download_spreadsheet(&params).await {
            Ok(bytes) => bytes,
            Err(source) => {
                let e = DashboardError::Backend {
                    operation: Operation::Download,
                    source,
                };
                self.report(&e);
                return DownloadOutcome::Failed(e);
            }
        };

        // The sink owns the bytes from here on.
        match self.sink.save(&spreadsheet_file_name(&params), bytes) {
            Ok(path) => {
                self.notifier
                    .notify(Notice::success(format!("Saved {}", path.display())));
                DownloadOutcome::Saved { path }
            }
            Err(e) => {
                let e = DashboardError::Download(e);
                self.report(&e);
                DownloadOutcome::Failed(e)
            }
        }
    }

    /// Flips and persists the theme, then redraws the last charts in it.
    pub fn toggle_theme(&self) -> Result<ThemePreference, DashboardError> {
        let next = lock(&self.theme).toggle().map_err(|e| {
            let e = DashboardError::Preferences(e);
            self.report(&e);
            e
        })?;
        self.notifier
            .notify(Notice::info(format!("Switched to the {} theme", next)));

        let last = lock(&self.render);
        if let Some(last) = last.as_ref() {
            let charts = build_charts(&last.payload, &last.indicators, next);
            if let Err(e) = self.draw(&charts) {
                self.report(&DashboardError::from(e));
            }
        }
        Ok(next)
    }

    fn report(&self, error: &DashboardError) {
        let level: Level = self.classifier.classify_dashboard_error(error).into();
        log!(level, "{}", error);
        self.notifier.notify(Notice::error(error.user_message()));
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
