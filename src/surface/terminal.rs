use super::{ChartSurface, SurfaceError};
use crate::charts::{ChartId, Layout, Trace};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

/// Latest chart per container, shared with the TUI draw loop.
#[derive(Debug, Clone, Default)]
pub struct TerminalSurface {
    charts: Arc<Mutex<BTreeMap<ChartId, RenderedChart>>>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, container: ChartId) -> Option<RenderedChart> {
        self.charts
            .lock()
            .ok()
            .and_then(|charts| charts.get(&container).cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.charts.lock().map(|c| c.is_empty()).unwrap_or(true)
    }

    fn with_charts<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<ChartId, RenderedChart>) -> T,
    ) -> Result<T, SurfaceError> {
        let mut charts = self
            .charts
            .lock()
            .map_err(|_| SurfaceError::Unavailable("terminal surface poisoned".to_string()))?;
        Ok(f(&mut charts))
    }
}

impl ChartSurface for TerminalSurface {
    fn render(
        &self,
        container: ChartId,
        traces: &[Trace],
        layout: &Layout,
    ) -> Result<(), SurfaceError> {
        self.with_charts(|charts| {
            charts.insert(
                container,
                RenderedChart {
                    traces: traces.to_vec(),
                    layout: layout.clone(),
                },
            );
        })
    }

    fn clear(&self, container: ChartId) -> Result<(), SurfaceError> {
        self.with_charts(|charts| {
            charts.remove(&container);
        })
    }
}
