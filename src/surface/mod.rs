//! Where charts end up. The dashboard core only talks to [`ChartSurface`].

use crate::charts::{ChartId, Layout, Trace};
use thiserror::Error;

mod plotly;
mod terminal;

pub use plotly::PlotlyFileSurface;
pub use terminal::{RenderedChart, TerminalSurface};

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not encode chart: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Surface unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait ChartSurface: Send + Sync {
    /// Replaces whatever the container currently shows.
    fn render(&self, container: ChartId, traces: &[Trace], layout: &Layout)
    -> Result<(), SurfaceError>;

    fn clear(&self, container: ChartId) -> Result<(), SurfaceError>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceCall {
        Render {
            container: ChartId,
            traces: Vec<Trace>,
            layout: Layout,
        },
        Clear(ChartId),
    }

    /// Keeps every call in order.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        calls: Mutex<Vec<SurfaceCall>>,
    }

    impl RecordingSurface {
        pub fn calls(&self) -> Vec<SurfaceCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn rendered(&self) -> Vec<ChartId> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    SurfaceCall::Render { container, .. } => Some(container),
                    SurfaceCall::Clear(_) => None,
                })
                .collect()
        }

        pub fn traces_for(&self, id: ChartId) -> Option<Vec<Trace>> {
            self.calls().into_iter().rev().find_map(|call| match call {
                SurfaceCall::Render {
                    container, traces, ..
                } if container == id => Some(traces),
                _ => None,
            })
        }
    }

    impl ChartSurface for RecordingSurface {
        fn render(
            &self,
            container: ChartId,
            traces: &[Trace],
            layout: &Layout,
        ) -> Result<(), SurfaceError> {
            self.calls.lock().unwrap().push(SurfaceCall::Render {
                container,
                traces: traces.to_vec(),
                layout: layout.clone(),
            });
            Ok(())
        }

        fn clear(&self, container: ChartId) -> Result<(), SurfaceError> {
            self.calls
                .lock()
                .unwrap()
                .push(SurfaceCall::Clear(container));
            Ok(())
        }
    }
}
