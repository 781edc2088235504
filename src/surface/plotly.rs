//! Headless surface: one Plotly figure file per container plus an index page.

use super::{ChartSurface, SurfaceError};
use crate::charts::{ChartId, Layout, Trace};
use log::debug;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use strum::IntoEnumIterator;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Serialize)]
struct Figure<'a> {
    data: &'a [Trace],
    layout: &'a Layout,
}

#[derive(Debug)]
pub struct PlotlyFileSurface {
    dir: PathBuf,
    // Serializes index regeneration across concurrent renders.
    index_lock: Mutex<()>,
}

impl PlotlyFileSurface {
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            index_lock: Mutex::new(()),
        })
    }

    pub fn figure_path(&self, container: ChartId) -> PathBuf {
        self.dir.join(format!("{}.json", container))
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join("index.html")
    }

    /// Rewrites index.html with every figure currently on disk, inlined so the page
    /// opens straight from the filesystem.
    fn write_index(&self) -> Result<(), SurfaceError> {
        let _guard = self
            .index_lock
            .lock()
            .map_err(|_| SurfaceError::Unavailable("index lock poisoned".to_string()))?;

        let mut body = String::new();
        for id in ChartId::iter() {
            let figure = match fs::read_to_string(self.figure_path(id)) {
                Ok(json) => script_safe(&json),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            body.push_str(&format!(
                "<div id=\"{id}\"></div>\n<script>(function(f){{Plotly.newPlot(\"{id}\", f.data, f.layout);}})({figure});</script>\n"
            ));
        }

        let html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Market dashboard</title>\n<script src=\"{PLOTLY_JS}\"></script>\n</head>\n<body>\n{body}</body>\n</html>\n"
        );
        fs::write(self.index_path(), html)?;
        Ok(())
    }
}

/// Escapes `<` so figure text such as `</script>` cannot close the inline script.
/// `\u003c` decodes back to `<` in JavaScript string literals.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
}

impl ChartSurface for PlotlyFileSurface {
    fn render(
        &self,
        container: ChartId,
        traces: &[Trace],
        layout: &Layout,
    ) -> Result<(), SurfaceError> {
        let json = serde_json::to_string(&Figure {
            data: traces,
            layout,
        })?;
        let path = self.figure_path(container);
        fs::write(&path, json)?;
        debug!("render | wrote {}", path.display());
        self.write_index()
    }

    fn clear(&self, container: ChartId) -> Result<(), SurfaceError> {
        match fs::remove_file(self.figure_path(container)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        self.write_index()
    }
}
