use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use crate::replay::strategy::FillReport;
use crate::trace::trace::TraceEvent;

/// Append-only JSONL sink for replay outcomes.
///
/// Opening or writing the file never fails a replay: problems are logged and
/// the line is dropped.
pub struct TraceLogger {
    path: PathBuf,
    file: Option<Mutex<File>>,
}

impl TraceLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path);

        let file = match file {
            Ok(f) => Some(Mutex::new(f)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not open trace file");
                None
            }
        };
        TraceLogger { path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// One line per field outcome, in snapshot order, written in one go.
    pub fn record_report(&self, snapshot_id: &str, report: &FillReport) {
        let events: Vec<TraceEvent> = report
            .outcomes
            .iter()
            .map(|outcome| TraceEvent::now(snapshot_id, report.mode, outcome))
            .collect();
        self.append(&events);
    }

    fn append<T: Serialize>(&self, lines: &[T]) {
        let Some(file) = &self.file else {
            return;
        };

        let mut file = file.lock().unwrap_or_else(|p| p.into_inner());
        let mut out = BufWriter::new(&mut *file);
        for line in lines {
            let written = serde_json::to_string(line)
                .map_err(std::io::Error::from)
                .and_then(|json| writeln!(out, "{}", json));
            if let Err(e) = written {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to write trace line");
                return;
            }
        }
        if let Err(e) = out.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to flush trace file");
        }
    }
}
