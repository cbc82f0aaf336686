use serde::{Deserialize, Serialize};

use crate::browser::session::LivePage;
use crate::capture::snapshot_model::FormSnapshot;
use crate::replay::locator::{DomLocator, ElementLocator};
use crate::replay::pacing::Pacing;
use crate::replay::strategy::{FillMode, FillReport};
use crate::trace::logger::TraceLogger;

/// A snapshot plus the fill mode to replay it with. Never persisted.
///
/// On the wire the snapshot's keys sit at the top level next to `fillMode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRequest {
    #[serde(flatten)]
    pub snapshot: FormSnapshot,
    #[serde(rename = "fillMode", default)]
    pub fill_mode: FillMode,
}

impl ReplayRequest {
    pub fn new(snapshot: FormSnapshot, fill_mode: FillMode) -> Self {
        ReplayRequest {
            snapshot,
            fill_mode,
        }
    }
}

/// Replays snapshots into live pages.
pub struct ReplayEngine {
    locator: Box<dyn ElementLocator>,
    pacing: Pacing,
    tracer: Option<TraceLogger>,
}

impl ReplayEngine {
    pub fn new(pacing: Pacing) -> Self {
        ReplayEngine {
            locator: Box::new(DomLocator),
            pacing,
            tracer: None,
        }
    }

    pub fn with_locator(mut self, locator: Box<dyn ElementLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Write one JSONL trace line per field outcome.
    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Replay `request` into `page`.
    ///
    /// Blocks form submission for the mode's interceptor window, runs the
    /// strategy to completion, then shows a completion notification.
    /// Field-level problems end up in the report, never as an error.
    pub async fn replay(&self, request: &ReplayRequest, page: &LivePage) -> FillReport {
        let mode = request.fill_mode;
        let fields = &request.snapshot.fields;

        let guard_timeout = mode.guard_timeout(&self.pacing);
        let guard = page.guard_submissions(guard_timeout);
        tracing::debug!(guard, ?guard_timeout, "submit interceptor installed");

        let report = mode
            .apply(fields, page, self.locator.as_ref(), &self.pacing)
            .await;

        page.notify(
            format!("✓ {} completed!", mode.display_name()),
            self.pacing.notification(),
        );

        tracing::info!(
            snapshot = %request.snapshot.id,
            mode = %mode,
            filled = report.filled(),
            not_found = report.not_found(),
            failed = report.failed(),
            "replay complete"
        );

        if let Some(tracer) = &self.tracer {
            tracer.record_report(&request.snapshot.id, &report);
        }

        report
    }
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new(Pacing::default())
    }
}
