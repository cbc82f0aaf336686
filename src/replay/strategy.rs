use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agent::error::DomError;
use crate::browser::session::LivePage;
use crate::capture::snapshot_model::{FieldDescriptor, FieldKind};
use crate::dom::dom_model::NodeId;
use crate::replay::apply::ValueApplier;
use crate::replay::locator::ElementLocator;
use crate::replay::pacing::Pacing;

// ============================================================================
// Fill modes
// ============================================================================

/// The five replay behaviors. They trade off speed, event fidelity and how
/// easily page-side automation detection can spot them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// One synchronous pass, input+change events
    #[default]
    Instant,
    /// Keystroke-by-keystroke typing with random delays
    Human,
    /// Sequential with a fixed gap between fields
    Slow,
    /// Values only, no events at all
    Silent,
    /// Clipboard paste simulation
    Paste,
}

impl FillMode {
    pub const ALL: [FillMode; 5] = [
        FillMode::Instant,
        FillMode::Human,
        FillMode::Slow,
        FillMode::Silent,
        FillMode::Paste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FillMode::Instant => "instant",
            FillMode::Human => "human",
            FillMode::Slow => "slow",
            FillMode::Silent => "silent",
            FillMode::Paste => "paste",
        }
    }

    /// Name shown in the completion notification.
    pub fn display_name(&self) -> &'static str {
        match self {
            FillMode::Instant => "Instant Fill",
            FillMode::Human => "Human-like Typing",
            FillMode::Slow => "Slow Fill",
            FillMode::Silent => "Silent Fill",
            FillMode::Paste => "Paste Fill",
        }
    }

    /// Modes that stretch over seconds keep the submit interceptor longer.
    pub fn is_time_extended(&self) -> bool {
        matches!(self, FillMode::Human | FillMode::Slow)
    }

    pub fn guard_timeout(&self, pacing: &Pacing) -> std::time::Duration {
        let ms = if self.is_time_extended() {
            pacing.timed_guard_ms
        } else {
            pacing.instant_guard_ms
        };
        std::time::Duration::from_millis(ms)
    }

    /// Fill `fields` into the page. Per-field failures are logged and recorded;
    /// they never stop the remaining fields.
    pub async fn apply(
        self,
        fields: &[FieldDescriptor],
        page: &LivePage,
        locator: &dyn ElementLocator,
        pacing: &Pacing,
    ) -> FillReport {
        let mut report = FillReport::new(self);
        let dispatching = ValueApplier::dispatching();

        match self {
            FillMode::Instant => {
                for (i, field) in fields.iter().enumerate() {
                    let status = fill_direct(&dispatching, page, locator, field, pacing).0;
                    report.record(i, field, status);
                }
            }

            FillMode::Silent => {
                let silent = ValueApplier::silent();
                for (i, field) in fields.iter().enumerate() {
                    let status = fill_direct(&silent, page, locator, field, pacing).0;
                    report.record(i, field, status);
                }
            }

            FillMode::Slow => {
                for (i, field) in fields.iter().enumerate() {
                    let (status, located) = fill_direct(&dispatching, page, locator, field, pacing);
                    report.record(i, field, status);
                    if located {
                        tokio::time::sleep(pacing.slow_gap()).await;
                    }
                }
            }

            FillMode::Human => {
                for (i, field) in fields.iter().enumerate() {
                    let status = fill_human(&dispatching, page, locator, field, pacing).await;
                    report.record(i, field, status);
                }
            }

            FillMode::Paste => {
                for (i, field) in fields.iter().enumerate() {
                    let (status, located) = fill_paste(&dispatching, page, locator, field, pacing);
                    report.record(i, field, status);
                    if located {
                        tokio::time::sleep(pacing.paste_gap()).await;
                    }
                }
            }
        }

        report
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FillMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown fill mode '{}'", s))
    }
}

// ============================================================================
// Per-field steps
// ============================================================================

/// Locate a field, or say why it will not be filled.
fn resolve(
    page: &LivePage,
    locator: &dyn ElementLocator,
    field: &FieldDescriptor,
) -> Result<NodeId, FillStatus> {
    if !field.has_truthy_value() {
        return Err(FillStatus::Skipped);
    }
    page.read(|doc| locator.locate(doc, field))
        .ok_or(FillStatus::NotFound)
}

fn finish(
    page: &LivePage,
    field: &FieldDescriptor,
    node: NodeId,
    result: Result<(), DomError>,
    pacing: &Pacing,
) -> FillStatus {
    let result = result.and_then(|()| page.highlight(node, pacing.highlight()));
    match result {
        Ok(()) => FillStatus::Filled,
        Err(e) => {
            tracing::warn!(field = %field.describe(), error = %e, "Error filling field");
            FillStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Standard value application. Second element: whether an element was found.
fn fill_direct(
    applier: &ValueApplier,
    page: &LivePage,
    locator: &dyn ElementLocator,
    field: &FieldDescriptor,
    pacing: &Pacing,
) -> (FillStatus, bool) {
    match resolve(page, locator, field) {
        Ok(node) => {
            let result = page.write(|doc| applier.apply(doc, Some(node), field));
            (finish(page, field, node, result, pacing), true)
        }
        Err(status) => (status, false),
    }
}

/// Text controls are typed; selects, checkboxes and radios have no keystroke
/// analog and get the standard path with a fixed pause.
async fn fill_human(
    applier: &ValueApplier,
    page: &LivePage,
    locator: &dyn ElementLocator,
    field: &FieldDescriptor,
    pacing: &Pacing,
) -> FillStatus {
    let node = match resolve(page, locator, field) {
        Ok(node) => node,
        Err(status) => return status,
    };

    if field.kind == FieldKind::Select || field.is_toggle() {
        let result = page.write(|doc| applier.apply(doc, Some(node), field));
        let status = finish(page, field, node, result, pacing);
        tokio::time::sleep(pacing.select_pause()).await;
        return status;
    }

    let text = field.value.as_ref().map(|v| v.as_text()).unwrap_or_default();
    let result = applier.type_text(page, node, &text, pacing).await;
    let status = finish(page, field, node, result, pacing);
    tokio::time::sleep(pacing.field_gap()).await;
    status
}

/// Text inputs are pasted; textareas, toggles and selects use the standard path.
fn fill_paste(
    applier: &ValueApplier,
    page: &LivePage,
    locator: &dyn ElementLocator,
    field: &FieldDescriptor,
    pacing: &Pacing,
) -> (FillStatus, bool) {
    let node = match resolve(page, locator, field) {
        Ok(node) => node,
        Err(status) => return (status, false),
    };

    let result = if field.kind != FieldKind::Input || field.is_toggle() {
        page.write(|doc| applier.apply(doc, Some(node), field))
    } else {
        let text = field.value.as_ref().map(|v| v.as_text()).unwrap_or_default();
        page.write(|doc| applier.paste_text(doc, node, &text))
    };
    (finish(page, field, node, result, pacing), true)
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FillStatus {
    Filled,
    /// Falsy value, never attempted
    Skipped,
    NotFound,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOutcome {
    /// Position in the snapshot's field list
    pub position: usize,
    pub field: String,
    #[serde(flatten)]
    pub status: FillStatus,
}

/// What a replay did to each field of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub mode: FillMode,
    pub outcomes: Vec<FieldOutcome>,
}

impl FillReport {
    pub fn new(mode: FillMode) -> Self {
        FillReport {
            mode,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, position: usize, field: &FieldDescriptor, status: FillStatus) {
        if status == FillStatus::NotFound {
            tracing::debug!(field = %field.describe(), "no matching element");
        }
        self.outcomes.push(FieldOutcome {
            position,
            field: field.describe(),
            status,
        });
    }

    fn count(&self, pred: impl Fn(&FillStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn filled(&self) -> usize {
        self.count(|s| *s == FillStatus::Filled)
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| *s == FillStatus::Skipped)
    }

    pub fn not_found(&self) -> usize {
        self.count(|s| *s == FillStatus::NotFound)
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FillStatus::Failed { .. }))
    }
}
