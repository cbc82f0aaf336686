use std::sync::Arc;

use crate::agent::error::DomError;
use crate::browser::session::LivePage;
use crate::capture::snapshot_model::{FieldDescriptor, FieldKind};
use crate::dom::dom_model::{Document, NodeId};
use crate::dom::events::{ClipboardData, DomEvent, EventKind};
use crate::replay::pacing::Pacing;

// ============================================================================
// Event emission policy
// ============================================================================

/// Decides how synthetic events reach the page during value application.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, doc: &mut Document, target: NodeId, event: DomEvent) -> Result<(), DomError>;
}

/// Dispatches every event to the page's listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchEvents;

impl EventEmitter for DispatchEvents {
    fn emit(&self, doc: &mut Document, target: NodeId, event: DomEvent) -> Result<(), DomError> {
        doc.dispatch_event(target, event)
    }
}

/// Drops every event; only the underlying value/checked state changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressEvents;

impl EventEmitter for SuppressEvents {
    fn emit(&self, _doc: &mut Document, _target: NodeId, _event: DomEvent) -> Result<(), DomError> {
        Ok(())
    }
}

// ============================================================================
// Value application
// ============================================================================

/// Writes descriptor values into live elements through an emission policy.
#[derive(Clone)]
pub struct ValueApplier {
    emitter: Arc<dyn EventEmitter>,
}

impl ValueApplier {
    pub fn new(emitter: Arc<dyn EventEmitter>) -> Self {
        ValueApplier { emitter }
    }

    pub fn dispatching() -> Self {
        Self::new(Arc::new(DispatchEvents))
    }

    pub fn silent() -> Self {
        Self::new(Arc::new(SuppressEvents))
    }

    fn emit(&self, doc: &mut Document, target: NodeId, event: DomEvent) -> Result<(), DomError> {
        self.emitter.emit(doc, target, event)
    }

    /// Set the element's state from the descriptor and emit the matching
    /// events. Does nothing when the element is absent or the value is null.
    ///
    /// - checkbox/radio: `checked`, then `change`
    /// - other input, textarea: `value`, then `input` and `change`
    /// - select: `value`, then `change`
    pub fn apply(
        &self,
        doc: &mut Document,
        target: Option<NodeId>,
        field: &FieldDescriptor,
    ) -> Result<(), DomError> {
        let (Some(target), Some(value)) = (target, field.value.as_ref()) else {
            return Ok(());
        };

        if field.is_toggle() {
            doc.set_checked(target, value.is_truthy())?;
            return self.emit(doc, target, DomEvent::change());
        }

        doc.set_value(target, &value.as_text())?;
        match field.kind {
            FieldKind::Input | FieldKind::Textarea => {
                self.emit(doc, target, DomEvent::input())?;
                self.emit(doc, target, DomEvent::change())
            }
            FieldKind::Select => self.emit(doc, target, DomEvent::change()),
        }
    }

    /// Type `text` one character at a time: focus, clear, then per character
    /// keydown/keypress/input/keyup with a jittered pause, then change and blur.
    pub async fn type_text(
        &self,
        page: &LivePage,
        target: NodeId,
        text: &str,
        pacing: &Pacing,
    ) -> Result<(), DomError> {
        page.write(|doc| -> Result<(), DomError> {
            doc.focus(target)?;
            doc.set_value(target, "")
        })?;

        for ch in text.chars() {
            page.write(|doc| -> Result<(), DomError> {
                doc.append_value(target, ch)?;
                self.emit(doc, target, DomEvent::keyboard(EventKind::KeyDown, ch))?;
                self.emit(doc, target, DomEvent::keyboard(EventKind::KeyPress, ch))?;
                self.emit(doc, target, DomEvent::input())?;
                self.emit(doc, target, DomEvent::keyboard(EventKind::KeyUp, ch))
            })?;
            tokio::time::sleep(pacing.keystroke_delay()).await;
        }

        page.write(|doc| -> Result<(), DomError> {
            self.emit(doc, target, DomEvent::change())?;
            doc.blur(target)
        })
    }

    /// Simulate a paste: focus, a `paste` event carrying `text/plain`, then the
    /// value itself with `input` and `change`, then blur. If clipboard data
    /// cannot be built the paste event goes out empty and the value is still set.
    pub fn paste_text(&self, doc: &mut Document, target: NodeId, text: &str) -> Result<(), DomError> {
        doc.focus(target)?;

        let mut clipboard = ClipboardData::new(doc.supports_clipboard_data);
        if let Err(e) = clipboard.set_data("text/plain", text) {
            tracing::debug!(node = target, error = %e, "paste without clipboard payload");
        }

        self.emit(doc, target, DomEvent::paste(clipboard))?;
        doc.set_value(target, text)?;
        self.emit(doc, target, DomEvent::input())?;
        self.emit(doc, target, DomEvent::change())?;
        doc.blur(target)
    }
}
