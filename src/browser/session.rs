use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::agent::error::{DomError, FormError};
use crate::dom::dom_model::{Document, GuardId, NodeId};

/// Background applied to a freshly filled field.
pub const HIGHLIGHT_COLOR: &str = "#d4edda";

/// A shared handle on one live page.
///
/// The page is the only shared resource between a replay and the deferred
/// page effects it schedules (highlight revert, interceptor removal,
/// notification dismissal). Every access takes the lock for the duration of
/// one closure; callers must never hold it across an `.await`.
#[derive(Debug, Clone)]
pub struct LivePage {
    doc: Arc<Mutex<Document>>,
}

impl LivePage {
    pub fn new(doc: Document) -> Self {
        LivePage {
            doc: Arc::new(Mutex::new(doc)),
        }
    }

    /// Load a page fixture from a JSON file.
    pub fn open(path: &str) -> Result<Self, FormError> {
        let json = std::fs::read_to_string(path).map_err(|e| FormError::io(path, e))?;
        Ok(Self::new(Document::from_json(&json)?))
    }

    /// Write the current page state back out as a fixture.
    pub fn save(&self, path: &str) -> Result<(), FormError> {
        let fixture = self.read(|doc| doc.to_fixture());
        let json = serde_json::to_string_pretty(&fixture)
            .map_err(|e| FormError::serialize("page fixture", e))?;
        std::fs::write(path, json).map_err(|e| FormError::io(path, e))
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        // A panic in another holder leaves the DOM usable; keep going
        self.doc.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.lock())
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn url(&self) -> String {
        self.read(|doc| doc.url.clone())
    }

    /// Snapshot of the whole document, for inspection.
    pub fn document(&self) -> Document {
        self.read(|doc| doc.clone())
    }

    /// Highlight a filled element, reverting to its prior background after `hold`.
    pub fn highlight(&self, node: NodeId, hold: Duration) -> Result<(), DomError> {
        let original = self.write(|doc| -> Result<String, DomError> {
            let original = doc.element(node)?.background.clone();
            doc.set_background(node, HIGHLIGHT_COLOR)?;
            Ok(original)
        })?;

        // Re-highlighting inside the window leaves the pending revert in charge
        if original != HIGHLIGHT_COLOR {
            let page = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(hold).await;
                if let Err(e) = page.write(|doc| doc.set_background(node, &original)) {
                    tracing::debug!(node, error = %e, "could not revert highlight");
                }
            });
        }
        Ok(())
    }

    /// Block every form's submission until `timeout` elapses.
    pub fn guard_submissions(&self, timeout: Duration) -> GuardId {
        let guard = self.write(|doc| doc.install_submit_guard());
        let page = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            page.write(|doc| doc.remove_submit_guard(guard));
            tracing::debug!(guard, "submit interceptor removed");
        });
        guard
    }

    /// Show a notification that dismisses itself after `visible`.
    pub fn notify(&self, message: impl Into<String>, visible: Duration) {
        let index = self.write(|doc| doc.show_notification(message));
        let page = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(visible).await;
            page.write(|doc| doc.dismiss_notification(index));
        });
    }
}
