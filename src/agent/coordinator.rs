use crate::agent::agent::PageAgent;
use crate::agent::agent_model::{AgentRequest, Notice};
use crate::agent::error::FormError;
use crate::capture::snapshot_model::generate_snapshot_id;
use crate::replay::replay::ReplayRequest;
use crate::replay::strategy::FillMode;
use crate::store::kv_store::KeyValueStore;
use crate::store::repository::FormRepository;
use crate::store::transfer::{ImportOutcome, export_json, merge_import, parse_import};

/// URL prefixes the page agent can never run on.
const RESTRICTED_SCHEMES: [&str; 3] = ["chrome://", "edge://", "about:"];

pub fn is_restricted_url(url: &str) -> bool {
    RESTRICTED_SCHEMES.iter().any(|s| url.starts_with(s))
}

/// Popup-side operations: save, auto-fill, delete, export, import.
///
/// Each operation returns a `Notice` for the user. Boundary errors become
/// error notices rather than propagating.
pub struct Coordinator<S: KeyValueStore> {
    repo: FormRepository<S>,
}

impl<S: KeyValueStore> Coordinator<S> {
    pub fn new(repo: FormRepository<S>) -> Self {
        Coordinator { repo }
    }

    pub fn repository(&self) -> &FormRepository<S> {
        &self.repo
    }

    /// Capture the active tab's form and store it under a fresh id.
    pub fn save_current_form(&self, tab: Option<&PageAgent>) -> Notice {
        match self.try_save(tab) {
            Ok(count) => Notice::success(format!("Form saved! ({} fields captured)", count)),
            Err(e) => failure("saving form", e),
        }
    }

    fn try_save(&self, tab: Option<&PageAgent>) -> Result<usize, FormError> {
        let agent = active_agent(tab)?;
        let response = agent.handle(AgentRequest::CaptureForm);

        let snapshot = match response.data {
            Some(snapshot) if response.success => snapshot,
            _ => {
                return Err(FormError::Agent(
                    response.error.unwrap_or_else(|| "Failed to capture form data".into()),
                ));
            }
        };

        if snapshot.fields.is_empty() {
            return Err(FormError::EmptyCapture);
        }

        let id = generate_snapshot_id(chrono::Utc::now().timestamp_millis());
        let count = snapshot.fields.len();
        self.repo.insert(snapshot.with_id(id.clone()))?;
        tracing::info!(%id, fields = count, "form saved");
        Ok(count)
    }

    /// Ask the active tab to replay a saved form. `mode` overrides the stored preference.
    pub fn auto_fill(&self, form_id: &str, tab: Option<&PageAgent>, mode: Option<FillMode>) -> Notice {
        match self.try_fill(form_id, tab, mode) {
            Ok(()) => Notice::success("Auto-fill started!"),
            Err(e) => failure("filling form", e),
        }
    }

    fn try_fill(
        &self,
        form_id: &str,
        tab: Option<&PageAgent>,
        mode: Option<FillMode>,
    ) -> Result<(), FormError> {
        let snapshot = self
            .repo
            .find(form_id)?
            .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;
        let agent = active_agent(tab)?;
        let fill_mode = match mode {
            Some(m) => m,
            None => self.repo.fill_mode()?,
        };

        let response = agent.handle(AgentRequest::FillForm {
            data: ReplayRequest::new(snapshot, fill_mode),
        });

        if response.success {
            Ok(())
        } else {
            Err(FormError::Agent(
                response.error.unwrap_or_else(|| "Failed to fill form".into()),
            ))
        }
    }

    pub fn delete(&self, form_id: &str) -> Notice {
        match self.repo.delete(form_id) {
            Ok(true) => Notice::success("Form deleted"),
            Ok(false) => Notice::error(FormError::FormNotFound(form_id.to_string()).to_string()),
            Err(e) => failure("deleting form", e),
        }
    }

    /// Serialize the whole collection. `None` with an error notice when empty.
    pub fn export(&self) -> (Option<String>, Notice) {
        let forms = match self.repo.get() {
            Ok(forms) => forms,
            Err(e) => return (None, failure("exporting forms", e)),
        };

        if forms.is_empty() {
            return (None, Notice::error("No forms to export"));
        }

        match export_json(&forms) {
            Ok(json) => (
                Some(json),
                Notice::success(format!("Exported {} form(s)", forms.len())),
            ),
            Err(e) => (None, failure("exporting forms", e)),
        }
    }

    /// Merge an import file into the collection.
    pub fn import(&self, text: &str) -> (ImportOutcome, Notice) {
        let empty = ImportOutcome {
            valid: 0,
            added: Vec::new(),
        };

        let imported = match parse_import(text) {
            Ok(forms) => forms,
            Err(e) => return (empty, failure("importing file", e)),
        };

        if imported.is_empty() {
            return (empty, Notice::error("No valid forms found in file"));
        }

        let result = self.repo.get().and_then(|mut forms| {
            let outcome = merge_import(&forms, imported);
            forms.extend(outcome.added.iter().cloned());
            self.repo.put(&forms)?;
            Ok(outcome)
        });

        match result {
            Ok(outcome) => {
                let notice = Notice::success(format!("Imported {} new form(s)", outcome.added.len()));
                (outcome, notice)
            }
            Err(e) => (empty, failure("importing file", e)),
        }
    }

    pub fn set_fill_mode(&self, mode: FillMode) -> Notice {
        match self.repo.set_fill_mode(mode) {
            Ok(()) => Notice::success(format!("Fill mode set to {}", mode)),
            Err(e) => failure("saving fill mode", e),
        }
    }
}

fn active_agent(tab: Option<&PageAgent>) -> Result<&PageAgent, FormError> {
    let agent = tab.ok_or(FormError::NoActiveTab)?;
    let url = agent.url();
    if is_restricted_url(&url) {
        return Err(FormError::RestrictedPage(url));
    }
    Ok(agent)
}

fn failure(operation: &str, error: FormError) -> Notice {
    tracing::warn!(error = %error, "error {}", operation);
    Notice::error(error.to_string())
}
