use serde_json::Value;

use crate::agent::error::FormError;
use crate::capture::snapshot_model::FormSnapshot;
use crate::replay::strategy::FillMode;
use crate::store::kv_store::KeyValueStore;

pub const SAVED_FORMS_KEY: &str = "savedForms";
pub const FILL_MODE_KEY: &str = "fillMode";

/// The saved-snapshot collection and the fill-mode preference, backed by a
/// key-value store. Every call reads or writes the store, so there is no
/// cached copy to drift out of sync.
pub struct FormRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> FormRepository<S> {
    pub fn new(store: S) -> Self {
        FormRepository { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create an empty collection if none is stored yet.
    pub fn initialize(&self) -> Result<(), FormError> {
        if self.store.get(SAVED_FORMS_KEY)?.is_none() {
            self.put(&[])?;
        }
        Ok(())
    }

    /// The whole collection in stored (insertion) order.
    pub fn get(&self) -> Result<Vec<FormSnapshot>, FormError> {
        match self.store.get(SAVED_FORMS_KEY)? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| FormError::parse(SAVED_FORMS_KEY, e)),
        }
    }

    /// Replace the whole collection.
    pub fn put(&self, forms: &[FormSnapshot]) -> Result<(), FormError> {
        let value =
            serde_json::to_value(forms).map_err(|e| FormError::serialize(SAVED_FORMS_KEY, e))?;
        self.store.set(SAVED_FORMS_KEY, value)
    }

    /// Newest first, for display. Stored order is left untouched.
    pub fn list(&self) -> Result<Vec<FormSnapshot>, FormError> {
        let mut forms = self.get()?;
        forms.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(forms)
    }

    pub fn find(&self, id: &str) -> Result<Option<FormSnapshot>, FormError> {
        Ok(self.get()?.into_iter().find(|f| f.id == id))
    }

    pub fn insert(&self, snapshot: FormSnapshot) -> Result<(), FormError> {
        let mut forms = self.get()?;
        forms.push(snapshot);
        self.put(&forms)
    }

    /// Remove a snapshot. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, FormError> {
        let mut forms = self.get()?;
        let before = forms.len();
        forms.retain(|f| f.id != id);
        if forms.len() == before {
            return Ok(false);
        }
        self.put(&forms)?;
        Ok(true)
    }

    /// Drop every saved snapshot.
    pub fn reset(&self) -> Result<(), FormError> {
        self.put(&[])
    }

    /// Stored preference; unknown or missing values mean `instant`.
    pub fn fill_mode(&self) -> Result<FillMode, FormError> {
        let stored = self.store.get(FILL_MODE_KEY)?;
        let mode = match stored.as_ref().and_then(Value::as_str) {
            Some(name) => name.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "ignoring stored fill mode");
                FillMode::default()
            }),
            None => FillMode::default(),
        };
        Ok(mode)
    }

    pub fn set_fill_mode(&self, mode: FillMode) -> Result<(), FormError> {
        self.store
            .set(FILL_MODE_KEY, Value::String(mode.as_str().to_string()))
    }
}
