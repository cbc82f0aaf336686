use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::agent::error::FormError;
use crate::capture::snapshot_model::{FieldDescriptor, FormSnapshot};

/// Pretty-printed JSON array, 2-space indent.
pub fn export_json(forms: &[FormSnapshot]) -> Result<String, FormError> {
    serde_json::to_string_pretty(forms).map_err(|e| FormError::serialize("export", e))
}

/// `form-replay_export_2026-10-17T05-48-00.json`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("form-replay_export_{}.json", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Result of merging an import file into the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// Elements that passed validation
    pub valid: usize,
    /// Snapshots actually added
    pub added: Vec<FormSnapshot>,
}

/// Parse an import file into its valid snapshots.
///
/// The file must be a JSON array. An element is kept if it has a non-empty
/// `id`, `title` and `url` and an array `fields`; anything else is dropped.
/// A missing `timestamp` reads as 0. Field entries that do not decode are
/// dropped one by one without losing the rest of the snapshot.
pub fn parse_import(text: &str) -> Result<Vec<FormSnapshot>, FormError> {
    let parsed: Value = serde_json::from_str(text).map_err(|e| FormError::parse("import", e))?;
    let Value::Array(items) = parsed else {
        return Err(FormError::InvalidImport("expected a JSON array".into()));
    };

    let total = items.len();
    let valid: Vec<FormSnapshot> = items
        .into_iter()
        .filter(has_required_shape)
        .filter_map(decode_snapshot)
        .collect();

    tracing::debug!(total, valid = valid.len(), "parsed import file");
    Ok(valid)
}

fn decode_snapshot(mut item: Value) -> Option<FormSnapshot> {
    let raw_fields = match item.get_mut("fields").map(Value::take) {
        Some(Value::Array(fields)) => fields,
        _ => Vec::new(),
    };
    item["fields"] = Value::Array(Vec::new());

    let mut form = match serde_json::from_value::<FormSnapshot>(item) {
        Ok(form) => form,
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed snapshot");
            return None;
        }
    };

    form.fields = raw_fields
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<FieldDescriptor>(raw) {
            Ok(field) => Some(field),
            Err(e) => {
                tracing::debug!(snapshot = %form.id, error = %e, "dropping malformed field");
                None
            }
        })
        .collect();
    Some(form)
}

fn has_required_shape(item: &Value) -> bool {
    let non_empty = |key: &str| item.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    non_empty("id")
        && non_empty("title")
        && non_empty("url")
        && item.get("fields").is_some_and(Value::is_array)
}

/// Union keyed by id. Stored snapshots win over imported ones, and earlier
/// file entries win over later ones with the same id.
pub fn merge_import(existing: &[FormSnapshot], imported: Vec<FormSnapshot>) -> ImportOutcome {
    let valid = imported.len();
    let mut seen: HashSet<String> = existing.iter().map(|f| f.id.clone()).collect();
    let added = imported
        .into_iter()
        .filter(|f| seen.insert(f.id.clone()))
        .collect();

    ImportOutcome { valid, added }
}
