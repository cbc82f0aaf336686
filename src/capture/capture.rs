use crate::agent::error::DomError;
use crate::capture::label::resolve_label;
use crate::capture::snapshot_model::{
    FieldDescriptor, FieldIdentity, FieldKind, FieldValue, FormSnapshot,
};
use crate::dom::dom_model::{Document, NodeId};

/// Input subtypes that never carry re-fillable state.
const EXCLUDED_INPUT_TYPES: [&str; 5] = ["submit", "button", "image", "reset", "file"];

/// Capture every qualifying form control on the page, stamped with the current time.
pub fn capture(doc: &Document) -> FormSnapshot {
    capture_at(doc, chrono::Utc::now().timestamp_millis())
}

/// Capture with an explicit timestamp.
///
/// Fields come out inputs first, then textareas, then selects, each in
/// document order. Only truthy values are kept. A control that cannot be
/// read is logged and skipped.
pub fn capture_at(doc: &Document, timestamp: i64) -> FormSnapshot {
    let mut fields = Vec::new();

    for kind in [FieldKind::Input, FieldKind::Textarea, FieldKind::Select] {
        for (index, node) in doc.elements_by_tag(kind.tag()).into_iter().enumerate() {
            match capture_control(doc, node, kind, index) {
                Ok(Some(field)) => fields.push(field),
                Ok(None) => {}
                Err(e) => tracing::warn!(node, error = %e, "Could not capture field"),
            }
        }
    }

    tracing::debug!(count = fields.len(), url = %doc.url, "captured form fields");

    FormSnapshot {
        id: String::new(),
        url: doc.url.clone(),
        title: page_title(doc),
        timestamp,
        fields,
    }
}

fn capture_control(
    doc: &Document,
    node: NodeId,
    kind: FieldKind,
    index: usize,
) -> Result<Option<FieldDescriptor>, DomError> {
    let el = doc.element(node)?;

    let (input_type, value, selected_index) = match kind {
        FieldKind::Input => {
            let t = el.input_type.clone().unwrap_or_else(|| "text".to_string());
            if EXCLUDED_INPUT_TYPES.contains(&t.as_str()) {
                return Ok(None);
            }
            let value = if t == "checkbox" || t == "radio" {
                FieldValue::Checked(el.checked)
            } else {
                FieldValue::Text(el.value.clone())
            };
            (Some(t), value, None)
        }
        FieldKind::Textarea => (None, FieldValue::Text(el.value.clone()), None),
        FieldKind::Select => (
            None,
            FieldValue::Text(el.value.clone()),
            Some(doc.selected_index(node)?),
        ),
    };

    if !value.is_truthy() {
        return Ok(None);
    }

    Ok(Some(FieldDescriptor {
        kind,
        input_type,
        identity: FieldIdentity {
            id: el.id.clone(),
            name: el.name.clone(),
            class_name: el.class_name.clone(),
        },
        placeholder: el.placeholder.clone().unwrap_or_default(),
        label: resolve_label(doc, node),
        value: Some(value),
        selected_index,
        position_index: position_index(doc, node, &el.class_name, index),
    }))
}

/// Ordinal used by the class fallback at replay time: the control's position
/// among elements sharing its class list, or among same-kind controls when it
/// has no class.
fn position_index(doc: &Document, node: NodeId, class_name: &str, kind_index: usize) -> usize {
    if class_name.trim().is_empty() {
        return kind_index;
    }
    doc.elements_by_class_name(class_name)
        .ok()
        .and_then(|same_class| same_class.iter().position(|&n| n == node))
        .unwrap_or(kind_index)
}

/// Document title, falling back to the URL's host.
fn page_title(doc: &Document) -> String {
    if !doc.title.trim().is_empty() {
        return doc.title.clone();
    }
    hostname(&doc.url).unwrap_or_else(|| doc.url.clone())
}

/// Host part of `url`; IPv6 hosts keep their brackets. `None` for URLs
/// without a host or that do not parse.
pub fn hostname(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed.host_str().filter(|h| !h.is_empty()).map(str::to_string)
}
