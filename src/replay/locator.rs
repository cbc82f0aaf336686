use crate::agent::error::DomError;
use crate::capture::snapshot_model::FieldDescriptor;
use crate::dom::dom_model::{Document, NodeId};

/// Maps a stored descriptor back to a live element.
pub trait ElementLocator: Send + Sync {
    fn locate(&self, doc: &Document, field: &FieldDescriptor) -> Option<NodeId>;
}

/// id, then first same-named element, then class + capture-time position.
///
/// The class fallback assumes the page keeps the element order it had at
/// capture time. It is fragile: it yields nothing when the index is out of
/// range, and the wrong element when controls were inserted or moved.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomLocator;

impl ElementLocator for DomLocator {
    fn locate(&self, doc: &Document, field: &FieldDescriptor) -> Option<NodeId> {
        match try_locate(doc, field) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(field = %field.describe(), error = %e, "Error finding element");
                None
            }
        }
    }
}

fn try_locate(doc: &Document, field: &FieldDescriptor) -> Result<Option<NodeId>, DomError> {
    let identity = &field.identity;

    if !identity.id.is_empty() {
        if let Some(node) = doc.element_by_id(&identity.id)? {
            tracing::debug!(field = %field.describe(), node, "located by id");
            return Ok(Some(node));
        }
    }

    if !identity.name.is_empty() {
        if let Some(&node) = doc.elements_by_name(&identity.name)?.first() {
            tracing::debug!(field = %field.describe(), node, "located by name");
            return Ok(Some(node));
        }
    }

    if !identity.class_name.is_empty() {
        let matches = doc.elements_by_class_name(&identity.class_name)?;
        if let Some(&node) = matches.get(field.position_index) {
            tracing::debug!(field = %field.describe(), node, "located by class and position");
            return Ok(Some(node));
        }
    }

    Ok(None)
}
