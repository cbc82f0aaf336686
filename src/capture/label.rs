use crate::dom::dom_model::{Document, NodeId};

/// Best-effort caption for a control. First match wins:
/// `label[for=id]`, then a wrapping label, then the nearest preceding
/// sibling label. Empty when none applies.
pub fn resolve_label(doc: &Document, control: NodeId) -> String {
    label_for_attribute(doc, control)
        .or_else(|| doc.closest(control, "label"))
        .or_else(|| preceding_label(doc, control))
        .map(|label| doc.text_content(label).trim().to_string())
        .unwrap_or_default()
}

fn label_for_attribute(doc: &Document, control: NodeId) -> Option<NodeId> {
    let id = &doc.node(control).ok()?.id;
    if id.is_empty() {
        return None;
    }

    doc.elements_by_tag("label").into_iter().find(|&l| {
        doc.node(l)
            .ok()
            .and_then(|label| label.html_for.as_deref())
            == Some(id.as_str())
    })
}

fn preceding_label(doc: &Document, control: NodeId) -> Option<NodeId> {
    doc.previous_siblings(control)
        .into_iter()
        .find(|&s| doc.node(s).is_ok_and(|el| el.tag == "label"))
}
