use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::agent::error::{DomError, FormError};
use crate::dom::events::{DomEvent, EventKind, EventRecord};

/// Index of an element inside a `Document` arena. Arena order is document order.
pub type NodeId = usize;

// ============================================================================
// Page fixture (serialized tree form)
// ============================================================================

/// A page as a JSON tree, the shape pages are loaded from and written back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFixture {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(
        rename = "supportsClipboardData",
        default = "default_true",
        skip_serializing_if = "is_true"
    )]
    pub supports_clipboard_data: bool,
    #[serde(default)]
    pub body: Vec<DomNode>,
}

/// One element of a page fixture, with its children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "className", default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub html_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Option values of a select, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Inline `background-color`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub background: String,
    /// Host-page listener that submits the owning form on `change`
    #[serde(rename = "submitOnChange", default, skip_serializing_if = "is_false")]
    pub submit_on_change: bool,
    /// Element cannot be read or written (cross-origin restriction)
    #[serde(default, skip_serializing_if = "is_false")]
    pub restricted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomNode>,
}

fn default_true() -> bool { true }
fn is_true(b: &bool) -> bool { *b }
fn is_false(b: &bool) -> bool { !*b }

// ============================================================================
// Live document (arena form)
// ============================================================================

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub id: String,
    pub name: String,
    pub class_name: String,
    /// Lowercased `type`; inputs without one report "text"
    pub input_type: Option<String>,
    pub html_for: Option<String>,
    pub text: Option<String>,
    pub value: String,
    pub checked: bool,
    pub placeholder: Option<String>,
    pub options: Vec<String>,
    pub background: String,
    pub submit_on_change: bool,
    pub restricted: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Element {
    fn has_class_tokens(&self, wanted: &[&str]) -> bool {
        let own: Vec<&str> = self.class_name.split_whitespace().collect();
        !wanted.is_empty() && wanted.iter().all(|w| own.contains(w))
    }
}

/// A notification overlay shown on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub dismissed: bool,
}

pub type GuardId = u64;

/// In-memory DOM: elements in document order plus everything a replay can
/// observe (dispatched events, submit attempts, notifications, focus).
#[derive(Debug, Clone)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub supports_clipboard_data: bool,
    nodes: Vec<Element>,
    roots: Vec<NodeId>,
    focused: Option<NodeId>,
    event_log: Vec<EventRecord>,
    submit_guards: HashMap<NodeId, Vec<GuardId>>,
    next_guard: GuardId,
    submitted: Vec<NodeId>,
    blocked_submits: usize,
    notifications: Vec<Notification>,
}

impl Document {
    pub fn from_fixture(fixture: PageFixture) -> Self {
        let mut doc = Document {
            url: fixture.url,
            title: fixture.title,
            supports_clipboard_data: fixture.supports_clipboard_data,
            nodes: Vec::new(),
            roots: Vec::new(),
            focused: None,
            event_log: Vec::new(),
            submit_guards: HashMap::new(),
            next_guard: 1,
            submitted: Vec::new(),
            blocked_submits: 0,
            notifications: Vec::new(),
        };

        for node in fixture.body {
            let id = doc.push_node(node, None);
            doc.roots.push(id);
        }

        doc
    }

    pub fn from_json(json: &str) -> Result<Self, FormError> {
        let fixture: PageFixture =
            serde_json::from_str(json).map_err(|e| FormError::parse("page fixture", e))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Pre-order insertion keeps arena ids in document order.
    fn push_node(&mut self, node: DomNode, parent: Option<NodeId>) -> NodeId {
        let tag = node.tag.to_lowercase();
        let input_type = match (&node.r#type, tag.as_str()) {
            (Some(t), _) => Some(t.to_lowercase()),
            (None, "input") => Some("text".to_string()),
            (None, _) => None,
        };

        let id = self.nodes.len();
        self.nodes.push(Element {
            tag,
            id: node.id,
            name: node.name,
            class_name: node.class_name,
            input_type,
            html_for: node.html_for,
            text: node.text,
            value: node.value,
            checked: node.checked,
            placeholder: node.placeholder,
            options: node.options,
            background: node.background,
            submit_on_change: node.submit_on_change,
            restricted: node.restricted,
            parent,
            children: Vec::new(),
        });

        for child in node.children {
            let child_id = self.push_node(child, Some(id));
            self.nodes[id].children.push(child_id);
        }

        id
    }

    pub fn to_fixture(&self) -> PageFixture {
        PageFixture {
            url: self.url.clone(),
            title: self.title.clone(),
            supports_clipboard_data: self.supports_clipboard_data,
            body: self.roots.iter().map(|&r| self.node_to_fixture(r)).collect(),
        }
    }

    fn node_to_fixture(&self, id: NodeId) -> DomNode {
        let el = &self.nodes[id];
        // Default input type is implied, not written back
        let r#type = match (&el.input_type, el.tag.as_str()) {
            (Some(t), "input") if t == "text" => None,
            (t, _) => t.clone(),
        };
        DomNode {
            tag: el.tag.clone(),
            id: el.id.clone(),
            name: el.name.clone(),
            class_name: el.class_name.clone(),
            r#type,
            html_for: el.html_for.clone(),
            text: el.text.clone(),
            value: el.value.clone(),
            checked: el.checked,
            placeholder: el.placeholder.clone(),
            options: el.options.clone(),
            background: el.background.clone(),
            submit_on_change: el.submit_on_change,
            restricted: el.restricted,
            children: el.children.iter().map(|&c| self.node_to_fixture(c)).collect(),
        }
    }

    // ------------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------------

    /// Raw node access, ignoring restrictions. Used for tree walking.
    pub fn node(&self, id: NodeId) -> Result<&Element, DomError> {
        self.nodes.get(id).ok_or(DomError::NoSuchNode(id))
    }

    /// Checked access: restricted elements cannot be read.
    pub fn element(&self, id: NodeId) -> Result<&Element, DomError> {
        let el = self.node(id)?;
        if el.restricted {
            return Err(DomError::AccessDenied {
                node: id,
                tag: el.tag.clone(),
            });
        }
        Ok(el)
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        self.element(id)?;
        Ok(&mut self.nodes[id])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------------
    // Queries (document order)
    // ------------------------------------------------------------------------

    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].tag == tag)
            .collect()
    }

    /// First element whose id matches. Hitting a restricted match is an error.
    pub fn element_by_id(&self, id: &str) -> Result<Option<NodeId>, DomError> {
        match (0..self.nodes.len()).find(|&i| self.nodes[i].id == id) {
            Some(i) => self.element(i).map(|_| Some(i)),
            None => Ok(None),
        }
    }

    pub fn elements_by_name(&self, name: &str) -> Result<Vec<NodeId>, DomError> {
        self.collect_checked(|el| el.name == name)
    }

    /// Elements carrying every class in the space-separated `class_names`.
    pub fn elements_by_class_name(&self, class_names: &str) -> Result<Vec<NodeId>, DomError> {
        let wanted: Vec<&str> = class_names.split_whitespace().collect();
        self.collect_checked(|el| el.has_class_tokens(&wanted))
    }

    fn collect_checked(&self, pred: impl Fn(&Element) -> bool) -> Result<Vec<NodeId>, DomError> {
        let mut out = Vec::new();
        for i in 0..self.nodes.len() {
            if pred(&self.nodes[i]) {
                self.element(i)?;
                out.push(i);
            }
        }
        Ok(out)
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(el) = self.nodes.get(id) {
            if let Some(t) = &el.text {
                out.push_str(t);
            }
            for &c in &el.children {
                self.collect_text(c, out);
            }
        }
    }

    /// Nearest ancestor-or-self with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(i) = cur {
            let el = self.nodes.get(i)?;
            if el.tag == tag {
                return Some(i);
            }
            cur = el.parent;
        }
        None
    }

    /// Preceding siblings, nearest first.
    pub fn previous_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let siblings = match self.nodes.get(id).and_then(|el| el.parent) {
            Some(p) => &self.nodes[p].children,
            None => &self.roots,
        };
        match siblings.iter().position(|&s| s == id) {
            Some(pos) => siblings[..pos].iter().rev().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Index of the selected option, -1 when nothing is selected.
    pub fn selected_index(&self, id: NodeId) -> Result<i64, DomError> {
        let el = self.element(id)?;
        Ok(el
            .options
            .iter()
            .position(|o| *o == el.value)
            .map(|p| p as i64)
            .unwrap_or(-1))
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Sets `value`. A select only accepts one of its option values; anything
    /// else leaves it unselected.
    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        if el.tag == "select" && !el.options.iter().any(|o| o == value) {
            el.value = String::new();
        } else {
            el.value = value.to_string();
        }
        Ok(())
    }

    pub fn append_value(&mut self, id: NodeId, ch: char) -> Result<(), DomError> {
        self.element_mut(id)?.value.push(ch);
        Ok(())
    }

    /// Sets `checked`. Checking a radio unchecks the rest of its group.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        el.checked = checked;

        let is_radio = el.input_type.as_deref() == Some("radio");
        let group = el.name.clone();
        if checked && is_radio && !group.is_empty() {
            let owner = self.closest(id, "form");
            for other in 0..self.nodes.len() {
                let o = &self.nodes[other];
                if other != id
                    && o.input_type.as_deref() == Some("radio")
                    && o.name == group
                    && !o.restricted
                    && self.closest(other, "form") == owner
                {
                    self.nodes[other].checked = false;
                }
            }
        }
        Ok(())
    }

    pub fn set_background(&mut self, id: NodeId, color: &str) -> Result<(), DomError> {
        self.element_mut(id)?.background = color.to_string();
        Ok(())
    }

    pub fn focus(&mut self, id: NodeId) -> Result<(), DomError> {
        self.element(id)?;
        self.focused = Some(id);
        self.record(id, DomEvent::focus());
        Ok(())
    }

    pub fn blur(&mut self, id: NodeId) -> Result<(), DomError> {
        self.element(id)?;
        if self.focused == Some(id) {
            self.focused = None;
        }
        self.record(id, DomEvent::blur());
        Ok(())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // ------------------------------------------------------------------------
    // Events & submission
    // ------------------------------------------------------------------------

    /// Dispatches an event at `target`, running host-page listeners.
    pub fn dispatch_event(&mut self, target: NodeId, event: DomEvent) -> Result<(), DomError> {
        let submit_on_change = self.element(target)?.submit_on_change;
        let is_change = event.kind == EventKind::Change;
        self.record(target, event);

        if is_change && submit_on_change {
            if let Some(form) = self.closest(target, "form") {
                self.request_submit(form);
            }
        }
        Ok(())
    }

    fn record(&mut self, target: NodeId, event: DomEvent) {
        self.event_log.push(EventRecord { target, event });
    }

    /// Fires `submit` on a form. Returns true when the submission went through.
    pub fn request_submit(&mut self, form: NodeId) -> bool {
        self.record(form, DomEvent::submit());
        let intercepted = self
            .submit_guards
            .get(&form)
            .is_some_and(|guards| !guards.is_empty());

        if intercepted {
            self.blocked_submits += 1;
            false
        } else {
            self.submitted.push(form);
            true
        }
    }

    /// Installs one capturing submit interceptor on every form.
    pub fn install_submit_guard(&mut self) -> GuardId {
        let guard = self.next_guard;
        self.next_guard += 1;
        for form in self.elements_by_tag("form") {
            self.submit_guards.entry(form).or_default().push(guard);
        }
        guard
    }

    pub fn remove_submit_guard(&mut self, guard: GuardId) {
        for guards in self.submit_guards.values_mut() {
            guards.retain(|g| *g != guard);
        }
        self.submit_guards.retain(|_, guards| !guards.is_empty());
    }

    pub fn has_submit_guard(&self) -> bool {
        !self.submit_guards.is_empty()
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.event_log
    }

    pub fn events_for(&self, target: NodeId) -> Vec<&DomEvent> {
        self.event_log
            .iter()
            .filter(|r| r.target == target)
            .map(|r| &r.event)
            .collect()
    }

    pub fn count_events(&self, kind: EventKind) -> usize {
        self.event_log.iter().filter(|r| r.event.kind == kind).count()
    }

    pub fn submitted_forms(&self) -> &[NodeId] {
        &self.submitted
    }

    pub fn blocked_submits(&self) -> usize {
        self.blocked_submits
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    pub fn show_notification(&mut self, message: impl Into<String>) -> usize {
        self.notifications.push(Notification {
            message: message.into(),
            dismissed: false,
        });
        self.notifications.len() - 1
    }

    pub fn dismiss_notification(&mut self, index: usize) {
        if let Some(n) = self.notifications.get_mut(index) {
            n.dismissed = true;
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }
}
