use serde::Serialize;

use crate::agent::error::DomError;
use crate::dom::dom_model::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
    KeyDown,
    KeyPress,
    KeyUp,
    Paste,
    Focus,
    Blur,
    Submit,
}

/// A DOM event as seen by page listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomEvent {
    pub kind: EventKind,
    pub bubbles: bool,
    pub cancelable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clipboard: Option<ClipboardData>,
}

impl DomEvent {
    fn new(kind: EventKind, bubbles: bool, cancelable: bool) -> Self {
        DomEvent {
            kind,
            bubbles,
            cancelable,
            key: None,
            clipboard: None,
        }
    }

    pub fn input() -> Self {
        Self::new(EventKind::Input, true, false)
    }

    pub fn change() -> Self {
        Self::new(EventKind::Change, true, false)
    }

    /// keydown / keypress / keyup carrying one character.
    pub fn keyboard(kind: EventKind, key: char) -> Self {
        DomEvent {
            key: Some(key),
            ..Self::new(kind, true, false)
        }
    }

    pub fn paste(clipboard: ClipboardData) -> Self {
        DomEvent {
            clipboard: Some(clipboard),
            ..Self::new(EventKind::Paste, true, true)
        }
    }

    pub fn focus() -> Self {
        Self::new(EventKind::Focus, false, false)
    }

    pub fn blur() -> Self {
        Self::new(EventKind::Blur, false, false)
    }

    pub fn submit() -> Self {
        Self::new(EventKind::Submit, true, true)
    }
}

/// Clipboard payload attached to a paste event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClipboardData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_plain: Option<String>,
    #[serde(skip)]
    writable: bool,
}

impl ClipboardData {
    /// Empty transfer object; writes fail when the page does not support them.
    pub fn new(supported: bool) -> Self {
        ClipboardData {
            text_plain: None,
            writable: supported,
        }
    }

    pub fn set_data(&mut self, format: &str, data: &str) -> Result<(), DomError> {
        if !self.writable {
            return Err(DomError::ClipboardUnavailable);
        }
        if format == "text/plain" {
            self.text_plain = Some(data.to_string());
        }
        Ok(())
    }
}

/// One dispatched event, in dispatch order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub target: NodeId,
    pub event: DomEvent,
}
