use serde::{Deserialize, Serialize};

// ============================================================================
// Snapshot data model: the sole contract between capture and replay
// ============================================================================

/// Which kind of form control a descriptor was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Input,
    Textarea,
    Select,
}

impl FieldKind {
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Input => "input",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
        }
    }
}

/// Captured value: checked-state for checkbox/radio, text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Checked(bool),
    Text(String),
}

impl FieldValue {
    /// Non-empty text or `true`.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Checked(b) => *b,
            FieldValue::Text(s) => !s.is_empty(),
        }
    }

    /// String form, as written into a text control.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Checked(b) => b.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// Attributes used to find the control again. Empty means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIdentity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "className", default)]
    pub class_name: String,
}

/// One captured form control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Input subtype (text, checkbox, radio, password...), inputs only
    #[serde(rename = "inputType", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    #[serde(flatten)]
    pub identity: FieldIdentity,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placeholder: String,

    #[serde(default)]
    pub label: String,

    /// `None` only for foreign data (e.g. an imported `null`)
    #[serde(default)]
    pub value: Option<FieldValue>,

    /// Informational; replay never consults it
    #[serde(rename = "selectedIndex", default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<i64>,

    /// Capture-time ordinal among elements sharing `className`, or among
    /// same-kind controls when there is no class
    #[serde(rename = "index", default)]
    pub position_index: usize,
}

impl FieldDescriptor {
    pub fn is_toggle(&self) -> bool {
        self.kind == FieldKind::Input
            && matches!(self.input_type.as_deref(), Some("checkbox") | Some("radio"))
    }

    pub fn has_truthy_value(&self) -> bool {
        self.value.as_ref().is_some_and(FieldValue::is_truthy)
    }

    /// Short human description for logs.
    pub fn describe(&self) -> String {
        let FieldIdentity { id, name, class_name } = &self.identity;
        if !id.is_empty() {
            format!("{}#{}", self.kind.tag(), id)
        } else if !name.is_empty() {
            format!("{}[name={}]", self.kind.tag(), name)
        } else if !class_name.is_empty() {
            format!("{}.{}[{}]", self.kind.tag(), class_name, self.position_index)
        } else {
            format!("{}[{}]", self.kind.tag(), self.position_index)
        }
    }
}

/// One saved form capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    /// Assigned at save time; empty straight out of capture
    #[serde(default)]
    pub id: String,
    pub url: String,
    pub title: String,
    /// Capture instant, epoch milliseconds; 0 when an import omits it
    #[serde(default)]
    pub timestamp: i64,
    pub fields: Vec<FieldDescriptor>,
}

impl FormSnapshot {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Generate a snapshot id: `form_<epoch-ms>_<9 base-36 chars>`.
pub fn generate_snapshot_id(now_ms: i64) -> String {
    use rand::Rng;

    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("form_{}_{}", now_ms, suffix)
}
