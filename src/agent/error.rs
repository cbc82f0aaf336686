use crate::dom::dom_model::NodeId;

/// Failures raised while touching the live page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Element belongs to a restricted context (e.g. a cross-origin frame)
    #[error("access to <{tag}> element {node} is restricted")]
    AccessDenied { node: NodeId, tag: String },

    /// Node id does not exist in the document
    #[error("no node with id {0}")]
    NoSuchNode(NodeId),

    /// DataTransfer construction is unsupported by the page
    #[error("clipboard data is not supported on this page")]
    ClipboardUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Dom(#[from] DomError),

    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed (page fixture, store file, import file, message)
    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failed
    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Import file is not a JSON array of snapshots
    #[error("Invalid file format: {0}")]
    InvalidImport(String),

    /// Page URL uses a scheme the agent cannot run on
    #[error("Cannot access this page: {0}")]
    RestrictedPage(String),

    #[error("No active tab found")]
    NoActiveTab,

    #[error("No form fields found on this page")]
    EmptyCapture,

    /// Page agent answered with `success: false`
    #[error("{0}")]
    Agent(String),

    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// Key-value store backend failure
    #[error("Storage error: {0}")]
    Store(String),
}

impl FormError {
    pub fn parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        FormError::JsonParse {
            context: context.into(),
            source,
        }
    }

    pub fn serialize(context: impl Into<String>, source: serde_json::Error) -> Self {
        FormError::JsonSerialize {
            context: context.into(),
            source,
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        FormError::Io {
            path: path.into(),
            source,
        }
    }
}
