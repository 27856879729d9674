use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing or filling a response template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unmatched '{{' at byte {0}")]
    UnclosedBrace(usize),

    #[error("single '}}' encountered at byte {0}")]
    StrayClosingBrace(usize),

    #[error("unsupported placeholder '{{{0}}}'")]
    UnsupportedField(String),

    #[error("cannot switch between automatic and manual field numbering")]
    MixedNumbering,
}

/// A template referenced more captures than were supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("template needs {required} captures but {available} were supplied")]
pub struct MissingCapture {
    pub required: usize,
    pub available: usize,
}

/// Runtime failure of a bot while producing a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The chosen template references more placeholders than the rule captured.
    #[error("template for intent '{intent}' needs {required} captures, got {available}")]
    TemplateMismatch {
        intent: String,
        required: usize,
        available: usize,
    },
}

/// Errors raised while loading rules, responses or lexicons from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule #{index} (intent '{intent}') has an invalid pattern: {source}")]
    Pattern {
        index: usize,
        intent: String,
        #[source]
        source: regex::Error,
    },

    #[error("intent '{intent}' has an invalid template {template:?}: {source}")]
    Template {
        intent: String,
        template: String,
        #[source]
        source: TemplateError,
    },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        LoadError::Json {
            path: path.into(),
            source,
        }
    }
}
