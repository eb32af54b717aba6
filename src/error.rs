// Typed errors with thiserror. Every variant is recoverable and surfaces as a
// dismissible notification; nothing here is fatal to the page.

use thiserror::Error;

/// Site error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid margin `{0}`: expected 1 to 4 pixel values")]
    InvalidMargin(String),

    #[error("Please fix the highlighted fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("{0}")]
    TransientIo(String),

    #[error("{capability} unavailable: {message}")]
    IntegrationUnavailable { capability: String, message: String },

    #[error("Unknown project: {0}")]
    UnknownItem(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SiteError {
    /// No condition on the page is fatal; kept as a method so callers can
    /// branch on it the same way for every variant.
    pub fn is_fatal(&self) -> bool {
        false
    }

    /// Whether the user can retry the same action with the same state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SiteError::TransientIo(_))
    }
}

impl From<serde_json::Error> for SiteError {
    fn from(err: serde_json::Error) -> Self {
        SiteError::Serialization(err.to_string())
    }
}

impl From<SiteError> for wasm_bindgen::JsValue {
    fn from(err: SiteError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
