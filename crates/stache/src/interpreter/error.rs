//! Error types for rendering.

use thiserror::Error;

use crate::parser::ParseError;

/// An error that occurred while rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A helper was not found and no `helperMissing` helper is registered
    /// to handle it.
    #[error("helper '{name}' is not registered and no 'helperMissing' helper is available")]
    HelperMissingNotRegistered { name: String },

    /// A partial was not found by name.
    #[error("partial not found: '{name}'")]
    PartialNotFound { name: String },

    /// Blocks or partials nested deeper than the context allows.
    #[error("maximum render depth of {max_depth} exceeded")]
    MaxDepthExceeded { max_depth: usize },

    /// Raised by a host helper.
    #[error("helper '{name}' failed: {message}")]
    Helper { name: String, message: String },

    /// A template compiled during rendering failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl RenderError {
    /// Convenience constructor for helper implementations.
    pub fn helper(name: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::Helper {
            name: name.into(),
            message: message.into(),
        }
    }
}
