//! Error types for RDF reading and writing.

use thiserror::Error;

/// Errors produced while parsing or serialising RDF syntaxes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RdfError {
    /// The input is not well-formed.
    #[error("invalid {format}: {message}")]
    Syntax {
        format: &'static str,
        message: String,
    },

    /// The IRI given to resolve relative references against is not absolute.
    #[error("invalid base IRI {iri:?}: {message}")]
    BaseIri { iri: String, message: String },

    /// Output could not be produced.
    #[error("cannot write {format}: {message}")]
    Write {
        format: &'static str,
        message: String,
    },
}

impl RdfError {
    pub fn syntax(format: &'static str, message: impl ToString) -> Self {
        Self::Syntax {
            format,
            message: message.to_string(),
        }
    }

    pub fn write(format: &'static str, message: impl ToString) -> Self {
        Self::Write {
            format,
            message: message.to_string(),
        }
    }

    /// Returns `true` if the input itself was at fault.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Write { .. })
    }
}

/// Result alias for RDF operations.
pub type RdfResult<T> = Result<T, RdfError>;
