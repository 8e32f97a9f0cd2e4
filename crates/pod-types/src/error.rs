//! The classified error taxonomy shared by every pod crate.

use std::io;

use http::StatusCode;
use pod_rdf::RdfError;
use thiserror::Error;

/// An error carrying the HTTP classification it should surface as.
///
/// Components never return untyped failures: whatever goes wrong is mapped to
/// one of these variants so the server can pick a status code directly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The request is malformed (bad header value, unparseable body).
    #[error("{0}")]
    BadRequest(String),

    /// The target does not exist or lies outside the store.
    #[error("{0}")]
    NotFound(String),

    /// The method is not allowed on the target (root delete, bad parent).
    #[error("{0}")]
    MethodNotAllowed(String),

    /// The request conflicts with the current state of the target.
    #[error("{0}")]
    Conflict(String),

    /// The payload has a type this component cannot accept.
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// The request is understood but not supported.
    #[error("{0}")]
    NotImplemented(String),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl HttpError {
    /// Rebuild a classification from a status code.
    ///
    /// Unknown client codes become [`HttpError::BadRequest`], unknown server
    /// codes [`HttpError::Internal`].
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::METHOD_NOT_ALLOWED => Self::MethodNotAllowed(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => Self::UnsupportedMediaType(message),
            StatusCode::NOT_IMPLEMENTED => Self::NotImplemented(message),
            s if s.is_server_error() => Self::Internal(message),
            _ => Self::BadRequest(message),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::NotFound(m)
            | Self::MethodNotAllowed(m)
            | Self::Conflict(m)
            | Self::UnsupportedMediaType(m)
            | Self::NotImplemented(m)
            | Self::Internal(m) => m,
        }
    }

    /// Returns `true` for 5xx classifications.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented(message.into())
    }
}

impl From<io::Error> for HttpError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<RdfError> for HttpError {
    fn from(err: RdfError) -> Self {
        if err.is_input_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

/// Result alias used across the pod crates.
pub type HttpResult<T> = Result<T, HttpError>;
