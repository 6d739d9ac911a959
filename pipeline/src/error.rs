use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error taxonomy surfaced to API clients.
///
/// Domain services raise their own typed errors; route handlers convert them
/// into this taxonomy, and the route-invocation processor is the single point
/// that classifies a variant into a status code and serializes the structured
/// body. Internal causes are kept for logs and only echoed to clients when
/// the embedding service runs with error details enabled.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        properties: Option<Value>,
    },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    AlreadyExists { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    Internal {
        message: String,
        cause: Option<String>,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            properties: None,
        }
    }

    pub fn validation_with(message: impl Into<String>, properties: Value) -> Self {
        Self::Validation {
            message: message.into(),
            properties: Some(properties),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            cause: None,
        }
    }

    pub fn internal_with_cause(message: impl Into<String>, cause: impl ToString) -> Self {
        Self::Internal {
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }

    /// Error kind name serialized in the response body.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::Unauthorized { .. } => "Unauthorized",
            Self::NotFound { .. } => "NotFound",
            Self::AlreadyExists { .. } => "AlreadyExists",
            Self::Conflict { .. } => "Conflict",
            Self::Internal { .. } => "InternalServerError",
        }
    }

    /// Status code this error classifies to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Serialize the structured error body.
    ///
    /// Internal errors are redacted unless `include_details` is set; the
    /// original message and cause stay available for logging either way.
    pub fn to_body(&self, include_details: bool) -> Value {
        let (message, properties) = match self {
            Self::Validation { message, properties } => (message.clone(), properties.clone()),
            Self::Internal { message, cause } => {
                if include_details {
                    let properties = cause
                        .as_ref()
                        .map(|cause| serde_json::json!({ "cause": cause }));
                    (message.clone(), properties)
                } else {
                    ("internal server error".to_string(), None)
                }
            }
            other => (other.to_string(), None),
        };

        serde_json::to_value(ErrorBody {
            name: self.name(),
            message,
            properties,
        })
        // ErrorBody contains only strings and already-built Values
        .unwrap_or(Value::Null)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    name: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Value>,
}
