//! Error types for backend calls.
//!
//! Every network boundary returns [`ApiResult`]. Errors carry a structured
//! [`ErrorContext`] so a failed action can be logged with the operation and
//! resource it belonged to, and [`ApiError::user_message`] gives the text a
//! page shows in its alert.

use std::fmt;

/// Result type for backend operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Structured context for backend errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "fetch_prices", "save_schedule")
    pub operation: Option<String>,
    /// The resource involved (e.g., "listing", "price", "session")
    pub resource: Option<String>,
    /// The resource ID if applicable
    pub resource_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.operation.is_none()
            && self.resource.is_none()
            && self.resource_id.is_none()
            && self.details.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref resource) = self.resource {
            parts.push(format!("resource={}", resource));
        }
        if let Some(ref id) = self.resource_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for backend operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, reset).
    #[error("Network error: {message} {context}")]
    Network {
        message: String,
        context: ErrorContext,
    },

    /// Non-2xx response. `message` is the body's `error` field when the body
    /// was JSON, the raw text when it was not.
    #[error("Server error ({status}): {message} {context}")]
    Server {
        status: u16,
        message: String,
        context: ErrorContext,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("Decode error: {message} {context}")]
    Decode {
        message: String,
        context: ErrorContext,
    },

    /// Input rejected before any request was sent.
    #[error("Validation error: {message} {context}")]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// The caller does not own the resource it tried to change.
    #[error("Forbidden: {message} {context}")]
    Forbidden {
        message: String,
        context: ErrorContext,
    },

    #[error("Conflict: {message} {context}")]
    Conflict {
        message: String,
        context: ErrorContext,
    },

    /// Reading or writing the persisted session failed.
    #[error("Storage error: {message} {context}")]
    Storage {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Network { context, .. }
            | Self::Server { context, .. }
            | Self::Decode { context, .. }
            | Self::Validation { context, .. }
            | Self::NotFound { context, .. }
            | Self::Forbidden { context, .. }
            | Self::Conflict { context, .. }
            | Self::Storage { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Network { context, .. }
            | Self::Server { context, .. }
            | Self::Decode { context, .. }
            | Self::Validation { context, .. }
            | Self::NotFound { context, .. }
            | Self::Forbidden { context, .. }
            | Self::Conflict { context, .. }
            | Self::Storage { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Replace the whole context.
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        *self.context_mut() = context;
        self
    }

    /// HTTP status equivalent, when the error came from (or mimics) a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Validation { .. } => Some(400),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            _ => None,
        }
    }

    /// Text for the user-facing alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => "Connection error".to_string(),
            Self::Server {
                status, message, ..
            } => {
                if message.trim().is_empty() {
                    format!("Server Error (Status {})", status)
                } else {
                    message.clone()
                }
            }
            Self::Decode { .. } => "Invalid JSON response".to_string(),
            Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::Forbidden { message, .. }
            | Self::Conflict { message, .. } => message.clone(),
            Self::Storage { .. } => "Could not access saved session".to_string(),
            Self::Configuration { message, .. } => message.clone(),
        }
    }

    /// Whether the failure happened before the server saw the request.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Storage { .. } | Self::Configuration { .. }
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::server(status.as_u16(), err.to_string())
        } else {
            ApiError::network(err.to_string())
        }
    }
}
