//! Global application error types.
//!
//! Every failure in the frontend resolves to one of these variants, which the
//! page layer turns into an inline message, a flash alert or a redirect to the
//! sign-in page. Nothing here is fatal to the process.

use thiserror::Error;
use validator::ValidationErrors;

/// Generic service error used by the backend client, the form workflows and
/// the page handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Field-specific validation failures collected before any backend call.
    #[error("Invalid input: {}", errors.join(", "))]
    InvalidInput { errors: Vec<String> },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    /// The backend answered with a non-success status.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The backend could not be reached or its response could not be decoded.
    #[error("External service error: {message}")]
    ExternalService { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_input(errors: Vec<String>) -> Self {
        Self::InvalidInput { errors }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn external_service(message: impl Into<String>) -> Self {
        Self::ExternalService {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Flattens `validator` output into `field: message` strings, sorted by
    /// field so the rendered list is stable.
    pub fn from_validation(errors: ValidationErrors) -> Self {
        Self::InvalidInput {
            errors: field_messages(&errors),
        }
    }

    /// True when the session behind the request is no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
            || matches!(self, Self::Backend { status: 401, .. })
    }

    /// Messages suitable for showing to the visitor.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { errors } => errors.clone(),
            Self::Validation { message }
            | Self::Unauthorized { message }
            | Self::PermissionDenied { message }
            | Self::Backend { message, .. } => vec![message.clone()],
            Self::NotFound { entity, .. } => vec![format!("{} not found", entity)],
            Self::ExternalService { .. } => {
                vec!["We could not reach the server. Please try again.".to_string()]
            }
            Self::Internal { .. } => vec!["Something went wrong. Please try again.".to_string()],
        }
    }
}

/// `field: message` pairs from a `validator` error set.
pub fn field_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error.message.as_ref().unwrap_or(&"Invalid value".into())
                )
            })
        })
        .collect()
}
