use serde_json::Value;
use thiserror::Error;

/// Classified failure of a backend call made through `ApiClient`.
///
/// Every variant that came from a response keeps the original server payload
/// so callers can branch on structured fields.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Unauthorized {
        message: String,
        payload: Option<Value>,
    },

    #[error("{message}")]
    Forbidden {
        message: String,
        payload: Option<Value>,
    },

    #[error("{message}")]
    BadRequest {
        message: String,
        payload: Option<Value>,
    },

    #[error("Request failed with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// No response was received (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::BadRequest { .. } => Some(400),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server error body, or `None` when no response arrived.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Unauthorized { payload, .. }
            | ApiError::Forbidden { payload, .. }
            | ApiError::BadRequest { payload, .. }
            | ApiError::Status { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::BadRequest { .. })
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// A client-side form validation failure. The dialog keeps its input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{label}: {message}")]
pub struct FormError {
    pub field: String,
    pub label: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
}

/// Failure of a list-page operation.
#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No {0} dialog is open")]
    NoDialog(&'static str),
}
