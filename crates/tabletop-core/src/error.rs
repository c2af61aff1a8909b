//! Errors returned by mutation services and the authorization gate
//!
//! Publishing never fails, so there is no broker error.

/// Failure of a state-changing operation
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Zero ids, empty text, unsupported values
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced table, scene, object, message or member does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller failed the master, owner or author check
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Repository failure
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl SyncError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Storage(_) => "internal",
        }
    }
}

/// Result type for mutation services
pub type SyncResult<T> = Result<T, SyncError>;
