use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Immutable node: {0}")]
    ImmutabilityViolation(String),

    #[error("Collision in generated principal names: {0}")]
    Collision(String),

    #[error("Authorizable '{0}' not found")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl SyncError {
    /// True for failures a transport should answer with "forbidden"
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::ImmutabilityViolation(_))
    }

    /// True for failures caused by the request itself rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::ImmutabilityViolation(_) | Self::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;


impl<T> From<std::sync::PoisonError<T>> for SyncError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
