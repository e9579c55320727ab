//! Core error types.

use thiserror::Error;

/// Errors raised while building the job catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("job factory {0} is already registered")]
    AlreadyRegistered(String),

    #[error("invalid catalog identity {0:?}")]
    InvalidIdentity(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_registered_display() {
        let err = CatalogError::AlreadyRegistered("Heartbeat".to_string());
        assert!(err.to_string().contains("Heartbeat"));
        assert!(err.to_string().contains("already registered"));
    }
}
