use thiserror::Error;

/// Errors from repository operations (used by trait definitions in quill-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("lock poisoned".to_string());
        assert_eq!(err.to_string(), "query error: lock poisoned");
    }
}
