//! Error types for explorar.

/// Result type alias for explorar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in explorar operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No handler is registered for a structure type, and the default
    /// handler is missing too.
    #[error("No handler found for type: {ds_type}")]
    NoHandler {
        /// The structure type that failed to resolve.
        ds_type: String,
    },

    /// A handler with the same id is already registered and the manager
    /// was configured to reject duplicates.
    #[error("Handler '{id}' is already registered")]
    HandlerConflict {
        /// The conflicting handler id.
        id: String,
    },

    /// Saved-objects client error.
    #[error("Saved objects error: {message}")]
    SavedObjects {
        /// Description of the client failure.
        message: String,
    },

    /// Search client error.
    #[error("Search error: {message}")]
    Search {
        /// Description of the search failure.
        message: String,
    },

    /// Index-patterns service error.
    #[error("Index pattern error: {message}")]
    IndexPattern {
        /// Description of the service failure.
        message: String,
    },

    /// Internal storage error (lock acquisition, cache state).
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// Invalid configuration or malformed call arguments.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a no-handler error.
    pub fn no_handler(ds_type: impl Into<String>) -> Self {
        Self::NoHandler {
            ds_type: ds_type.into(),
        }
    }

    /// Create a handler conflict error.
    pub fn handler_conflict(id: impl Into<String>) -> Self {
        Self::HandlerConflict { id: id.into() }
    }

    /// Create a saved-objects client error.
    pub fn saved_objects(message: impl Into<String>) -> Self {
        Self::SavedObjects {
            message: message.into(),
        }
    }

    /// Create a search client error.
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create an index-patterns service error.
    pub fn index_pattern(message: impl Into<String>) -> Self {
        Self::IndexPattern {
            message: message.into(),
        }
    }

    /// Create an internal storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_handler() {
        let err = Error::no_handler("UNREGISTERED");
        assert_eq!(err.to_string(), "No handler found for type: UNREGISTERED");
    }

    #[test]
    fn test_handler_conflict() {
        let err = Error::handler_conflict("INDEX");
        assert!(err.to_string().contains("INDEX"));
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_saved_objects_error() {
        let err = Error::saved_objects("connection refused");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_search_error() {
        let err = Error::search("shard failure");
        assert!(err.to_string().contains("shard failure"));
    }

    #[test]
    fn test_index_pattern_error() {
        let err = Error::index_pattern("create failed");
        assert!(err.to_string().contains("create failed"));
    }

    #[test]
    fn test_storage_error() {
        let err = Error::storage("failed to acquire lock");
        assert!(err.to_string().contains("failed to acquire lock"));
    }

    #[test]
    fn test_invalid_config() {
        let err = Error::invalid_config("fetch path must not be empty");
        assert!(err.to_string().contains("fetch path must not be empty"));
    }

    #[test]
    fn test_json_error_display() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json");
        assert!(parse_err.is_err());
        if let Err(source) = parse_err {
            let err: Error = source.into();
            assert!(err.to_string().starts_with("JSON error"));
        }
    }
}
