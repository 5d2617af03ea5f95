use thiserror::Error;

/// Errors produced by the research pipeline.
///
/// Only `Validation` is allowed to escape a research run; every other
/// variant is captured into the run's operations log and the pipeline
/// keeps going with whatever sources remain.
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Invalid argument: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Network request failed: {url} - {message}")]
    Network { url: String, message: String },

    #[error("Request timeout: {url} (timeout: {timeout_ms}ms)")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Parse error: {context} - {message}")]
    Parse { context: String, message: String },

    #[error("No usable content extracted from {url}")]
    NoUsableContent { url: String },

    #[error("Search failed: {query} - {message}")]
    Search { query: String, message: String },
}

impl ResearchError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// True when the error is fatal to a whole run rather than to a
    /// single source or backend.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_validation_is_fatal() {
        assert!(ResearchError::validation("topic", "must not be empty").is_fatal());
        assert!(!ResearchError::network("https://example.com", "dns failure").is_fatal());
        assert!(!ResearchError::NoUsableContent {
            url: "https://example.com".to_string()
        }
        .is_fatal());
        assert!(!ResearchError::Timeout {
            url: "https://example.com".to_string(),
            timeout_ms: 15000
        }
        .is_fatal());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = ResearchError::network("https://example.com", "connection refused");
        let message = err.to_string();
        assert!(message.contains("https://example.com"));
        assert!(message.contains("connection refused"));
    }
}
