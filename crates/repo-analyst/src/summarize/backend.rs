use thiserror::Error;

/// Failures of the external summarization capability.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("No API key configured: {0}")]
    MissingApiKey(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A synchronous text-in, text-out generation service.
pub trait SummarizationBackend: Send + Sync {
    fn generate(&self, instruction: &str, content: &str) -> Result<String, BackendError>;
}

/// Maps a non-success HTTP status to a [`BackendError`].
pub fn parse_http_error(status: u16, body: &str) -> BackendError {
    match status {
        401 => BackendError::Authentication("Invalid API key".to_string()),
        403 => BackendError::Authentication("Access denied".to_string()),
        429 => BackendError::RateLimited(body.to_string()),
        _ => BackendError::Http {
            status,
            body: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_error() {
        assert!(matches!(parse_http_error(401, ""), BackendError::Authentication(_)));
        assert!(matches!(parse_http_error(403, ""), BackendError::Authentication(_)));
        assert!(matches!(parse_http_error(429, "quota"), BackendError::RateLimited(m) if m == "quota"));
        assert!(matches!(
            parse_http_error(503, "down"),
            BackendError::Http { status: 503, .. }
        ));
    }
}
