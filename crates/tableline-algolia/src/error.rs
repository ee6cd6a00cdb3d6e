//! Errors from the Algolia REST API

use tableline_core::PipelineError;

#[derive(Debug, thiserror::Error)]
pub enum AlgoliaError {
    /// HTTP error with optional status code (`None` = transport failure)
    #[error("{}", display_http(*status, message))]
    Http {
        status: Option<u16>,
        message: String,
    },

    /// Response body was not the JSON we expected
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Missing application id or API key
    #[error("missing credentials: {0}")]
    Credentials(String),
}

fn display_http(status: Option<u16>, message: &str) -> String {
    match status {
        Some(s) => format!("HTTP {s}: {message}"),
        None => format!("HTTP error: {message}"),
    }
}

impl AlgoliaError {
    /// Create HTTP error from reqwest error.
    ///
    /// The URL is stripped so hosts and query strings never reach the logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.without_url().to_string(),
        }
    }

    /// Worth trying again, possibly on another host.
    ///
    /// Transport failures, 408, 429 and 5xx are retryable; any other 4xx
    /// means the request itself is wrong.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status: None, .. } => true,
            Self::Http {
                status: Some(s), ..
            } => matches!(s, 408 | 429 | 500..=599),
            Self::InvalidResponse(_) | Self::Credentials(_) => false,
        }
    }
}

impl From<AlgoliaError> for PipelineError {
    fn from(e: AlgoliaError) -> Self {
        PipelineError::Publisher(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: u16) -> AlgoliaError {
        AlgoliaError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn http_403_not_retryable() {
        assert!(!http_err(403).is_retryable());
    }

    #[test]
    fn http_404_not_retryable() {
        assert!(!http_err(404).is_retryable());
    }

    #[test]
    fn http_429_retryable() {
        assert!(http_err(429).is_retryable());
    }

    #[test]
    fn http_503_retryable() {
        assert!(http_err(503).is_retryable());
    }

    #[test]
    fn transport_error_retryable() {
        let err = AlgoliaError::Http {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_response_not_retryable() {
        assert!(!AlgoliaError::InvalidResponse("x".into()).is_retryable());
    }

    #[test]
    fn display_http_with_status() {
        assert_eq!(format!("{}", http_err(400)), "HTTP 400: test");
    }

    #[test]
    fn converts_to_publisher_error() {
        let err: PipelineError = http_err(500).into();
        assert!(matches!(err, PipelineError::Publisher(ref m) if m == "HTTP 500: test"));
    }
}
