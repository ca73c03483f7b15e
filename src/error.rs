use std::path::PathBuf;
use thiserror::Error;

/// Errors from the persisted summary cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not determine the home directory")]
    HomeDirNotFound,
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache entry serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from reading or writing the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    HomeDirNotFound,
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors returned by a text generation service.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// API key is missing or rejected
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Requests-per-minute or token quota exhausted
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Server error (5xx)
    #[error("server error: {0}")]
    Server(String),

    /// Connection failed, DNS, timeout
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The service answered but produced no text
    #[error("empty response")]
    EmptyResponse,
}

impl GenerationError {
    /// Maps an HTTP status without a recognizable error body.
    pub fn from_http_status(status: u16, message: &str) -> Self {
        let message = message.to_string();
        match status {
            401 | 403 => GenerationError::Authentication(message),
            429 => GenerationError::RateLimited(message),
            400 | 404 | 422 => GenerationError::InvalidRequest(message),
            500..=599 => GenerationError::Server(message),
            _ => GenerationError::InvalidResponse(format!("HTTP {}: {}", status, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status() {
        assert!(matches!(
            GenerationError::from_http_status(401, "bad key"),
            GenerationError::Authentication(_)
        ));
        assert!(matches!(
            GenerationError::from_http_status(429, "slow down"),
            GenerationError::RateLimited(_)
        ));
        assert!(matches!(
            GenerationError::from_http_status(503, "unavailable"),
            GenerationError::Server(_)
        ));
        assert_eq!(
            GenerationError::from_http_status(302, "moved").to_string(),
            "invalid response: HTTP 302: moved"
        );
    }
}
