use thiserror::Error;

use crate::poller::FetchError;

/// OVH-specific errors that can occur during API operations.
///
/// SECURITY: Error messages must NEVER contain sensitive data like access tokens.
#[derive(Debug, Error)]
pub enum OvhError {
    /// The access token cannot be used as a header value
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("decode error: {message}")]
    Decode { message: String },
}

// Keeps the HTTP status so the poller can classify it.
impl From<OvhError> for FetchError {
    fn from(err: OvhError) -> Self {
        match err {
            OvhError::Api { status, message } => FetchError::Http { status, message },
            OvhError::Auth { message } => FetchError::Http {
                status: 401,
                message,
            },
            OvhError::Network(e) => FetchError::Network {
                message: e.to_string(),
            },
            OvhError::Decode { message } => FetchError::Decode { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = OvhError::Api {
            status: 403,
            message: "This call has not been granted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (403): This call has not been granted"
        );
    }

    #[test]
    fn test_api_error_keeps_status_as_fetch_error() {
        let err = OvhError::Api {
            status: 404,
            message: "The requested object (taskId = 42) does not exist".to_string(),
        };
        let fetch: FetchError = err.into();
        assert!(fetch.is_transient(&[404, 500]));
    }

    #[test]
    fn test_decode_error_is_fatal_fetch_error() {
        let fetch: FetchError = OvhError::Decode {
            message: "expected value".to_string(),
        }
        .into();
        assert!(matches!(fetch, FetchError::Decode { .. }));
        assert!(!fetch.is_transient(&[404, 500]));
    }

    #[test]
    fn test_conversion_to_provider_error() {
        let err = OvhError::Auth {
            message: "test error".to_string(),
        };
        let provider_err: crate::providers::ProviderError = err.into();

        assert!(matches!(
            provider_err,
            crate::providers::ProviderError::Ovh(_)
        ));
        assert!(provider_err.to_string().contains("authentication failed"));

        let source = std::error::Error::source(&provider_err).unwrap();
        assert!(source.to_string().contains("test error"));
    }
}
