pub mod ovh;

use thiserror::Error;

use crate::config::ClientConfig;
use ovh::{OvhClient, OvhError};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("ovh error: {0}")]
    Ovh(#[from] OvhError),
}

/// Named API endpoints of the OVH family of brands.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("ovh-eu", "https://eu.api.ovh.com/1.0"),
    ("ovh-ca", "https://ca.api.ovh.com/1.0"),
    ("ovh-us", "https://api.us.ovhcloud.com/1.0"),
    ("kimsufi-eu", "https://eu.api.kimsufi.com/1.0"),
    ("kimsufi-ca", "https://ca.api.kimsufi.com/1.0"),
    ("soyoustart-eu", "https://eu.api.soyoustart.com/1.0"),
    ("soyoustart-ca", "https://ca.api.soyoustart.com/1.0"),
];

/// Resolves an endpoint name to its base URL. Explicit `http(s)://` URLs are
/// passed through unchanged.
pub fn resolve_endpoint(name: &str) -> Result<String, ProviderError> {
    if name.starts_with("https://") || name.starts_with("http://") {
        return Ok(name.to_string());
    }

    ENDPOINTS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, url)| url.to_string())
        .ok_or_else(|| ProviderError::UnknownEndpoint(name.to_string()))
}

/// Builds an authenticated client from CLI/env configuration.
pub fn connect(config: &ClientConfig) -> Result<OvhClient, ProviderError> {
    let token = config.access_token.clone().ok_or_else(|| {
        ProviderError::Auth(
            "No access token provided. Set OVH_ACCESS_TOKEN or use --token flag".to_string(),
        )
    })?;

    let base_url = resolve_endpoint(&config.endpoint)?;
    tracing::debug!(endpoint = %config.endpoint, base_url = %base_url, "connecting to OVH API");

    Ok(OvhClient::with_base_url(token, base_url)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_named_endpoint() {
        assert_eq!(
            resolve_endpoint("ovh-ca").unwrap(),
            "https://ca.api.ovh.com/1.0"
        );
        assert_eq!(
            resolve_endpoint("ovh-us").unwrap(),
            "https://api.us.ovhcloud.com/1.0"
        );
    }

    #[test]
    fn test_resolve_explicit_url() {
        assert_eq!(
            resolve_endpoint("http://127.0.0.1:9000").unwrap(),
            "http://127.0.0.1:9000"
        );
    }

    #[test]
    fn test_resolve_unknown_endpoint() {
        let result = resolve_endpoint("ovh-mars");
        match result {
            Err(ProviderError::UnknownEndpoint(name)) => assert_eq!(name, "ovh-mars"),
            _ => panic!("expected UnknownEndpoint error"),
        }
    }

    #[test]
    fn test_connect_without_token() {
        let config = ClientConfig::default();
        let result = connect(&config);

        if let Err(ProviderError::Auth(msg)) = result {
            assert!(msg.contains("No access token provided"));
        } else {
            panic!("Expected ProviderError::Auth");
        }
    }

    #[test]
    fn test_connect_uses_resolved_endpoint() {
        let config = ClientConfig {
            endpoint: "kimsufi-eu".to_string(),
            access_token: Some("token".to_string()),
        };
        let client = connect(&config).unwrap();
        assert_eq!(client.api_base(), "https://eu.api.kimsufi.com/1.0");
    }

    #[test]
    fn test_connect_error_does_not_contain_token() {
        let config = ClientConfig {
            endpoint: "ovh-eu".to_string(),
            access_token: Some("secret\nvalue".to_string()),
        };
        let err = connect(&config).unwrap_err();
        assert!(!err.to_string().contains("secret"));
    }
}
