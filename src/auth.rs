use axum::http::HeaderMap;

use crate::config;
use crate::errors::AppError;

/// Header carrying the shared agent API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks the shared-key gate for the demo data endpoints. A deployment
/// without `AGENT_API_KEY` set is a configuration error, not a 401.
pub fn is_agent_api_authorized(headers: &HeaderMap) -> Result<bool, AppError> {
    let expected = config::require_env("AGENT_API_KEY")?;
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);
    Ok(provided == Some(expected.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn headers_with_key(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key.parse().unwrap());
        headers
    }

    #[test]
    #[serial]
    fn matching_key_authorizes() {
        std::env::set_var("AGENT_API_KEY", "sekrit");
        assert!(is_agent_api_authorized(&headers_with_key("sekrit")).unwrap());
        assert!(is_agent_api_authorized(&headers_with_key("  sekrit  ")).unwrap());
        std::env::remove_var("AGENT_API_KEY");
    }

    #[test]
    #[serial]
    fn wrong_or_absent_key_is_rejected() {
        std::env::set_var("AGENT_API_KEY", "sekrit");
        assert!(!is_agent_api_authorized(&headers_with_key("nope")).unwrap());
        assert!(!is_agent_api_authorized(&HeaderMap::new()).unwrap());
        std::env::remove_var("AGENT_API_KEY");
    }

    #[test]
    #[serial]
    fn missing_configuration_raises() {
        std::env::remove_var("AGENT_API_KEY");
        let err = is_agent_api_authorized(&headers_with_key("any")).unwrap_err();
        assert!(matches!(err, AppError::MissingEnv { .. }));
    }
}
