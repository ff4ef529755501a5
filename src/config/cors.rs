//! CORS headers configuration.

use std::env;

pub const DEFAULT_ALLOW_ORIGIN: &str = "*";
pub const DEFAULT_ALLOW_METHODS: &str = "GET,OPTIONS";
pub const DEFAULT_ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";

/// Values stamped into the `Access-Control-*` response headers
#[derive(Debug, Clone, PartialEq)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: DEFAULT_ALLOW_ORIGIN.to_string(),
            allow_methods: DEFAULT_ALLOW_METHODS.to_string(),
            allow_headers: DEFAULT_ALLOW_HEADERS.to_string(),
        }
    }
}

impl CorsConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let allow_origin =
            env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| DEFAULT_ALLOW_ORIGIN.to_string());

        let allow_methods =
            env::var("CORS_ALLOW_METHODS").unwrap_or_else(|_| DEFAULT_ALLOW_METHODS.to_string());

        let allow_headers =
            env::var("CORS_ALLOW_HEADERS").unwrap_or_else(|_| DEFAULT_ALLOW_HEADERS.to_string());

        Self {
            allow_origin,
            allow_methods,
            allow_headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_any_origin_for_reads() {
        let config = CorsConfig::default();
        assert_eq!(config.allow_origin, "*");
        assert_eq!(config.allow_methods, "GET,OPTIONS");
        assert!(config.allow_headers.contains("X-Api-Key"));
    }
}
